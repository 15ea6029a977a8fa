//! Force simulation for the forest layout.
//!
//! Each tick accumulates four contributions per body and integrates them:
//!
//! - springs along parent/child links, toward `link_distance`
//! - pairwise repulsion falling off as 1/distance
//! - a pull of every body toward the origin (the viewport centre)
//! - a minimum-separation pass that pushes overlapping bodies apart
//!
//! The simulation idles once the mean kinetic energy per free body drops
//! below `energy_threshold`, and wakes again on reseed, pin, or release.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::debug;

use super::types::GraphData;
use super::viewport::Bounds;
use crate::config::LayoutConfig;
use crate::graph::NodeId;

/// Simulated state of one node.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
	/// Node this body draws.
	pub id: NodeId,
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal velocity.
	pub vx: f64,
	/// Vertical velocity.
	pub vy: f64,
	/// Held in place by a drag; excluded from integration.
	pub pinned: bool,
}

impl Body {
	fn at(id: NodeId, x: f64, y: f64) -> Self {
		Self {
			id,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			pinned: false,
		}
	}

	fn kinetic_energy(&self) -> f64 {
		0.5 * (self.vx * self.vx + self.vy * self.vy)
	}
}

/// Bodies keyed by node id plus the link list between them.
#[derive(Clone, Debug)]
pub struct Simulation {
	config: LayoutConfig,
	bodies: Vec<Body>,
	index: HashMap<NodeId, usize>,
	links: Vec<(usize, usize)>,
	energy: f64,
	running: bool,
}

/// Deterministic hash in `[0, 1)`, stable across reloads.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Unit vector for two coincident bodies, derived from their indices.
fn fallback_direction(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
	(angle.cos(), angle.sin())
}

impl Simulation {
	/// Empty, idle simulation.
	pub fn new(config: LayoutConfig) -> Self {
		Self {
			config,
			bodies: Vec::new(),
			index: HashMap::new(),
			links: Vec::new(),
			energy: 0.0,
			running: false,
		}
	}

	/// Tuning in use.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Bodies in view order.
	pub fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	/// Body for a node id.
	pub fn body(&self, id: NodeId) -> Option<&Body> {
		self.index.get(&id).map(|&i| &self.bodies[i])
	}

	/// Position of a node id.
	pub fn position(&self, id: NodeId) -> Option<(f64, f64)> {
		self.body(id).map(|b| (b.x, b.y))
	}

	/// Iterates links as `(source, target)` body pairs.
	pub fn links(&self) -> impl Iterator<Item = (&Body, &Body)> {
		self.links
			.iter()
			.map(|&(a, b)| (&self.bodies[a], &self.bodies[b]))
	}

	/// Whether ticks still move bodies.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Mean kinetic energy per free body after the last tick.
	pub fn energy(&self) -> f64 {
		self.energy
	}

	/// Rebuilds the body and link set from a new view.
	///
	/// Bodies whose id survives keep their position, velocity and pin.
	/// New bodies start near their parent (or near the origin for roots)
	/// at a deterministic pseudo-random offset.
	pub fn reseed(&mut self, data: &GraphData) {
		let parents: HashMap<NodeId, NodeId> = data
			.links
			.iter()
			.map(|link| (link.target, link.source))
			.collect();

		let mut bodies: Vec<Body> = Vec::with_capacity(data.nodes.len());
		let mut index: HashMap<NodeId, usize> = HashMap::with_capacity(data.nodes.len());
		let mut spawned = 0usize;

		for node in &data.nodes {
			let body = match self.body(node.id) {
				Some(old) => old.clone(),
				None => {
					let anchor = parents
						.get(&node.id)
						.and_then(|p| index.get(p))
						.map(|&i| (bodies[i].x, bodies[i].y));
					let (x, y) = self.spawn_point(node.id, anchor);
					spawned += 1;
					Body::at(node.id, x, y)
				}
			};
			index.insert(node.id, bodies.len());
			bodies.push(body);
		}

		let links = data
			.links
			.iter()
			.filter_map(|link| Some((*index.get(&link.source)?, *index.get(&link.target)?)))
			.collect();

		let removed = self.bodies.len() + spawned - bodies.len();
		debug!(
			"lead-graph: reseeded layout with {} bodies ({} new, {} removed)",
			bodies.len(),
			spawned,
			removed
		);

		self.bodies = bodies;
		self.index = index;
		self.links = links;
		self.running = !self.bodies.is_empty();
	}

	fn spawn_point(&self, id: NodeId, anchor: Option<(f64, f64)>) -> (f64, f64) {
		let seed = id.0 as f64;
		let angle = pseudo_random(seed * 1.1) * TAU;
		let (ox, oy, radius) = match anchor {
			Some((x, y)) => (x, y, self.config.link_distance * (0.5 + 0.5 * pseudo_random(seed * 2.3))),
			None => (0.0, 0.0, self.config.link_distance * pseudo_random(seed * 3.7)),
		};
		(ox + radius * angle.cos(), oy + radius * angle.sin())
	}

	/// Holds a body at `(x, y)` until [`release`](Self::release).
	pub fn pin(&mut self, id: NodeId, x: f64, y: f64) {
		if let Some(&i) = self.index.get(&id) {
			let body = &mut self.bodies[i];
			body.x = x;
			body.y = y;
			body.vx = 0.0;
			body.vy = 0.0;
			body.pinned = true;
			self.running = true;
		}
	}

	/// Lets a pinned body move freely again.
	pub fn release(&mut self, id: NodeId) {
		if let Some(&i) = self.index.get(&id) {
			self.bodies[i].pinned = false;
			self.running = true;
		}
	}

	/// Bounding box of every body centre.
	pub fn bounds(&self) -> Option<Bounds> {
		let mut iter = self.bodies.iter();
		let first = iter.next()?;
		let mut bounds = Bounds::point(first.x, first.y);
		for b in iter {
			bounds.include(b.x, b.y);
		}
		Some(bounds)
	}

	/// Nearest body whose centre lies within `radius` of `(x, y)`.
	pub fn body_at(&self, x: f64, y: f64, radius: f64) -> Option<NodeId> {
		self.bodies
			.iter()
			.map(|b| (b.id, (b.x - x).hypot(b.y - y)))
			.filter(|&(_, d)| d < radius)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(id, _)| id)
	}

	/// Advances one frame. `dt` is in seconds; 1/60 s is one unit step.
	/// Returns whether the simulation is still running.
	pub fn tick(&mut self, dt: f64) -> bool {
		if !self.running {
			return false;
		}
		let step = (dt * 60.0).clamp(0.0, 3.0);
		let forces = self.forces();
		self.integrate(&forces, step);
		self.separate();

		let free: Vec<&Body> = self.bodies.iter().filter(|b| !b.pinned).collect();
		self.energy = if free.is_empty() {
			0.0
		} else {
			free.iter().map(|b| b.kinetic_energy()).sum::<f64>() / free.len() as f64
		};
		let pinned = free.len() < self.bodies.len();
		if self.energy < self.config.energy_threshold && !pinned {
			debug!("lead-graph: layout settled (energy {:.4})", self.energy);
			self.running = false;
		}
		self.running
	}

	fn forces(&self) -> Vec<(f64, f64)> {
		let c = &self.config;
		let n = self.bodies.len();
		let mut forces = vec![(0.0, 0.0); n];

		for i in 0..n {
			for j in (i + 1)..n {
				let (dx, dy) = (self.bodies[i].x - self.bodies[j].x, self.bodies[i].y - self.bodies[j].y);
				let dist = dx.hypot(dy);
				let (ux, uy) = if dist > 1e-6 {
					(dx / dist, dy / dist)
				} else {
					fallback_direction(i, j)
				};
				let push = c.repulsion / dist.max(1.0);
				forces[i].0 += ux * push;
				forces[i].1 += uy * push;
				forces[j].0 -= ux * push;
				forces[j].1 -= uy * push;
			}
		}

		for &(a, b) in &self.links {
			if a == b {
				continue;
			}
			let (dx, dy) = (self.bodies[b].x - self.bodies[a].x, self.bodies[b].y - self.bodies[a].y);
			let dist = dx.hypot(dy);
			if dist <= 1e-6 {
				continue;
			}
			let pull = c.link_strength * (dist - c.link_distance);
			let (fx, fy) = (dx / dist * pull, dy / dist * pull);
			forces[a].0 += fx;
			forces[a].1 += fy;
			forces[b].0 -= fx;
			forces[b].1 -= fy;
		}

		for (force, body) in forces.iter_mut().zip(&self.bodies) {
			force.0 -= body.x * c.center_strength;
			force.1 -= body.y * c.center_strength;
		}

		forces
	}

	fn integrate(&mut self, forces: &[(f64, f64)], step: f64) {
		let c = &self.config;
		for (body, &(fx, fy)) in self.bodies.iter_mut().zip(forces) {
			if body.pinned {
				body.vx = 0.0;
				body.vy = 0.0;
				continue;
			}
			let mut vx = (body.vx + fx * step) * c.velocity_damping;
			let mut vy = (body.vy + fy * step) * c.velocity_damping;
			let speed = vx.hypot(vy);
			if speed > c.max_speed {
				vx *= c.max_speed / speed;
				vy *= c.max_speed / speed;
			}
			body.vx = vx;
			body.vy = vy;
			body.x += vx * step;
			body.y += vy * step;
		}
	}

	/// Pushes overlapping pairs apart to `2 * collision_radius`. Pinned
	/// bodies stay put and their partner takes the whole correction.
	fn separate(&mut self) {
		let min_dist = 2.0 * self.config.collision_radius;
		if min_dist <= 0.0 {
			return;
		}
		let n = self.bodies.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.bodies[i], &self.bodies[j]);
				if a.pinned && b.pinned {
					continue;
				}
				let (dx, dy) = (a.x - b.x, a.y - b.y);
				let dist = dx.hypot(dy);
				if dist >= min_dist {
					continue;
				}
				let (ux, uy) = if dist > 1e-6 {
					(dx / dist, dy / dist)
				} else {
					fallback_direction(i, j)
				};
				let overlap = min_dist - dist;
				let (share_a, share_b) = match (a.pinned, b.pinned) {
					(true, false) => (0.0, 1.0),
					(false, true) => (1.0, 0.0),
					_ => (0.5, 0.5),
				};
				self.bodies[i].x += ux * overlap * share_a;
				self.bodies[i].y += uy * overlap * share_a;
				self.bodies[j].x -= ux * overlap * share_b;
				self.bodies[j].y -= uy * overlap * share_b;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode, NodeKind};

	fn quiet() -> LayoutConfig {
		LayoutConfig {
			repulsion: 0.0,
			link_strength: 0.0,
			center_strength: 0.0,
			collision_radius: 0.0,
			..LayoutConfig::default()
		}
	}

	fn data(ids: &[u64], links: &[(u64, u64)]) -> GraphData {
		GraphData {
			nodes: ids
				.iter()
				.map(|&id| GraphNode {
					id: NodeId(id),
					label: format!("n{id}"),
					is_root: !links.iter().any(|&(_, t)| t == id),
					kind: NodeKind::Seed,
				})
				.collect(),
			links: links
				.iter()
				.map(|&(s, t)| GraphLink {
					source: NodeId(s),
					target: NodeId(t),
				})
				.collect(),
		}
	}

	fn place(sim: &mut Simulation, id: u64, x: f64, y: f64) {
		sim.pin(NodeId(id), x, y);
		sim.release(NodeId(id));
	}

	fn distance(sim: &Simulation, a: u64, b: u64) -> f64 {
		let (ax, ay) = sim.position(NodeId(a)).unwrap();
		let (bx, by) = sim.position(NodeId(b)).unwrap();
		(ax - bx).hypot(ay - by)
	}

	#[test]
	fn reseed_keeps_existing_positions() {
		let mut sim = Simulation::new(LayoutConfig::default());
		sim.reseed(&data(&[1, 2], &[(1, 2)]));
		for _ in 0..50 {
			sim.tick(1.0 / 60.0);
		}
		let before_1 = sim.position(NodeId(1)).unwrap();
		let before_2 = sim.position(NodeId(2)).unwrap();

		sim.reseed(&data(&[1, 2, 3], &[(1, 2), (2, 3)]));
		assert_eq!(sim.position(NodeId(1)), Some(before_1));
		assert_eq!(sim.position(NodeId(2)), Some(before_2));
		assert!(sim.is_running());

		// New child spawns within one rest length of its parent.
		let d = distance(&sim, 2, 3);
		assert!(d <= LayoutConfig::default().link_distance + 1e-9, "spawned {d} away");
	}

	#[test]
	fn reseed_drops_missing_bodies_and_links() {
		let mut sim = Simulation::new(LayoutConfig::default());
		sim.reseed(&data(&[1, 2, 3], &[(1, 2), (1, 3)]));
		sim.reseed(&data(&[1], &[]));
		assert_eq!(sim.bodies().len(), 1);
		assert_eq!(sim.links().count(), 0);
		assert!(sim.body(NodeId(2)).is_none());
	}

	#[test]
	fn empty_view_idles() {
		let mut sim = Simulation::new(LayoutConfig::default());
		sim.reseed(&GraphData::default());
		assert!(!sim.is_running());
		assert!(!sim.tick(1.0 / 60.0));
		assert!(sim.bounds().is_none());
	}

	#[test]
	fn spring_pulls_stretched_link_together() {
		let mut sim = Simulation::new(LayoutConfig {
			link_strength: 0.05,
			..quiet()
		});
		sim.reseed(&data(&[1, 2], &[(1, 2)]));
		place(&mut sim, 1, 0.0, 0.0);
		place(&mut sim, 2, 400.0, 0.0);
		sim.tick(1.0 / 60.0);
		assert!(distance(&sim, 1, 2) < 400.0);
	}

	#[test]
	fn spring_pushes_compressed_link_apart() {
		let mut sim = Simulation::new(LayoutConfig {
			link_strength: 0.05,
			..quiet()
		});
		sim.reseed(&data(&[1, 2], &[(1, 2)]));
		place(&mut sim, 1, 0.0, 0.0);
		place(&mut sim, 2, 20.0, 0.0);
		sim.tick(1.0 / 60.0);
		assert!(distance(&sim, 1, 2) > 20.0);
	}

	#[test]
	fn repulsion_separates_unlinked_bodies() {
		let mut sim = Simulation::new(LayoutConfig {
			repulsion: 500.0,
			..quiet()
		});
		sim.reseed(&data(&[1, 2], &[]));
		place(&mut sim, 1, -5.0, 0.0);
		place(&mut sim, 2, 5.0, 0.0);
		sim.tick(1.0 / 60.0);
		assert!(distance(&sim, 1, 2) > 10.0);
	}

	#[test]
	fn centering_pulls_toward_origin() {
		let mut sim = Simulation::new(LayoutConfig {
			center_strength: 0.05,
			..quiet()
		});
		sim.reseed(&data(&[1], &[]));
		place(&mut sim, 1, 300.0, -200.0);
		sim.tick(1.0 / 60.0);
		let (x, y) = sim.position(NodeId(1)).unwrap();
		assert!(x < 300.0 && y > -200.0);
	}

	#[test]
	fn collision_enforces_minimum_separation() {
		let mut sim = Simulation::new(LayoutConfig {
			collision_radius: 10.0,
			..quiet()
		});
		sim.reseed(&data(&[1, 2], &[]));
		place(&mut sim, 1, 0.0, 0.0);
		place(&mut sim, 2, 0.0, 0.0);
		sim.tick(1.0 / 60.0);
		assert!(distance(&sim, 1, 2) >= 20.0 - 1e-9);
	}

	#[test]
	fn pinned_body_does_not_move() {
		let mut sim = Simulation::new(LayoutConfig::default());
		sim.reseed(&data(&[1, 2, 3], &[(1, 2), (1, 3)]));
		sim.pin(NodeId(2), 250.0, 40.0);
		for _ in 0..100 {
			sim.tick(1.0 / 60.0);
		}
		assert_eq!(sim.position(NodeId(2)), Some((250.0, 40.0)));
		// A held body keeps the layout awake.
		assert!(sim.is_running());
		sim.release(NodeId(2));
		assert!(!sim.body(NodeId(2)).unwrap().pinned);
	}

	#[test]
	fn small_forest_settles() {
		let mut sim = Simulation::new(LayoutConfig::default());
		sim.reseed(&data(
			&[1, 2, 3, 4, 5, 6],
			&[(1, 2), (1, 3), (1, 4), (4, 5)],
		));
		let mut ticks = 0;
		while sim.tick(1.0 / 60.0) {
			ticks += 1;
			assert!(ticks < 5_000, "did not settle, energy {}", sim.energy());
		}
		assert!(sim.energy() < LayoutConfig::default().energy_threshold);
		for body in sim.bodies() {
			assert!(body.x.is_finite() && body.y.is_finite());
		}
	}

	#[test]
	fn body_at_picks_nearest_within_radius() {
		let mut sim = Simulation::new(quiet());
		sim.reseed(&data(&[1, 2], &[]));
		place(&mut sim, 1, 0.0, 0.0);
		place(&mut sim, 2, 8.0, 0.0);
		assert_eq!(sim.body_at(6.0, 0.0, 10.0), Some(NodeId(2)));
		assert_eq!(sim.body_at(100.0, 0.0, 10.0), None);
	}
}
