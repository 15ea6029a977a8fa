//! Layout engine: simulation plus interaction state.
//!
//! All mutable handles (drag pin, pan gesture, hover, zoom/pan transform)
//! live here rather than in the component. [`LayoutEngine::set_data`]
//! defines what survives a data change:
//!
//! - bodies keep their positions by node id (see [`Simulation::reseed`])
//! - a drag or hover on a node that no longer exists is dropped
//! - an empty view resets the transform to its initial centred state
//! - otherwise the transform is kept

use std::collections::{HashMap, HashSet};

use url::Url;

use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::Simulation;
use super::types::{GraphData, GraphNode, NodeKind};
use super::viewport::Viewport;
use crate::config::LayoutConfig;
use crate::graph::NodeId;

/// Screen distance a pointer may travel before a press stops being a click.
const CLICK_SLOP: f64 = 4.0;

/// In-progress node drag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragState {
	/// Grabbed node, if a drag is in progress.
	pub node: Option<NodeId>,
	/// Pointer position at press.
	pub start_x: f64,
	/// Pointer position at press.
	pub start_y: f64,
	/// Node position at press.
	pub node_start_x: f64,
	/// Node position at press.
	pub node_start_y: f64,
	/// Whether the pointer left the click slop.
	pub moved: bool,
}

/// In-progress background pan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanState {
	/// Whether a pan is in progress.
	pub active: bool,
	/// Pointer position at press.
	pub start_x: f64,
	/// Pointer position at press.
	pub start_y: f64,
	/// Viewport pan at press.
	pub transform_start_x: f64,
	/// Viewport pan at press.
	pub transform_start_y: f64,
}

/// Hover highlight with eased per-node intensity.
///
/// The hovered node and its direct neighbours fade toward 1.0; everything
/// else decays toward 0.0 and is forgotten once invisible.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	/// Node under the pointer.
	pub hovered: Option<NodeId>,
	targets: HashSet<NodeId>,
	intensity: HashMap<NodeId, f64>,
	peak: f64,
}

impl HighlightState {
	/// Changes the hovered node; neighbours come from `edges`.
	pub fn set_hover(&mut self, node: Option<NodeId>, edges: &[(NodeId, NodeId)]) {
		if self.hovered == node {
			return;
		}
		self.hovered = node;
		self.targets.clear();
		if let Some(id) = node {
			self.targets.insert(id);
			for &(a, b) in edges {
				if a == id {
					self.targets.insert(b);
				} else if b == id {
					self.targets.insert(a);
				}
			}
		}
	}

	/// Exponential smoothing: faster in than out.
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0;
		const FADE_OUT_SPEED: f64 = 4.0;
		let fade_in = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out = (-FADE_OUT_SPEED * dt).exp();

		for &id in &self.targets {
			let value = self.intensity.entry(id).or_insert(0.0);
			*value += (1.0 - *value) * fade_in;
		}
		let targets = &self.targets;
		self.intensity.retain(|id, value| {
			if !targets.contains(id) {
				*value *= fade_out;
			}
			*value > 0.005
		});
		self.peak = self.intensity.values().copied().fold(0.0, f64::max);
	}

	/// Current highlight of one node, 0.0 to 1.0.
	pub fn intensity(&self, id: NodeId) -> f64 {
		self.intensity.get(&id).copied().unwrap_or(0.0)
	}

	/// Geometric mean of the endpoints, so edges fade with their nodes.
	pub fn edge_intensity(&self, a: NodeId, b: NodeId) -> f64 {
		(self.intensity(a) * self.intensity(b)).sqrt()
	}

	/// Strongest intensity on screen; used to dim everything else.
	pub fn peak(&self) -> f64 {
		self.peak
	}

	fn retain_nodes(&mut self, alive: impl Fn(NodeId) -> bool) {
		if self.hovered.is_some_and(|id| !alive(id)) {
			self.hovered = None;
			self.targets.clear();
		}
		self.targets.retain(|&id| alive(id));
		self.intensity.retain(|&id, _| alive(id));
	}
}

/// What the hover overlay shows for the node under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	/// Hovered node.
	pub id: NodeId,
	/// Its label.
	pub label: String,
	/// Whether it is a root.
	pub is_root: bool,
	/// Set for resource nodes; clicking opens it.
	pub url: Option<Url>,
	/// Screen position of the node centre.
	pub screen_x: f64,
	/// Screen position of the node centre.
	pub screen_y: f64,
}

/// Physics simulation combined with pan/zoom, drag and hover tracking.
///
/// Created once when the canvas mounts and mutated every animation frame.
pub struct LayoutEngine {
	/// Body positions.
	pub simulation: Simulation,
	/// Pan/zoom.
	pub viewport: Viewport,
	/// Node drag gesture.
	pub drag: DragState,
	/// Background pan gesture.
	pub pan: PanState,
	/// Hover easing.
	pub highlight: HighlightState,
	/// Drawn sizes.
	pub scale: ScaleConfig,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	nodes: HashMap<NodeId, GraphNode>,
	edges: Vec<(NodeId, NodeId)>,
}

impl LayoutEngine {
	/// Engine for an initial view on a `width` x `height` canvas.
	pub fn new(data: &GraphData, width: f64, height: f64, config: LayoutConfig) -> Self {
		let viewport = Viewport::centered(width, height, &config);
		let mut engine = Self {
			simulation: Simulation::new(config),
			viewport,
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			scale: ScaleConfig::default(),
			width,
			height,
			nodes: HashMap::new(),
			edges: Vec::new(),
		};
		engine.set_data(data);
		engine
	}

	/// View node by id.
	pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
		self.nodes.get(&id)
	}

	/// Replaces the node/edge view and reseeds the simulation.
	pub fn set_data(&mut self, data: &GraphData) {
		self.simulation.reseed(data);
		self.nodes = data.nodes.iter().map(|n| (n.id, n.clone())).collect();
		self.edges = data.links.iter().map(|l| (l.source, l.target)).collect();

		let nodes = &self.nodes;
		if self.drag.node.is_some_and(|id| !nodes.contains_key(&id)) {
			self.drag = DragState::default();
		}
		self.highlight.retain_nodes(|id| nodes.contains_key(&id));

		if data.nodes.is_empty() {
			self.viewport = Viewport::centered(self.width, self.height, self.simulation.config());
			self.pan = PanState::default();
		}
	}

	/// Tracks a canvas size change.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Advances physics and hover easing by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		self.simulation.tick(dt);
		self.highlight.tick(dt);
	}

	/// Node under a screen position, if any.
	pub fn node_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let (wx, wy) = self.viewport.screen_to_world(sx, sy);
		let hit = ScaledValues::new(&self.scale, self.viewport.k).hit_radius;
		self.simulation.body_at(wx, wy, hit)
	}

	/// Press: grabs the node under the pointer, or starts panning.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		match self.node_at(sx, sy) {
			Some(id) => {
				let (x, y) = self.simulation.position(id).unwrap_or_default();
				self.drag = DragState {
					node: Some(id),
					start_x: sx,
					start_y: sy,
					node_start_x: x,
					node_start_y: y,
					moved: false,
				};
				self.simulation.pin(id, x, y);
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: sx,
					start_y: sy,
					transform_start_x: self.viewport.x,
					transform_start_y: self.viewport.y,
				};
			}
		}
	}

	/// Move: drags the pinned node, pans, or updates hover.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(id) = self.drag.node {
			let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
			if dx.hypot(dy) > CLICK_SLOP {
				self.drag.moved = true;
			}
			if self.drag.moved {
				let k = self.viewport.k;
				self.simulation
					.pin(id, self.drag.node_start_x + dx / k, self.drag.node_start_y + dy / k);
			}
		} else if self.pan.active {
			self.viewport.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.viewport.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		} else {
			let hovered = self.node_at(sx, sy);
			self.highlight.set_hover(hovered, &self.edges);
		}
	}

	/// Release: unpins a dragged node. Returns the URL to open when the
	/// gesture was a click on a resource node.
	pub fn pointer_up(&mut self) -> Option<Url> {
		self.pan = PanState::default();
		let drag = std::mem::take(&mut self.drag);
		let id = drag.node?;
		self.simulation.release(id);
		if drag.moved {
			return None;
		}
		self.nodes.get(&id).and_then(|n| n.kind.url().cloned())
	}

	/// Pointer left the canvas: abandon gestures and hover.
	pub fn pointer_leave(&mut self) {
		if let Some(id) = std::mem::take(&mut self.drag).node {
			self.simulation.release(id);
		}
		self.pan = PanState::default();
		self.highlight.set_hover(None, &self.edges);
	}

	/// Wheel zoom around the cursor; positive `delta_y` zooms out.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		self.viewport.zoom_at(sx, sy, factor);
	}

	/// Frames every node with the configured margin.
	pub fn fit_to_view(&mut self) {
		let config = self.simulation.config();
		match self.simulation.bounds() {
			Some(bounds) => {
				let pad = config.collision_radius;
				let margin = config.fit_margin;
				self.viewport
					.fit(bounds.padded(pad), self.width, self.height, margin);
			}
			None => self.viewport = Viewport::centered(self.width, self.height, config),
		}
	}

	/// Overlay contents for the hovered node.
	pub fn hover_info(&self) -> Option<HoverInfo> {
		let id = self.highlight.hovered?;
		let node = self.nodes.get(&id)?;
		let (x, y) = self.simulation.position(id)?;
		let (screen_x, screen_y) = self.viewport.world_to_screen(x, y);
		Some(HoverInfo {
			id,
			label: node.label.clone(),
			is_root: node.is_root,
			url: match &node.kind {
				NodeKind::Resource(url) => Some(url.clone()),
				NodeKind::Seed => None,
			},
			screen_x,
			screen_y,
		})
	}
}
