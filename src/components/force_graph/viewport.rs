//! Pan/zoom transform between world and screen space.
//!
//! `screen = world * k + (x, y)`. The transform never touches simulated
//! coordinates; it only changes how they are drawn and hit-tested.

use crate::config::LayoutConfig;

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Zero-size box at one point.
	pub fn point(x: f64, y: f64) -> Self {
		Self {
			min_x: x,
			min_y: y,
			max_x: x,
			max_y: y,
		}
	}

	/// Grows the box to cover `(x, y)`.
	pub fn include(&mut self, x: f64, y: f64) {
		self.min_x = self.min_x.min(x);
		self.min_y = self.min_y.min(y);
		self.max_x = self.max_x.max(x);
		self.max_y = self.max_y.max(y);
	}

	/// Grows the box by `by` on every side.
	pub fn padded(self, by: f64) -> Self {
		Self {
			min_x: self.min_x - by,
			min_y: self.min_y - by,
			max_x: self.max_x + by,
			max_y: self.max_y + by,
		}
	}

	/// Horizontal extent.
	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	/// Vertical extent.
	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	/// Midpoint.
	pub fn center(&self) -> (f64, f64) {
		((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
	}
}

/// Pan offset `(x, y)` in screen pixels and zoom factor `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Horizontal pan in pixels.
	pub x: f64,
	/// Vertical pan in pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
	min_zoom: f64,
	max_zoom: f64,
	fit_max_zoom: f64,
}

impl Viewport {
	/// World origin at the centre of a `width` x `height` canvas, 100% zoom.
	pub fn centered(width: f64, height: f64, config: &LayoutConfig) -> Self {
		let min_zoom = config.min_zoom.min(config.max_zoom);
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0_f64.clamp(min_zoom, config.max_zoom),
			min_zoom,
			max_zoom: config.max_zoom,
			fit_max_zoom: config.fit_max_zoom,
		}
	}

	/// Canvas pixel to simulation coordinates.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Simulation coordinates to canvas pixel.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Shifts the view by a screen delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}

	/// Multiplies the zoom by `factor`, clamped to the configured bounds,
	/// keeping the world point under `(sx, sy)` fixed on screen.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.k * factor).clamp(self.min_zoom, self.max_zoom);
		let ratio = new_k / self.k;
		self.x = sx - (sx - self.x) * ratio;
		self.y = sy - (sy - self.y) * ratio;
		self.k = new_k;
	}

	/// Centres `bounds` on a `width` x `height` canvas and zooms so it fits
	/// inside `margin` pixels on every side.
	pub fn fit(&mut self, bounds: Bounds, width: f64, height: f64, margin: f64) {
		let avail_w = (width - 2.0 * margin).max(1.0);
		let avail_h = (height - 2.0 * margin).max(1.0);
		let k = (avail_w / bounds.width().max(1.0)).min(avail_h / bounds.height().max(1.0));
		let upper = self.max_zoom.min(self.fit_max_zoom).max(self.min_zoom);
		self.k = k.clamp(self.min_zoom, upper);
		let (cx, cy) = bounds.center();
		self.x = width / 2.0 - cx * self.k;
		self.y = height / 2.0 - cy * self.k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn viewport() -> Viewport {
		Viewport::centered(800.0, 600.0, &LayoutConfig::default())
	}

	fn close(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn origin_starts_at_canvas_centre() {
		let vp = viewport();
		assert_eq!(vp.world_to_screen(0.0, 0.0), (400.0, 300.0));
		assert_eq!(vp.screen_to_world(400.0, 300.0), (0.0, 0.0));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut vp = viewport();
		for _ in 0..200 {
			vp.zoom_at(400.0, 300.0, 1.1);
		}
		assert_eq!(vp.k, LayoutConfig::default().max_zoom);
		for _ in 0..400 {
			vp.zoom_at(400.0, 300.0, 0.9);
		}
		assert_eq!(vp.k, LayoutConfig::default().min_zoom);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let mut vp = viewport();
		vp.pan_by(-35.0, 12.0);
		let before = vp.screen_to_world(120.0, 480.0);
		vp.zoom_at(120.0, 480.0, 1.7);
		let after = vp.screen_to_world(120.0, 480.0);
		assert!(close(before.0, after.0) && close(before.1, after.1));
	}

	#[test]
	fn fit_puts_every_point_inside_margin() {
		let mut vp = viewport();
		vp.zoom_at(0.0, 0.0, 5.0);
		let points = [(-300.0, -120.0), (520.0, 80.0), (40.0, 260.0)];
		let mut bounds = Bounds::point(points[0].0, points[0].1);
		for &(x, y) in &points[1..] {
			bounds.include(x, y);
		}
		vp.fit(bounds, 800.0, 600.0, 40.0);
		for &(x, y) in &points {
			let (sx, sy) = vp.world_to_screen(x, y);
			assert!((40.0 - 1e-9..=760.0 + 1e-9).contains(&sx), "x {sx}");
			assert!((40.0 - 1e-9..=560.0 + 1e-9).contains(&sy), "y {sy}");
		}
		let (cx, cy) = vp.world_to_screen(bounds.center().0, bounds.center().1);
		assert!(close(cx, 400.0) && close(cy, 300.0));
	}

	#[test]
	fn fit_of_single_point_does_not_over_magnify() {
		let mut vp = viewport();
		vp.fit(Bounds::point(10.0, 10.0), 800.0, 600.0, 40.0);
		assert_eq!(vp.k, LayoutConfig::default().fit_max_zoom);
		assert_eq!(vp.world_to_screen(10.0, 10.0), (400.0, 300.0));
	}
}
