//! Colours for the forest canvas.

use super::types::GraphNode;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque colour.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Colour with opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same colour, new opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Moves toward white by `factor` (0.0 = unchanged, 1.0 = white).
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Canvas palette. Nodes are coloured by role: roots (seeds of an
/// investigation thread), resources (clickable URLs), and other candidates.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas centre.
	pub background: Color,
	/// Canvas corners.
	pub background_edge: Color,
	/// Links and arrowheads.
	pub edge: Color,
	/// Root nodes.
	pub root: Color,
	/// Clickable resource nodes.
	pub resource: Color,
	/// Other nodes.
	pub candidate: Color,
	/// Node labels.
	pub label: Color,
	/// Hover and pin rings.
	pub ring: Color,
	/// Overlay box.
	pub overlay_fill: Color,
	/// Overlay outline.
	pub overlay_border: Color,
	/// Overlay title.
	pub overlay_text: Color,
	/// Overlay hint line.
	pub overlay_hint: Color,
}

impl Theme {
	/// Default dark palette.
	pub fn dark() -> Self {
		Self {
			background: Color::rgb(22, 27, 34),
			background_edge: Color::rgb(13, 17, 23),
			edge: Color::rgba(139, 148, 158, 0.55),
			root: Color::rgb(240, 136, 62),
			resource: Color::rgb(88, 166, 255),
			candidate: Color::rgb(163, 113, 247),
			label: Color::rgba(230, 237, 243, 0.85),
			ring: Color::rgb(255, 255, 255),
			overlay_fill: Color::rgba(13, 17, 23, 0.92),
			overlay_border: Color::rgba(88, 166, 255, 0.6),
			overlay_text: Color::rgb(230, 237, 243),
			overlay_hint: Color::rgb(139, 148, 158),
		}
	}

	/// Fill for a node by role.
	pub fn node_color(&self, node: &GraphNode) -> Color {
		if node.is_root {
			self.root
		} else if node.kind.is_resource() {
			self.resource
		} else {
			self.candidate
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
