//! Zoom-dependent sizes for drawn elements.
//!
//! Drawing happens after the canvas transform, so every value handed to
//! the renderer is in world units. A [`ScaleBehavior`] decides how a base
//! size reacts to the zoom factor `k`:
//!
//! - [`ScaleBehavior::Screen`] keeps a constant pixel size.
//! - [`ScaleBehavior::Clamped`] grows with zoom between pixel bounds.

/// How a size reacts to zoom.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant size in pixels.
	Screen,
	/// World size, kept between `min_screen` and `max_screen` pixels.
	Clamped {
		/// Smallest on-screen size.
		min_screen: f64,
		/// Largest on-screen size.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space size for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Base sizes and how they scale.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Candidate node radius.
	pub node_radius: f64,
	/// How node radii scale.
	pub node_behavior: ScaleBehavior,
	/// Roots are drawn this much larger than candidates.
	pub root_factor: f64,
	/// Pointer pick radius.
	pub hit_radius: f64,
	/// How the pick radius scales.
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Labels are hidden below this zoom unless highlighted.
	pub label_min_k: f64,
	/// Edge width in screen pixels.
	pub edge_width: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// How arrowheads scale.
	pub arrow_behavior: ScaleBehavior,
	/// Hover ring stroke in screen pixels.
	pub ring_width: f64,
	/// Hover ring gap in screen pixels.
	pub ring_offset: f64,
	/// Hover overlay font size in screen pixels.
	pub overlay_font_size: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 6.0,
			node_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: f64::INFINITY,
			},
			root_factor: 1.8,
			hit_radius: 12.0,
			hit_behavior: ScaleBehavior::Clamped {
				min_screen: 6.0,
				max_screen: f64::INFINITY,
			},
			label_size: 11.0,
			label_min_k: 0.6,
			edge_width: 1.25,
			arrow_size: 5.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 3.0,
				max_screen: 14.0,
			},
			ring_width: 1.5,
			ring_offset: 3.0,
			overlay_font_size: 12.0,
		}
	}
}

/// [`ScaleConfig`] resolved for one zoom level; build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom these values were resolved for.
	pub k: f64,
	/// Candidate node radius.
	pub node_radius: f64,
	/// Pointer pick radius.
	pub hit_radius: f64,
	/// CSS font for labels.
	pub label_font: String,
	/// Whether unhighlighted labels are drawn.
	pub show_labels: bool,
	/// Edge stroke.
	pub edge_width: f64,
	/// Arrowhead length.
	pub arrow_size: f64,
	/// Hover ring stroke.
	pub ring_width: f64,
	/// Hover ring gap.
	pub ring_offset: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			node_radius: config.node_behavior.apply(config.node_radius, k),
			hit_radius: config.hit_behavior.apply(config.hit_radius, k),
			label_font: format!("{}px sans-serif", config.label_size / k),
			show_labels: k >= config.label_min_k,
			edge_width: config.edge_width / k,
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			ring_width: config.ring_width / k,
			ring_offset: config.ring_offset / k,
		}
	}

	/// Radius of a node, roots drawn larger.
	pub fn radius(&self, config: &ScaleConfig, is_root: bool) -> f64 {
		if is_root {
			self.node_radius * config.root_factor
		} else {
			self.node_radius
		}
	}
}
