//! Canvas rendering for the forest.
//!
//! Passes, back to front:
//! 1. Background (screen space)
//! 2. Edges with arrowheads pointing parent to child (world space)
//! 3. Dimmed nodes, then highlighted nodes with labels and hover ring
//! 4. Hover overlay describing the node under the pointer (screen space)

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::simulation::Body;
use super::state::{HoverInfo, LayoutEngine};
use super::theme::Theme;

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders one frame.
pub fn render(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let viewport = &engine.viewport;
	let scale = ScaledValues::new(&engine.scale, viewport.k);

	draw_background(engine, ctx, theme);

	ctx.save();
	let _ = ctx.translate(viewport.x, viewport.y);
	let _ = ctx.scale(viewport.k, viewport.k);

	draw_edges(engine, ctx, &scale, theme);
	draw_nodes(engine, ctx, &scale, theme);

	ctx.restore();

	if let Some(info) = engine.hover_info() {
		draw_overlay(engine, ctx, theme, &info);
	}
}

fn draw_background(engine: &LayoutEngine, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (engine.width, engine.height);
	match ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background_edge.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn body_radius(engine: &LayoutEngine, scale: &ScaledValues, body: &Body) -> f64 {
	let is_root = engine.node(body.id).is_some_and(|n| n.is_root);
	scale.radius(&engine.scale, is_root)
}

fn draw_edges(
	engine: &LayoutEngine,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let peak = smooth_step(engine.highlight.peak());

	for (parent, child) in engine.simulation.links() {
		let (dx, dy) = (child.x - parent.x, child.y - parent.y);
		let dist = dx.hypot(dy);
		let r_from = body_radius(engine, scale, parent);
		let r_to = body_radius(engine, scale, child);
		if dist <= r_from + r_to + scale.arrow_size {
			continue;
		}

		let edge_t = smooth_step(engine.highlight.edge_intensity(parent.id, child.id));
		let (alpha, width) = if edge_t > 0.01 {
			(0.7 + 0.3 * edge_t, scale.edge_width * (1.0 + 0.5 * edge_t))
		} else {
			(0.7 - 0.5 * peak, scale.edge_width)
		};
		let color = theme.edge.with_alpha(theme.edge.a * alpha);

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(parent.x + ux * r_from, parent.y + uy * r_from);
		ctx.line_to(
			child.x - ux * (r_to + scale.arrow_size),
			child.y - uy * (r_to + scale.arrow_size),
		);
		ctx.stroke();

		let (tip_x, tip_y) = (child.x - ux * r_to, child.y - uy * r_to);
		let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
		let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);
		ctx.set_fill_style_str(&color.to_css());
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

fn draw_nodes(
	engine: &LayoutEngine,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let peak = smooth_step(engine.highlight.peak());
	let dim = 1.0 - 0.7 * peak;
	let bodies = engine.simulation.bodies();

	for body in bodies {
		if engine.highlight.intensity(body.id) <= 0.001 {
			draw_node(engine, ctx, scale, theme, body, dim, 1.0);
		}
	}

	for body in bodies {
		let t = engine.highlight.intensity(body.id);
		if t <= 0.001 {
			continue;
		}
		let eased = smooth_step(t);
		let alpha = dim + (1.0 - dim) * eased;
		draw_node(engine, ctx, scale, theme, body, alpha, 1.0 + 0.3 * eased);

		if engine.highlight.hovered == Some(body.id) {
			let radius = body_radius(engine, scale, body) * (1.0 + 0.3 * eased);
			ctx.begin_path();
			let _ = ctx.arc(body.x, body.y, radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.ring.with_alpha(0.8 * eased).to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}
	}
}

fn draw_node(
	engine: &LayoutEngine,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	body: &Body,
	alpha: f64,
	radius_mult: f64,
) {
	let Some(node) = engine.node(body.id) else {
		return;
	};
	let radius = scale.radius(&engine.scale, node.is_root) * radius_mult;
	let color = theme.node_color(node);

	ctx.set_global_alpha(alpha);
	match ctx.create_radial_gradient(
		body.x - radius * 0.3,
		body.y - radius * 0.3,
		0.0,
		body.x,
		body.y,
		radius,
	) {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(1.0, &color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.begin_path();
	let _ = ctx.arc(body.x, body.y, radius, 0.0, 2.0 * PI);
	ctx.fill();

	if body.pinned {
		ctx.set_stroke_style_str(&theme.ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	let highlighted = radius_mult > 1.0;
	if (scale.show_labels || highlighted || node.is_root) && alpha > 0.4 {
		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(&theme.label.to_css());
		ctx.set_font(&scale.label_font);
		let _ = ctx.fill_text(&node.label, body.x + radius + 4.0 / scale.k, body.y + 3.0 / scale.k);
	}
	ctx.set_global_alpha(1.0);
}

fn draw_overlay(
	engine: &LayoutEngine,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	info: &HoverInfo,
) {
	let font_size = engine.scale.overlay_font_size;
	let title = match &info.url {
		Some(url) => url.as_str(),
		None => info.label.as_str(),
	};
	let hint = match (&info.url, info.is_root) {
		(Some(_), _) => "click to open",
		(None, true) => "seed",
		(None, false) => "candidate",
	};

	// No TextMetrics binding; approximate glyph width.
	let text_w = title.chars().count().max(hint.len()) as f64 * font_size * 0.6;
	let (pad, line) = (8.0, font_size * 1.4);
	let (box_w, box_h) = (text_w + 2.0 * pad, 2.0 * line + pad);

	let mut x = info.screen_x + 14.0;
	let mut y = info.screen_y + 14.0;
	if x + box_w > engine.width {
		x = (info.screen_x - 14.0 - box_w).max(0.0);
	}
	if y + box_h > engine.height {
		y = (info.screen_y - 14.0 - box_h).max(0.0);
	}

	ctx.set_fill_style_str(&theme.overlay_fill.to_css());
	ctx.fill_rect(x, y, box_w, box_h);
	ctx.set_stroke_style_str(&theme.overlay_border.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke_rect(x, y, box_w, box_h);

	ctx.set_font(&format!("{font_size}px sans-serif"));
	ctx.set_fill_style_str(&theme.overlay_text.to_css());
	let _ = ctx.fill_text(title, x + pad, y + line);
	ctx.set_fill_style_str(&theme.overlay_hint.to_css());
	let _ = ctx.fill_text(hint, x + pad, y + 2.0 * line);
}
