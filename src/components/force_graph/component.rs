//! Leptos component wrapping the forest canvas.
//!
//! The component creates an HTML canvas element and forwards mouse/wheel
//! events to the [`LayoutEngine`], which owns every piece of interaction
//! state. An animation loop runs via `requestAnimationFrame`, stepping the
//! simulation and rendering each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::LayoutEngine;
use super::theme::Theme;
use super::types::GraphData;
use crate::config::LayoutConfig;

/// Layout state bundled with the drawing surface.
struct GraphContext {
	engine: LayoutEngine,
	theme: Theme,
	ctx: CanvasRenderingContext2d,
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

fn canvas_context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Pointer position relative to the canvas.
fn local_position(canvas: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Renders the lead forest on a canvas element.
///
/// `data` is the current store view; each change reseeds the layout while
/// keeping existing node positions. Bumping `fit` frames every node. The
/// component sizes itself to its parent by default; `fullscreen` fills the
/// window and follows resizes. Explicit `width`/`height` override both.
#[component]
pub fn LeadGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] fit: Signal<u32>,
	#[prop(default = LayoutConfig::default())] config: LayoutConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let data = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};

		if let Some(ref mut c) = *context_init.borrow_mut() {
			c.engine.set_data(&data);
			return;
		}

		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let parent = canvas.parent_element();
		let (w, h) = match (fullscreen, window_size(&window)) {
			(true, Some(size)) => size,
			_ => (
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			),
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas_context(&canvas) else {
			warn!("lead-graph: canvas has no 2d context");
			return;
		};
		debug!("lead-graph: canvas mounted at {}x{}", w, h);

		*context_init.borrow_mut() = Some(GraphContext {
			engine: LayoutEngine::new(&data, w, h, config.clone()),
			theme: Theme::default(),
			ctx,
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.engine.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.engine.tick(0.016);
				render::render(&c.engine, &c.ctx, &c.theme);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_fit = context.clone();
	Effect::new(move |previous: Option<u32>| {
		let requested = fit.get();
		if previous.is_some_and(|p| p != requested) {
			if let Some(ref mut c) = *context_fit.borrow_mut() {
				c.engine.fit_to_view();
			}
		}
		requested
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.engine.pointer_down(x, y);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.engine.pointer_move(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		let url = context_mu
			.borrow_mut()
			.as_mut()
			.and_then(|c| c.engine.pointer_up());
		if let (Some(url), Some(window)) = (url, web_sys::window()) {
			debug!("lead-graph: opening {}", url);
			if window.open_with_url_and_target(url.as_str(), "_blank").is_err() {
				warn!("lead-graph: browser refused to open {}", url);
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.engine.pointer_leave();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.engine.wheel(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="lead-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
