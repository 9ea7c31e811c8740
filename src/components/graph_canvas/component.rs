use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::{CanvasState, Gesture};
use crate::config::AnimationSettings;
use crate::graph::session::Scene;
use crate::graph::types::Position;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn local_point(canvas: &NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((ev.client_x() as f64 - rect.left(), ev.client_y() as f64 - rect.top()))
}

/// Canvas view of a [`Scene`] with pan, zoom, selection, dragging of
/// user-added nodes and shift-drag connections.
#[component]
pub fn GraphCanvas(
	#[prop(into)] scene: Signal<Scene>,
	#[prop(into)] animation: Signal<AnimationSettings>,
	#[prop(into)] on_select: Callback<Option<String>>,
	#[prop(into)] on_open: Callback<String>,
	#[prop(into)] on_node_moved: Callback<(String, Position)>,
	#[prop(into)] on_connect: Callback<(String, String)>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<CanvasState>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) = (state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};

		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		*state_init.borrow_mut() = Some(CanvasState::new(scene.get_untracked(), w, h, animation.get_untracked()));

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, resize_inner) = (state_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			// Stop once the page navigated away from the canvas
			if !canvas.is_connected() {
				if let Some(ref cb) = *resize_inner.borrow() {
					let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick(0.016);
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_scene = state.clone();
	Effect::new(move |_| {
		let scene = scene.get();
		if let Some(ref mut s) = *state_scene.borrow_mut() {
			s.set_scene(scene);
		}
	});

	let state_settings = state.clone();
	Effect::new(move |_| {
		let settings = animation.get();
		if let Some(ref mut s) = *state_settings.borrow_mut() {
			s.animation = settings;
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y, ev.shift_key());
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		// Release the borrow before callbacks feed a new scene back in
		let gesture = state_mu.borrow_mut().as_mut().and_then(|s| s.release(x, y));
		match gesture {
			Some(Gesture::Select(id)) => on_select.run(id),
			Some(Gesture::Moved { id, position }) => on_node_moved.run((id, position)),
			Some(Gesture::Connect { source, target }) => on_connect.run((source, target)),
			None => {}
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		let hit = state_dc.borrow().as_ref().and_then(|s| s.node_at_position(x, y));
		if let Some(id) = hit {
			on_open.run(id);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.cancel();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(&canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
