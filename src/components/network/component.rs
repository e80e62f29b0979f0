use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::NetworkState;
use super::store::GraphStore;

/// The network diagram: a canvas sized to its container, a frame loop over
/// the force simulation, and the pointer surface for hover/drag/click and
/// zoom. All model mutations route through the shared [`GraphStore`].
#[component]
pub fn NetworkCanvas(store: GraphStore) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<NetworkState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let zoom = RwSignal::new(1.0_f64);

	{
		let (state_init, animate_init, store_init) =
			(state.clone(), animate.clone(), store.clone());
		Effect::new(move |_| {
			let Some(canvas) = canvas_ref.get() else {
				return;
			};
			let canvas: HtmlCanvasElement = canvas.into();
			let window: Window = web_sys::window().unwrap();

			// The drawing surface takes its container's natural size, so it
			// can sit behind the overlapping filter panel.
			let (w, h) = (
				canvas
					.parent_element()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0),
				canvas
					.parent_element()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0),
			);
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx: CanvasRenderingContext2d = canvas
				.get_context("2d")
				.unwrap()
				.unwrap()
				.dyn_into()
				.unwrap();

			let mut initial = NetworkState::new(w, h);
			let (nodes, edges) = store_init.visible();
			initial.rebuild(nodes, edges);
			*state_init.borrow_mut() = Some(initial);

			let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				if let Some(ref mut s) = *state_anim.borrow_mut() {
					s.tick(0.016);
					render::render(s, &ctx);
				}
				if let Some(ref cb) = *animate_inner.borrow() {
					let _ = web_sys::window()
						.unwrap()
						.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		});
	}

	// Any model mutation: derive the new visible subgraph and restart the
	// simulation over it, within the same reactive turn.
	{
		let (state_rebuild, store_rebuild) = (state.clone(), store.clone());
		Effect::new(move |_| {
			let _ = store_rebuild.revision().get();
			if let Some(ref mut s) = *state_rebuild.borrow_mut() {
				let (nodes, edges) = store_rebuild.visible();
				s.rebuild(nodes, edges);
			}
		});
	}

	// Cross-highlight driven from the filter panel.
	{
		let (state_hover, store_hover) = (state.clone(), store.clone());
		Effect::new(move |_| {
			let id = store_hover.hovered.get();
			if let Some(ref mut s) = *state_hover.borrow_mut() {
				if s.hovered_id() != id.as_deref() {
					s.set_hover_id(id.as_deref());
				}
			}
		});
	}

	let pointer_position = move |ev: &MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		)
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.begin_drag(idx, x, y);
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
			}
		}
	};

	let (state_mm, store_mm) = (state.clone(), store.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let (x, y) = pointer_position(&ev);
		let mut hovered_now = None;
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			} else if s.pan.active {
				s.transform.x = s.pan.transform_start_x + (x - s.pan.start_x);
				s.transform.y = s.pan.transform_start_y + (y - s.pan.start_y);
			} else {
				let hit = s.node_at_position(x, y);
				s.set_hover(hit);
				hovered_now = Some(s.hovered_id().map(str::to_string));
			}
		}
		// Published outside the borrow: the hover effect reads the state.
		if let Some(id) = hovered_now {
			if store_mm.hovered.get_untracked() != id {
				store_mm.hovered.set(id);
			}
		}
	};

	let (state_mu, store_mu) = (state.clone(), store.clone());
	let on_mouseup = move |_: MouseEvent| {
		let mut clicked = None;
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				if !s.drag.moved {
					clicked = s
						.drag
						.node_idx
						.map(|idx| s.sprites[idx].id.clone());
				}
				s.end_drag();
			}
			s.pan.active = false;
		}
		// A stationary press on a node toggles its expansion; the store
		// no-ops for childless nodes.
		if let Some(id) = clicked {
			store_mu.toggle_expansion(&id);
		}
	};

	let (state_ml, store_ml) = (state.clone(), store.clone());
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if s.drag.active {
				s.end_drag();
			}
			s.pan.active = false;
			s.set_hover(None);
		}
		store_ml.hovered.set(None);
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let (x, y) = pointer_position(&ev);
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			zoom.set(s.zoom_by(factor, x, y));
		}
	};

	let state_zi = state.clone();
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zi.borrow_mut() {
			zoom.set(s.zoom_by(1.25, s.width / 2.0, s.height / 2.0));
		}
	};
	let state_zo = state.clone();
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zo.borrow_mut() {
			zoom.set(s.zoom_by(0.8, s.width / 2.0, s.height / 2.0));
		}
	};
	let state_zr = state.clone();
	let on_zoom_reset = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zr.borrow_mut() {
			zoom.set(s.zoom_reset());
		}
	};

	view! {
		<div class="network-canvas-wrap">
			<canvas
				node_ref=canvas_ref
				class="network-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<div class="zoom-controls">
				<button class="zoom-button" title="Zoom in" on:click=on_zoom_in>
					"+"
				</button>
				<button class="zoom-button" title="Zoom out" on:click=on_zoom_out>
					"\u{2212}"
				</button>
				<button class="zoom-button" title="Reset view" on:click=on_zoom_reset>
					"\u{27f2}"
				</button>
				<span class="zoom-level">{move || format!("{:.0}%", zoom.get() * 100.0)}</span>
			</div>
		</div>
	}
}
