//! web-sys bindings: the browser window as a [`Host`] and a 2D canvas context
//! as a [`Surface`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, MouseEvent, Window};

use super::config::NetworkConfig;
use super::engine::{EngineHandle, FrameRequestId, Host, ListenerId, ListenerKind};
use super::error::MountError;
use super::state::NetworkState;
use super::surface::{Rgba, Stroke, Surface};
use super::types::{NodeId, NodeSpec, Viewport};

/// An engine driven by the browser window.
pub type BrowserEngine = EngineHandle<BrowserHost, CanvasSurface>;
/// Handle returned by [`mount`]; dropping the last clone stops the engine.
pub type SharedEngine = Rc<RefCell<BrowserEngine>>;

/// Receives selection changes after the frame that produced them.
pub type SelectionSink = Rc<dyn Fn(Option<NodeId>)>;

/// How the canvas picks its pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CanvasSizing {
	/// Fill the window, ignoring `width` and `height`.
	pub fullscreen: bool,
	/// Fixed width, else the parent's client width.
	pub width: Option<f64>,
	/// Fixed height, else the parent's client height.
	pub height: Option<f64>,
}

impl CanvasSizing {
	/// Current pixel size for `canvas`.
	pub fn measure(&self, window: &Window, canvas: &HtmlCanvasElement) -> Viewport {
		if self.fullscreen {
			let dim = |v: Result<JsValue, JsValue>, fallback| v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback);
			return Viewport::new(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0));
		}
		let parent = canvas.parent_element();
		Viewport::new(
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}

	/// Measure and size the canvas backing store to match.
	pub fn apply(&self, window: &Window, canvas: &HtmlCanvasElement) -> Viewport {
		let viewport = self.measure(window, canvas);
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);
		viewport
	}
}

/// Create an engine on `canvas` and start its frame loop.
pub fn mount(
	canvas: HtmlCanvasElement,
	specs: &[NodeSpec],
	config: NetworkConfig,
	sizing: CanvasSizing,
	on_select: Option<SelectionSink>,
) -> Result<SharedEngine, MountError> {
	let window = web_sys::window().ok_or(MountError::NoWindow)?;
	let viewport = sizing.apply(&window, &canvas);
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
		.ok_or(MountError::NoContext)?;
	let state = NetworkState::new(specs, config, viewport)?;

	let engine = Rc::new_cyclic(|weak| {
		let host = BrowserHost::new(window, canvas, weak.clone(), sizing, on_select);
		RefCell::new(EngineHandle::new(state, host, CanvasSurface::new(ctx)))
	});
	engine.borrow_mut().start();
	Ok(engine)
}

/// Schedules frames and listens for events on a window and canvas.
pub struct BrowserHost {
	window: Window,
	canvas: Option<HtmlCanvasElement>,
	engine: Weak<RefCell<BrowserEngine>>,
	sizing: CanvasSizing,
	animate: Option<Closure<dyn FnMut(f64)>>,
	listeners: HashMap<ListenerId, (ListenerKind, Closure<dyn FnMut(Event)>)>,
	next_listener: ListenerId,
}

impl BrowserHost {
	fn new(
		window: Window,
		canvas: HtmlCanvasElement,
		engine: Weak<RefCell<BrowserEngine>>,
		sizing: CanvasSizing,
		on_select: Option<SelectionSink>,
	) -> Self {
		let animate = animation_closure(engine.clone(), on_select);
		Self {
			window,
			canvas: Some(canvas),
			engine,
			sizing,
			animate: Some(animate),
			listeners: HashMap::new(),
			next_listener: 0,
		}
	}

	fn target(&self, kind: ListenerKind) -> Option<&EventTarget> {
		match kind {
			ListenerKind::Resize => Some(self.window.as_ref()),
			_ => self.canvas.as_ref().map(AsRef::as_ref),
		}
	}

	fn event_closure(&self, kind: ListenerKind, canvas: HtmlCanvasElement) -> Closure<dyn FnMut(Event)> {
		let engine = self.engine.clone();
		match kind {
			ListenerKind::PointerMove => Closure::new(move |ev: Event| {
				if let Some((x, y)) = canvas_point(&canvas, &ev) {
					with_state(&engine, |s| s.pointer_moved(x, y));
				}
			}),
			ListenerKind::PointerLeave => Closure::new(move |_: Event| {
				with_state(&engine, NetworkState::pointer_left);
			}),
			ListenerKind::Click => Closure::new(move |ev: Event| {
				if let Some((x, y)) = canvas_point(&canvas, &ev) {
					with_state(&engine, |s| s.clicked(x, y));
				}
			}),
			ListenerKind::Resize => {
				let (window, sizing) = (self.window.clone(), self.sizing);
				Closure::new(move |_: Event| {
					let viewport = sizing.apply(&window, &canvas);
					with_state(&engine, |s| s.resize(viewport.width, viewport.height));
				})
			}
		}
	}
}

fn event_name(kind: ListenerKind) -> &'static str {
	match kind {
		ListenerKind::PointerMove => "mousemove",
		ListenerKind::PointerLeave => "mouseleave",
		ListenerKind::Click => "click",
		ListenerKind::Resize => "resize",
	}
}

fn animation_closure(engine: Weak<RefCell<BrowserEngine>>, on_select: Option<SelectionSink>) -> Closure<dyn FnMut(f64)> {
	Closure::new(move |timestamp: f64| {
		let outcome = {
			let Some(engine) = engine.upgrade() else {
				return;
			};
			let Ok(mut engine) = engine.try_borrow_mut() else {
				warn!("engine busy, dropping frame");
				return;
			};
			engine.on_frame(timestamp)
		};
		// the engine is released before the host UI reacts
		if let (Some(selected), Some(sink)) = (outcome.selection_changed, &on_select) {
			sink(selected);
		}
	})
}

/// Pointer events only touch interaction state; the next frame picks it up.
fn with_state(engine: &Weak<RefCell<BrowserEngine>>, f: impl FnOnce(&mut NetworkState)) {
	let Some(engine) = engine.upgrade() else {
		return;
	};
	match engine.try_borrow_mut() {
		Ok(mut engine) => f(engine.state_mut()),
		Err(_) => debug!("engine busy, dropping event"),
	}
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &Event) -> Option<(f64, f64)> {
	let ev = ev.dyn_ref::<MouseEvent>()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

impl Host for BrowserHost {
	fn request_frame(&mut self) -> Option<FrameRequestId> {
		let cb = self.animate.as_ref()?;
		match self.window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => Some(id),
			Err(err) => {
				warn!("requestAnimationFrame failed: {err:?}");
				None
			}
		}
	}

	fn cancel_frame(&mut self, id: FrameRequestId) {
		if let Err(err) = self.window.cancel_animation_frame(id) {
			warn!("cancelAnimationFrame failed: {err:?}");
		}
	}

	fn add_listener(&mut self, kind: ListenerKind) -> Option<ListenerId> {
		let canvas = self.canvas.clone()?;
		let closure = self.event_closure(kind, canvas);
		let target = self.target(kind)?;
		if let Err(err) = target.add_event_listener_with_callback(event_name(kind), closure.as_ref().unchecked_ref()) {
			warn!("failed to add {} listener: {err:?}", event_name(kind));
			return None;
		}
		self.next_listener += 1;
		let id = self.next_listener;
		self.listeners.insert(id, (kind, closure));
		Some(id)
	}

	fn remove_listener(&mut self, id: ListenerId) {
		let Some((kind, closure)) = self.listeners.remove(&id) else {
			return;
		};
		let Some(target) = self.target(kind) else {
			return;
		};
		if let Err(err) =
			target.remove_event_listener_with_callback(event_name(kind), closure.as_ref().unchecked_ref())
		{
			warn!("failed to remove {} listener: {err:?}", event_name(kind));
		}
	}

	fn release(&mut self) {
		let ids: Vec<ListenerId> = self.listeners.keys().copied().collect();
		for id in ids {
			self.remove_listener(id);
		}
		self.animate = None;
		self.canvas = None;
		debug!("browser host released canvas and callbacks");
	}
}

/// [`Surface`] over a 2D canvas context.
pub struct CanvasSurface {
	ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
	/// Draw into `ctx`.
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl Surface for CanvasSurface {
	fn clear(&mut self, width: f64, height: f64, color: Rgba) {
		self.ctx.set_fill_style_str(&color.to_string());
		self.ctx.fill_rect(0.0, 0.0, width, height);
	}

	fn glow(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
		if radius <= 0.0 {
			return;
		}
		let gradient = match self.ctx.create_radial_gradient(x, y, 0.0, x, y, radius) {
			Ok(gradient) => gradient,
			Err(err) => {
				warn!("createRadialGradient failed: {err:?}");
				return;
			}
		};
		let _ = gradient.add_color_stop(0.0, &color.to_string());
		let _ = gradient.add_color_stop(0.5, &color.with_alpha(color.a * 0.5).to_string());
		let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_string());
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius, 0.0, TAU);
		#[allow(deprecated)]
		self.ctx.set_fill_style(&gradient);
		self.ctx.fill();
	}

	fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius.max(0.0), 0.0, TAU);
		self.ctx.set_fill_style_str(&color.to_string());
		self.ctx.fill();
	}

	fn stroke_arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, width: f64, color: Rgba) {
		self.ctx.begin_path();
		let _ = self.ctx.arc(x, y, radius.max(0.0), start, end);
		self.ctx.set_stroke_style_str(&color.to_string());
		self.ctx.set_line_width(width);
		self.ctx.stroke();
	}

	fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Rgba, stroke: Stroke) {
		match stroke {
			Stroke::Solid => {
				let _ = self.ctx.set_line_dash(&js_sys::Array::new());
			}
			Stroke::Dashed { dash, gap, offset } => {
				let _ = self.ctx.set_line_dash(&js_sys::Array::of2(
					&JsValue::from_f64(dash),
					&JsValue::from_f64(gap),
				));
				self.ctx.set_line_dash_offset(offset);
			}
		}
		self.ctx.set_stroke_style_str(&color.to_string());
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(x1, y1);
		self.ctx.line_to(x2, y2);
		self.ctx.stroke();
		let _ = self.ctx.set_line_dash(&js_sys::Array::new());
	}

	fn gradient_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, stops: &[(f64, Rgba)]) {
		let gradient = self.ctx.create_linear_gradient(x1, y1, x2, y2);
		for (offset, color) in stops {
			let _ = gradient.add_color_stop(offset.clamp(0.0, 1.0) as f32, &color.to_string());
		}
		let _ = self.ctx.set_line_dash(&js_sys::Array::new());
		#[allow(deprecated)]
		self.ctx.set_stroke_style(&gradient);
		self.ctx.set_line_width(width);
		self.ctx.begin_path();
		self.ctx.move_to(x1, y1);
		self.ctx.line_to(x2, y2);
		self.ctx.stroke();
	}

	fn text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Rgba) {
		self.ctx.set_fill_style_str(&color.to_string());
		self.ctx.set_font(&format!("{size:.0}px monospace"));
		self.ctx.set_text_align("center");
		let _ = self.ctx.fill_text(text, x, y);
	}
}
