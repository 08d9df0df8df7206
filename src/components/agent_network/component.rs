use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use web_sys::HtmlCanvasElement;

use super::browser::{CanvasSizing, SelectionSink, SharedEngine, mount};
use super::config::NetworkConfig;
use super::types::{NodeId, NodeSpec, NodeUpdate};

/// Canvas hosting a live agent network.
///
/// The engine is rebuilt whenever `nodes` changes and stopped when the
/// component unmounts. `telemetry` updates are applied as they arrive.
#[component]
pub fn AgentNetworkCanvas(
	/// Agents to show, in order.
	#[prop(into)]
	nodes: Signal<Vec<NodeSpec>>,
	/// Tuning, defaults if absent.
	#[prop(optional)]
	config: Option<NetworkConfig>,
	/// Status and load overwrites.
	#[prop(optional, into)]
	telemetry: Option<Signal<Vec<NodeUpdate>>>,
	/// Called with the selected id, or `None` when the selection clears.
	#[prop(optional, into)]
	on_select: Option<Callback<Option<String>>>,
	/// Size the canvas to the window.
	#[prop(default = false)]
	fullscreen: bool,
	/// Fixed canvas width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Fixed canvas height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine = StoredValue::new_local(None::<SharedEngine>);
	let config = config.unwrap_or_default();
	let sizing = CanvasSizing {
		fullscreen,
		width,
		height,
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let specs = nodes.get();
		let sink = on_select.map(|cb| -> SelectionSink {
			Rc::new(move |id: Option<NodeId>| cb.run(id.map(String::from)))
		});

		// dropping the previous engine stops it
		engine.set_value(None);
		match mount(canvas, &specs, config.clone(), sizing, sink) {
			Ok(handle) => engine.set_value(Some(handle)),
			Err(err) => error!("agent network failed to start: {err}"),
		}
	});

	if let Some(telemetry) = telemetry {
		Effect::new(move |_| {
			let updates = telemetry.get();
			engine.with_value(|handle| {
				let Some(handle) = handle else {
					return;
				};
				match handle.try_borrow_mut() {
					Ok(mut handle) => handle.state_mut().apply_updates(&updates),
					Err(_) => warn!("engine busy, dropping {} telemetry updates", updates.len()),
				}
			});
		});
	}

	on_cleanup(move || {
		engine.try_update_value(|slot| {
			if let Some(handle) = slot.take() {
				if let Ok(mut handle) = handle.try_borrow_mut() {
					handle.stop();
				}
			}
		});
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="agent-network-canvas"
			style="display: block; cursor: crosshair;"
		/>
	}
}
