//! Frame loop ownership.
//!
//! [`EngineHandle`] owns the pending frame request, every registered listener
//! and the drawing surface. `stop` (or dropping the handle) revokes all three,
//! so a running engine cannot outlive its handle.

use log::{info, warn};

use super::state::{FrameOutcome, NetworkState};
use super::surface::Surface;

/// Host token for a pending frame callback.
pub type FrameRequestId = i32;
/// Host token for a registered listener.
pub type ListenerId = u32;

/// Host events the engine subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
	/// Pointer moved over the canvas.
	PointerMove,
	/// Pointer left the canvas.
	PointerLeave,
	/// Primary button click on the canvas.
	Click,
	/// The window changed size.
	Resize,
}

impl ListenerKind {
	/// Every kind, in subscription order.
	pub const ALL: [ListenerKind; 4] = [
		ListenerKind::PointerMove,
		ListenerKind::PointerLeave,
		ListenerKind::Click,
		ListenerKind::Resize,
	];
}

/// The event loop an engine runs on, e.g. a browser window.
///
/// The host calls back into [`EngineHandle::on_frame`] for each granted frame
/// request and routes subscribed events to the handle's [`NetworkState`].
pub trait Host {
	/// Ask for one frame callback. `None` if the host refused.
	fn request_frame(&mut self) -> Option<FrameRequestId>;

	/// Withdraw a pending frame request.
	fn cancel_frame(&mut self, id: FrameRequestId);

	/// Subscribe to one event kind. `None` if registration failed.
	fn add_listener(&mut self, kind: ListenerKind) -> Option<ListenerId>;

	/// Unsubscribe a listener returned by [`Host::add_listener`].
	fn remove_listener(&mut self, id: ListenerId);

	/// Drop any references the host keeps to the canvas or callbacks.
	fn release(&mut self) {}
}

/// A running (or stopped) network bound to a host and a surface.
pub struct EngineHandle<H: Host, S: Surface> {
	state: NetworkState,
	host: H,
	surface: Option<S>,
	pending_frame: Option<FrameRequestId>,
	listeners: Vec<ListenerId>,
	last_timestamp_ms: Option<f64>,
	running: bool,
	stopped: bool,
}

impl<H: Host, S: Surface> EngineHandle<H, S> {
	/// Bind a state to a host. Nothing runs until [`Self::start`].
	pub fn new(state: NetworkState, host: H, surface: S) -> Self {
		Self {
			state,
			host,
			surface: Some(surface),
			pending_frame: None,
			listeners: Vec::new(),
			last_timestamp_ms: None,
			running: false,
			stopped: false,
		}
	}

	/// The owned network.
	pub fn state(&self) -> &NetworkState {
		&self.state
	}

	/// Mutable access for event routing and telemetry.
	pub fn state_mut(&mut self) -> &mut NetworkState {
		&mut self.state
	}

	/// The host this handle schedules on.
	pub fn host(&self) -> &H {
		&self.host
	}

	/// True between `start` and `stop`.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Subscribe to host events and schedule the first frame.
	///
	/// A stopped handle cannot be restarted since its surface is gone.
	pub fn start(&mut self) {
		if self.running || self.stopped {
			return;
		}
		for kind in ListenerKind::ALL {
			match self.host.add_listener(kind) {
				Some(id) => self.listeners.push(id),
				None => warn!("host refused {kind:?} listener"),
			}
		}
		self.running = true;
		self.schedule();
		info!("engine started with {} listeners", self.listeners.len());
	}

	/// Run one tick for a frame callback at `timestamp_ms`.
	pub fn on_frame(&mut self, timestamp_ms: f64) -> FrameOutcome {
		self.pending_frame = None;
		if !self.running {
			return FrameOutcome::default();
		}
		let Some(surface) = self.surface.as_mut() else {
			return FrameOutcome::default();
		};

		let max_dt = self.state.config().max_frame_dt;
		// NaN and negative deltas pass through so the stepper skips them
		let dt = match self.last_timestamp_ms {
			Some(last) => {
				let dt = (timestamp_ms - last) / 1000.0;
				if dt > max_dt { max_dt } else { dt }
			}
			None => 0.0,
		};
		if timestamp_ms.is_finite() {
			self.last_timestamp_ms = Some(timestamp_ms);
		}
		let outcome = self.state.tick(dt, surface);
		self.schedule();
		outcome
	}

	/// Cancel the pending frame, remove every listener and release the surface.
	pub fn stop(&mut self) {
		if self.stopped {
			return;
		}
		if let Some(id) = self.pending_frame.take() {
			self.host.cancel_frame(id);
		}
		for id in self.listeners.drain(..) {
			self.host.remove_listener(id);
		}
		self.surface = None;
		self.host.release();
		self.running = false;
		self.stopped = true;
		info!("engine stopped");
	}

	fn schedule(&mut self) {
		if self.pending_frame.is_some() {
			return;
		}
		self.pending_frame = self.host.request_frame();
		if self.pending_frame.is_none() {
			warn!("host refused a frame request, animation halted");
		}
	}
}

impl<H: Host, S: Surface> Drop for EngineHandle<H, S> {
	fn drop(&mut self) {
		self.stop();
	}
}
