use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Tuning constants, fixed for the lifetime of one engine instance.
///
/// Distances are in canvas pixels, rates are per second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	/// Maximum out-degree of a node.
	pub max_degree: usize,
	/// Nodes closer than this may be connected.
	pub connect_radius: f64,
	/// Perspective strength; larger is flatter.
	pub focal_length: f64,
	/// Screen distance within which a click or hover picks a node.
	pub pick_radius_px: f64,
	/// Screen distance under which the pointer pulls nodes.
	pub attraction_radius: f64,
	/// Pointer pull at zero distance, in px/s².
	pub attraction_strength: f64,
	/// Speed cap applied after pointer attraction.
	pub max_speed: f64,
	/// How far a node may leave the canvas before wrapping around.
	pub wrap_margin: f64,
	/// z wraps within `[0, depth]`.
	pub depth: f64,
	/// Pulse angular rate in radians per second.
	pub pulse_rate: f64,
	/// Flow marker laps per second along an edge.
	pub flow_speed: f64,
	/// Glow radius as a multiple of node size.
	pub glow_factor: f64,
	/// Glow multiple for the selected node.
	pub selected_glow_factor: f64,
	/// Upper bound on one frame's dt, absorbs long pauses such as a hidden tab.
	pub max_frame_dt: f64,
	/// Alpha of the background clear; below 1 leaves motion trails.
	pub trail_alpha: f64,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			max_degree: 3,
			connect_radius: 200.0,
			focal_length: 800.0,
			pick_radius_px: 20.0,
			attraction_radius: 150.0,
			attraction_strength: 72.0,
			max_speed: 120.0,
			wrap_margin: 50.0,
			depth: 1000.0,
			pulse_rate: 3.0,
			flow_speed: 0.5,
			glow_factor: 2.0,
			selected_glow_factor: 3.0,
			max_frame_dt: 0.1,
			trail_alpha: 0.1,
		}
	}
}

impl NetworkConfig {
	/// Parse a partial JSON object over the defaults and validate it.
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Reject values the simulation or projection cannot work with.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !(self.focal_length.is_finite() && self.focal_length > 0.0) {
			return Err(invalid("focal_length", "must be finite and positive"));
		}
		for (field, value) in [
			("connect_radius", self.connect_radius),
			("pick_radius_px", self.pick_radius_px),
			("attraction_radius", self.attraction_radius),
			("wrap_margin", self.wrap_margin),
			("max_speed", self.max_speed),
		] {
			if !(value.is_finite() && value >= 0.0) {
				return Err(invalid(field, "must be finite and non-negative"));
			}
		}
		if !(self.depth.is_finite() && self.depth > 0.0) {
			return Err(invalid("depth", "must be finite and positive"));
		}
		if !(self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0) {
			return Err(invalid("max_frame_dt", "must be finite and positive"));
		}
		// a negative pulse rate would run the pulse phase backwards
		if !(self.pulse_rate.is_finite() && self.pulse_rate >= 0.0) {
			return Err(invalid("pulse_rate", "must be finite and non-negative"));
		}
		for (field, value) in [
			("flow_speed", self.flow_speed),
			("attraction_strength", self.attraction_strength),
			("glow_factor", self.glow_factor),
			("selected_glow_factor", self.selected_glow_factor),
		] {
			if !value.is_finite() {
				return Err(invalid(field, "must be finite"));
			}
		}
		if !(0.0..=1.0).contains(&self.trail_alpha) {
			return Err(invalid("trail_alpha", "must be within [0, 1]"));
		}
		Ok(())
	}
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
	ConfigError::Invalid { field, reason }
}
