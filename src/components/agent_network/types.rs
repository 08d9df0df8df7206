use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::NetworkError;
use super::surface::Rgba;

/// Stable node identity, unique within one graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	/// Wrap any string as an id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw id.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for NodeId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for NodeId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl From<NodeId> for String {
	fn from(id: NodeId) -> Self {
		id.0
	}
}

/// Role of an agent in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	/// Coordinates the other agents.
	Orchestrator,
	/// Executes tasks.
	Worker,
	/// Owns a data store.
	Data,
	/// Watches the rest of the network.
	Monitor,
}

impl Category {
	/// Every category, in legend order.
	pub const ALL: [Category; 4] = [
		Category::Orchestrator,
		Category::Worker,
		Category::Data,
		Category::Monitor,
	];

	/// Core dot color.
	pub fn color(self) -> Rgba {
		match self {
			Category::Orchestrator => Rgba::rgb(255, 108, 0),
			Category::Worker => Rgba::rgb(255, 0, 255),
			Category::Data => Rgba::rgb(59, 130, 246),
			Category::Monitor => Rgba::rgb(0, 255, 255),
		}
	}

	/// Unscaled node radius in pixels.
	pub fn base_size(self) -> f64 {
		match self {
			Category::Orchestrator => 20.0,
			Category::Worker => 15.0,
			Category::Data => 14.0,
			Category::Monitor => 12.0,
		}
	}

	/// Human-readable name for legends.
	pub fn label(self) -> &'static str {
		match self {
			Category::Orchestrator => "Orchestrator",
			Category::Worker => "Worker Agent",
			Category::Data => "Data Agent",
			Category::Monitor => "Monitor",
		}
	}
}

/// Latest reported agent status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	/// Up and reachable.
	Active,
	/// Up with nothing to do.
	#[default]
	Idle,
	/// Working; its links carry flow markers.
	Processing,
	/// Unreachable; drawn dimmed.
	Offline,
}

impl Status {
	/// Every status.
	pub const ALL: [Status; 4] = [
		Status::Active,
		Status::Idle,
		Status::Processing,
		Status::Offline,
	];

	/// Lowercase name, as serialized.
	pub fn as_str(self) -> &'static str {
		match self {
			Status::Active => "active",
			Status::Idle => "idle",
			Status::Processing => "processing",
			Status::Offline => "offline",
		}
	}
}

/// World-space vector. x/y are canvas pixels, z is depth away from the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component, growing downward.
	pub y: f64,
	/// Depth component.
	pub z: f64,
}

impl Vec3 {
	/// The zero vector.
	pub const ZERO: Vec3 = Vec3 {
		x: 0.0,
		y: 0.0,
		z: 0.0,
	};

	/// Vector from components.
	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	/// Euclidean norm.
	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
	}

	/// Euclidean distance over all three components.
	pub fn distance(self, other: Vec3) -> f64 {
		Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z).length()
	}

	/// Distance in the x/y plane, ignoring depth.
	pub fn planar_distance(self, other: Vec3) -> f64 {
		(self.x - other.x).hypot(self.y - other.y)
	}

	/// True if every component is finite.
	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
	}

	/// Replace non-finite components with zero.
	pub fn sanitized(self) -> Self {
		let fix = |v: f64| if v.is_finite() { v } else { 0.0 };
		Self::new(fix(self.x), fix(self.y), fix(self.z))
	}
}

/// Canvas size in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Viewport {
	/// Viewport of the given size.
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Construction input for one node, supplied by the host UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
	/// Unique id.
	pub id: NodeId,
	/// Role of the agent.
	pub category: Category,
	/// Starting world position. z is clamped into `[0, depth]`.
	pub position: Vec3,
	/// Initial status, idle if absent.
	#[serde(default)]
	pub status: Status,
	/// Initial load percentage, clamped to `[0, 100]`.
	#[serde(default)]
	pub load: f64,
	/// Drift velocity in units per second.
	#[serde(default)]
	pub velocity: Vec3,
	/// Display label, defaults to the uppercased id.
	#[serde(default)]
	pub label: Option<String>,
}

impl NodeSpec {
	/// An idle, unloaded, stationary node.
	pub fn new(id: impl Into<NodeId>, category: Category, position: Vec3) -> Self {
		Self {
			id: id.into(),
			category,
			position,
			status: Status::default(),
			load: 0.0,
			velocity: Vec3::ZERO,
			label: None,
		}
	}

	/// Set the initial status.
	pub fn with_status(mut self, status: Status) -> Self {
		self.status = status;
		self
	}

	/// Set the initial load.
	pub fn with_load(mut self, load: f64) -> Self {
		self.load = load;
		self
	}

	/// Set the drift velocity.
	pub fn with_velocity(mut self, velocity: Vec3) -> Self {
		self.velocity = velocity;
		self
	}

	/// Set the display label.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}
}

/// A telemetry overwrite. Absent fields are left untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdate {
	/// Target node.
	pub id: NodeId,
	/// New status.
	#[serde(default)]
	pub status: Option<Status>,
	/// New load percentage.
	#[serde(default)]
	pub load: Option<f64>,
}

impl NodeUpdate {
	/// Update for `id`; `None` fields are left alone.
	pub fn new(id: impl Into<NodeId>, status: Option<Status>, load: Option<f64>) -> Self {
		Self {
			id: id.into(),
			status,
			load,
		}
	}
}

/// Parse an ordered node list, e.g. a bundled JSON fixture.
pub fn parse_node_specs(json: &str) -> Result<Vec<NodeSpec>, NetworkError> {
	Ok(serde_json::from_str(json)?)
}
