//! Arena-backed graph model.
//!
//! Nodes live in a `Vec` in construction order and refer to each other by id,
//! so the neighbor graph can contain cycles without any shared ownership.

use std::collections::HashMap;
use std::f64::consts::TAU;

use log::warn;

use super::config::NetworkConfig;
use super::error::GraphError;
use super::topology::build_topology;
use super::types::{Category, NodeId, NodeSpec, Status, Vec3, Viewport};

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// One agent in the live graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub(super) id: NodeId,
	pub(super) category: Category,
	pub(super) status: Status,
	pub(super) load: f64,
	pub(super) position: Vec3,
	pub(super) velocity: Vec3,
	pub(super) pulse_phase: f64,
	pub(super) phase_offset: f64,
	pub(super) label: String,
	pub(super) neighbors: Vec<NodeId>,
}

impl Node {
	fn from_spec(spec: &NodeSpec, index: usize, depth: f64) -> Self {
		if !spec.position.is_finite() || !spec.velocity.is_finite() {
			warn!("node `{}` has non-finite kinematics, zeroing them", spec.id);
		}
		let mut position = spec.position.sanitized();
		if !(0.0..=depth).contains(&position.z) {
			warn!("node `{}` starts at z = {}, clamping into [0, {depth}]", spec.id, position.z);
			position.z = position.z.clamp(0.0, depth);
		}
		let phase_offset = (index as f64 * GOLDEN_ANGLE) % TAU;
		Self {
			id: spec.id.clone(),
			category: spec.category,
			status: spec.status,
			load: clamp_load(spec.load).unwrap_or(0.0),
			position,
			velocity: spec.velocity.sanitized(),
			pulse_phase: phase_offset,
			phase_offset,
			label: spec
				.label
				.clone()
				.unwrap_or_else(|| spec.id.as_str().to_uppercase()),
			neighbors: Vec::new(),
		}
	}

	/// Stable identity.
	pub fn id(&self) -> &NodeId {
		&self.id
	}

	/// Role, fixes color and size.
	pub fn category(&self) -> Category {
		self.category
	}

	/// Latest telemetry status.
	pub fn status(&self) -> Status {
		self.status
	}

	/// Load in `[0, 100]`.
	pub fn load(&self) -> f64 {
		self.load
	}

	/// World position, z within `[0, depth]`.
	pub fn position(&self) -> Vec3 {
		self.position
	}

	/// Velocity in canvas units per second.
	pub fn velocity(&self) -> Vec3 {
		self.velocity
	}

	/// Pulse angle in radians, advances with elapsed time.
	pub fn pulse_phase(&self) -> f64 {
		self.pulse_phase
	}

	/// Display label, the uppercased id unless one was given.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Neighbor ids, nearest first.
	pub fn neighbors(&self) -> &[NodeId] {
		&self.neighbors
	}
}

fn clamp_load(load: f64) -> Option<f64> {
	load.is_finite().then(|| load.clamp(0.0, 100.0))
}

/// Agents plus their neighbor references, owned by one engine.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	pub(super) nodes: Vec<Node>,
	index: HashMap<NodeId, usize>,
	pub(super) viewport: Viewport,
	pub(super) elapsed: f64,
}

/// Build a graph from host-supplied specs and connect it.
///
/// Fails on the first id that appears twice; no partial graph is returned.
pub fn create_graph(
	specs: &[NodeSpec],
	viewport: Viewport,
	config: &NetworkConfig,
) -> Result<Graph, GraphError> {
	let mut nodes = Vec::with_capacity(specs.len());
	let mut index = HashMap::with_capacity(specs.len());
	for (i, spec) in specs.iter().enumerate() {
		if index.insert(spec.id.clone(), i).is_some() {
			return Err(GraphError::DuplicateId(spec.id.clone()));
		}
		nodes.push(Node::from_spec(spec, i, config.depth));
	}

	let mut graph = Graph {
		nodes,
		index,
		viewport,
		elapsed: 0.0,
	};
	build_topology(&mut graph, config.max_degree, config.connect_radius);
	Ok(graph)
}

impl Graph {
	/// Nodes in construction order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True when the graph has no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether a node with this id exists.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// Arena index of a node.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Canvas size the graph wraps within.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Seconds of simulated wall-clock time.
	pub fn elapsed(&self) -> f64 {
		self.elapsed
	}

	/// Overwrite the given fields of a node.
	///
	/// A non-finite load is ignored; a finite one is clamped to `[0, 100]`.
	pub fn update_node_state(
		&mut self,
		id: &str,
		status: Option<Status>,
		load: Option<f64>,
	) -> Result<(), GraphError> {
		let i = self
			.index_of(id)
			.ok_or_else(|| GraphError::UnknownNode(NodeId::from(id)))?;
		let node = &mut self.nodes[i];
		if let Some(status) = status {
			node.status = status;
		}
		if let Some(load) = load {
			match clamp_load(load) {
				Some(load) => node.load = load,
				None => warn!("ignoring non-finite load for node `{id}`"),
			}
		}
		Ok(())
	}

	/// Remove a node and every reference to it. Returns false if absent.
	///
	/// Topology is not rebuilt here, so surviving nodes may have spare degree
	/// until the next explicit rebuild.
	pub fn remove_node(&mut self, id: &str) -> bool {
		let Some(i) = self.index.remove(id) else {
			return false;
		};
		self.nodes.remove(i);
		for node in &mut self.nodes {
			node.neighbors.retain(|n| n.as_str() != id);
		}
		self.index = self
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		true
	}
}
