use log::{debug, info};

use super::config::NetworkConfig;
use super::error::NetworkError;
use super::graph::{Graph, create_graph};
use super::interaction::Interaction;
use super::projection::{ProjectedNode, project_graph};
use super::render::render;
use super::simulation::step;
use super::surface::Surface;
use super::topology::build_topology;
use super::types::{NodeId, NodeSpec, NodeUpdate, Viewport};

/// What a tick produced that the host may care about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameOutcome {
	/// Set when the selection changed since the previous tick, by a click or
	/// because the selected node went away.
	pub selection_changed: Option<Option<NodeId>>,
}

/// Everything one network visualization owns.
pub struct NetworkState {
	graph: Graph,
	config: NetworkConfig,
	interaction: Interaction,
	projected: Vec<ProjectedNode>,
	/// Selection cleared outside a tick, reported by the next one.
	selection_dropped: bool,
}

impl NetworkState {
	/// Validate `config`, build the graph and connect it.
	pub fn new(specs: &[NodeSpec], config: NetworkConfig, viewport: Viewport) -> Result<Self, NetworkError> {
		config.validate()?;
		let graph = create_graph(specs, viewport, &config)?;
		let projected = project_graph(&graph, config.focal_length);
		info!(
			"network created: {} nodes, {}x{} viewport",
			graph.len(),
			viewport.width,
			viewport.height
		);
		Ok(Self {
			graph,
			config,
			interaction: Interaction::default(),
			projected,
			selection_dropped: false,
		})
	}

	/// The live graph.
	pub fn graph(&self) -> &Graph {
		&self.graph
	}

	/// Config this network was built with.
	pub fn config(&self) -> &NetworkConfig {
		&self.config
	}

	/// Current selection and pointer state.
	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	/// Screen positions from the most recent tick.
	pub fn projected(&self) -> &[ProjectedNode] {
		&self.projected
	}

	/// The selected node, if any.
	pub fn selected_node_id(&self) -> Option<&NodeId> {
		self.interaction.selected()
	}

	/// One simulate, project, resolve input, render pass.
	pub fn tick<S: Surface + ?Sized>(&mut self, dt: f64, surface: &mut S) -> FrameOutcome {
		step(&mut self.graph, dt, self.interaction.pointer(), &self.config);
		self.projected = project_graph(&self.graph, self.config.focal_length);

		let dropped = std::mem::take(&mut self.selection_dropped);
		let dropped = self.interaction.reconcile(&self.graph) || dropped;
		let selection_changed = self
			.interaction
			.resolve(&self.projected, self.config.pick_radius_px)
			.or_else(|| dropped.then(|| self.interaction.selected().cloned()));

		render(
			surface,
			&self.graph,
			&self.projected,
			&self.interaction,
			self.graph.elapsed(),
			&self.config,
		);
		FrameOutcome { selection_changed }
	}

	/// New canvas size; reconnects the graph for the current positions.
	pub fn resize(&mut self, width: f64, height: f64) {
		info!("resizing network to {width}x{height}");
		self.graph.viewport = Viewport::new(width, height);
		self.rebuild_topology();
	}

	/// Reassign neighbors for the current positions.
	pub fn rebuild_topology(&mut self) {
		build_topology(&mut self.graph, self.config.max_degree, self.config.connect_radius);
	}

	/// Apply a telemetry overwrite. Stale ids are expected and only logged.
	pub fn apply_update(&mut self, update: &NodeUpdate) {
		if let Err(err) = self
			.graph
			.update_node_state(update.id.as_str(), update.status, update.load)
		{
			debug!("dropping telemetry update: {err}");
		}
	}

	/// [`Self::apply_update`] for each update in order.
	pub fn apply_updates<'a>(&mut self, updates: impl IntoIterator<Item = &'a NodeUpdate>) {
		for update in updates {
			self.apply_update(update);
		}
	}

	/// Remove a node; a structural change, so topology is rebuilt.
	pub fn remove_node(&mut self, id: &str) -> bool {
		if !self.graph.remove_node(id) {
			return false;
		}
		self.rebuild_topology();
		self.selection_dropped |= self.interaction.reconcile(&self.graph);
		true
	}

	/// Select a node programmatically, or clear with `None`.
	pub fn select(&mut self, id: Option<NodeId>) {
		self.interaction.select(id);
	}

	/// Pointer position in canvas pixels.
	pub fn pointer_moved(&mut self, x: f64, y: f64) {
		self.interaction.pointer_moved(x, y);
	}

	/// Pointer left the canvas.
	pub fn pointer_left(&mut self) {
		self.interaction.pointer_left();
	}

	/// Queue a click, resolved on the next tick.
	pub fn clicked(&mut self, x: f64, y: f64) {
		self.interaction.clicked(x, y);
	}
}
