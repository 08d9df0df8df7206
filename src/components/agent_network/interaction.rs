//! Pointer state and hit-testing.
//!
//! Event handlers only write into [`Interaction`]; the next tick reads it.

use log::debug;

use super::graph::Graph;
use super::projection::ProjectedNode;
use super::types::NodeId;

/// Nearest node within `pick_radius` of `pointer`, first in order on ties.
pub fn hit_test(projected: &[ProjectedNode], pointer: (f64, f64), pick_radius: f64) -> Option<NodeId> {
	let mut best: Option<(f64, &NodeId)> = None;
	for node in projected {
		let d = node.screen.distance_to(pointer.0, pointer.1);
		if d > pick_radius {
			continue;
		}
		if best.is_none_or(|(best_d, _)| d < best_d) {
			best = Some((d, &node.id));
		}
	}
	best.map(|(_, id)| id.clone())
}

/// Selection, hover and queued pointer input for one network.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interaction {
	selected: Option<NodeId>,
	hovered: Option<NodeId>,
	pointer: Option<(f64, f64)>,
	pending_click: Option<(f64, f64)>,
}

impl Interaction {
	/// Currently selected node.
	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}

	/// Node under the pointer as of the last tick.
	pub fn hovered(&self) -> Option<&NodeId> {
		self.hovered.as_ref()
	}

	/// Last pointer position in canvas pixels, if over the canvas.
	pub fn pointer(&self) -> Option<(f64, f64)> {
		self.pointer
	}

	/// Set or clear the selection. Unknown ids are dropped by [`Self::reconcile`].
	pub fn select(&mut self, id: Option<NodeId>) {
		self.selected = id;
	}

	/// Whether `id` is the selected node.
	pub fn is_selected(&self, id: &NodeId) -> bool {
		self.selected.as_ref() == Some(id)
	}

	/// Whether `id` is under the pointer.
	pub fn is_hovered(&self, id: &NodeId) -> bool {
		self.hovered.as_ref() == Some(id)
	}

	/// Record the pointer position in canvas pixels.
	pub fn pointer_moved(&mut self, x: f64, y: f64) {
		self.pointer = Some((x, y));
	}

	/// The pointer left the canvas; hover ends with it.
	pub fn pointer_left(&mut self) {
		self.pointer = None;
		self.hovered = None;
	}

	/// Queue a click for the next tick.
	pub fn clicked(&mut self, x: f64, y: f64) {
		self.pending_click = Some((x, y));
	}

	/// Drop references to nodes that no longer exist.
	///
	/// Returns true if the selection was cleared.
	pub fn reconcile(&mut self, graph: &Graph) -> bool {
		self.hovered.take_if(|id| !graph.contains(id.as_str()));
		match self.selected.take_if(|id| !graph.contains(id.as_str())) {
			Some(id) => {
				debug!("selected node `{id}` is gone, clearing selection");
				true
			}
			None => false,
		}
	}

	/// Resolve queued input against this frame's projection.
	///
	/// Returns the new selection if a click changed it; a click on empty
	/// space clears it.
	pub fn resolve(&mut self, projected: &[ProjectedNode], pick_radius: f64) -> Option<Option<NodeId>> {
		self.hovered = self
			.pointer
			.and_then(|p| hit_test(projected, p, pick_radius));

		let click = self.pending_click.take()?;
		let hit = hit_test(projected, click, pick_radius);
		if hit == self.selected {
			return None;
		}
		self.selected = hit.clone();
		Some(hit)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::agent_network::projection::ScreenPoint;

	fn at(id: &str, x: f64, y: f64) -> ProjectedNode {
		ProjectedNode {
			id: NodeId::from(id),
			screen: ScreenPoint { x, y, scale: 1.0 },
		}
	}

	#[test]
	fn exact_center_hits_with_zero_radius() {
		let points = [at("a", 10.0, 10.0), at("b", 100.0, 40.0)];
		assert_eq!(hit_test(&points, (100.0, 40.0), 0.0), Some(NodeId::from("b")));
	}

	#[test]
	fn nearest_within_radius_wins() {
		let points = [at("a", 0.0, 0.0), at("b", 12.0, 0.0)];
		assert_eq!(hit_test(&points, (7.0, 0.0), 20.0), Some(NodeId::from("b")));
		assert_eq!(hit_test(&points, (5.0, 0.0), 20.0), Some(NodeId::from("a")));
		assert_eq!(hit_test(&points, (6.0, 0.0), 20.0), Some(NodeId::from("a")));
	}

	#[test]
	fn radius_is_inclusive() {
		let points = [at("a", 0.0, 0.0)];
		assert_eq!(hit_test(&points, (3.0, 4.0), 5.0), Some(NodeId::from("a")));
		assert_eq!(hit_test(&points, (3.0, 4.0), 4.99), None);
		assert_eq!(hit_test(&[], (0.0, 0.0), 100.0), None);
	}

	#[test]
	fn click_selects_and_miss_clears() {
		let points = [at("a", 50.0, 50.0)];
		let mut interaction = Interaction::default();

		interaction.clicked(52.0, 49.0);
		assert_eq!(interaction.selected(), None);
		assert_eq!(interaction.resolve(&points, 20.0), Some(Some(NodeId::from("a"))));
		assert!(interaction.is_selected(&NodeId::from("a")));

		interaction.clicked(51.0, 50.0);
		assert_eq!(interaction.resolve(&points, 20.0), None);

		interaction.clicked(300.0, 300.0);
		assert_eq!(interaction.resolve(&points, 20.0), Some(None));
		assert_eq!(interaction.selected(), None);
	}

	#[test]
	fn hover_follows_pointer() {
		let points = [at("a", 50.0, 50.0)];
		let mut interaction = Interaction::default();
		interaction.pointer_moved(55.0, 55.0);
		interaction.resolve(&points, 20.0);
		assert!(interaction.is_hovered(&NodeId::from("a")));

		interaction.pointer_left();
		assert_eq!(interaction.hovered(), None);
		assert_eq!(interaction.pointer(), None);
	}
}
