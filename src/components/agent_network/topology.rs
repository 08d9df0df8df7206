//! Distance and degree bounded neighbor assignment.
//!
//! O(n²) per rebuild, so it only runs on construction, resize and removal.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;

use super::graph::Graph;
use super::types::NodeId;

/// An undirected render edge, `source -> target` is the flow direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
	/// Arena index of the node that owns the neighbor reference.
	pub source: usize,
	/// Arena index of the referenced neighbor.
	pub target: usize,
	/// Flow marker offset in `[0, 1)`.
	pub phase: f64,
}

/// Give every node its `max_degree` nearest neighbors closer than `connect_radius`.
///
/// Distance is measured in the x/y plane; depth only affects how a link is
/// drawn. Ties are broken by id, so the result depends only on positions.
pub fn build_topology(graph: &mut Graph, max_degree: usize, connect_radius: f64) {
	let assignments: Vec<Vec<NodeId>> = graph
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let mut candidates: Vec<(f64, &NodeId)> = graph
				.nodes
				.iter()
				.enumerate()
				.filter(|&(j, _)| j != i)
				.map(|(_, other)| (node.position.planar_distance(other.position), &other.id))
				.filter(|&(distance, _)| distance < connect_radius)
				.collect();
			candidates.sort_by(|a, b| match a.0.total_cmp(&b.0) {
				Ordering::Equal => a.1.cmp(b.1),
				ord => ord,
			});
			candidates
				.into_iter()
				.take(max_degree)
				.map(|(_, id)| id.clone())
				.collect()
		})
		.collect();

	let mut directed = 0;
	for (node, neighbors) in graph.nodes.iter_mut().zip(assignments) {
		directed += neighbors.len();
		node.neighbors = neighbors;
	}
	debug!(
		"topology rebuilt: {} nodes, {} directed links",
		graph.nodes.len(),
		directed
	);
}

/// Deduplicate directed neighbor references into undirected edges.
pub fn unique_edges(graph: &Graph) -> Vec<Edge> {
	let mut seen = HashSet::new();
	let mut edges = Vec::new();
	for (source, node) in graph.nodes.iter().enumerate() {
		for neighbor in &node.neighbors {
			let Some(target) = graph.index_of(neighbor.as_str()) else {
				continue;
			};
			if seen.insert((source.min(target), source.max(target))) {
				edges.push(Edge {
					source,
					target,
					phase: (source as f64 * 0.1).fract(),
				});
			}
		}
	}
	edges
}
