use std::f64::consts::{PI, TAU};

use log::warn;

use super::config::NetworkConfig;
use super::graph::{Graph, Node};
use super::interaction::Interaction;
use super::projection::{ProjectedNode, ScreenPoint};
use super::surface::{Rgba, Stroke, Surface};
use super::topology::{Edge, unique_edges};
use super::types::Status;

/// Link stroke and ambient glow color.
pub const LINK_COLOR: Rgba = Rgba::rgb(255, 108, 0);
/// Flow marker color, also the midpoint of an active link's gradient.
pub const FLOW_COLOR: Rgba = Rgba::rgb(255, 0, 255);

const RING_START: f64 = -PI / 2.0;
const OFFLINE_ALPHA: f64 = 0.35;
/// Links whose length fade drops to this are not drawn.
const MIN_LINK_ALPHA: f64 = 0.1;
const LINK_FADE_ALPHA: f64 = 0.6;
const AMBIENT_RADIUS: f64 = 200.0;
const AMBIENT_ALPHA: f64 = 0.08;

/// Draw one frame. Never touches graph state.
///
/// `projected` must be in graph order, as produced by `project_graph`.
pub fn render<S: Surface + ?Sized>(
	surface: &mut S,
	graph: &Graph,
	projected: &[ProjectedNode],
	interaction: &Interaction,
	time: f64,
	config: &NetworkConfig,
) {
	let viewport = graph.viewport();
	surface.clear(
		viewport.width,
		viewport.height,
		Rgba::BLACK.with_alpha(config.trail_alpha),
	);
	if projected.len() != graph.len() {
		warn!(
			"projection has {} points for {} nodes, skipping frame",
			projected.len(),
			graph.len()
		);
		return;
	}

	if let Some((x, y)) = interaction.pointer() {
		surface.glow(x, y, AMBIENT_RADIUS, LINK_COLOR.with_alpha(AMBIENT_ALPHA));
	}
	for edge in unique_edges(graph) {
		draw_edge(surface, graph, projected, interaction, &edge, time, config);
	}
	for (node, point) in graph.nodes().iter().zip(projected) {
		draw_node(surface, node, &point.screen, interaction, config);
	}
}

fn draw_edge<S: Surface + ?Sized>(
	surface: &mut S,
	graph: &Graph,
	projected: &[ProjectedNode],
	interaction: &Interaction,
	edge: &Edge,
	time: f64,
	config: &NetworkConfig,
) {
	let (a, b) = (&graph.nodes()[edge.source], &graph.nodes()[edge.target]);
	let (pa, pb) = (projected[edge.source].screen, projected[edge.target].screen);
	let flowing = a.status() == Status::Processing || b.status() == Status::Processing;
	let highlighted = interaction.is_selected(a.id()) || interaction.is_selected(b.id());
	let scale = (pa.scale + pb.scale) / 2.0;

	// fade by on-screen length, a wrapped neighbor may be a canvas away
	let fade = link_fade(pa.distance_to(pb.x, pb.y), config.connect_radius);
	if fade * LINK_FADE_ALPHA <= MIN_LINK_ALPHA {
		return;
	}
	let emphasis = match (highlighted, flowing) {
		(true, _) => 0.6,
		(false, true) => 0.35,
		(false, false) => 0.15,
	};
	let alpha = fade * emphasis;
	let width = (scale * 1.5).max(0.5);
	if !flowing {
		let dashed = Stroke::Dashed {
			dash: 6.0,
			gap: 6.0,
			offset: 0.0,
		};
		surface.line(pa.x, pa.y, pb.x, pb.y, width, LINK_COLOR.with_alpha(alpha), dashed);
		return;
	}
	surface.gradient_line(
		pa.x,
		pa.y,
		pb.x,
		pb.y,
		width,
		&[
			(0.0, LINK_COLOR.with_alpha(alpha)),
			(0.5, FLOW_COLOR.with_alpha(alpha)),
			(1.0, LINK_COLOR.with_alpha(alpha)),
		],
	);

	let t = flow_progress(time, config.flow_speed, edge.phase);
	let (fx, fy) = (pa.x + (pb.x - pa.x) * t, pa.y + (pb.y - pa.y) * t);
	let pulse = (t * PI).sin().max(0.2) * fade;
	surface.glow(fx, fy, 8.0 * scale, Rgba::WHITE.with_alpha(0.8 * pulse));
	surface.fill_circle(fx, fy, 3.0 * scale, FLOW_COLOR.with_alpha(pulse));
}

/// 1 for a zero-length link, falling to 0 at `connect_radius`.
fn link_fade(length: f64, connect_radius: f64) -> f64 {
	if connect_radius <= 0.0 {
		return 0.0;
	}
	((connect_radius - length) / connect_radius).max(0.0)
}

/// Position of a flow marker along its edge, in `[0, 1)`.
pub fn flow_progress(time: f64, flow_speed: f64, phase: f64) -> f64 {
	(time * flow_speed + phase).rem_euclid(1.0)
}

fn draw_node<S: Surface + ?Sized>(
	surface: &mut S,
	node: &Node,
	p: &ScreenPoint,
	interaction: &Interaction,
	config: &NetworkConfig,
) {
	let selected = interaction.is_selected(node.id());
	let size = node.category().base_size() * p.scale;
	let color = node.category().color();
	let alpha = if node.status() == Status::Offline {
		OFFLINE_ALPHA
	} else {
		1.0
	};
	let pulse = node.pulse_phase().sin() * 0.3 + 0.7;

	let glow = if selected {
		config.selected_glow_factor
	} else {
		config.glow_factor
	};
	surface.glow(p.x, p.y, size * glow, color.with_alpha(alpha * pulse * 0.6));
	surface.fill_circle(p.x, p.y, size * 0.5 * pulse, color.with_alpha(alpha));

	let ring_width = (2.0 * p.scale).max(1.0);
	if node.load() > 0.0 {
		surface.stroke_arc(
			p.x,
			p.y,
			size * 0.75,
			RING_START,
			RING_START + node.load() / 100.0 * TAU,
			ring_width,
			Rgba::WHITE.with_alpha(0.8 * alpha),
		);
	}
	if selected || interaction.is_hovered(node.id()) {
		let outline = if selected { 0.9 } else { 0.5 };
		surface.stroke_arc(
			p.x,
			p.y,
			size * 1.05,
			0.0,
			TAU,
			ring_width,
			Rgba::WHITE.with_alpha(outline * alpha),
		);
	}

	surface.text(
		node.label(),
		p.x,
		p.y + size + 16.0 * p.scale,
		(12.0 * p.scale).max(8.0),
		Rgba::WHITE.with_alpha(0.8 * alpha),
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::agent_network::graph::create_graph;
	use crate::components::agent_network::projection::project_graph;
	use crate::components::agent_network::simulation::step;
	use crate::components::agent_network::surface::{DrawCommand, DrawList};
	use crate::components::agent_network::types::{Category, NodeId, NodeSpec, Vec3, Viewport};

	fn pair(status_a: Status, status_b: Status) -> Graph {
		let specs = [
			NodeSpec::new("a", Category::Orchestrator, Vec3::new(100.0, 100.0, 0.0))
				.with_status(status_a)
				.with_load(50.0),
			NodeSpec::new("b", Category::Data, Vec3::new(200.0, 100.0, 0.0)).with_status(status_b),
		];
		create_graph(&specs, Viewport::new(400.0, 300.0), &NetworkConfig::default()).unwrap()
	}

	fn draw(graph: &Graph, interaction: &Interaction, time: f64) -> DrawList {
		let config = NetworkConfig::default();
		let projected = project_graph(graph, config.focal_length);
		let mut list = DrawList::new();
		render(&mut list, graph, &projected, interaction, time, &config);
		list
	}

	fn flow_markers(list: &DrawList) -> Vec<(f64, f64)> {
		list.commands
			.iter()
			.filter_map(|c| match c {
				DrawCommand::FillCircle { x, y, color, .. }
					if (color.r, color.g, color.b) == (FLOW_COLOR.r, FLOW_COLOR.g, FLOW_COLOR.b) =>
				{
					Some((*x, *y))
				}
				_ => None,
			})
			.collect()
	}

	fn lines(list: &DrawList) -> usize {
		list.commands
			.iter()
			.filter(|c| matches!(c, DrawCommand::Line { .. } | DrawCommand::GradientLine { .. }))
			.count()
	}

	fn line_alpha(list: &DrawList) -> f64 {
		list.commands
			.iter()
			.find_map(|c| match c {
				DrawCommand::Line { color, .. } => Some(color.a),
				_ => None,
			})
			.unwrap()
	}

	/// Full outlines (hover or selection) drawn around the node at `x`.
	fn outlines_at(list: &DrawList, at: f64) -> Vec<f64> {
		list.commands
			.iter()
			.filter_map(|c| match c {
				DrawCommand::StrokeArc {
					x, start, end, color, ..
				} if *x == at && *start == 0.0 && *end == TAU => Some(color.a),
				_ => None,
			})
			.collect()
	}

	fn pair_at(distance: f64) -> Graph {
		let specs = [
			NodeSpec::new("a", Category::Data, Vec3::new(100.0, 100.0, 0.0)),
			NodeSpec::new("b", Category::Data, Vec3::new(100.0 + distance, 100.0, 0.0)),
		];
		create_graph(&specs, Viewport::new(400.0, 300.0), &NetworkConfig::default()).unwrap()
	}

	#[test]
	fn mutual_neighbors_draw_one_line() {
		let g = pair(Status::Idle, Status::Idle);
		assert_eq!(g.nodes()[0].neighbors().len(), 1);
		assert_eq!(g.nodes()[1].neighbors().len(), 1);
		assert_eq!(lines(&draw(&g, &Interaction::default(), 0.0)), 1);
	}

	#[test]
	fn idle_links_have_no_flow_marker() {
		let g = pair(Status::Active, Status::Idle);
		let list = draw(&g, &Interaction::default(), 0.3);
		assert!(flow_markers(&list).is_empty());
		assert!(list.commands.iter().any(|c| matches!(
			c,
			DrawCommand::Line {
				stroke: Stroke::Dashed { .. },
				..
			}
		)));
	}

	#[test]
	fn flow_marker_moves_along_edge() {
		let g = pair(Status::Idle, Status::Processing);
		// edge from node 0 has phase 0, so progress is time * 0.5
		let list = draw(&g, &Interaction::default(), 0.5);
		assert_eq!(flow_markers(&list), [(125.0, 100.0)]);

		let list = draw(&g, &Interaction::default(), 2.5);
		assert_eq!(flow_markers(&list), [(125.0, 100.0)]);
	}

	#[test]
	fn flow_progress_wraps() {
		assert_eq!(flow_progress(3.0, 0.5, 0.25), 0.75);
		assert_eq!(flow_progress(3.5, 0.5, 0.5), 0.25);
		assert!((0.0..1.0).contains(&flow_progress(-7.3, 0.5, 0.1)));
	}

	#[test]
	fn load_ring_spans_load_fraction() {
		let g = pair(Status::Idle, Status::Idle);
		let list = draw(&g, &Interaction::default(), 0.0);
		let arcs: Vec<(f64, f64)> = list
			.commands
			.iter()
			.filter_map(|c| match c {
				DrawCommand::StrokeArc { start, end, .. } => Some((*start, *end)),
				_ => None,
			})
			.collect();
		// only "a" has load
		assert_eq!(arcs.len(), 1);
		assert!((arcs[0].1 - arcs[0].0 - PI).abs() < 1e-12);
	}

	#[test]
	fn selection_enlarges_glow() {
		let g = pair(Status::Idle, Status::Idle);
		let glow_radius = |list: &DrawList| {
			list.commands
				.iter()
				.find_map(|c| match c {
					DrawCommand::Glow { x, radius, .. } if *x == 100.0 => Some(*radius),
					_ => None,
				})
				.unwrap()
		};
		let plain = glow_radius(&draw(&g, &Interaction::default(), 0.0));

		let mut selected = Interaction::default();
		selected.select(Some(NodeId::from("a")));
		let big = glow_radius(&draw(&g, &selected, 0.0));
		assert_eq!(plain, 20.0 * 2.0);
		assert_eq!(big, 20.0 * 3.0);
	}

	#[test]
	fn unknown_selection_is_ignored() {
		let g = pair(Status::Idle, Status::Idle);
		let mut interaction = Interaction::default();
		interaction.select(Some(NodeId::from("ghost")));
		let list = draw(&g, &interaction, 0.0);
		assert_eq!(list.texts().collect::<Vec<_>>(), ["A", "B"]);
	}

	#[test]
	fn render_does_not_mutate_graph() {
		let g = pair(Status::Processing, Status::Active);
		let before = g.clone();
		draw(&g, &Interaction::default(), 1.0);
		assert_eq!(g.nodes(), before.nodes());
	}

	#[test]
	fn wrapped_neighbor_draws_no_cross_canvas_line() {
		let config = NetworkConfig::default();
		let specs = [
			NodeSpec::new("a", Category::Data, Vec3::new(-45.0, 300.0, 0.0))
				.with_velocity(Vec3::new(-20.0, 0.0, 0.0)),
			NodeSpec::new("b", Category::Data, Vec3::new(40.0, 300.0, 0.0)),
		];
		let mut g = create_graph(&specs, Viewport::new(800.0, 600.0), &config).unwrap();
		assert_eq!(lines(&draw(&g, &Interaction::default(), 0.0)), 1);

		step(&mut g, 0.5, None, &config);
		assert_eq!(g.nodes()[0].position().x, 800.0 + config.wrap_margin);
		// still neighbors, but a canvas apart on screen
		assert_eq!(g.nodes()[0].neighbors(), [NodeId::from("b")]);
		assert_eq!(lines(&draw(&g, &Interaction::default(), 0.0)), 0);
	}

	#[test]
	fn link_alpha_fades_with_length() {
		let short = line_alpha(&draw(&pair_at(40.0), &Interaction::default(), 0.0));
		let long = line_alpha(&draw(&pair_at(140.0), &Interaction::default(), 0.0));
		assert!((short - 0.8 * 0.15).abs() < 1e-12);
		assert!((long - 0.3 * 0.15).abs() < 1e-12);
		// fade * 0.6 <= 0.1 from here on
		assert_eq!(lines(&draw(&pair_at(170.0), &Interaction::default(), 0.0)), 0);
	}

	#[test]
	fn active_links_use_a_gradient() {
		let g = pair(Status::Processing, Status::Idle);
		let list = draw(&g, &Interaction::default(), 0.0);
		let stops = list
			.commands
			.iter()
			.find_map(|c| match c {
				DrawCommand::GradientLine { stops, .. } => Some(stops.clone()),
				_ => None,
			})
			.unwrap();
		let colors: Vec<(u8, u8, u8)> = stops.iter().map(|(_, c)| (c.r, c.g, c.b)).collect();
		assert_eq!(
			colors,
			[
				(LINK_COLOR.r, LINK_COLOR.g, LINK_COLOR.b),
				(FLOW_COLOR.r, FLOW_COLOR.g, FLOW_COLOR.b),
				(LINK_COLOR.r, LINK_COLOR.g, LINK_COLOR.b),
			]
		);
	}

	#[test]
	fn offline_nodes_are_dimmed() {
		let g = pair(Status::Idle, Status::Offline);
		let list = draw(&g, &Interaction::default(), 0.0);
		let core_alpha = |at: f64| {
			list.commands
				.iter()
				.find_map(|c| match c {
					DrawCommand::FillCircle { x, color, .. } if *x == at => Some(color.a),
					_ => None,
				})
				.unwrap()
		};
		assert_eq!(core_alpha(100.0), 1.0);
		assert_eq!(core_alpha(200.0), OFFLINE_ALPHA);
	}

	#[test]
	fn hovered_node_gets_an_outline() {
		let g = pair(Status::Idle, Status::Idle);
		let config = NetworkConfig::default();
		assert!(outlines_at(&draw(&g, &Interaction::default(), 0.0), 200.0).is_empty());

		let mut interaction = Interaction::default();
		interaction.pointer_moved(203.0, 101.0);
		interaction.resolve(&project_graph(&g, config.focal_length), config.pick_radius_px);
		let list = draw(&g, &interaction, 0.0);
		assert_eq!(outlines_at(&list, 200.0), [0.5]);
		assert!(outlines_at(&list, 100.0).is_empty());

		interaction.select(Some(NodeId::from("b")));
		assert_eq!(outlines_at(&draw(&g, &interaction, 0.0), 200.0), [0.9]);
	}

	#[test]
	fn pointer_casts_an_ambient_glow() {
		let g = pair(Status::Idle, Status::Idle);
		let mut interaction = Interaction::default();
		assert!(!draw(&g, &interaction, 0.0).commands.iter().any(|c| matches!(
			c,
			DrawCommand::Glow { x, .. } if *x == 320.0
		)));
		interaction.pointer_moved(320.0, 40.0);
		let list = draw(&g, &interaction, 0.0);
		assert!(list.commands.iter().any(|c| matches!(
			c,
			DrawCommand::Glow { x, y, radius, .. } if *x == 320.0 && *y == 40.0 && *radius == AMBIENT_RADIUS
		)));
	}
}
