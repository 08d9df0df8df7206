//! Per-tick node kinematics.
//!
//! Velocities are in canvas units per second, so motion is independent of the
//! frame rate.

use log::trace;

use super::config::NetworkConfig;
use super::graph::{Graph, Node};
use super::projection::project;
use super::types::{Vec3, Viewport};

/// Advance the simulation by `dt` seconds.
///
/// `pointer` is in canvas pixels. A non-finite or non-positive `dt` skips the
/// tick entirely.
pub fn step(graph: &mut Graph, dt: f64, pointer: Option<(f64, f64)>, config: &NetworkConfig) {
	if !(dt.is_finite() && dt > 0.0) {
		trace!("skipping tick with dt = {dt}");
		return;
	}
	graph.elapsed += dt;
	let (viewport, elapsed) = (graph.viewport, graph.elapsed);

	for node in &mut graph.nodes {
		let v = node.velocity;
		node.position.x += v.x * dt;
		node.position.y += v.y * dt;
		node.position.z += v.z * dt;

		if let Some(pointer) = pointer {
			attract(node, pointer, dt, viewport, config);
		}
		node.position = wrap(node.position, viewport, config);

		// derived from total elapsed time so any dt split lands on the same phase
		node.pulse_phase = node.phase_offset + config.pulse_rate * elapsed;
	}
}

fn attract(node: &mut Node, pointer: (f64, f64), dt: f64, viewport: Viewport, config: &NetworkConfig) {
	let screen = project(node.position, config.focal_length, viewport);
	let (dx, dy) = (pointer.0 - screen.x, pointer.1 - screen.y);
	let distance = dx.hypot(dy);
	let radius = config.attraction_radius;
	if distance >= radius || distance <= f64::EPSILON {
		return;
	}

	let force = (radius - distance) / radius * config.attraction_strength * dt;
	node.velocity.x += dx / distance * force;
	node.velocity.y += dy / distance * force;

	let speed = node.velocity.length();
	if speed > config.max_speed {
		let k = config.max_speed / speed;
		node.velocity = Vec3::new(node.velocity.x * k, node.velocity.y * k, node.velocity.z * k);
	}
}

fn wrap(p: Vec3, viewport: Viewport, config: &NetworkConfig) -> Vec3 {
	let m = config.wrap_margin;
	Vec3::new(
		wrap_axis(p.x, -m, viewport.width + m),
		wrap_axis(p.y, -m, viewport.height + m),
		wrap_axis(p.z, 0.0, config.depth),
	)
}

/// Leaving through one side re-enters at the opposite one.
fn wrap_axis(value: f64, low: f64, high: f64) -> f64 {
	if value < low {
		high
	} else if value > high {
		low
	} else {
		value
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::agent_network::graph::create_graph;
	use crate::components::agent_network::types::{Category, NodeSpec};

	const VP: Viewport = Viewport::new(800.0, 600.0);

	fn single(position: Vec3, velocity: Vec3) -> Graph {
		let spec = NodeSpec::new("a", Category::Worker, position).with_velocity(velocity);
		create_graph(&[spec], VP, &NetworkConfig::default()).unwrap()
	}

	#[test]
	fn bad_dt_is_a_no_op() {
		let config = NetworkConfig::default();
		let mut g = single(Vec3::new(100.0, 100.0, 10.0), Vec3::new(30.0, -20.0, 5.0));
		let before = g.clone();
		for dt in [0.0, -0.016, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
			step(&mut g, dt, Some((100.0, 100.0)), &config);
		}
		assert_eq!(g.nodes(), before.nodes());
		assert_eq!(g.elapsed(), 0.0);
	}

	#[test]
	fn integrates_velocity_per_second() {
		let mut g = single(Vec3::new(100.0, 100.0, 10.0), Vec3::new(30.0, -20.0, 4.0));
		step(&mut g, 0.5, None, &NetworkConfig::default());
		assert_eq!(g.nodes()[0].position(), Vec3::new(115.0, 90.0, 12.0));
		assert_eq!(g.elapsed(), 0.5);
	}

	#[test]
	fn wraps_to_opposite_edge() {
		let config = NetworkConfig::default();
		let mut g = single(Vec3::new(845.0, -45.0, 999.0), Vec3::new(10.0, -10.0, 10.0));
		step(&mut g, 1.0, None, &config);
		let p = g.nodes()[0].position();
		assert_eq!(p.x, -config.wrap_margin);
		assert_eq!(p.y, VP.height + config.wrap_margin);
		assert_eq!(p.z, 0.0);
	}

	#[test]
	fn near_starting_depth_does_not_wrap_to_far_plane() {
		let mut g = single(Vec3::new(100.0, 100.0, -100.0), Vec3::ZERO);
		step(&mut g, 0.016, None, &NetworkConfig::default());
		assert_eq!(g.nodes()[0].position().z, 0.0);
	}

	#[test]
	fn positions_stay_within_wrapped_bounds() {
		let config = NetworkConfig::default();
		let m = config.wrap_margin;
		let specs: Vec<NodeSpec> = (0..12)
			.map(|i| {
				let f = i as f64;
				NodeSpec::new(format!("n{i}"), Category::Data, Vec3::new(f * 60.0, f * 45.0, f * 80.0))
					.with_velocity(Vec3::new(90.0 - f * 17.0, f * 23.0 - 120.0, 400.0 - f * 70.0))
			})
			.collect();
		let mut g = create_graph(&specs, VP, &config).unwrap();
		let dts = [0.016, 0.033, 0.1, 0.008, 0.25];
		for tick in 0..2000 {
			step(&mut g, dts[tick % dts.len()], None, &config);
			for node in g.nodes() {
				let p = node.position();
				assert!((-m..=VP.width + m).contains(&p.x), "x out of bounds: {p:?}");
				assert!((-m..=VP.height + m).contains(&p.y), "y out of bounds: {p:?}");
				assert!((0.0..=config.depth).contains(&p.z), "z out of bounds: {p:?}");
			}
		}
	}

	#[test]
	fn pointer_pulls_node_and_speed_is_capped() {
		let config = NetworkConfig::default();
		let mut g = single(Vec3::new(400.0, 300.0, 0.0), Vec3::ZERO);
		step(&mut g, 0.1, Some((450.0, 300.0)), &config);
		let v = g.nodes()[0].velocity();
		assert!(v.x > 0.0);
		assert_eq!(v.y, 0.0);

		for _ in 0..500 {
			step(&mut g, 0.1, Some((450.0, 300.0)), &config);
			assert!(g.nodes()[0].velocity().length() <= config.max_speed + 1e-9);
		}
	}

	#[test]
	fn distant_pointer_has_no_effect() {
		let config = NetworkConfig::default();
		let mut g = single(Vec3::new(100.0, 100.0, 0.0), Vec3::ZERO);
		step(&mut g, 0.1, Some((700.0, 500.0)), &config);
		assert_eq!(g.nodes()[0].velocity(), Vec3::ZERO);
	}

	#[test]
	fn phase_depends_only_on_elapsed_time() {
		let config = NetworkConfig::default();
		let mut even = single(Vec3::new(10.0, 10.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
		let mut uneven = even.clone();
		for _ in 0..8 {
			step(&mut even, 0.25, None, &config);
		}
		for dt in [0.5, 0.5, 0.25, 0.75] {
			step(&mut uneven, dt, None, &config);
		}
		assert_eq!(even.elapsed(), 2.0);
		assert_eq!(even.nodes()[0].pulse_phase(), uneven.nodes()[0].pulse_phase());
		assert!(even.nodes()[0].pulse_phase() > 0.0);
	}
}
