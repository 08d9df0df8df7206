use log::trace;

use super::error::ProjectionError;
use super::graph::Graph;
use super::types::{NodeId, Vec3, Viewport};

/// Closest a point may get to the camera plane at `z = -focal_length`.
pub const Z_EPSILON: f64 = 1e-3;

/// Canvas-space position of a projected point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
	/// Horizontal canvas pixel.
	pub x: f64,
	/// Vertical canvas pixel.
	pub y: f64,
	/// Depth-derived size factor, 1.0 at `z = 0`.
	pub scale: f64,
}

impl ScreenPoint {
	/// Pixel distance to `(x, y)`.
	pub fn distance_to(&self, x: f64, y: f64) -> f64 {
		(self.x - x).hypot(self.y - y)
	}
}

/// A node's screen position for the current frame.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectedNode {
	/// Node the point belongs to.
	pub id: NodeId,
	/// Where it lands on the canvas.
	pub screen: ScreenPoint,
}

/// Perspective-project a point toward the viewport center.
pub fn try_project(
	position: Vec3,
	focal_length: f64,
	viewport: Viewport,
) -> Result<ScreenPoint, ProjectionError> {
	let z = position.z;
	if !z.is_finite() || z <= -focal_length + Z_EPSILON {
		return Err(ProjectionError::Degenerate { z, focal_length });
	}
	let scale = focal_length / (focal_length + z);
	Ok(ScreenPoint {
		x: position.x * scale + viewport.width / 2.0 * (1.0 - scale),
		y: position.y * scale + viewport.height / 2.0 * (1.0 - scale),
		scale,
	})
}

/// Like [`try_project`], but pulls degenerate depths back into range.
pub fn project(position: Vec3, focal_length: f64, viewport: Viewport) -> ScreenPoint {
	match try_project(position, focal_length, viewport) {
		Ok(point) => point,
		Err(err) => {
			trace!("{err}, clamping");
			let z = if position.z.is_finite() {
				-focal_length + 2.0 * Z_EPSILON
			} else {
				0.0
			};
			let clamped = Vec3 { z, ..position };
			try_project(clamped, focal_length, viewport).unwrap_or(ScreenPoint {
				x: position.x,
				y: position.y,
				scale: 1.0,
			})
		}
	}
}

/// Project every node, in graph order.
pub fn project_graph(graph: &Graph, focal_length: f64) -> Vec<ProjectedNode> {
	graph
		.nodes()
		.iter()
		.map(|node| ProjectedNode {
			id: node.id().clone(),
			screen: project(node.position(), focal_length, graph.viewport()),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	const VP: Viewport = Viewport::new(800.0, 600.0);

	#[test]
	fn zero_depth_is_identity() {
		let p = project(Vec3::new(120.0, 45.0, 0.0), 800.0, VP);
		assert_eq!(p, ScreenPoint { x: 120.0, y: 45.0, scale: 1.0 });
	}

	#[test]
	fn distant_points_converge_on_center() {
		let p = project(Vec3::new(0.0, 0.0, 800.0), 800.0, VP);
		assert_eq!(p.scale, 0.5);
		assert_eq!(p.x, 200.0);
		assert_eq!(p.y, 150.0);
	}

	#[test]
	fn scale_strictly_decreases_with_depth() {
		let f = 800.0;
		let mut previous = f64::INFINITY;
		let mut z = -f + 1.0;
		while z < 5000.0 {
			let scale = try_project(Vec3::new(10.0, 10.0, z), f, VP).unwrap().scale;
			assert!(scale < previous, "scale did not decrease at z = {z}");
			previous = scale;
			z += 37.5;
		}
	}

	#[test]
	fn camera_plane_is_degenerate() {
		let err = try_project(Vec3::new(0.0, 0.0, -800.0), 800.0, VP).unwrap_err();
		assert_eq!(
			err,
			ProjectionError::Degenerate {
				z: -800.0,
				focal_length: 800.0
			}
		);
		assert!(try_project(Vec3::new(0.0, 0.0, -5000.0), 800.0, VP).is_err());
		assert!(try_project(Vec3::new(0.0, 0.0, f64::NAN), 800.0, VP).is_err());
	}

	#[test]
	fn project_clamps_instead_of_failing() {
		let behind = project(Vec3::new(10.0, 20.0, -5000.0), 800.0, VP);
		assert!(behind.scale.is_finite() && behind.scale > 0.0);
		assert!(behind.x.is_finite() && behind.y.is_finite());

		let nan = project(Vec3::new(10.0, 20.0, f64::NAN), 800.0, VP);
		assert_eq!(nan, ScreenPoint { x: 10.0, y: 20.0, scale: 1.0 });
	}
}
