//! Error taxonomy for the network engine.
//!
//! Only construction errors are fatal. Everything raised while the frame loop
//! runs is recovered where it happens and at most logged.

use thiserror::Error;

use super::types::NodeId;

/// Errors raised by the graph model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
	/// Two specs share an id.
	#[error("duplicate node id `{0}`")]
	DuplicateId(NodeId),

	/// Stale reference, e.g. telemetry for a node removed earlier.
	#[error("unknown node `{0}`")]
	UnknownNode(NodeId),
}

/// A config that cannot drive an engine.
#[derive(Error, Debug)]
pub enum ConfigError {
	/// A field holds an unusable value.
	#[error("invalid `{field}`: {reason}")]
	Invalid {
		/// Offending field name.
		field: &'static str,
		/// What the field must satisfy.
		reason: &'static str,
	},

	/// Malformed JSON.
	#[error("failed to parse network config: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Point at or behind the camera plane.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ProjectionError {
	/// `z` is non-finite or not greater than `-focal_length`.
	#[error("degenerate projection: z = {z} with focal length {focal_length}")]
	Degenerate {
		/// Depth that was projected.
		z: f64,
		/// Focal length in use.
		focal_length: f64,
	},
}

/// Anything that can stop an engine from being constructed.
#[derive(Error, Debug)]
pub enum NetworkError {
	/// Invalid node set.
	#[error(transparent)]
	Graph(#[from] GraphError),

	/// Invalid config.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// Node list JSON did not parse.
	#[error("failed to parse node specs: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Failure to attach an engine to a canvas.
#[derive(Error, Debug)]
pub enum MountError {
	/// Not running in a browser.
	#[error("no browser window available")]
	NoWindow,

	/// `getContext("2d")` failed.
	#[error("canvas has no 2d rendering context")]
	NoContext,

	/// The engine itself could not be built.
	#[error(transparent)]
	Network(#[from] NetworkError),
}
