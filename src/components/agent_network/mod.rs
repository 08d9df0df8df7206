//! Real-time agent network visualization.
//!
//! The core (`graph` through `engine`) is plain Rust and runs anywhere;
//! `browser` and `component` bind it to a canvas.

mod browser;
mod component;
mod config;
mod engine;
mod error;
mod graph;
mod interaction;
mod projection;
mod render;
mod simulation;
mod state;
mod surface;
mod topology;
mod types;

pub use browser::{CanvasSizing, SharedEngine, mount};
pub use component::AgentNetworkCanvas;
pub use config::NetworkConfig;
pub use engine::{EngineHandle, FrameRequestId, Host, ListenerId, ListenerKind};
pub use error::{ConfigError, GraphError, MountError, NetworkError, ProjectionError};
pub use graph::{Graph, Node, create_graph};
pub use interaction::{Interaction, hit_test};
pub use projection::{ProjectedNode, ScreenPoint, project, project_graph, try_project};
pub use render::render;
pub use simulation::step;
pub use state::{FrameOutcome, NetworkState};
pub use surface::{DrawCommand, DrawList, Rgba, Stroke, Surface};
pub use topology::{Edge, build_topology, unique_edges};
pub use types::{Category, NodeId, NodeSpec, NodeUpdate, Status, Vec3, Viewport, parse_node_specs};
