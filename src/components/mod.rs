//! Reusable UI components.

pub mod agent_network;
