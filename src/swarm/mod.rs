//! Flocking simulation over the agent registry

pub mod behavior;
pub mod engine;
pub mod environment;
pub mod flocking;
pub mod metrics;

pub use engine::SwarmEngine;
pub use environment::{NoResources, ResourceLocator, RetainState, StaticResources, TransitionPolicy};
pub use metrics::TickMetrics;
