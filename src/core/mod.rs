pub mod config;
pub mod error;
pub mod types;

pub use config::{BehaviorTuning, SimulationConfig, SwarmConfig};
pub use error::{Result, SwarmError};
pub use types::{AgentId, Rect, SimTime, Tick};
