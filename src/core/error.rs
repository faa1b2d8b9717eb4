use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum SwarmError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid fuzzy set '{set}': {reason}")]
    InvalidFuzzySet { set: String, reason: String },

    #[error("Invalid rule '{rule_id}': {reason}")]
    InvalidRule { rule_id: String, reason: String },

    #[error("Rule '{rule_id}' references unknown variable '{variable}'")]
    UnknownVariable { rule_id: String, variable: String },

    #[error("Rule '{rule_id}' references unknown set '{variable}.{set}'")]
    UnknownSet {
        rule_id: String,
        variable: String,
        set: String,
    },

    #[error("Unknown role tag: {0}")]
    UnknownRole(String),

    #[error("Delta time must be finite and positive, got {0}")]
    InvalidDeltaTime(f32),

    #[error("Agent already registered: {0}")]
    DuplicateAgent(AgentId),

    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SwarmError {
    /// Validation errors are raised synchronously at registration or load
    /// time and never leave partially registered state behind.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SwarmError::InvalidConfig(_)
                | SwarmError::InvalidFuzzySet { .. }
                | SwarmError::InvalidRule { .. }
                | SwarmError::UnknownVariable { .. }
                | SwarmError::UnknownSet { .. }
                | SwarmError::UnknownRole(_)
                | SwarmError::InvalidDeltaTime(_)
                | SwarmError::DuplicateAgent(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SwarmError>;
