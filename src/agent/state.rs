//! Behavioral state carried by each agent

use derive_more::Display;
use glam::Vec3;

use crate::core::types::{AgentId, SimTime};

/// Something an agent can pursue or flee from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef {
    /// Another agent, resolved against the current tick's snapshot
    Agent(AgentId),
    /// A fixed kinematic snapshot supplied by the caller
    Point { position: Vec3, velocity: Vec3 },
}

impl EntityRef {
    pub fn stationary(position: Vec3) -> Self {
        EntityRef::Point {
            position,
            velocity: Vec3::ZERO,
        }
    }
}

/// What an agent is currently doing.
///
/// Each variant carries exactly the data its steering needs, so pursuit and
/// evasion never have to check for a missing target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorState {
    Exploring,
    Pursuing { target: EntityRef },
    Evading { threat: EntityRef },
    /// No state-driven steering
    Idle,
}

impl BehaviorState {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            BehaviorState::Exploring => BehaviorKind::Exploring,
            BehaviorState::Pursuing { .. } => BehaviorKind::Pursuing,
            BehaviorState::Evading { .. } => BehaviorKind::Evading,
            BehaviorState::Idle => BehaviorKind::Idle,
        }
    }
}

/// Payload-free tag of a [`BehaviorState`], used for change detection and events
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    #[display(fmt = "exploring")]
    Exploring,
    #[display(fmt = "pursuing")]
    Pursuing,
    #[display(fmt = "evading")]
    Evading,
    #[display(fmt = "idle")]
    Idle,
}

/// A behavior plus the simulated time it was entered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState {
    pub behavior: BehaviorState,
    pub since: SimTime,
}

impl AgentState {
    pub fn new(behavior: BehaviorState, since: SimTime) -> Self {
        Self { behavior, since }
    }

    pub fn kind(&self) -> BehaviorKind {
        self.behavior.kind()
    }
}

impl Default for AgentState {
    fn default() -> Self {
        Self::new(BehaviorState::Exploring, 0.0)
    }
}
