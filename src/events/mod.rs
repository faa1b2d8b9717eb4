//! Events emitted by the swarm and decision engines
//!
//! Engines post structured events to an injected [`EventSink`]; consumers own
//! buffering and backpressure.

pub mod sink;

pub use sink::{ChannelSink, EventLog, EventSink, NullSink};

use std::time::Duration;

use derive_more::Display;
use glam::Vec3;

use crate::agent::BehaviorKind;
use crate::core::types::{AgentId, SimTime};
use crate::fuzzy::Decision;
use crate::swarm::TickMetrics;

/// Type tag of an event
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[display(fmt = "AGENT_UPDATED")]
    AgentUpdated,
    #[display(fmt = "STATE_CHANGED")]
    StateChanged,
    #[display(fmt = "DECISION_MADE")]
    DecisionMade,
    #[display(fmt = "DECISION_ERROR")]
    DecisionError,
    #[display(fmt = "RULE_ADDED")]
    RuleAdded,
    #[display(fmt = "FUZZY_SET_ADDED")]
    FuzzySetAdded,
    #[display(fmt = "METRICS_UPDATED")]
    MetricsUpdated,
}

/// Event-specific data
#[derive(Debug, Clone)]
pub enum EventPayload {
    AgentUpdated {
        agent_id: AgentId,
        position: Vec3,
        velocity: Vec3,
        state: BehaviorKind,
    },
    StateChanged {
        agent_id: AgentId,
        from: BehaviorKind,
        to: BehaviorKind,
    },
    DecisionMade {
        duration: Duration,
        decision: Decision,
    },
    DecisionError {
        message: String,
    },
    RuleAdded {
        rule_id: String,
    },
    FuzzySetAdded {
        variable: String,
        set: String,
    },
    MetricsUpdated(TickMetrics),
}

#[derive(Debug, Clone)]
pub struct SwarmEvent {
    /// Simulated seconds for swarm events; the input's world time for decisions
    pub timestamp: SimTime,
    pub payload: EventPayload,
}

impl SwarmEvent {
    pub fn new(timestamp: SimTime, payload: EventPayload) -> Self {
        Self { timestamp, payload }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::AgentUpdated { .. } => EventKind::AgentUpdated,
            EventPayload::StateChanged { .. } => EventKind::StateChanged,
            EventPayload::DecisionMade { .. } => EventKind::DecisionMade,
            EventPayload::DecisionError { .. } => EventKind::DecisionError,
            EventPayload::RuleAdded { .. } => EventKind::RuleAdded,
            EventPayload::FuzzySetAdded { .. } => EventKind::FuzzySetAdded,
            EventPayload::MetricsUpdated(_) => EventKind::MetricsUpdated,
        }
    }
}
