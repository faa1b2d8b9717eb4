//! Turning decisions into agent changes, and agents into decision inputs

use serde_json::{json, Value};

use crate::agent::Agent;
use crate::core::types::ground;
use crate::fuzzy::{Decision, DecisionInput};

/// Writes a decision back onto its agent
pub trait DecisionApplier: Send + Sync {
    fn apply(&self, agent: &mut Agent, decision: &Decision);
}

/// Leaves agents untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopApplier;

impl DecisionApplier for NoopApplier {
    fn apply(&self, _agent: &mut Agent, _decision: &Decision) {}
}

impl<F> DecisionApplier for F
where
    F: Fn(&mut Agent, &Decision) + Send + Sync,
{
    fn apply(&self, agent: &mut Agent, decision: &Decision) {
        self(agent, decision)
    }
}

/// JSON view of an agent as seen by the decision engine
pub fn agent_state(agent: &Agent) -> Value {
    json!({
        "id": agent.id(),
        "role": agent.role.name(),
        "state": agent.state.kind().to_string(),
        "since": agent.state.since,
        "position": agent.position,
        "velocity": agent.velocity,
        "speed": agent.speed(),
        "attributes": agent.attributes(),
        "neighborCount": agent.neighbors.len(),
    })
}

/// JSON view of a neighbor, with its ground distance to `observer`
fn nearby_entity(observer: &Agent, other: &Agent) -> Value {
    json!({
        "id": other.id(),
        "role": other.role.name(),
        "state": other.state.kind().to_string(),
        "position": other.position,
        "velocity": other.velocity,
        "distance": ground(observer.position).distance(ground(other.position)),
    })
}

/// Input bag for one agent: `agentState`, `worldState`, `nearbyEntities`.
/// The agent itself is left out of its own neighbors.
pub fn decision_input(agent: &Agent, nearby: &[&Agent], world_state: &Value) -> DecisionInput {
    let entities = nearby
        .iter()
        .filter(|other| other.id() != agent.id())
        .map(|other| nearby_entity(agent, other))
        .collect();
    DecisionInput::new(agent_state(agent), world_state.clone(), entities)
}
