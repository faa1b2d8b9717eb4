//! Swarm agents: identity, kinematics, role and behavioral state

pub mod population;
pub mod registry;
pub mod role;
pub mod state;

pub use population::{RoleProfile, SpawnArea, SwarmSetup};
pub use registry::AgentRegistry;
pub use role::Role;
pub use state::{AgentState, BehaviorKind, BehaviorState, EntityRef};

use ahash::AHashMap;
use glam::{Quat, Vec3};

use crate::core::types::{AgentId, SimTime};

/// One member of the swarm
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Quat,
    pub role: Role,
    pub state: AgentState,
    /// State before the last transition; only used to detect changes
    pub previous_state: Option<AgentState>,
    /// Role-derived scalars, read-only while the simulation runs
    attributes: AHashMap<String, f32>,
    /// Neighbors found during the last tick. Advisory: the spatial index is
    /// authoritative for the current tick.
    pub neighbors: Vec<AgentId>,
}

impl Agent {
    /// Fresh agent at rest, facing +Z, exploring
    pub fn new(id: AgentId, position: Vec3, role: Role) -> Self {
        Self {
            id,
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            role,
            state: AgentState::default(),
            previous_state: None,
            attributes: AHashMap::new(),
            neighbors: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: AHashMap<String, f32>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_state(mut self, behavior: BehaviorState) -> Self {
        self.state = AgentState::new(behavior, self.state.since);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn attribute(&self, name: &str) -> Option<f32> {
        self.attributes.get(name).copied()
    }

    pub fn attributes(&self) -> &AHashMap<String, f32> {
        &self.attributes
    }

    /// Enter a new behavior. Returns the old and new kinds when the kind
    /// actually changed; a same-kind update only refreshes the payload.
    pub fn transition(
        &mut self,
        behavior: BehaviorState,
        now: SimTime,
    ) -> Option<(BehaviorKind, BehaviorKind)> {
        let old = self.state;
        if old.kind() == behavior.kind() {
            self.state.behavior = behavior;
            return None;
        }

        self.previous_state = Some(old);
        self.state = AgentState::new(behavior, now);
        Some((old.kind(), behavior.kind()))
    }
}
