//! Collaborators the swarm engine consults but does not own

use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::agent::{Agent, BehaviorState};
use crate::core::types::{ground, SimTime};

/// Where collectors find resources
pub trait ResourceLocator: Send + Sync {
    /// Nearest resource to `position` on the ground plane
    fn nearest(&self, position: Vec3) -> Option<Vec3>;
}

/// World without resources; collectors get no attraction
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResources;

impl ResourceLocator for NoResources {
    fn nearest(&self, _position: Vec3) -> Option<Vec3> {
        None
    }
}

/// Fixed list of resource positions
#[derive(Debug, Default, Clone)]
pub struct StaticResources {
    points: Vec<Vec3>,
}

impl StaticResources {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

impl ResourceLocator for StaticResources {
    fn nearest(&self, position: Vec3) -> Option<Vec3> {
        let origin = ground(position);
        self.points
            .iter()
            .copied()
            .min_by_key(|p| OrderedFloat(ground(*p).distance_squared(origin)))
    }
}

/// Decides when an agent switches behavior.
///
/// Called once per agent per tick against the pre-tick snapshot; returning
/// `None` keeps the current state.
pub trait TransitionPolicy: Send + Sync {
    fn next_state(&self, agent: &Agent, neighbors: &[&Agent], now: SimTime) -> Option<BehaviorState>;
}

/// Never changes state on its own
#[derive(Debug, Default, Clone, Copy)]
pub struct RetainState;

impl TransitionPolicy for RetainState {
    fn next_state(&self, _agent: &Agent, _neighbors: &[&Agent], _now: SimTime) -> Option<BehaviorState> {
        None
    }
}

impl<F> TransitionPolicy for F
where
    F: Fn(&Agent, &[&Agent], SimTime) -> Option<BehaviorState> + Send + Sync,
{
    fn next_state(&self, agent: &Agent, neighbors: &[&Agent], now: SimTime) -> Option<BehaviorState> {
        self(agent, neighbors, now)
    }
}
