//! Swarm engine: owns the agents and the spatial index and advances them
//! one tick at a time.
//!
//! Each tick has two phases. The compute phase derives every agent's next
//! kinematics from the previous tick's snapshot (parallel above a threshold);
//! the commit phase writes them back, rebuilds the index and emits events.

use std::sync::Arc;
use std::time::Instant;

use glam::{Quat, Vec3};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::agent::{Agent, AgentRegistry, BehaviorKind, BehaviorState, EntityRef, SwarmSetup};
use crate::core::config::{BehaviorTuning, SimulationConfig};
use crate::core::error::{Result, SwarmError};
use crate::core::types::{ground, AgentId, Rect, SimTime, Tick};
use crate::events::{EventPayload, EventSink, SwarmEvent};
use crate::spatial::{ExplorationGrid, QuadTree};
use crate::swarm::behavior::{apply_role, apply_state, SteeringContext};
use crate::swarm::environment::{NoResources, ResourceLocator, RetainState, TransitionPolicy};
use crate::swarm::flocking::flocking_force;
use crate::swarm::metrics::TickMetrics;

/// Decorrelates per-tick seeds
const TICK_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Result of the compute phase for one agent
struct AgentUpdate {
    velocity: Vec3,
    position: Vec3,
    rotation: Quat,
    next_state: Option<BehaviorState>,
    neighbors: Vec<AgentId>,
}

pub struct SwarmEngine {
    config: SimulationConfig,
    registry: AgentRegistry,
    /// Dense registry indices keyed by ground position
    index: QuadTree<usize>,
    tick: Tick,
    elapsed: SimTime,
    metrics: TickMetrics,
    resources: Arc<dyn ResourceLocator>,
    transitions: Arc<dyn TransitionPolicy>,
    exploration: Option<ExplorationGrid>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for SwarmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmEngine")
            .field("agents", &self.registry.len())
            .field("tick", &self.tick)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl SwarmEngine {
    pub fn new(config: SimulationConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let index = QuadTree::new(config.world_bounds, config.node_capacity)?;
        let exploration = config
            .exploration_cell_size
            .map(|cell| ExplorationGrid::new(config.world_bounds, cell));

        Ok(Self {
            config,
            registry: AgentRegistry::new(),
            index,
            tick: 0,
            elapsed: 0.0,
            metrics: TickMetrics::default(),
            resources: Arc::new(NoResources),
            transitions: Arc::new(RetainState),
            exploration,
            sink,
        })
    }

    /// Engine populated from a role table, seeded by the config
    pub fn from_setup(config: SimulationConfig, setup: &SwarmSetup, sink: Arc<dyn EventSink>) -> Result<Self> {
        let mut engine = Self::new(config, sink)?;
        let mut rng = ChaCha8Rng::seed_from_u64(engine.config.seed);
        engine.registry.spawn_population(setup, &mut rng)?;
        engine.rebuild_index();
        Ok(engine)
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceLocator>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_transitions(mut self, transitions: Arc<dyn TransitionPolicy>) -> Self {
        self.transitions = transitions;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn agents(&self) -> &[Agent] {
        self.registry.as_slice()
    }

    /// Mutable agents. Position edits reach the spatial index at the next
    /// [`rebuild_index`](Self::rebuild_index) or tick.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        self.registry.as_mut_slice()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Stats of the last completed tick
    pub fn metrics(&self) -> TickMetrics {
        self.metrics
    }

    /// Simulated seconds since the first tick
    pub fn elapsed(&self) -> SimTime {
        self.elapsed
    }

    pub fn tick_count(&self) -> Tick {
        self.tick
    }

    pub fn exploration(&self) -> Option<&ExplorationGrid> {
        self.exploration.as_ref()
    }

    /// Register an agent and make it visible to neighbor queries immediately
    pub fn add_agent(&mut self, agent: Agent) -> Result<AgentId> {
        let position = agent.position;
        let id = self.registry.add(agent)?;
        let slot = self.registry.len() - 1;
        if !self.index.insert(slot, ground(position)) {
            tracing::debug!("Agent {} spawned outside world bounds, not indexed", id);
        }
        Ok(id)
    }

    /// Force a behavior, emitting `StateChanged` if its kind differs
    pub fn set_state(&mut self, id: AgentId, behavior: BehaviorState) -> Result<()> {
        let now = self.elapsed;
        let agent = self
            .registry
            .get_mut(id)
            .ok_or(SwarmError::AgentNotFound(id))?;
        if let Some((from, to)) = agent.transition(behavior, now) {
            self.emit_state_change(id, from, to, now);
        }
        Ok(())
    }

    /// Agents whose ground position lies within `radius` of `position`
    pub fn get_nearby_entities(&self, position: Vec3, radius: f32) -> Vec<&Agent> {
        let agents = self.registry.as_slice();
        self.neighbors_of(position, radius, None)
            .into_iter()
            .map(|i| &agents[i])
            .collect()
    }

    /// Broad phase through the index, then an exact planar distance check
    fn neighbors_of(&self, position: Vec3, radius: f32, exclude: Option<usize>) -> Vec<usize> {
        if !(radius > 0.0) {
            return Vec::new();
        }

        let center = ground(position);
        let range = Rect::centered(center, radius);
        let agents = self.registry.as_slice();

        let mut candidates = Vec::new();
        self.index.query_into(&range, &mut candidates);
        candidates.retain(|&i| {
            Some(i) != exclude && ground(agents[i].position).distance(center) <= radius
        });
        candidates
    }

    /// Refill the spatial index from current positions
    pub fn rebuild_index(&mut self) {
        let rejected = self.index.rebuild(
            self.registry
                .iter()
                .enumerate()
                .map(|(i, agent)| (i, ground(agent.position))),
        );
        if rejected > 0 {
            tracing::debug!("{} agents outside world bounds this tick", rejected);
        }
    }

    /// Per-agent generator, identical whichever thread computes the agent
    fn agent_rng(&self, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ self.tick.wrapping_mul(TICK_SALT));
        rng.set_stream(index as u64);
        rng
    }

    fn resolve(&self, entity: EntityRef) -> Option<(Vec3, Vec3)> {
        match entity {
            EntityRef::Agent(id) => self.registry.get(id).map(|a| (a.position, a.velocity)),
            EntityRef::Point { position, velocity } => Some((position, velocity)),
        }
    }

    fn compute(&self, i: usize, dt: f32, ctx: &SteeringContext<'_>) -> AgentUpdate {
        let agents = self.registry.as_slice();
        let agent = &agents[i];
        let swarm = &self.config.swarm;

        let neighbor_slots = self.neighbors_of(agent.position, swarm.neighborhood_radius, Some(i));
        let neighbors: Vec<&Agent> = neighbor_slots.iter().map(|&j| &agents[j]).collect();

        let mut rng = self.agent_rng(i);
        let mut velocity = agent.velocity + flocking_force(agent, &neighbors, swarm);
        velocity = apply_role(agent, velocity, ctx);
        velocity = apply_state(agent, velocity, ctx, &mut rng);
        velocity = clamp_speed(velocity, swarm.max_speed);

        AgentUpdate {
            velocity,
            position: agent.position + velocity * dt,
            rotation: face(agent.rotation, velocity, &self.config.tuning),
            next_state: self.transitions.next_state(agent, &neighbors, ctx.now),
            neighbors: neighbors.iter().map(|n| n.id()).collect(),
        }
    }

    /// Advance every agent by `dt` simulated seconds
    pub fn tick(&mut self, dt: f32) -> Result<TickMetrics> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SwarmError::InvalidDeltaTime(dt));
        }

        let started = Instant::now();
        let now = self.elapsed + dt as f64;
        let count = self.registry.len();

        // COMPUTE: reads only the pre-tick snapshot
        let updates: Vec<AgentUpdate> = {
            let engine = &*self;
            let resolve = |entity: EntityRef| engine.resolve(entity);
            let ctx = SteeringContext {
                now,
                swarm: &engine.config.swarm,
                tuning: &engine.config.tuning,
                resources: engine.resources.as_ref(),
                exploration: engine.exploration.as_ref(),
                resolve: &resolve,
            };

            if count >= engine.config.parallel_threshold {
                (0..count)
                    .into_par_iter()
                    .map(|i| engine.compute(i, dt, &ctx))
                    .collect()
            } else {
                (0..count).map(|i| engine.compute(i, dt, &ctx)).collect()
            }
        };

        // COMMIT
        let mut changes: Vec<(AgentId, BehaviorKind, BehaviorKind)> = Vec::new();
        for (agent, update) in self.registry.as_mut_slice().iter_mut().zip(updates) {
            agent.velocity = update.velocity;
            agent.position = update.position;
            agent.rotation = update.rotation;
            agent.neighbors = update.neighbors;
            if let Some(next) = update.next_state {
                if let Some((from, to)) = agent.transition(next, now) {
                    changes.push((agent.id(), from, to));
                }
            }
        }

        self.tick += 1;
        self.elapsed = now;
        self.rebuild_index();

        if let Some(grid) = self.exploration.as_mut() {
            for agent in self.registry.iter() {
                grid.record(agent.position);
            }
        }

        for &(id, from, to) in &changes {
            self.emit_state_change(id, from, to, now);
        }
        if self.config.emit_agent_updates {
            for agent in self.registry.iter() {
                self.sink.emit(SwarmEvent::new(
                    now,
                    EventPayload::AgentUpdated {
                        agent_id: agent.id(),
                        position: agent.position,
                        velocity: agent.velocity,
                        state: agent.state.kind(),
                    },
                ));
            }
        }

        self.metrics = TickMetrics::new(self.tick, started.elapsed(), count, count, changes.len());
        self.sink
            .emit(SwarmEvent::new(now, EventPayload::MetricsUpdated(self.metrics)));

        tracing::debug!(
            "Tick {}: {} agents, {} state changes, load {:.2}",
            self.tick,
            count,
            changes.len(),
            self.metrics.system_load
        );

        Ok(self.metrics)
    }

    fn emit_state_change(&self, agent_id: AgentId, from: BehaviorKind, to: BehaviorKind, now: SimTime) {
        self.sink.emit(SwarmEvent::new(
            now,
            EventPayload::StateChanged { agent_id, from, to },
        ));
    }
}

/// Cap the magnitude at `max_speed`; a non-finite velocity becomes zero
fn clamp_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    if !velocity.is_finite() {
        return Vec3::ZERO;
    }
    velocity.clamp_length_max(max_speed)
}

/// Turn gradually toward the direction of travel; too slow to have a
/// heading keeps the current rotation
fn face(rotation: Quat, velocity: Vec3, tuning: &BehaviorTuning) -> Quat {
    if velocity.length() < tuning.facing_min_speed {
        return rotation;
    }
    let target = Quat::from_rotation_arc(Vec3::Z, velocity.normalize());
    rotation.slerp(target, tuning.facing_slerp)
}
