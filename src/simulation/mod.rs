//! Simulation loop: flocking tick followed by one decision per agent

pub mod apply;

pub use apply::{agent_state, decision_input, DecisionApplier, NoopApplier};

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use serde_json::{json, Value};

use crate::agent::{Agent, SwarmSetup};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SwarmError};
use crate::core::types::AgentId;
use crate::events::EventSink;
use crate::fuzzy::{Decision, FuzzyDecisionEngine};
use crate::swarm::{SwarmEngine, TickMetrics};

/// Running totals across steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub ticks: u64,
    /// Summed straight-line displacement of every agent per tick
    pub distance_traveled: f64,
    pub decisions_made: u64,
    pub decision_failures: u64,
}

/// Outcome of one [`Simulation::step`]
#[derive(Debug)]
pub struct StepReport {
    pub metrics: TickMetrics,
    pub decisions: usize,
    /// Agents whose decision failed this step; their state was left as the
    /// tick produced it
    pub failures: Vec<(AgentId, SwarmError)>,
}

/// Swarm engine plus decision engine, stepped together
pub struct Simulation {
    engine: SwarmEngine,
    decisions: FuzzyDecisionEngine,
    applier: Box<dyn DecisionApplier>,
    stats: SimulationStats,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("engine", &self.engine)
            .field("decisions", &self.decisions)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Simulation {
    pub fn new(engine: SwarmEngine, decisions: FuzzyDecisionEngine) -> Self {
        Self {
            engine,
            decisions,
            applier: Box::new(NoopApplier),
            stats: SimulationStats::default(),
        }
    }

    /// Spawn `setup` into a fresh engine sharing `sink` with `decisions`
    pub fn from_setup(
        config: SimulationConfig,
        setup: &SwarmSetup,
        decisions: FuzzyDecisionEngine,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        let engine = SwarmEngine::from_setup(config, setup, sink)?;
        Ok(Self::new(engine, decisions))
    }

    pub fn with_applier(mut self, applier: impl DecisionApplier + 'static) -> Self {
        self.applier = Box::new(applier);
        self
    }

    pub fn engine(&self) -> &SwarmEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut SwarmEngine {
        &mut self.engine
    }

    pub fn decisions(&self) -> &FuzzyDecisionEngine {
        &self.decisions
    }

    pub fn decisions_mut(&mut self) -> &mut FuzzyDecisionEngine {
        &mut self.decisions
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    /// `worldState` as decisions see it
    pub fn world_state(&self) -> Value {
        json!({
            "time": self.engine.elapsed(),
            "tick": self.engine.tick_count(),
            "agentCount": self.engine.len(),
        })
    }

    /// One tick of flocking, then one decision per agent.
    ///
    /// A failed decision is reported for its agent and does not affect the
    /// others. Only an invalid `dt` fails the whole step.
    pub fn step(&mut self, dt: f32) -> Result<StepReport> {
        let before: Vec<_> = self.engine.agents().iter().map(|a| a.position).collect();
        let metrics = self.engine.tick(dt)?;

        self.stats.ticks += 1;
        self.stats.distance_traveled += self
            .engine
            .agents()
            .iter()
            .zip(&before)
            .map(|(agent, start)| agent.position.distance(*start) as f64)
            .sum::<f64>();

        let outcomes = self.decide_all();

        let mut failures = Vec::new();
        let mut decided = 0usize;
        for (agent, outcome) in self.engine.agents_mut().iter_mut().zip(outcomes) {
            match outcome {
                Ok(decision) => {
                    self.applier.apply(agent, &decision);
                    decided += 1;
                }
                Err(err) => failures.push((agent.id(), err)),
            }
        }
        self.engine.rebuild_index();

        self.stats.decisions_made += decided as u64;
        self.stats.decision_failures += failures.len() as u64;
        if !failures.is_empty() {
            tracing::warn!(
                "{} of {} decisions failed at tick {}",
                failures.len(),
                decided + failures.len(),
                metrics.tick
            );
        }

        Ok(StepReport {
            metrics,
            decisions: decided,
            failures,
        })
    }

    /// Decisions for every agent in registry order
    fn decide_all(&self) -> Vec<Result<Decision>> {
        let engine = &self.engine;
        let world = self.world_state();
        let radius = engine.config().decision_radius;

        let decide = |agent: &Agent| {
            let nearby = engine.get_nearby_entities(agent.position, radius);
            self.decisions.decide(&decision_input(agent, &nearby, &world))
        };

        let agents = engine.agents();
        if agents.len() >= engine.config().parallel_threshold {
            agents.par_iter().map(decide).collect()
        } else {
            agents.iter().map(decide).collect()
        }
    }
}
