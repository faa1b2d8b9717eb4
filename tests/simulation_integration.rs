//! Integration tests for the full simulation loop
//!
//! Loads the bundled config, population and rules, then checks:
//! - Every agent gets one decision per step
//! - Events reach an async consumer through the channel sink
//! - A full channel drops events instead of blocking the tick
//! - Appliers see every decision

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashMap;
use glam::Vec3;

use swarm_intel::agent::{Agent, SwarmSetup};
use swarm_intel::core::config::SimulationConfig;
use swarm_intel::events::{ChannelSink, EventKind, EventLog, EventPayload};
use swarm_intel::fuzzy::{load_definitions, Decision, FuzzyDecisionEngine};
use swarm_intel::simulation::Simulation;

fn data(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(file)
}

fn bundled_config() -> SimulationConfig {
    SimulationConfig::load(&data("simulation.toml")).unwrap()
}

fn bundled_setup() -> SwarmSetup {
    SwarmSetup::load(&data("swarm_setup.toml")).unwrap()
}

fn bundled_rules(sink: Arc<dyn swarm_intel::events::EventSink>) -> FuzzyDecisionEngine {
    let mut engine = FuzzyDecisionEngine::new(sink);
    load_definitions(&data("fuzzy_rules.toml"))
        .unwrap()
        .install(&mut engine)
        .unwrap();
    engine
}

#[test]
fn test_bundled_files_load() {
    let config = bundled_config();
    assert_eq!(config.seed, 42);
    assert_eq!(config.swarm.neighborhood_radius, 50.0);
    assert_eq!(config.exploration_cell_size, Some(25.0));

    let setup = bundled_setup();
    assert_eq!(setup.planned_count(), 100);
}

#[test]
fn test_every_agent_decides_each_step() {
    let log = Arc::new(EventLog::new(100_000));
    let decisions = bundled_rules(log.clone());
    let mut sim =
        Simulation::from_setup(bundled_config(), &bundled_setup(), decisions, log.clone()).unwrap();
    assert_eq!(sim.engine().len(), 100);

    for _ in 0..3 {
        let report = sim.step(0.016).unwrap();
        assert_eq!(report.decisions, 100);
        assert!(report.failures.is_empty());
    }

    let stats = sim.stats();
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.decisions_made, 300);
    assert_eq!(stats.decision_failures, 0);
    assert!(stats.distance_traveled > 0.0);

    assert_eq!(log.count(EventKind::DecisionMade), 300);
    assert_eq!(log.count(EventKind::AgentUpdated), 300);
    assert_eq!(log.count(EventKind::MetricsUpdated), 3);

    // Decisions carry the simulated time of the tick that preceded them
    let last = log.of_kind(EventKind::DecisionMade).pop().unwrap();
    assert!((last.timestamp - sim.engine().elapsed()).abs() < 1e-9);
    assert!(sim.engine().exploration().is_some());
}

#[tokio::test]
async fn test_channel_sink_feeds_consumer() {
    let (sink, mut events) = ChannelSink::bounded(8192);
    let sink = Arc::new(sink);

    let consumer = tokio::spawn(async move {
        let mut counts: AHashMap<EventKind, usize> = AHashMap::new();
        let mut metric_ticks = Vec::new();
        while let Some(event) = events.recv().await {
            if let EventPayload::MetricsUpdated(metrics) = &event.payload {
                metric_ticks.push(metrics.tick);
            }
            *counts.entry(event.kind()).or_default() += 1;
        }
        (counts, metric_ticks)
    });

    let decisions = bundled_rules(sink.clone());
    let mut sim =
        Simulation::from_setup(bundled_config(), &bundled_setup(), decisions, sink.clone()).unwrap();
    for _ in 0..5 {
        sim.step(0.05).unwrap();
    }
    assert_eq!(sink.dropped(), 0);
    drop(sim);
    drop(sink);

    let (counts, metric_ticks) = consumer.await.unwrap();
    assert_eq!(counts.get(&EventKind::RuleAdded).copied(), Some(4));
    assert_eq!(counts.get(&EventKind::DecisionMade).copied(), Some(500));
    assert_eq!(counts.get(&EventKind::AgentUpdated).copied(), Some(500));
    assert_eq!(metric_ticks, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_full_channel_drops_instead_of_blocking() {
    let (sink, mut events) = ChannelSink::bounded(8);
    let sink = Arc::new(sink);

    let decisions = bundled_rules(sink.clone());
    let mut sim =
        Simulation::from_setup(bundled_config(), &bundled_setup(), decisions, sink.clone()).unwrap();
    let report = sim.step(0.016).unwrap();
    assert_eq!(report.decisions, 100);
    assert!(sink.dropped() > 0);

    drop(sim);
    drop(sink);
    let mut received = 0;
    while events.recv().await.is_some() {
        received += 1;
    }
    assert_eq!(received, 8);
}

#[test]
fn test_applier_sees_every_decision() {
    let decisions = bundled_rules(Arc::new(EventLog::default()));
    let mut config = bundled_config();
    config.emit_agent_updates = false;

    let mut sim = Simulation::from_setup(config, &bundled_setup(), decisions, Arc::new(EventLog::default()))
        .unwrap()
        .with_applier(|agent: &mut Agent, _decision: &Decision| {
            agent.velocity = Vec3::ZERO;
        });

    sim.step(0.016).unwrap();
    assert!(sim.engine().agents().iter().all(|a| a.velocity == Vec3::ZERO));

    let world = sim.world_state();
    assert_eq!(world["tick"], 1);
    assert_eq!(world["agentCount"], 100);
}
