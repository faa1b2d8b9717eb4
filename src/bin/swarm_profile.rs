//! Headless swarm profiler
//!
//! Steps a full simulation (flocking tick plus one fuzzy decision per agent)
//! and reports timings, statistics and event counts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use clap::Parser;
use serde_json::json;
use swarm_intel::agent::SwarmSetup;
use swarm_intel::core::config::SimulationConfig;
use swarm_intel::core::error::Result;
use swarm_intel::events::{ChannelSink, EventKind};
use swarm_intel::fuzzy::{load_definitions, FuzzyDecisionEngine};
use swarm_intel::simulation::Simulation;

/// Swarm profiler - run ticks and decisions without any frontend
#[derive(Parser, Debug)]
#[command(name = "swarm_profile")]
#[command(about = "Profile swarm ticks and fuzzy decisions headlessly")]
struct Args {
    /// Simulation config (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Population table (TOML); 100 scouts/defenders/collectors when omitted
    #[arg(long)]
    setup: Option<PathBuf>,

    /// Fuzzy variables and rules (TOML)
    #[arg(long, default_value = "data/fuzzy_rules.toml")]
    rules: PathBuf,

    /// Override the population size
    #[arg(long)]
    agents: Option<usize>,

    /// Number of steps to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Simulated seconds per step
    #[arg(long, default_value_t = 0.016)]
    dt: f32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Event channel capacity
    #[arg(long, default_value_t = 4096)]
    channel: usize,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.emit_agent_updates = false;

    let mut setup = match &args.setup {
        Some(path) => SwarmSetup::load(path)?,
        None => SwarmSetup::default(),
    };
    if let Some(count) = args.agents {
        setup.agent_count = count;
    }

    // Events drain on a runtime worker while the simulation runs here
    let (sink, mut events) = ChannelSink::bounded(args.channel);
    let sink = Arc::new(sink);
    let consumer = tokio::spawn(async move {
        let mut counts: AHashMap<EventKind, u64> = AHashMap::new();
        while let Some(event) = events.recv().await {
            *counts.entry(event.kind()).or_default() += 1;
        }
        counts
    });

    let mut decisions = FuzzyDecisionEngine::with_standard_sets(sink.clone())?;
    load_definitions(&args.rules)?.install(&mut decisions)?;

    let mut sim = Simulation::from_setup(config, &setup, decisions, sink.clone())?;
    tracing::info!(
        "Profiling {} agents for {} ticks ({} rules)",
        sim.engine().len(),
        args.ticks,
        sim.decisions().rule_count()
    );

    let mut tick_time = Duration::ZERO;
    let mut step_time = Duration::ZERO;
    let mut worst_step = Duration::ZERO;
    let mut failures = 0usize;
    for _ in 0..args.ticks {
        let start = Instant::now();
        let report = sim.step(args.dt)?;
        let elapsed = start.elapsed();

        tick_time += report.metrics.duration;
        step_time += elapsed;
        worst_step = worst_step.max(elapsed);
        failures += report.failures.len();
    }

    let stats = sim.stats();
    let dropped = sink.dropped();
    drop(sim);
    drop(sink);

    let counts = match consumer.await {
        Ok(counts) => counts,
        Err(err) => {
            tracing::warn!("Event consumer failed: {}", err);
            AHashMap::new()
        }
    };
    let count = |kind: EventKind| counts.get(&kind).copied().unwrap_or(0);

    let ticks = args.ticks.max(1) as u32;
    if args.json {
        let summary = json!({
            "stats": stats,
            "avg_tick_us": (tick_time / ticks).as_micros() as u64,
            "avg_step_us": (step_time / ticks).as_micros() as u64,
            "worst_step_us": worst_step.as_micros() as u64,
            "decision_failures": failures,
            "events": {
                "decisions": count(EventKind::DecisionMade),
                "errors": count(EventKind::DecisionError),
                "state_changes": count(EventKind::StateChanged),
                "metrics": count(EventKind::MetricsUpdated),
                "dropped": dropped,
            },
        });
        println!("{}", summary);
        return Ok(());
    }

    println!("=== Average times per step ({} samples) ===\n", args.ticks);
    println!("Phase           | Time");
    println!("----------------|------------");
    println!("Flocking tick   | {:>10.2?}", tick_time / ticks);
    println!("Tick + decide   | {:>10.2?}", step_time / ticks);
    println!("Worst step      | {:>10.2?}", worst_step);
    println!("\nTarget: <16.6ms for 60 ticks/sec\n");

    println!("Distance traveled: {:.1}", stats.distance_traveled);
    println!("Decisions made:    {}", stats.decisions_made);
    println!("Decision failures: {}", stats.decision_failures);
    println!(
        "Events: {} decisions, {} errors, {} state changes, {} dropped",
        count(EventKind::DecisionMade),
        count(EventKind::DecisionError),
        count(EventKind::StateChanged),
        dropped
    );

    Ok(())
}
