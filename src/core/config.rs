//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{Result, SwarmError};
use crate::core::types::Rect;

/// Upper bound on exploration grid cells over `world_bounds`.
///
/// At 10M cells the u32 visit counters alone take 40MB.
pub const MAX_EXPLORATION_CELLS: f64 = 10_000_000.0;

/// Flocking weights and limits.
///
/// Immutable once an engine is constructed from it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SwarmConfig {
    /// Multiplier on the separation (crowd avoidance) steering vector
    #[serde(alias = "separationWeight")]
    pub separation_weight: f32,

    /// Multiplier on the alignment (heading matching) steering vector
    #[serde(alias = "alignmentWeight")]
    pub alignment_weight: f32,

    /// Multiplier on the cohesion (move toward local centroid) steering vector
    #[serde(alias = "cohesionWeight")]
    pub cohesion_weight: f32,

    /// Hard cap on velocity magnitude, applied after every integration step
    #[serde(alias = "maxSpeed")]
    pub max_speed: f32,

    /// Radius of the neighbor circle on the ground plane (world units)
    ///
    /// Separation only reacts to neighbors inside half of this radius.
    #[serde(alias = "neighborhoodRadius")]
    pub neighborhood_radius: f32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            separation_weight: 1.0,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            max_speed: 10.0,
            neighborhood_radius: 50.0,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("separation_weight", self.separation_weight),
            ("alignment_weight", self.alignment_weight),
            ("cohesion_weight", self.cohesion_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(SwarmError::InvalidConfig(format!(
                    "{} must be finite and non-negative, got {}",
                    name, weight
                )));
            }
        }

        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "max_speed must be positive, got {}",
                self.max_speed
            )));
        }

        if !self.neighborhood_radius.is_finite() || self.neighborhood_radius <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "neighborhood_radius must be positive, got {}",
                self.neighborhood_radius
            )));
        }

        Ok(())
    }
}

/// Strengths of the role and behavior-state modulation forces
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BehaviorTuning {
    // === ROLES ===
    /// Magnitude of the scout's periodic wander force
    pub scout_wander_strength: f32,

    /// Angular frequency of the scout wander (radians per simulated second)
    pub scout_wander_frequency: f32,

    /// Velocity multiplier applied to scouts after their wander force.
    ///
    /// The speed clamp still applies afterwards, so this only matters for
    /// scouts moving below max_speed.
    pub scout_speed_factor: f32,

    /// Magnitude of the force pulling a defender back to its post once it
    /// strays further than neighborhood_radius
    pub defender_return_strength: f32,

    /// Magnitude of the force pulling a collector toward the nearest resource
    pub collector_attraction: f32,

    // === BEHAVIOR STATES ===
    /// Width of the uniform random wander added while exploring
    ///
    /// Each planar component is drawn from [-noise/2, noise/2].
    pub exploration_noise: f32,

    /// Magnitude of the pull toward the least-visited adjacent cell when an
    /// exploration grid is attached
    pub exploration_bias: f32,

    /// Evasion force is max_speed times this factor
    pub evasion_speed_factor: f32,

    /// Width of the random jitter added to evasion
    pub evasion_jitter: f32,

    // === ORIENTATION ===
    /// Fraction of the way the rotation moves toward the facing direction per tick
    pub facing_slerp: f32,

    /// Below this speed the facing direction is undefined and rotation is left alone
    pub facing_min_speed: f32,
}

impl Default for BehaviorTuning {
    fn default() -> Self {
        Self {
            scout_wander_strength: 0.5,
            scout_wander_frequency: 1.0,
            scout_speed_factor: 1.5,
            defender_return_strength: 0.5,
            collector_attraction: 0.8,
            exploration_noise: 0.2,
            exploration_bias: 0.1,
            evasion_speed_factor: 1.2,
            evasion_jitter: 0.3,
            facing_slerp: 0.1,
            facing_min_speed: 0.01,
        }
    }
}

/// Everything an engine needs at construction
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub swarm: SwarmConfig,
    pub tuning: BehaviorTuning,

    /// Root rectangle of the spatial index (X/Z plane).
    ///
    /// Agents outside it are silently absent from neighbor queries for the
    /// tick, so it should cover every reachable position.
    pub world_bounds: Rect,

    /// Items a quadtree node holds before it subdivides (minimum 1)
    pub node_capacity: usize,

    /// Agent count at which per-tick work switches to rayon.
    ///
    /// Below this the thread pool overhead outweighs the gain.
    pub parallel_threshold: usize,

    /// Seed for all simulation randomness (wander, jitter, spawning)
    pub seed: u64,

    /// Emit one AgentUpdated event per agent per tick
    pub emit_agent_updates: bool,

    /// Radius used when gathering nearby entities for decisions
    pub decision_radius: f32,

    /// Cell size of the exploration coverage grid; `None` disables the
    /// unexplored-area bias
    pub exploration_cell_size: Option<f32>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            swarm: SwarmConfig::default(),
            tuning: BehaviorTuning::default(),
            world_bounds: Rect::new(-1000.0, -1000.0, 2000.0, 2000.0),
            node_capacity: 4,
            parallel_threshold: 1000,
            seed: 42,
            emit_agent_updates: true,
            decision_radius: 5.0,
            exploration_cell_size: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_swarm(swarm: SwarmConfig) -> Self {
        Self {
            swarm,
            ..Self::default()
        }
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.swarm.validate()?;

        if !self.world_bounds.is_valid() {
            return Err(SwarmError::InvalidConfig(format!(
                "world_bounds must have finite coordinates and positive extent, got {:?}",
                self.world_bounds
            )));
        }

        if self.node_capacity == 0 {
            return Err(SwarmError::InvalidConfig(
                "node_capacity must be at least 1".into(),
            ));
        }

        if !self.decision_radius.is_finite() || self.decision_radius <= 0.0 {
            return Err(SwarmError::InvalidConfig(format!(
                "decision_radius must be positive, got {}",
                self.decision_radius
            )));
        }

        if let Some(cell) = self.exploration_cell_size {
            if !cell.is_finite() || cell <= 0.0 {
                return Err(SwarmError::InvalidConfig(format!(
                    "exploration_cell_size must be positive, got {}",
                    cell
                )));
            }

            let columns = (self.world_bounds.width as f64 / cell as f64).ceil().max(1.0);
            let rows = (self.world_bounds.height as f64 / cell as f64).ceil().max(1.0);
            if columns * rows > MAX_EXPLORATION_CELLS {
                return Err(SwarmError::InvalidConfig(format!(
                    "exploration_cell_size {} needs {}x{} cells over the world bounds, limit is {}",
                    cell, columns, rows, MAX_EXPLORATION_CELLS
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }
}
