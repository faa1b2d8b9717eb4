//! Initial population description: how many agents, where, and in which roles

use std::path::Path;

use ahash::AHashMap;
use glam::Vec3;
use rand::Rng;
use serde::Deserialize;

use crate::agent::Role;
use crate::core::error::{Result, SwarmError};

/// Slack allowed when role distributions sum to slightly above 1.0
const DISTRIBUTION_EPSILON: f64 = 1e-6;

/// Absorbs decimal shares like 0.7 that sit just below their true value
const COUNT_EPSILON: f64 = 1e-9;

/// Rectangle on the ground plane that new agents are dropped into
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpawnArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl SpawnArea {
    pub fn square(half_extent: f32) -> Self {
        Self {
            min_x: -half_extent,
            max_x: half_extent,
            min_z: -half_extent,
            max_z: half_extent,
        }
    }

    /// Uniform position in the area at ground height
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vec3 {
        let x = self.min_x + rng.gen::<f32>() * (self.max_x - self.min_x);
        let z = self.min_z + rng.gen::<f32>() * (self.max_z - self.min_z);
        Vec3::new(x, 0.0, z)
    }

    fn validate(&self) -> Result<()> {
        let finite = [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.min_x > self.max_x || self.min_z > self.max_z {
            return Err(SwarmError::InvalidConfig(format!(
                "spawn area is empty or non-finite: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// One row of the role distribution table
#[derive(Debug, Clone, Deserialize)]
pub struct RoleProfile {
    pub name: String,
    /// Fraction of agent_count spawned with this role
    pub distribution: f64,
    #[serde(default)]
    pub attributes: AHashMap<String, f32>,
    /// Guard point for defenders; the origin when omitted
    #[serde(default)]
    pub post: Option<[f32; 3]>,
}

impl RoleProfile {
    pub fn new(name: &str, distribution: f64, attributes: &[(&str, f32)]) -> Self {
        Self {
            name: name.to_string(),
            distribution,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            post: None,
        }
    }

    pub fn role(&self) -> Result<Role> {
        let role: Role = self.name.parse()?;
        Ok(match (role, self.post) {
            (Role::Defender { .. }, Some(post)) => Role::Defender {
                post: Vec3::from_array(post),
            },
            (role, _) => role,
        })
    }

    /// `floor(agent_count * distribution)`
    pub fn count(&self, agent_count: usize) -> usize {
        (agent_count as f64 * self.distribution + COUNT_EPSILON).floor() as usize
    }
}

/// Initial swarm description
#[derive(Debug, Clone, Deserialize)]
pub struct SwarmSetup {
    pub agent_count: usize,
    pub spawn_area: SpawnArea,
    pub roles: Vec<RoleProfile>,
}

impl Default for SwarmSetup {
    fn default() -> Self {
        Self {
            agent_count: 100,
            spawn_area: SpawnArea::square(50.0),
            roles: vec![
                RoleProfile::new("scout", 0.4, &[("speed", 2.0), ("vision", 10.0), ("stamina", 0.8)]),
                RoleProfile::new("defender", 0.3, &[("speed", 1.5), ("strength", 2.0), ("armor", 0.9)]),
                RoleProfile::new("collector", 0.3, &[("speed", 1.8), ("capacity", 2.0), ("efficiency", 0.9)]),
            ],
        }
    }
}

impl SwarmSetup {
    pub fn validate(&self) -> Result<()> {
        self.spawn_area.validate()?;

        let mut total = 0.0f64;
        for profile in &self.roles {
            profile.role()?;
            if !(0.0..=1.0).contains(&profile.distribution) {
                return Err(SwarmError::InvalidConfig(format!(
                    "role '{}' distribution must be in [0, 1], got {}",
                    profile.name, profile.distribution
                )));
            }
            total += profile.distribution;
        }

        if total > 1.0 + DISTRIBUTION_EPSILON {
            return Err(SwarmError::InvalidConfig(format!(
                "role distributions sum to {}, which exceeds 1.0",
                total
            )));
        }

        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let setup: SwarmSetup = toml::from_str(content)?;
        setup.validate()?;
        Ok(setup)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Number of agents the table produces
    pub fn planned_count(&self) -> usize {
        self.roles.iter().map(|r| r.count(self.agent_count)).sum()
    }
}
