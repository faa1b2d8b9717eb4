//! Agent roles and the modulation each one applies on top of flocking

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::core::error::SwarmError;

/// Role of an agent within the swarm.
///
/// Closed set: a tag that does not name one of these is rejected when the
/// population is loaded. `Passive` is the explicit "no modulation" role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Fast, wide-ranging explorer with a periodic wander
    Scout,
    /// Stays within neighborhood radius of its post
    Defender { post: Vec3 },
    /// Drawn toward the nearest known resource
    Collector,
    /// Pure flocking, no role force
    Passive,
}

impl Role {
    /// Defender guarding the world origin
    pub fn defender() -> Self {
        Role::Defender { post: Vec3::ZERO }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::Scout => "scout",
            Role::Defender { .. } => "defender",
            Role::Collector => "collector",
            Role::Passive => "passive",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = SwarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scout" => Ok(Role::Scout),
            "defender" => Ok(Role::defender()),
            "collector" => Ok(Role::Collector),
            "passive" => Ok(Role::Passive),
            _ => Err(SwarmError::UnknownRole(s.to_string())),
        }
    }
}
