//! Classic flocking forces on the ground plane
//!
//! All three forces are pure functions of an agent and its neighbor
//! snapshot, so they can run on any thread.

use glam::Vec3;

use crate::agent::Agent;
use crate::core::config::SwarmConfig;
use crate::core::types::{flatten, ground};

/// Push away from neighbors closer than half the radius, stronger when
/// closer. Coincident neighbors are skipped.
pub fn separation(agent: &Agent, neighbors: &[&Agent], radius: f32) -> Vec3 {
    let threshold = radius / 2.0;
    let here = ground(agent.position);

    let mut steer = Vec3::ZERO;
    let mut count = 0usize;
    for other in neighbors {
        let distance = here.distance(ground(other.position));
        if distance > 0.0 && distance < threshold {
            let away = flatten(agent.position - other.position).normalize_or_zero();
            steer += away / distance;
            count += 1;
        }
    }

    if count > 0 {
        steer / count as f32
    } else {
        Vec3::ZERO
    }
}

/// Difference between the neighbors' mean velocity and the agent's own
pub fn alignment(agent: &Agent, neighbors: &[&Agent]) -> Vec3 {
    if neighbors.is_empty() {
        return Vec3::ZERO;
    }
    let mean = neighbors.iter().map(|n| n.velocity).sum::<Vec3>() / neighbors.len() as f32;
    mean - agent.velocity
}

/// Planar offset from the agent to the neighbors' centroid
pub fn cohesion(agent: &Agent, neighbors: &[&Agent]) -> Vec3 {
    if neighbors.is_empty() {
        return Vec3::ZERO;
    }
    let centroid =
        neighbors.iter().map(|n| flatten(n.position)).sum::<Vec3>() / neighbors.len() as f32;
    centroid - flatten(agent.position)
}

/// Weighted sum of the three forces
pub fn flocking_force(agent: &Agent, neighbors: &[&Agent], config: &SwarmConfig) -> Vec3 {
    separation(agent, neighbors, config.neighborhood_radius) * config.separation_weight
        + alignment(agent, neighbors) * config.alignment_weight
        + cohesion(agent, neighbors) * config.cohesion_weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;
    use crate::core::types::AgentId;

    fn at(x: f32, z: f32) -> Agent {
        Agent::new(AgentId::new(), Vec3::new(x, 0.0, z), Role::Passive)
    }

    #[test]
    fn test_separation_pushes_away() {
        let me = at(0.0, 0.0);
        let close = at(1.0, 0.0);
        let force = separation(&me, &[&close], 10.0);
        assert!(force.x < 0.0);
        assert!((force.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_separation_ignores_coincident_and_distant() {
        let me = at(0.0, 0.0);
        let same = at(0.0, 0.0);
        let far = at(6.0, 0.0);
        let force = separation(&me, &[&same, &far], 10.0);
        assert_eq!(force, Vec3::ZERO);
        assert!(force.is_finite());
    }

    #[test]
    fn test_separation_uses_ground_distance() {
        let me = at(0.0, 0.0);
        let mut above = at(0.5, 0.0);
        above.position.y = 100.0;
        let force = separation(&me, &[&above], 4.0);
        assert_eq!(force.y, 0.0);
        assert!((force.x + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_alignment_matches_mean_velocity() {
        let me = at(0.0, 0.0).with_velocity(Vec3::new(1.0, 0.0, 0.0));
        let a = at(1.0, 0.0).with_velocity(Vec3::new(0.0, 0.0, 2.0));
        let b = at(2.0, 0.0).with_velocity(Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(alignment(&me, &[&a, &b]), Vec3::new(-1.0, 0.0, 3.0));
    }

    #[test]
    fn test_cohesion_points_to_centroid() {
        let me = at(0.0, 0.0);
        let a = at(2.0, 2.0);
        let b = at(4.0, -2.0);
        assert_eq!(cohesion(&me, &[&a, &b]), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_no_neighbors_no_force() {
        let me = at(3.0, 3.0).with_velocity(Vec3::X);
        let config = SwarmConfig::default();
        assert_eq!(flocking_force(&me, &[], &config), Vec3::ZERO);
    }
}
