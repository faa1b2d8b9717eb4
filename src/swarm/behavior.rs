//! Role- and state-specific steering added on top of flocking

use glam::Vec3;
use rand::Rng;

use crate::agent::{Agent, BehaviorState, EntityRef, Role};
use crate::core::config::{BehaviorTuning, SwarmConfig};
use crate::core::types::{flatten, ground, SimTime};
use crate::spatial::ExplorationGrid;
use crate::swarm::environment::ResourceLocator;

/// Read-only view of the world while computing one agent's steering
pub struct SteeringContext<'a> {
    pub now: SimTime,
    pub swarm: &'a SwarmConfig,
    pub tuning: &'a BehaviorTuning,
    pub resources: &'a dyn ResourceLocator,
    pub exploration: Option<&'a ExplorationGrid>,
    /// Current position and velocity of an entity, `None` if it is gone
    pub resolve: &'a (dyn Fn(EntityRef) -> Option<(Vec3, Vec3)> + Sync),
}

/// Planar unit vector from `from` toward `to`, zero when they coincide
fn toward(from: Vec3, to: Vec3) -> Vec3 {
    flatten(to - from).normalize_or_zero()
}

/// Uniform planar offset with components in `[-amplitude/2, amplitude/2]`
fn planar_noise<R: Rng>(rng: &mut R, amplitude: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * amplitude,
        0.0,
        (rng.gen::<f32>() - 0.5) * amplitude,
    )
}

/// Adjust `velocity` for the agent's role
pub fn apply_role(agent: &Agent, velocity: Vec3, ctx: &SteeringContext<'_>) -> Vec3 {
    let tuning = ctx.tuning;
    match agent.role {
        Role::Scout => {
            let phase = (ctx.now * tuning.scout_wander_frequency as f64) as f32;
            let wander = Vec3::new(
                phase.sin() * tuning.scout_wander_strength,
                0.0,
                phase.cos() * tuning.scout_wander_strength,
            );
            (velocity + wander) * tuning.scout_speed_factor
        }
        Role::Defender { post } => {
            let drift = ground(agent.position).distance(ground(post));
            if drift > ctx.swarm.neighborhood_radius {
                velocity + toward(agent.position, post) * tuning.defender_return_strength
            } else {
                velocity
            }
        }
        Role::Collector => match ctx.resources.nearest(agent.position) {
            Some(resource) => velocity + toward(agent.position, resource) * tuning.collector_attraction,
            None => velocity,
        },
        Role::Passive => velocity,
    }
}

/// Adjust `velocity` for the agent's behavioral state
pub fn apply_state<R: Rng>(
    agent: &Agent,
    velocity: Vec3,
    ctx: &SteeringContext<'_>,
    rng: &mut R,
) -> Vec3 {
    let tuning = ctx.tuning;
    let max_speed = ctx.swarm.max_speed;
    match agent.state.behavior {
        BehaviorState::Exploring => {
            let mut v = velocity + planar_noise(rng, tuning.exploration_noise);
            if let Some(direction) = ctx.exploration.and_then(|g| g.unexplored_direction(agent.position)) {
                v += direction * tuning.exploration_bias;
            }
            v
        }
        BehaviorState::Pursuing { target } => match (ctx.resolve)(target) {
            Some((position, target_velocity)) => {
                let aim = intercept(agent.position, position, target_velocity, max_speed);
                velocity + toward(agent.position, aim) * max_speed
            }
            None => velocity,
        },
        BehaviorState::Evading { threat } => match (ctx.resolve)(threat) {
            Some((position, _)) => {
                let away = toward(position, agent.position) * max_speed * tuning.evasion_speed_factor;
                velocity + away + planar_noise(rng, tuning.evasion_jitter)
            }
            None => velocity,
        },
        BehaviorState::Idle => velocity,
    }
}

/// Linear lead: where the target will be after the time it takes to cover
/// the current gap at `speed`
pub fn intercept(from: Vec3, target: Vec3, target_velocity: Vec3, speed: f32) -> Vec3 {
    let lead = from.distance(target) / speed;
    target + target_velocity * lead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AgentId;
    use crate::swarm::environment::{NoResources, StaticResources};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn no_entities(_: EntityRef) -> Option<(Vec3, Vec3)> {
        None
    }

    fn points(entity: EntityRef) -> Option<(Vec3, Vec3)> {
        match entity {
            EntityRef::Point { position, velocity } => Some((position, velocity)),
            EntityRef::Agent(_) => None,
        }
    }

    fn context<'a>(
        swarm: &'a SwarmConfig,
        tuning: &'a BehaviorTuning,
        resources: &'a dyn ResourceLocator,
        resolve: &'a (dyn Fn(EntityRef) -> Option<(Vec3, Vec3)> + Sync),
    ) -> SteeringContext<'a> {
        SteeringContext {
            now: 0.0,
            swarm,
            tuning,
            resources,
            exploration: None,
            resolve,
        }
    }

    #[test]
    fn test_scout_wander_at_time_zero() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &no_entities);
        let scout = Agent::new(AgentId::new(), Vec3::ZERO, Role::Scout);
        // sin(0) = 0, cos(0) = 1: wander is (0, 0, 0.5), then scaled by 1.5
        let v = apply_role(&scout, Vec3::ZERO, &ctx);
        assert!((v - Vec3::new(0.0, 0.0, 0.75)).length() < 1e-6);
    }

    #[test]
    fn test_defender_returns_only_when_far() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &no_entities);
        let post = Vec3::ZERO;

        let near = Agent::new(AgentId::new(), Vec3::new(5.0, 0.0, 0.0), Role::Defender { post });
        assert_eq!(apply_role(&near, Vec3::ZERO, &ctx), Vec3::ZERO);

        let far = Agent::new(AgentId::new(), Vec3::new(60.0, 0.0, 0.0), Role::Defender { post });
        let v = apply_role(&far, Vec3::ZERO, &ctx);
        assert!((v - Vec3::new(-0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_collector_attraction() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let resources = StaticResources::new(vec![Vec3::new(0.0, 0.0, 20.0)]);
        let ctx = context(&swarm, &tuning, &resources, &no_entities);
        let collector = Agent::new(AgentId::new(), Vec3::ZERO, Role::Collector);
        let v = apply_role(&collector, Vec3::ZERO, &ctx);
        assert!((v - Vec3::new(0.0, 0.0, 0.8)).length() < 1e-6);

        let nothing = context(&swarm, &tuning, &NoResources, &no_entities);
        assert_eq!(apply_role(&collector, Vec3::X, &nothing), Vec3::X);
    }

    #[test]
    fn test_pursuit_leads_moving_target() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &points);
        let target = EntityRef::Point {
            position: Vec3::new(10.0, 0.0, 0.0),
            velocity: Vec3::new(0.0, 0.0, 10.0),
        };
        let hunter = Agent::new(AgentId::new(), Vec3::ZERO, Role::Passive)
            .with_state(BehaviorState::Pursuing { target });
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let v = apply_state(&hunter, Vec3::ZERO, &ctx, &mut rng);
        // Lead is 10 / 10 = 1s, so the aim point is (10, 0, 10)
        let expected = Vec3::new(1.0, 0.0, 1.0).normalize() * swarm.max_speed;
        assert!((v - expected).length() < 1e-4);
    }

    #[test]
    fn test_unresolved_target_is_noop() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &no_entities);
        let lost = Agent::new(AgentId::new(), Vec3::ZERO, Role::Passive).with_state(
            BehaviorState::Evading {
                threat: EntityRef::Agent(AgentId::new()),
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(apply_state(&lost, Vec3::Z, &ctx, &mut rng), Vec3::Z);
    }

    #[test]
    fn test_evasion_moves_away() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning {
            evasion_jitter: 0.0,
            ..BehaviorTuning::default()
        };
        let ctx = context(&swarm, &tuning, &NoResources, &points);
        let prey = Agent::new(AgentId::new(), Vec3::ZERO, Role::Passive).with_state(
            BehaviorState::Evading {
                threat: EntityRef::stationary(Vec3::new(0.0, 0.0, 3.0)),
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let v = apply_state(&prey, Vec3::ZERO, &ctx, &mut rng);
        assert!(v.z < 0.0);
        assert!((v.length() - swarm.max_speed * tuning.evasion_speed_factor).abs() < 1e-4);
    }

    #[test]
    fn test_exploring_noise_is_bounded() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &no_entities);
        let wanderer = Agent::new(AgentId::new(), Vec3::ZERO, Role::Passive);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let v = apply_state(&wanderer, Vec3::ZERO, &ctx, &mut rng);
            assert!(v.x.abs() <= 0.1 && v.z.abs() <= 0.1);
            assert_eq!(v.y, 0.0);
        }
    }

    #[test]
    fn test_idle_is_noop() {
        let swarm = SwarmConfig::default();
        let tuning = BehaviorTuning::default();
        let ctx = context(&swarm, &tuning, &NoResources, &no_entities);
        let idle = Agent::new(AgentId::new(), Vec3::ZERO, Role::Passive).with_state(BehaviorState::Idle);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(apply_state(&idle, Vec3::X, &ctx, &mut rng), Vec3::X);
    }
}
