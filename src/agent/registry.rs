//! Authoritative store of agents, keyed by id

use ahash::AHashMap;
use rand::Rng;

use crate::agent::{Agent, SwarmSetup};
use crate::core::error::{Result, SwarmError};
use crate::core::types::AgentId;

/// Owns every agent. Insertion order is stable and doubles as the agent's
/// dense index for per-tick bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    index: AHashMap<AgentId, usize>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, agent: Agent) -> Result<AgentId> {
        let id = agent.id();
        if self.index.contains_key(&id) {
            return Err(SwarmError::DuplicateAgent(id));
        }
        self.index.insert(id, self.agents.len());
        self.agents.push(agent);
        Ok(id)
    }

    /// Create agents from a role table: `floor(count * distribution)` per role,
    /// each at a uniform position in the spawn area.
    pub fn spawn_population<R: Rng>(&mut self, setup: &SwarmSetup, rng: &mut R) -> Result<Vec<AgentId>> {
        setup.validate()?;

        let mut spawned = Vec::with_capacity(setup.planned_count());
        for profile in &setup.roles {
            let role = profile.role()?;
            for _ in 0..profile.count(setup.agent_count) {
                let agent = Agent::new(AgentId::from_rng(rng), setup.spawn_area.sample(rng), role)
                    .with_attributes(profile.attributes.clone());
                spawned.push(self.add(agent)?);
            }
        }

        tracing::info!(
            "Spawned {} agents across {} roles",
            spawned.len(),
            setup.roles.len()
        );
        Ok(spawned)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).map(|&i| &self.agents[i])
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.index.get(&id).map(|&i| &mut self.agents[i])
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.iter().map(|a| a.id())
    }

    /// Dense view in insertion order
    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable dense view. Ids are private to `Agent`, so the index stays valid.
    pub fn as_mut_slice(&mut self) -> &mut [Agent] {
        &mut self.agents
    }
}
