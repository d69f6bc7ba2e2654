//! Population: an ordered collection of agents owned by the swarm.
//!
//! Order does not affect the dynamics, but it fixes the iteration sequence
//! so that a seeded run is reproducible.

use crate::metrics::per_capita;
use nrm_core::agent::Agent;
use nrm_core::types::{AgentId, PopulationId};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Population {
    pub id: PopulationId,
    pub(crate) agents: Vec<Agent>,
}

impl Population {
    pub fn new(id: PopulationId) -> Self {
        Self {
            id,
            agents: Vec::new(),
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn total_energy(&self) -> f64 {
        self.agents.iter().map(|a| a.energy).sum()
    }

    /// Mean energy per agent; `0.0` for an empty population.
    pub fn mean_energy(&self) -> f64 {
        per_capita(self.total_energy(), self.agents.len())
    }

    pub fn max_depth(&self) -> u32 {
        self.agents.iter().map(|a| a.depth).max().unwrap_or(0)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Append an agent, taking ownership of it.
    pub(crate) fn admit(&mut self, mut agent: Agent) {
        agent.population = self.id;
        self.agents.push(agent);
    }

    /// Remove the agent at `index`, preserving the order of the rest.
    pub(crate) fn remove_at(&mut self, index: usize) -> Agent {
        self.agents.remove(index)
    }

    /// Remove every agent whose index is flagged, preserving order.
    pub(crate) fn remove_flagged(&mut self, flags: &[bool]) -> Vec<Agent> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.agents.len());
        for (agent, &flag) in self.agents.drain(..).zip(flags.iter()) {
            if flag {
                removed.push(agent);
            } else {
                kept.push(agent);
            }
        }
        self.agents = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population_with(energies: &[f64]) -> Population {
        let mut pop = Population::new(PopulationId(0));
        for (i, &e) in energies.iter().enumerate() {
            pop.admit(Agent::new(AgentId(i as u64), PopulationId(9), e, 0.0, 0));
        }
        pop
    }

    #[test]
    fn admit_takes_ownership() {
        let pop = population_with(&[10.0]);
        assert_eq!(pop.agents()[0].population, PopulationId(0));
    }

    #[test]
    fn empty_population_has_zero_mean() {
        let pop = Population::new(PopulationId(1));
        assert_eq!(pop.mean_energy(), 0.0);
        assert_eq!(pop.max_depth(), 0);
        assert!(pop.is_empty());
    }

    #[test]
    fn remove_flagged_preserves_order() {
        let mut pop = population_with(&[1.0, 2.0, 3.0, 4.0]);
        let removed = pop.remove_flagged(&[false, true, false, true]);
        let kept: Vec<u64> = pop.agents().iter().map(|a| a.id.0).collect();
        let gone: Vec<u64> = removed.iter().map(|a| a.id.0).collect();
        assert_eq!(kept, vec![0, 2]);
        assert_eq!(gone, vec![1, 3]);
        assert_eq!(pop.total_energy(), 4.0);
    }
}
