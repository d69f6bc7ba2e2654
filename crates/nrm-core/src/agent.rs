//! Agent: the atomic energy-bearing entity.
//!
//! An agent belongs to exactly one population at a time. It is created by
//! spawning (depth 0) or by a composition/decomposition (depth ± 1), and it
//! is destroyed when consumed by a merge, when it bursts, or when its energy
//! runs out.

use crate::pattern::Pattern;
use crate::similarity::{wrap_phase, PhaseSignature};
use crate::types::{AgentId, PopulationId, Tick};
use serde::{Deserialize, Serialize};

/// A single agent in the swarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// The population that currently owns this agent.
    pub population: PopulationId,
    /// Non-negative, bounded above by the configured cap.
    pub energy: f64,
    /// Scalar phase in `[0, 2π)`.
    pub phase: f64,
    /// Hierarchical nesting level.
    pub depth: u32,
    pub compositions: u64,
    pub decompositions: u64,
    pub born_at: Tick,
    /// Private pattern memory, filled by redistribution and inheritance.
    pub memory: Vec<Pattern>,
}

impl Agent {
    /// A fresh depth-0 agent with no lineage.
    pub fn new(id: AgentId, population: PopulationId, energy: f64, phase: f64, born_at: Tick) -> Self {
        Self {
            id,
            population,
            energy: energy.max(0.0),
            phase: wrap_phase(phase),
            depth: 0,
            compositions: 0,
            decompositions: 0,
            born_at,
            memory: Vec::new(),
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// The three-component resonance signature.
    pub fn signature(&self) -> PhaseSignature {
        PhaseSignature::derive(self.energy, self.depth, self.phase)
    }

    pub fn is_depleted(&self) -> bool {
        self.energy <= 0.0
    }

    /// Truncate private memory to `limit`, keeping the most salient entries.
    pub fn trim_memory(&mut self, limit: usize) {
        if self.memory.len() > limit {
            crate::pattern::retain_most_salient(&mut self.memory, limit);
        }
    }
}
