//! Events emitted by the swarm while it steps.
//!
//! Events are a write-only side channel: the swarm records them when
//! `capture_events` is on and never reads them back.

use nrm_core::types::{AgentId, PopulationId, Tick};
use serde::{Deserialize, Serialize};

/// Why an agent came into existence outside a composition or burst.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreationCause {
    /// Seeded when the swarm was constructed or by a driver.
    Initial,
    /// Spawned by another agent.
    Spawn { parent: AgentId },
}

/// Why an agent was removed without being transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Energy reached zero.
    Depleted,
}

/// Event emitted by the swarm during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwarmEvent {
    /// An agent was created at depth 0.
    Created {
        agent: AgentId,
        population: PopulationId,
        energy: f64,
        cause: CreationCause,
    },
    /// Two agents were consumed into one deeper agent.
    Merged {
        first: AgentId,
        second: AgentId,
        into: AgentId,
        from: PopulationId,
        to: PopulationId,
        depth: u32,
        energy: f64,
        similarity: f64,
    },
    /// An agent burst into two shallower agents.
    Burst {
        parent: AgentId,
        children: [AgentId; 2],
        from: PopulationId,
        to: PopulationId,
        parent_energy: f64,
        child_energy: [f64; 2],
    },
    /// An agent moved between sibling populations.
    Migrated {
        agent: AgentId,
        from: PopulationId,
        to: PopulationId,
    },
    /// An agent was removed from its population.
    Removed {
        agent: AgentId,
        population: PopulationId,
        cause: RemovalCause,
    },
}

impl SwarmEvent {
    /// Short name used as the event kind in persisted logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SwarmEvent::Created { .. } => "created",
            SwarmEvent::Merged { .. } => "merged",
            SwarmEvent::Burst { .. } => "burst",
            SwarmEvent::Migrated { .. } => "migrated",
            SwarmEvent::Removed { .. } => "removed",
        }
    }
}

/// An event stamped with the cycle it happened in.
pub type TimedEvent = (Tick, SwarmEvent);
