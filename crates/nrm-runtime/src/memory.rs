//! Pattern memory: the swarm's capacity-bounded store of emitted patterns.
//!
//! During a cycle patterns are only appended, so the store may transiently
//! exceed its capacity. The bounding pass at the end of the cycle sorts by
//! magnitude and drops the least salient entries regardless of age. The
//! redistribution pass hands the most salient entries back to agents.
//!
//! The capacity holds immediately after `bound` and at no other defined
//! checkpoint.

use nrm_core::agent::Agent;
use nrm_core::config::RedistributionMode;
use nrm_core::pattern::{retain_most_salient, Pattern};
use serde::Serialize;

/// Outcome of one redistribution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Redistribution {
    /// Agents that received a pattern.
    pub recipients: usize,
    /// Distinct top entries that were handed out.
    pub handed_out: usize,
    /// Entries removed from global memory (move mode only).
    pub removed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternMemory {
    entries: Vec<Pattern>,
    capacity: usize,
    total_evicted: u64,
}

impl PatternMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
            total_evicted: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in their current order (insertion order until the next bound).
    pub fn entries(&self) -> &[Pattern] {
        &self.entries
    }

    pub fn total_evicted(&self) -> u64 {
        self.total_evicted
    }

    /// Append a pattern. Never evicts.
    pub fn insert(&mut self, pattern: Pattern) {
        self.entries.push(pattern);
    }

    /// Sort by magnitude (descending) and truncate to capacity.
    ///
    /// Returns the number of evicted entries.
    pub fn bound(&mut self) -> usize {
        let before = self.entries.len();
        retain_most_salient(&mut self.entries, self.capacity);
        let evicted = before - self.entries.len();
        self.total_evicted += evicted as u64;
        evicted
    }

    /// Copy (or move) the `size` most salient entries into agents' private
    /// memories, round-robin: agent `i` receives top entry `i mod k`, where
    /// `k` is `size` capped by the number of stored entries.
    ///
    /// Private memories are not bounded here; that is the caller's job.
    pub fn redistribute<'a, I>(&mut self, agents: I, size: usize, mode: RedistributionMode) -> Redistribution
    where
        I: IntoIterator<Item = &'a mut Agent>,
    {
        self.entries.sort_by(Pattern::by_magnitude_desc);
        let k = size.min(self.entries.len());
        if k == 0 {
            return Redistribution::default();
        }

        let mut recipients = 0usize;
        for (i, agent) in agents.into_iter().enumerate() {
            agent.memory.push(self.entries[i % k]);
            recipients += 1;
        }

        let handed_out = recipients.min(k);
        let removed = match mode {
            RedistributionMode::Copy => 0,
            RedistributionMode::Move => {
                self.entries.drain(..handed_out);
                handed_out
            }
        };

        Redistribution {
            recipients,
            handed_out,
            removed,
        }
    }
}
