//! The per-step context handed to every engine.
//!
//! The swarm owns all mutable run state. During a step it lends the pieces
//! the engines need through one explicit context instead of any global
//! state, so each engine function states exactly what it touches.

use crate::events::{SwarmEvent, TimedEvent};
use crate::memory::PatternMemory;
use crate::metrics::CycleCounters;
use nrm_core::config::SwarmConfig;
use nrm_core::types::{IdAllocator, Tick};
use rand_chacha::ChaCha8Rng;

/// The single PRNG stream of a run.
pub type SwarmRng = ChaCha8Rng;

pub struct StepContext<'a> {
    pub config: &'a SwarmConfig,
    /// The cycle being computed.
    pub tick: Tick,
    pub rng: &'a mut SwarmRng,
    pub ids: &'a mut IdAllocator,
    pub memory: &'a mut PatternMemory,
    pub counters: &'a mut CycleCounters,
    events: Option<&'a mut Vec<TimedEvent>>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        config: &'a SwarmConfig,
        tick: Tick,
        rng: &'a mut SwarmRng,
        ids: &'a mut IdAllocator,
        memory: &'a mut PatternMemory,
        counters: &'a mut CycleCounters,
        events: Option<&'a mut Vec<TimedEvent>>,
    ) -> Self {
        Self {
            config,
            tick,
            rng,
            ids,
            memory,
            counters,
            events,
        }
    }

    /// Record an event if capture is enabled. The closure is not run otherwise.
    pub fn record(&mut self, event: impl FnOnce() -> SwarmEvent) {
        if let Some(events) = &mut self.events {
            events.push((self.tick, event()));
        }
    }
}

/// Owned run state for exercising engines in isolation.
#[cfg(test)]
pub(crate) struct TestBed {
    pub config: SwarmConfig,
    pub rng: SwarmRng,
    pub ids: IdAllocator,
    pub memory: PatternMemory,
    pub counters: CycleCounters,
    pub events: Vec<TimedEvent>,
}

#[cfg(test)]
impl TestBed {
    pub fn new(config: SwarmConfig) -> Self {
        use rand::SeedableRng;
        let memory = PatternMemory::new(config.max_memory_size);
        Self {
            rng: SwarmRng::seed_from_u64(config.seed),
            config,
            // leave room below for hand-made agents
            ids: {
                let mut ids = IdAllocator::new();
                for _ in 0..1000 {
                    ids.next_id();
                }
                ids
            },
            memory,
            counters: CycleCounters::default(),
            events: Vec::new(),
        }
    }

    pub fn ctx(&mut self) -> StepContext<'_> {
        StepContext::new(
            &self.config,
            1,
            &mut self.rng,
            &mut self.ids,
            &mut self.memory,
            &mut self.counters,
            Some(&mut self.events),
        )
    }
}
