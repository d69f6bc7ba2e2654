//! The swarm: owns every population, the pattern memory and the PRNG.
//!
//! One call to [`Swarm::step`] runs a full cycle, in this order:
//! 1. Metabolism and spawning (per population)
//! 2. Composition
//! 3. Decomposition
//! 4. Migration
//! 5. Memory bounding, then redistribution on scheduled cycles
//! 6. Private memory trimming and the cycle summary
//!
//! Every stochastic decision draws from the swarm's single seeded stream in
//! that order, so a seed and a configuration fully determine a run.

use crate::composition::{self, pairing_policy, PairingPolicy};
use crate::context::{StepContext, SwarmRng};
use crate::decomposition;
use crate::events::{CreationCause, SwarmEvent, TimedEvent};
use crate::lifecycle;
use crate::memory::PatternMemory;
use crate::metrics::{per_capita, CycleCounters, CycleSummary, RunningBasinStats};
use crate::migration;
use crate::population::Population;
use nrm_core::agent::Agent;
use nrm_core::basin::{Basin, BasinStatistics, BasinThresholds};
use nrm_core::config::SwarmConfig;
use nrm_core::error::Result;
use nrm_core::types::{AgentId, IdAllocator, PopulationId, Tick};
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use tracing::debug;

pub struct Swarm {
    config: SwarmConfig,
    populations: Vec<Population>,
    memory: PatternMemory,
    rng: SwarmRng,
    ids: IdAllocator,
    tick: Tick,
    totals: CycleCounters,
    pairing: Box<dyn PairingPolicy>,
    basin_stats: RunningBasinStats,
    incremental_basin: Option<BasinThresholds>,
    events: Vec<TimedEvent>,
}

impl Swarm {
    /// Validate the configuration and seed the initial populations.
    pub fn new(config: SwarmConfig) -> Result<Self> {
        config.validate()?;

        let mut swarm = Self {
            populations: (0..config.num_populations)
                .map(|i| Population::new(PopulationId(i)))
                .collect(),
            memory: PatternMemory::new(config.max_memory_size),
            rng: SwarmRng::seed_from_u64(config.seed),
            ids: IdAllocator::new(),
            tick: 0,
            totals: CycleCounters::default(),
            pairing: pairing_policy(config.pairing),
            basin_stats: RunningBasinStats::new(None),
            incremental_basin: None,
            events: Vec::new(),
            config,
        };

        for p in 0..swarm.populations.len() {
            for _ in 0..swarm.config.initial_agents_per_population {
                let phase = swarm.rng.random_range(0.0..TAU);
                swarm.seed_agent(PopulationId(p), swarm.config.initial_energy, 0, phase);
            }
        }
        Ok(swarm)
    }

    /// Replace the pairing policy used by composition.
    pub fn with_pairing_policy(mut self, policy: Box<dyn PairingPolicy>) -> Self {
        self.pairing = policy;
        self
    }

    /// Track basin statistics over the trailing `window` cycles only.
    pub fn with_basin_window(mut self, window: Option<usize>) -> Self {
        self.basin_stats = RunningBasinStats::new(window);
        self
    }

    /// Classify every cycle under `thresholds`, optionally over a trailing window.
    pub fn with_incremental_basin(self, thresholds: BasinThresholds, window: Option<usize>) -> Self {
        let mut swarm = self.with_basin_window(window);
        swarm.incremental_basin = Some(thresholds);
        swarm
    }

    /// Add an agent directly, outside the dynamics.
    ///
    /// Returns `None` if the population does not exist.
    pub fn insert_agent(
        &mut self,
        population: PopulationId,
        energy: f64,
        depth: u32,
        phase: f64,
    ) -> Option<AgentId> {
        if population.index() >= self.populations.len() {
            return None;
        }
        let energy = self.config.energy().clamp(energy);
        Some(self.seed_agent(population, energy, depth, phase))
    }

    fn seed_agent(&mut self, population: PopulationId, energy: f64, depth: u32, phase: f64) -> AgentId {
        let agent = Agent::new(self.ids.next_id(), population, energy, phase, self.tick).with_depth(depth);
        let id = agent.id;
        if self.config.capture_events {
            self.events.push((
                self.tick,
                SwarmEvent::Created {
                    agent: id,
                    population,
                    energy: agent.energy,
                    cause: CreationCause::Initial,
                },
            ));
        }
        self.populations[population.index()].admit(agent);
        id
    }

    /// Run one full cycle and summarize it.
    pub fn step(&mut self) -> CycleSummary {
        self.tick += 1;
        let mut counters = CycleCounters::default();

        {
            let events = if self.config.capture_events {
                Some(&mut self.events)
            } else {
                None
            };
            let mut ctx = StepContext::new(
                &self.config,
                self.tick,
                &mut self.rng,
                &mut self.ids,
                &mut self.memory,
                &mut counters,
                events,
            );
            lifecycle::update_populations(&mut self.populations, &mut ctx);
            composition::compose(&mut self.populations, self.pairing.as_ref(), &mut ctx);
            decomposition::decompose(&mut self.populations, &mut ctx);
            migration::migrate(&mut self.populations, &mut ctx);
        }

        counters.patterns_evicted = self.memory.bound() as u64;

        let interval = self.config.redistribution_interval;
        if interval > 0 && self.tick % interval == 0 {
            let outcome = self.memory.redistribute(
                self.populations.iter_mut().flat_map(|p| p.agents.iter_mut()),
                self.config.redistribution_size(),
                self.config.redistribution_mode,
            );
            debug!(tick = self.tick, recipients = outcome.recipients, removed = outcome.removed, "redistributed");
        }

        let limit = self.config.agent_memory_size;
        for agent in self.populations.iter_mut().flat_map(|p| p.agents.iter_mut()) {
            agent.trim_memory(limit);
        }

        self.totals += counters;
        let mut summary = self.summarize(counters);
        self.basin_stats.record(&summary);
        if let Some(thresholds) = &self.incremental_basin {
            summary.basin = Some(self.basin_stats.classify(thresholds));
        }

        debug!(
            tick = summary.cycle,
            population = summary.population,
            energy = summary.total_energy,
            compositions = counters.compositions,
            decompositions = counters.decompositions,
            migrations = counters.migrations,
            "cycle complete"
        );
        summary
    }

    /// Run `cycles` steps, collecting every summary.
    pub fn run(&mut self, cycles: u64) -> Vec<CycleSummary> {
        (0..cycles).map(|_| self.step()).collect()
    }

    fn summarize(&self, counters: CycleCounters) -> CycleSummary {
        let population = self.agent_count();
        let total_energy = self.total_energy();
        CycleSummary {
            cycle: self.tick,
            population,
            per_population: self.populations.iter().map(Population::len).collect(),
            total_energy,
            mean_energy: per_capita(total_energy, population),
            max_depth: self.populations.iter().map(Population::max_depth).max().unwrap_or(0),
            counters,
            memory_len: self.memory.len(),
            basin: None,
        }
    }

    /// Take the events captured since the last drain.
    pub fn drain_events(&mut self) -> Vec<TimedEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn populations(&self) -> &[Population] {
        &self.populations
    }

    pub fn population(&self, id: PopulationId) -> Option<&Population> {
        self.populations.get(id.index())
    }

    /// Every agent, population by population.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.populations.iter().flat_map(|p| p.agents().iter())
    }

    pub fn agent_count(&self) -> usize {
        self.populations.iter().map(Population::len).sum()
    }

    pub fn total_energy(&self) -> f64 {
        self.populations.iter().map(Population::total_energy).sum()
    }

    /// `0.0` when the swarm is empty.
    pub fn mean_energy(&self) -> f64 {
        per_capita(self.total_energy(), self.agent_count())
    }

    pub fn memory(&self) -> &PatternMemory {
        &self.memory
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Counters summed over every completed cycle.
    pub fn totals(&self) -> CycleCounters {
        self.totals
    }

    pub fn pairing_policy(&self) -> &dyn PairingPolicy {
        self.pairing.as_ref()
    }

    /// All populations are empty.
    pub fn is_extinct(&self) -> bool {
        self.populations.iter().all(Population::is_empty)
    }

    /// Basin inputs over the tracked cycles.
    /// Trailing window the basin statistics cover; `None` is the whole run.
    pub fn basin_window(&self) -> Option<usize> {
        self.basin_stats.window()
    }

    pub fn basin_statistics(&self) -> BasinStatistics {
        self.basin_stats.statistics()
    }

    pub fn classify(&self, thresholds: &BasinThresholds) -> Basin {
        self.basin_stats.classify(thresholds)
    }
}
