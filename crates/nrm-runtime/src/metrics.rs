//! Per-cycle summaries and the running statistics the basin classifier reads.

use nrm_core::basin::{classify, Basin, BasinStatistics, BasinThresholds};
use nrm_core::types::Tick;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::AddAssign;

/// Event counts accumulated during one cycle (or a whole run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CycleCounters {
    pub compositions: u64,
    pub decompositions: u64,
    pub migrations: u64,
    pub failed_migrations: u64,
    pub spawn_attempts: u64,
    pub spawns: u64,
    pub failed_spawns: u64,
    pub deaths: u64,
    pub patterns_emitted: u64,
    pub patterns_evicted: u64,
}

impl AddAssign for CycleCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.compositions += rhs.compositions;
        self.decompositions += rhs.decompositions;
        self.migrations += rhs.migrations;
        self.failed_migrations += rhs.failed_migrations;
        self.spawn_attempts += rhs.spawn_attempts;
        self.spawns += rhs.spawns;
        self.failed_spawns += rhs.failed_spawns;
        self.deaths += rhs.deaths;
        self.patterns_emitted += rhs.patterns_emitted;
        self.patterns_evicted += rhs.patterns_evicted;
    }
}

/// Record produced by every call to `Swarm::step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle: Tick,
    /// Total agents across all populations.
    pub population: usize,
    pub per_population: Vec<usize>,
    pub total_energy: f64,
    /// `0.0` when the swarm is empty.
    pub mean_energy: f64,
    pub max_depth: u32,
    /// Events of this cycle only.
    pub counters: CycleCounters,
    pub memory_len: usize,
    /// Present when the swarm classifies incrementally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basin: Option<Basin>,
}

impl CycleSummary {
    pub fn is_extinct(&self) -> bool {
        self.population == 0
    }
}

/// Divide, yielding `0.0` for an empty denominator.
pub fn per_capita(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    population: f64,
    compositions: u64,
    spawn_attempts: u64,
    spawns: u64,
}

/// Running inputs for basin classification, optionally over a sliding window.
#[derive(Debug, Clone)]
pub struct RunningBasinStats {
    window: Option<usize>,
    samples: VecDeque<Sample>,
}

impl RunningBasinStats {
    /// Track every cycle (`None`) or only the most recent `window` cycles.
    pub fn new(window: Option<usize>) -> Self {
        Self {
            window,
            samples: VecDeque::new(),
        }
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    pub fn record(&mut self, summary: &CycleSummary) {
        self.samples.push_back(Sample {
            population: summary.population as f64,
            compositions: summary.counters.compositions,
            spawn_attempts: summary.counters.spawn_attempts,
            spawns: summary.counters.spawns,
        });
        if let Some(window) = self.window {
            while self.samples.len() > window {
                self.samples.pop_front();
            }
        }
    }

    pub fn statistics(&self) -> BasinStatistics {
        let populations: Vec<f64> = self.samples.iter().map(|s| s.population).collect();
        let compositions = self.samples.iter().map(|s| s.compositions).sum();
        let attempts = self.samples.iter().map(|s| s.spawn_attempts).sum();
        let spawns = self.samples.iter().map(|s| s.spawns).sum();
        BasinStatistics::from_series(&populations, compositions, attempts, spawns)
    }

    pub fn classify(&self, thresholds: &BasinThresholds) -> Basin {
        classify(&self.statistics(), thresholds)
    }
}

/// Basin statistics over recorded summaries, optionally only the trailing `window`.
///
/// This is the recompute-from-log path: it needs nothing but the summaries.
pub fn statistics_from_summaries(summaries: &[CycleSummary], window: Option<usize>) -> BasinStatistics {
    let mut running = RunningBasinStats::new(window);
    for summary in summaries {
        running.record(summary);
    }
    running.statistics()
}
