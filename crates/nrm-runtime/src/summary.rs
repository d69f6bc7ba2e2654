//! Run summaries: the final record of one experiment run.
//!
//! A summary carries everything needed to re-label the run under new basin
//! thresholds, so classification can change without re-simulating.

use crate::metrics::CycleCounters;
use nrm_core::basin::{classify, Basin, BasinStatistics, BasinThresholds};
use nrm_core::config::SwarmConfig;
use nrm_core::error::Result;
use nrm_core::types::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Unique identifier for one run, used to namespace its persisted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a run ended. Extinction is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    Completed,
    Extinct { cycle: Tick },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub seed: u64,
    pub config: SwarmConfig,
    pub thresholds: BasinThresholds,
    /// Trailing window the statistics cover; `None` means the whole run.
    #[serde(default)]
    pub basin_window: Option<usize>,
    pub cycles_run: Tick,
    pub termination: Termination,
    pub final_population: usize,
    pub final_energy: f64,
    pub final_mean_energy: f64,
    pub max_depth: u32,
    pub memory_len: usize,
    pub totals: CycleCounters,
    pub statistics: BasinStatistics,
    pub basin: Basin,
    pub duration_ms: u64,
}

impl RunSummary {
    /// Label the recorded statistics under different thresholds.
    pub fn reclassify(&self, thresholds: &BasinThresholds) -> Basin {
        classify(&self.statistics, thresholds)
    }

    /// Replace the thresholds and label in place.
    pub fn relabel(&mut self, thresholds: BasinThresholds) -> Basin {
        self.basin = self.reclassify(&thresholds);
        self.thresholds = thresholds;
        self.basin
    }

    pub fn is_extinct(&self) -> bool {
        matches!(self.termination, Termination::Extinct { .. })
    }

    /// Conventional file name for this run's summary.
    pub fn file_name(&self) -> String {
        format!("{}.summary.json", self.run_id)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrm_core::basin::BasinTier;

    fn sample() -> RunSummary {
        RunSummary {
            run_id: RunId::new(),
            seed: 7,
            config: SwarmConfig::default(),
            thresholds: BasinThresholds::default(),
            basin_window: None,
            cycles_run: 100,
            termination: Termination::Completed,
            final_population: 120,
            final_energy: 6000.0,
            final_mean_energy: 50.0,
            max_depth: 2,
            memory_len: 40,
            totals: CycleCounters::default(),
            statistics: BasinStatistics {
                mean_population: 120.0,
                cv_percent: 10.0,
                composition_rate: 0.4,
                spawn_success: 0.6,
                cycles: 100,
            },
            basin: Basin::B,
            duration_ms: 12,
        }
    }

    #[test]
    fn reclassify_uses_new_thresholds() {
        let summary = sample();
        assert_eq!(summary.reclassify(&BasinThresholds::default()), Basin::B);
        let lenient = BasinThresholds::two_way(BasinTier {
            min_mean_population: 100.0,
            ..BasinThresholds::default().primary
        });
        assert_eq!(summary.reclassify(&lenient), Basin::A);
        // the recorded label is untouched
        assert_eq!(summary.basin, Basin::B);
    }

    #[test]
    fn relabel_updates_record() {
        let mut summary = sample();
        let strict = BasinThresholds::two_way(BasinTier {
            min_mean_population: 1000.0,
            ..BasinThresholds::default().primary
        });
        assert_eq!(summary.relabel(strict), Basin::B);
        assert_eq!(summary.thresholds, strict);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let summary = sample();
        let path = dir.path().join("runs").join(summary.file_name());
        summary.save(&path).unwrap();
        let loaded = RunSummary::load(&path).unwrap();
        assert_eq!(loaded, summary);
    }

    #[test]
    fn extinct_termination_serializes_with_cycle() {
        let json = serde_json::to_string(&Termination::Extinct { cycle: 9 }).unwrap();
        assert_eq!(json, r#"{"kind":"extinct","cycle":9}"#);
    }
}
