//! Experiment driver: steps one swarm to completion and summarizes it.
//!
//! Each run owns its swarm, its PRNG stream and its event log destination,
//! so runs for different seeds or parameter points never share mutable
//! state.
//!
//! # Example
//!
//! ```rust
//! use nrm_runtime::experiment::{Experiment, ExperimentConfig};
//! use nrm_core::config::SwarmConfig;
//!
//! let config = ExperimentConfig {
//!     swarm: SwarmConfig::single_population(),
//!     cycles: 50,
//!     ..ExperimentConfig::default()
//! };
//! let record = Experiment::new(config).sample_every(10).run().unwrap();
//! assert_eq!(record.samples.len(), 5);
//! ```

use crate::composition::PairingPolicy;
use crate::event_log::EventLog;
use crate::metrics::CycleSummary;
use crate::summary::{RunId, RunSummary, Termination};
use crate::swarm::Swarm;
use nrm_core::basin::BasinThresholds;
use nrm_core::config::SwarmConfig;
use nrm_core::error::{NrmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Everything one run needs besides its output destinations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    pub swarm: SwarmConfig,
    /// Maximum number of cycles to run.
    pub cycles: u64,
    /// Keep every n-th cycle summary.
    pub sample_every: u64,
    pub basin: BasinThresholds,
    /// Classify over the trailing window only; `None` covers the whole run.
    pub basin_window: Option<usize>,
    /// Attach the running basin label to every sampled summary.
    pub label_samples: bool,
    pub stop_on_extinction: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            swarm: SwarmConfig::default(),
            cycles: 3000,
            sample_every: 1,
            basin: BasinThresholds::default(),
            basin_window: None,
            label_samples: false,
            stop_on_extinction: true,
        }
    }
}

impl ExperimentConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.swarm.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_every == 0 {
            return Err(NrmError::invalid_config(
                "sample_every",
                self.sample_every,
                "must be at least 1",
            ));
        }
        if self.basin_window == Some(0) {
            return Err(NrmError::invalid_config(
                "basin_window",
                0,
                "an empty window has no statistics",
            ));
        }
        self.swarm.validate()
    }
}

/// The outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub summary: RunSummary,
    pub samples: Vec<CycleSummary>,
}

/// Builder and driver for a single run.
pub struct Experiment<'a> {
    config: ExperimentConfig,
    run_id: RunId,
    event_log: Option<&'a mut dyn EventLog>,
    observer: Option<&'a mut dyn FnMut(&CycleSummary)>,
    pairing: Option<Box<dyn PairingPolicy>>,
}

impl<'a> Experiment<'a> {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            run_id: RunId::new(),
            event_log: None,
            observer: None,
            pairing: None,
        }
    }

    /// Use a fixed run id instead of a fresh one.
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Send every swarm event to `log`. Event capture is on exactly when a log is attached.
    pub fn with_event_log(mut self, log: &'a mut dyn EventLog) -> Self {
        self.event_log = Some(log);
        self
    }

    /// Call `observer` with every cycle summary, sampled or not.
    pub fn with_observer(mut self, observer: &'a mut dyn FnMut(&CycleSummary)) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_pairing_policy(mut self, policy: Box<dyn PairingPolicy>) -> Self {
        self.pairing = Some(policy);
        self
    }

    pub fn sample_every(mut self, every: u64) -> Self {
        self.config.sample_every = every;
        self
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Step the swarm to completion or extinction.
    pub fn run(self) -> Result<RunRecord> {
        let Experiment {
            mut config,
            run_id,
            mut event_log,
            mut observer,
            pairing,
        } = self;
        config.validate()?;
        // events are only buffered when something drains them
        config.swarm.capture_events = event_log.is_some();

        let started = Instant::now();
        let mut swarm = if config.label_samples {
            Swarm::new(config.swarm.clone())?.with_incremental_basin(config.basin, config.basin_window)
        } else {
            Swarm::new(config.swarm.clone())?.with_basin_window(config.basin_window)
        };
        if let Some(policy) = pairing {
            swarm = swarm.with_pairing_policy(policy);
        }

        info!(
            %run_id,
            seed = config.swarm.seed,
            cycles = config.cycles,
            populations = config.swarm.num_populations,
            agents = swarm.agent_count(),
            "run started"
        );

        if let Some(log) = event_log.as_deref_mut() {
            log.append(run_id, &swarm.drain_events())?;
        }

        let mut samples = Vec::new();
        let mut termination = Termination::Completed;
        for _ in 0..config.cycles {
            let summary = swarm.step();
            if let Some(observe) = observer.as_deref_mut() {
                observe(&summary);
            }

            if let Some(log) = event_log.as_deref_mut() {
                let events = swarm.drain_events();
                if !events.is_empty() {
                    log.append(run_id, &events)?;
                }
            }

            let sampled = summary.cycle % config.sample_every == 0;
            let extinct = summary.is_extinct() && termination == Termination::Completed;
            if extinct {
                termination = Termination::Extinct {
                    cycle: summary.cycle,
                };
                info!(%run_id, cycle = summary.cycle, "population extinct");
            }

            if sampled || (extinct && config.stop_on_extinction) {
                samples.push(summary);
            }
            if extinct && config.stop_on_extinction {
                break;
            }
        }

        if let Some(log) = event_log.as_deref_mut() {
            log.flush()?;
        }

        let statistics = swarm.basin_statistics();
        let basin = swarm.classify(&config.basin);
        let summary = RunSummary {
            run_id,
            seed: config.swarm.seed,
            config: config.swarm.clone(),
            thresholds: config.basin,
            basin_window: swarm.basin_window(),
            cycles_run: swarm.tick(),
            termination,
            final_population: swarm.agent_count(),
            final_energy: swarm.total_energy(),
            final_mean_energy: swarm.mean_energy(),
            max_depth: swarm.agents().map(|a| a.depth).max().unwrap_or(0),
            memory_len: swarm.memory().len(),
            totals: swarm.totals(),
            statistics,
            basin,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            %run_id,
            cycles = summary.cycles_run,
            population = summary.final_population,
            mean_population = statistics.mean_population,
            cv_percent = statistics.cv_percent,
            %basin,
            "run finished"
        );

        Ok(RunRecord { summary, samples })
    }
}

/// Run one independent experiment per seed, in order.
pub fn sweep(config: &ExperimentConfig, seeds: &[u64]) -> Result<Vec<RunRecord>> {
    seeds
        .iter()
        .map(|&seed| Experiment::new(config.clone().with_seed(seed)).run())
        .collect()
}
