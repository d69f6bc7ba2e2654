//! Swarm configuration.
//!
//! A flat mapping of named parameters. Every field has a default, so a
//! config file only needs the keys it changes; unknown keys are rejected so
//! that a misspelt parameter cannot silently fall back to its default.

use crate::energy::{EnergyEconomy, RechargeMode};
use crate::error::{NrmError, Result};
use crate::similarity::SimilarityMeasure;
use serde::{Deserialize, Serialize};

/// Which greedy pairing policy the composition engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStrategy {
    /// Compare each unpaired agent with the next unpaired one only.
    #[default]
    Adjacent,
    /// Scan forward for the first unpaired agent above the threshold.
    FirstMatch,
}

/// Where the products of composition and decomposition are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Products stay in the population they came from.
    #[default]
    SamePopulation,
    /// Population `i` holds depth level `i`; the last population takes every deeper level.
    DepthLevel,
}

/// How a burst divides the parent's energy between its two children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitPolicy {
    /// Each child receives a fraction; whatever the fractions leave is lost.
    Dissipative { left: f64, right: f64 },
    /// Each child receives exactly half.
    Conserving,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        SplitPolicy::Dissipative {
            left: 0.45,
            right: 0.45,
        }
    }
}

impl SplitPolicy {
    /// The `(left, right)` energy fractions.
    pub fn fractions(&self) -> (f64, f64) {
        match *self {
            SplitPolicy::Dissipative { left, right } => (left, right),
            SplitPolicy::Conserving => (0.5, 0.5),
        }
    }
}

/// Whether redistribution copies patterns out of global memory or moves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionMode {
    #[default]
    Copy,
    Move,
}

/// All tunable parameters of one swarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwarmConfig {
    /// Seed for the swarm's single PRNG stream.
    pub seed: u64,
    pub num_populations: usize,
    pub initial_agents_per_population: usize,
    pub initial_energy: f64,

    // Energy economy
    pub energy_cap: f64,
    pub consumption_cost: f64,
    pub depth_cost_scale: f64,
    pub recharge_rate: f64,
    pub recharge_mode: RechargeMode,

    // Spawning
    /// Per-agent, per-cycle spawn probability.
    pub spawn_rate: f64,
    pub spawn_cost: f64,
    pub spawn_threshold: f64,
    /// Maximum agents per population; spawns beyond it fail.
    pub agent_cap: usize,

    // Composition
    pub resonance_threshold: f64,
    pub similarity: SimilarityMeasure,
    pub pairing: PairingStrategy,
    pub shuffle_pairing: bool,
    /// Fraction of the pair's summed energy the merged agent keeps.
    pub merge_factor: f64,
    pub placement: Placement,

    // Decomposition
    pub burst_threshold: f64,
    /// Shallowest depth that may burst. Always at least 1.
    pub min_burst_depth: u32,
    pub split: SplitPolicy,

    // Pattern memory
    pub max_memory_size: usize,
    pub redistribution_fraction: f64,
    /// Redistribute every this many cycles; 0 disables redistribution.
    pub redistribution_interval: u64,
    pub redistribution_mode: RedistributionMode,
    /// Bound applied to each agent's private memory after redistribution.
    pub agent_memory_size: usize,

    // Migration
    /// Fraction of all agents that attempt to migrate each cycle.
    pub migration_rate: f64,
    pub migration_cost: f64,
    /// Minimum total energy a source population needs to send a migrant.
    pub migrate_threshold: f64,

    /// Maximum random phase change per cycle.
    pub phase_drift: f64,
    /// Record per-agent events on every step.
    pub capture_events: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_populations: 10,
            initial_agents_per_population: 20,
            initial_energy: 50.0,
            energy_cap: 100.0,
            consumption_cost: 0.5,
            depth_cost_scale: 0.25,
            recharge_rate: 1.0,
            recharge_mode: RechargeMode::Fixed,
            spawn_rate: 0.025,
            spawn_cost: 10.0,
            spawn_threshold: 20.0,
            agent_cap: 200,
            resonance_threshold: 0.95,
            similarity: SimilarityMeasure::Cosine,
            pairing: PairingStrategy::Adjacent,
            shuffle_pairing: true,
            merge_factor: 0.9,
            placement: Placement::SamePopulation,
            burst_threshold: 80.0,
            min_burst_depth: 1,
            split: SplitPolicy::default(),
            max_memory_size: 1000,
            redistribution_fraction: 0.1,
            redistribution_interval: 10,
            redistribution_mode: RedistributionMode::Copy,
            agent_memory_size: 16,
            migration_rate: 0.005,
            migration_cost: 1.0,
            migrate_threshold: 10.0,
            phase_drift: 0.05,
            capture_events: false,
        }
    }
}

impl SwarmConfig {
    /// A single-population configuration with migration disabled.
    pub fn single_population() -> Self {
        Self {
            num_populations: 1,
            migration_rate: 0.0,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Energy parameters as a standalone economy.
    pub fn energy(&self) -> EnergyEconomy {
        EnergyEconomy {
            energy_cap: self.energy_cap,
            consumption_cost: self.consumption_cost,
            depth_cost_scale: self.depth_cost_scale,
            recharge_rate: self.recharge_rate,
            recharge_mode: self.recharge_mode,
            spawn_cost: self.spawn_cost,
            spawn_threshold: self.spawn_threshold,
            migration_cost: self.migration_cost,
        }
    }

    /// Number of top patterns handed out per redistribution.
    pub fn redistribution_size(&self) -> usize {
        (self.max_memory_size as f64 * self.redistribution_fraction).floor() as usize
    }

    /// Reject physically meaningless parameters.
    pub fn validate(&self) -> Result<()> {
        if self.num_populations == 0 {
            return Err(NrmError::invalid_config(
                "num_populations",
                self.num_populations,
                "at least one population is required",
            ));
        }

        let non_negative = [
            ("energy_cap", self.energy_cap),
            ("consumption_cost", self.consumption_cost),
            ("depth_cost_scale", self.depth_cost_scale),
            ("recharge_rate", self.recharge_rate),
            ("spawn_cost", self.spawn_cost),
            ("spawn_threshold", self.spawn_threshold),
            ("migration_cost", self.migration_cost),
            ("migrate_threshold", self.migrate_threshold),
            ("phase_drift", self.phase_drift),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(NrmError::invalid_config(field, value, "must be finite and non-negative"));
            }
        }

        if self.energy_cap == 0.0 {
            return Err(NrmError::invalid_config("energy_cap", self.energy_cap, "must be positive"));
        }
        if !(self.initial_energy > 0.0 && self.initial_energy <= self.energy_cap) {
            return Err(NrmError::out_of_range(
                "initial_energy",
                0.0,
                self.energy_cap,
                self.initial_energy,
            ));
        }
        if !(self.burst_threshold.is_finite() && self.burst_threshold > 0.0) {
            return Err(NrmError::invalid_config(
                "burst_threshold",
                self.burst_threshold,
                "must be finite and positive",
            ));
        }

        let unit_interval = [
            ("spawn_rate", self.spawn_rate),
            ("migration_rate", self.migration_rate),
            ("redistribution_fraction", self.redistribution_fraction),
        ];
        for (field, value) in unit_interval {
            if !(0.0..=1.0).contains(&value) {
                return Err(NrmError::out_of_range(field, 0.0, 1.0, value));
            }
        }

        if !(-1.0..=1.0).contains(&self.resonance_threshold) {
            return Err(NrmError::out_of_range(
                "resonance_threshold",
                -1.0,
                1.0,
                self.resonance_threshold,
            ));
        }
        if !(self.merge_factor > 0.0 && self.merge_factor <= 1.0) {
            return Err(NrmError::out_of_range("merge_factor", 0.0, 1.0, self.merge_factor));
        }
        if self.min_burst_depth == 0 {
            return Err(NrmError::invalid_config(
                "min_burst_depth",
                self.min_burst_depth,
                "depth 0 agents cannot burst",
            ));
        }

        let (left, right) = self.split.fractions();
        for (field, value) in [("split.left", left), ("split.right", right)] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(NrmError::out_of_range(field, 0.0, 1.0, value));
            }
        }
        if left + right > 1.0 + 1e-12 {
            return Err(NrmError::invalid_config(
                "split",
                format!("{left} + {right}"),
                "fractions must not create energy",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SwarmConfig::default().validate().is_ok());
        assert!(SwarmConfig::single_population().validate().is_ok());
    }

    #[test]
    fn negative_energy_cap_is_rejected() {
        let config = SwarmConfig {
            energy_cap: -1.0,
            ..SwarmConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("energy_cap"));
    }

    #[test]
    fn probabilities_must_be_in_unit_interval() {
        let config = SwarmConfig {
            spawn_rate: 1.5,
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn energy_creating_split_is_rejected() {
        let config = SwarmConfig {
            split: SplitPolicy::Dissipative { left: 0.7, right: 0.6 },
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());

        let conserving = SwarmConfig {
            split: SplitPolicy::Conserving,
            ..SwarmConfig::default()
        };
        assert!(conserving.validate().is_ok());
    }

    #[test]
    fn zero_burst_depth_is_rejected() {
        let config = SwarmConfig {
            min_burst_depth: 0,
            ..SwarmConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn redistribution_size_is_fraction_of_capacity() {
        let config = SwarmConfig::default();
        assert_eq!(config.redistribution_size(), 100);
    }

    #[test]
    fn absent_keys_use_defaults() {
        let config: SwarmConfig =
            serde_json::from_str(r#"{"seed": 7, "burst_threshold": 40.0}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.burst_threshold, 40.0);
        assert_eq!(config.max_memory_size, 1000);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: std::result::Result<SwarmConfig, _> =
            serde_json::from_str(r#"{"burst_treshold": 40.0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn split_policy_is_tagged() {
        let config: SwarmConfig =
            serde_json::from_str(r#"{"split": {"kind": "conserving"}}"#).unwrap();
        assert_eq!(config.split, SplitPolicy::Conserving);
    }
}
