//! Configuration management for the NRM CLI.

use anyhow::{Context, Result};
use nrm::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// NRM project configuration, read from `nrm.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub swarm: SwarmConfig,
    #[serde(default)]
    pub basin: BasinThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_cycles")]
    pub cycles: u64,
    #[serde(default = "default_sample_every")]
    pub sample_every: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basin_window: Option<usize>,
    #[serde(default)]
    pub label_samples: bool,
    #[serde(default = "default_stop_on_extinction")]
    pub stop_on_extinction: bool,
    /// Where summaries, samples and event logs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

// Default value functions
fn default_cycles() -> u64 { 3000 }
fn default_sample_every() -> u64 { 10 }
fn default_stop_on_extinction() -> bool { true }
fn default_output_dir() -> PathBuf { PathBuf::from(".nrm/runs") }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            sample_every: default_sample_every(),
            basin_window: None,
            label_samples: false,
            stop_on_extinction: default_stop_on_extinction(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load config from nrm.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// The experiment this project describes, with command-line overrides applied.
    pub fn experiment(&self, cycles: Option<u64>, seed: Option<u64>) -> ExperimentConfig {
        let mut swarm = self.swarm.clone();
        if let Some(seed) = seed {
            swarm.seed = seed;
        }
        ExperimentConfig {
            swarm,
            cycles: cycles.unwrap_or(self.run.cycles),
            sample_every: self.run.sample_every,
            basin: self.basin,
            basin_window: self.run.basin_window,
            label_samples: self.run.label_samples,
            stop_on_extinction: self.run.stop_on_extinction,
        }
    }
}

/// Find nrm.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("nrm.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [run]
            cycles = 500

            [swarm]
            seed = 9
            num_populations = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.run.cycles, 500);
        assert_eq!(config.run.sample_every, 10);
        assert_eq!(config.swarm.seed, 9);
        assert_eq!(config.swarm.initial_energy, 50.0);
        assert_eq!(config.basin, BasinThresholds::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: std::result::Result<Config, _> = toml::from_str("[swarm]\nburst_treshold = 3.0\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn overrides_apply_to_experiment() {
        let config = Config::default();
        let experiment = config.experiment(Some(12), Some(77));
        assert_eq!(experiment.cycles, 12);
        assert_eq!(experiment.swarm.seed, 77);
        assert_eq!(experiment.sample_every, 10);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nrm.toml");
        let config = Config::default();
        config.save(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
