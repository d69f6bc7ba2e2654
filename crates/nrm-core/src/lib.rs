//! # NRM Core
//!
//! Leaf types and pure functions for the composition–decomposition kernel.
//!
//! Nothing in this crate draws random numbers or performs I/O. It defines:
//!
//! - **Agent**: the energy-bearing entity with phase, depth and lineage counters
//! - **Pattern**: the salience-scored phase state emitted by transformations
//! - **Energy economy**: consumption, clamping, recharge, spawn and migration costs
//! - **Similarity**: phase signatures and the resonance measures used for pairing
//! - **SwarmConfig**: the flat parameter mapping, validated before a run starts
//! - **Basin classification**: threshold rules over recorded statistics
//!
//! ## Quick Start
//!
//! ```rust
//! use nrm_core::prelude::*;
//!
//! let config = SwarmConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let stats = BasinStatistics::from_series(&[180.0, 190.0, 200.0], 12, 40, 30);
//! let basin = classify(&stats, &BasinThresholds::default());
//! assert_eq!(basin, Basin::A);
//! ```

pub mod agent;
pub mod basin;
pub mod config;
pub mod energy;
pub mod error;
pub mod pattern;
pub mod prelude;
pub mod similarity;
pub mod types;
