//! # NRM
//!
//! A seeded simulation kernel for composition–decomposition agent populations.
//!
//! Energy-bearing agents live in sibling populations. Each cycle they pay a
//! metabolic cost and recharge, occasionally spawn, merge with resonant
//! partners into deeper agents, burst back into shallower ones when they
//! hold too much energy, and migrate between populations. The aggregate
//! behaviour of a run is classified into discrete basins by threshold rules
//! that can be re-applied to recorded runs without re-simulating.
//!
//! ## Quick Start
//!
//! ```rust
//! use nrm::prelude::*;
//!
//! let config = SwarmConfig {
//!     num_populations: 2,
//!     initial_agents_per_population: 10,
//!     ..SwarmConfig::default()
//! };
//! let mut swarm = Swarm::new(config).unwrap();
//!
//! for summary in swarm.run(100) {
//!     assert!(summary.memory_len <= swarm.memory().capacity());
//! }
//!
//! let basin = swarm.classify(&BasinThresholds::default());
//! println!("{} agents, basin {}", swarm.agent_count(), basin);
//! ```
//!
//! ## Architecture
//!
//! - [`nrm_core`] - Agents, patterns, energy economy, configuration, basin rules
//! - [`nrm_runtime`] - Swarm stepping, engines, pattern memory, experiment driver
//!
//! ## Experiments
//!
//! ```rust
//! use nrm::prelude::*;
//!
//! let config = ExperimentConfig {
//!     swarm: SwarmConfig::single_population(),
//!     cycles: 200,
//!     ..ExperimentConfig::default()
//! };
//! let records = sweep(&config, &[1, 2, 3]).unwrap();
//!
//! // Relabel a recorded run under stricter thresholds.
//! let strict = BasinThresholds::two_way(BasinTier {
//!     min_mean_population: 1000.0,
//!     ..BasinTier::default()
//! });
//! assert_eq!(records[0].summary.reclassify(&strict), Basin::B);
//! ```

// Re-export all subcrates
pub use nrm_core as core;
pub use nrm_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust
/// use nrm::prelude::*;
/// ```
pub mod prelude {
    pub use nrm_runtime::prelude::*;
}
