//! # NRM Runtime
//!
//! The simulation kernel: swarm stepping, engines and the experiment driver.
//!
//! The swarm owns every population, the pattern memory and a single seeded
//! PRNG. Each step runs metabolism and spawning, composition, decomposition
//! and migration, then bounds the pattern memory and summarizes the cycle.
//! A seed and a configuration fully determine the run.

pub mod composition;
pub mod context;
pub mod decomposition;
pub mod event_log;
pub mod events;
pub mod experiment;
pub mod lifecycle;
pub mod memory;
pub mod metrics;
pub mod migration;
pub mod population;
pub mod prelude;
pub mod summary;
pub mod swarm;

#[cfg(feature = "sqlite")]
pub mod sqlite_log;
