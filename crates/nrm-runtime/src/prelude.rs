//! NRM Runtime Prelude: convenient imports for common usage.
//!
//! ```rust
//! use nrm_runtime::prelude::*;
//! ```

// Re-export swarm
pub use crate::swarm::Swarm;
pub use crate::population::Population;
pub use crate::memory::{PatternMemory, Redistribution};

// Re-export engines
pub use crate::composition::{
    pairing_policy, AdjacentPairing, FirstMatchPairing, Pairing, PairingPolicy,
};

// Re-export metrics and events
pub use crate::metrics::{statistics_from_summaries, CycleCounters, CycleSummary, RunningBasinStats};
pub use crate::events::{CreationCause, RemovalCause, SwarmEvent, TimedEvent};

// Re-export experiment driver
pub use crate::experiment::{sweep, Experiment, ExperimentConfig, RunRecord};
pub use crate::summary::{RunId, RunSummary, Termination};
pub use crate::event_log::{read_jsonl, EventLog, EventRecord, JsonlEventLog, MemoryEventLog};

// Re-export SQLite event log when feature is enabled
#[cfg(feature = "sqlite")]
pub use crate::sqlite_log::SqliteEventLog;

// Re-export from core
pub use nrm_core::prelude::*;
