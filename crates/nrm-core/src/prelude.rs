//! NRM Core Prelude: convenient imports for common usage.
//!
//! ```rust
//! use nrm_core::prelude::*;
//! ```

pub use crate::types::{AgentId, IdAllocator, PopulationId, Tick};

pub use crate::agent::Agent;
pub use crate::pattern::{Pattern, PatternOrigin};
pub use crate::similarity::{PhaseSignature, SimilarityMeasure};

pub use crate::energy::{EnergyEconomy, Metabolism, RechargeMode};

pub use crate::config::{
    PairingStrategy, Placement, RedistributionMode, SplitPolicy, SwarmConfig,
};

pub use crate::basin::{
    classify, Basin, BasinScheme, BasinStatistics, BasinThresholds, BasinTier,
};

pub use crate::error::{ConfigError, NrmError, Result};
