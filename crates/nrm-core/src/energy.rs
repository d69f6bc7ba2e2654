//! Energy economy: the per-agent metabolism applied once per cycle.
//!
//! Order is fixed: consumption, clamp at zero, death check, then recharge
//! clamped to the cap. Spawning and migration are paid for by the initiating
//! agent at the moment of the action.

use serde::{Deserialize, Serialize};

/// How recharge scales with the agent's current energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RechargeMode {
    /// Add `recharge_rate` every cycle.
    #[default]
    Fixed,
    /// Add `recharge_rate * (1 - energy / cap)`, tapering to zero at the cap.
    CapacityScaled,
}

/// Energy parameters extracted from the swarm configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyEconomy {
    pub energy_cap: f64,
    pub consumption_cost: f64,
    /// Extra consumption per depth level, as a fraction of the base cost.
    pub depth_cost_scale: f64,
    pub recharge_rate: f64,
    pub recharge_mode: RechargeMode,
    pub spawn_cost: f64,
    pub spawn_threshold: f64,
    pub migration_cost: f64,
}

/// Result of one metabolic pass over an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metabolism {
    /// The agent survives with this energy.
    Alive(f64),
    /// Energy reached zero after consumption; the agent must be removed.
    Depleted,
}

impl EnergyEconomy {
    /// Consumption cost for an agent at `depth`.
    pub fn consumption_for(&self, depth: u32) -> f64 {
        self.consumption_cost * (1.0 + self.depth_cost_scale * depth as f64)
    }

    /// Clamp an energy value into `[0, cap]`. Non-finite values become `0.0`.
    pub fn clamp(&self, energy: f64) -> f64 {
        if !energy.is_finite() {
            return 0.0;
        }
        energy.clamp(0.0, self.energy_cap)
    }

    /// Recharge amount for an agent currently holding `energy`.
    pub fn recharge_amount(&self, energy: f64) -> f64 {
        match self.recharge_mode {
            RechargeMode::Fixed => self.recharge_rate,
            RechargeMode::CapacityScaled => {
                if self.energy_cap <= 0.0 {
                    0.0
                } else {
                    self.recharge_rate * (1.0 - energy / self.energy_cap).max(0.0)
                }
            }
        }
    }

    /// Apply consumption, clamp, death check and recharge, in that order.
    pub fn metabolize(&self, energy: f64, depth: u32) -> Metabolism {
        let after_cost = (energy - self.consumption_for(depth)).max(0.0);
        if after_cost <= 0.0 || !after_cost.is_finite() {
            return Metabolism::Depleted;
        }
        let recharged = after_cost + self.recharge_amount(after_cost);
        Metabolism::Alive(self.clamp(recharged))
    }

    /// Energy left after paying for a spawn, or `None` if the agent cannot afford it.
    /// Like migration, a spawn never leaves the parent empty.
    pub fn pay_spawn(&self, energy: f64) -> Option<f64> {
        if energy < self.spawn_threshold || energy <= self.spawn_cost {
            return None;
        }
        Some(self.clamp(energy - self.spawn_cost))
    }

    /// Energy left after paying for a migration. The agent must keep a
    /// strictly positive balance.
    pub fn pay_migration(&self, energy: f64) -> Option<f64> {
        if energy <= self.migration_cost {
            return None;
        }
        Some(self.clamp(energy - self.migration_cost))
    }
}
