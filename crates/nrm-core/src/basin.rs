//! Basin classification: a discrete regime label for a run.
//!
//! The classifier is a pure function of recorded summary statistics and a
//! set of thresholds. Thresholds are calibrated per experiment and are not
//! derived from the dynamics, so they are configuration: a recorded run can
//! be re-labelled under new thresholds without re-simulating it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A qualitative regime label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Basin {
    A,
    B,
    C,
}

impl fmt::Display for Basin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Basin::A => "A",
            Basin::B => "B",
            Basin::C => "C",
        };
        f.write_str(label)
    }
}

/// Aggregate statistics the classifier reads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BasinStatistics {
    /// Mean total population over the observed cycles.
    pub mean_population: f64,
    /// Coefficient of variation of the population, in percent.
    pub cv_percent: f64,
    /// Compositions per cycle.
    pub composition_rate: f64,
    /// Successful spawns over attempted spawns.
    pub spawn_success: f64,
    /// Number of cycles the statistics cover.
    pub cycles: u64,
}

impl BasinStatistics {
    /// Compute statistics from a population series and event totals.
    ///
    /// Every per-capita or per-cycle quantity with a zero denominator is `0.0`.
    pub fn from_series(
        populations: &[f64],
        compositions: u64,
        spawn_attempts: u64,
        spawn_successes: u64,
    ) -> Self {
        let cycles = populations.len() as u64;
        let (mean, std_dev) = mean_and_std(populations);
        let cv_percent = if mean > 0.0 { std_dev / mean * 100.0 } else { 0.0 };
        let composition_rate = if cycles > 0 {
            compositions as f64 / cycles as f64
        } else {
            0.0
        };
        let spawn_success = if spawn_attempts > 0 {
            spawn_successes as f64 / spawn_attempts as f64
        } else {
            0.0
        };
        Self {
            mean_population: mean,
            cv_percent,
            composition_rate,
            spawn_success,
            cycles,
        }
    }
}

/// Population mean and standard deviation (population variance, Welford).
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mut mean = 0.0;
    let mut m2 = 0.0;
    for (i, &x) in values.iter().enumerate() {
        let n = (i + 1) as f64;
        let delta = x - mean;
        mean += delta / n;
        m2 += delta * (x - mean);
    }
    let variance = (m2 / values.len() as f64).max(0.0);
    (mean, variance.sqrt())
}

/// One tier of threshold comparisons. Every condition must hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasinTier {
    pub min_mean_population: f64,
    /// Strict upper bound on CV percent.
    pub max_cv_percent: f64,
    /// Strict lower bound on spawn success.
    pub min_spawn_success: f64,
    pub min_composition_rate: f64,
}

impl Default for BasinTier {
    fn default() -> Self {
        Self {
            min_mean_population: 0.0,
            max_cv_percent: f64::MAX,
            min_spawn_success: f64::MIN,
            min_composition_rate: 0.0,
        }
    }
}

impl BasinTier {
    /// Whether the statistics satisfy this tier. NaN never satisfies a tier.
    pub fn admits(&self, stats: &BasinStatistics) -> bool {
        stats.mean_population >= self.min_mean_population
            && stats.cv_percent < self.max_cv_percent
            && stats.spawn_success > self.min_spawn_success
            && stats.composition_rate >= self.min_composition_rate
    }
}

/// Two-way (`A`/`B`) or three-way (`A`/`B`/`C`) labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasinScheme {
    TwoWay,
    #[default]
    ThreeWay,
}

/// Thresholds for the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasinThresholds {
    pub scheme: BasinScheme,
    /// Conditions for `A`.
    pub primary: BasinTier,
    /// Conditions for `B` in the three-way scheme; ignored in the two-way scheme.
    pub secondary: BasinTier,
}

impl Default for BasinThresholds {
    fn default() -> Self {
        Self {
            scheme: BasinScheme::ThreeWay,
            primary: BasinTier {
                min_mean_population: 150.0,
                max_cv_percent: 15.0,
                min_spawn_success: 0.5,
                min_composition_rate: 0.0,
            },
            secondary: BasinTier {
                min_mean_population: 50.0,
                max_cv_percent: 40.0,
                min_spawn_success: 0.1,
                min_composition_rate: 0.0,
            },
        }
    }
}

impl BasinThresholds {
    /// A two-way scheme with a single tier for `A`.
    pub fn two_way(primary: BasinTier) -> Self {
        Self {
            scheme: BasinScheme::TwoWay,
            primary,
            secondary: BasinTier::default(),
        }
    }
}

/// Classify recorded statistics under the given thresholds.
pub fn classify(stats: &BasinStatistics, thresholds: &BasinThresholds) -> Basin {
    if thresholds.primary.admits(stats) {
        return Basin::A;
    }
    match thresholds.scheme {
        BasinScheme::TwoWay => Basin::B,
        BasinScheme::ThreeWay => {
            if thresholds.secondary.admits(stats) {
                Basin::B
            } else {
                Basin::C
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, cv: f64, success: f64) -> BasinStatistics {
        BasinStatistics {
            mean_population: mean,
            cv_percent: cv,
            composition_rate: 1.0,
            spawn_success: success,
            cycles: 100,
        }
    }

    #[test]
    fn three_way_tiers() {
        let t = BasinThresholds::default();
        assert_eq!(classify(&stats(200.0, 5.0, 0.9), &t), Basin::A);
        assert_eq!(classify(&stats(100.0, 5.0, 0.9), &t), Basin::B);
        assert_eq!(classify(&stats(10.0, 5.0, 0.9), &t), Basin::C);
    }

    #[test]
    fn boundaries_follow_comparison_direction() {
        let t = BasinThresholds::default();
        // mean is inclusive, cv and spawn success are strict
        assert_eq!(classify(&stats(150.0, 14.99, 0.51), &t), Basin::A);
        assert_eq!(classify(&stats(150.0, 15.0, 0.51), &t), Basin::B);
        assert_eq!(classify(&stats(150.0, 5.0, 0.5), &t), Basin::B);
    }

    #[test]
    fn two_way_never_yields_c() {
        let t = BasinThresholds::two_way(BasinThresholds::default().primary);
        assert_eq!(classify(&stats(0.0, 0.0, 0.0), &t), Basin::B);
        assert_eq!(classify(&stats(500.0, 1.0, 1.0), &t), Basin::A);
    }

    #[test]
    fn nan_statistics_fall_to_lowest_basin() {
        let t = BasinThresholds::default();
        assert_eq!(classify(&stats(f64::NAN, 1.0, 1.0), &t), Basin::C);
    }

    #[test]
    fn empty_series_is_all_zero() {
        let s = BasinStatistics::from_series(&[], 0, 0, 0);
        assert_eq!(s, BasinStatistics::default());
    }

    #[test]
    fn series_statistics() {
        let s = BasinStatistics::from_series(&[10.0, 20.0, 30.0, 40.0], 8, 10, 4);
        assert!((s.mean_population - 25.0).abs() < 1e-12);
        // population std of 10,20,30,40 is sqrt(125)
        let expected_cv = 125f64.sqrt() / 25.0 * 100.0;
        assert!((s.cv_percent - expected_cv).abs() < 1e-9);
        assert_eq!(s.composition_rate, 2.0);
        assert_eq!(s.spawn_success, 0.4);
        assert_eq!(s.cycles, 4);
    }

    #[test]
    fn extinct_series_has_zero_cv() {
        let s = BasinStatistics::from_series(&[0.0, 0.0, 0.0], 0, 5, 0);
        assert_eq!(s.cv_percent, 0.0);
        assert_eq!(s.spawn_success, 0.0);
    }

    #[test]
    fn thresholds_round_trip_through_json() {
        let t = BasinThresholds::default();
        let json = serde_json::to_string(&t).unwrap();
        let back: BasinThresholds = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
