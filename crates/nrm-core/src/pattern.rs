//! Patterns: the salience-scored phase states emitted by transformations.

use crate::similarity::PhaseSignature;
use crate::types::Tick;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which transformation produced a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternOrigin {
    Composition,
    Decomposition,
}

/// A phase state recorded when a composition or decomposition commits.
///
/// One fixed shape shared by both engines and by pattern memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Non-negative salience score.
    pub magnitude: f64,
    pub signature: PhaseSignature,
    pub origin: PatternOrigin,
    /// Cycle in which the pattern was emitted.
    pub emitted_at: Tick,
}

impl Pattern {
    /// Build a pattern. Negative or non-finite magnitudes are stored as `0.0`.
    pub fn new(magnitude: f64, signature: PhaseSignature, origin: PatternOrigin, emitted_at: Tick) -> Self {
        let magnitude = if magnitude.is_finite() { magnitude.max(0.0) } else { 0.0 };
        Self {
            magnitude,
            signature,
            origin,
            emitted_at,
        }
    }

    /// Ordering that puts higher magnitudes first.
    pub fn by_magnitude_desc(a: &Pattern, b: &Pattern) -> Ordering {
        b.magnitude.total_cmp(&a.magnitude)
    }
}

/// Keep only the `limit` highest-magnitude patterns, sorted descending.
///
/// The sort is stable, so equal magnitudes keep their insertion order.
pub fn retain_most_salient(patterns: &mut Vec<Pattern>, limit: usize) {
    patterns.sort_by(Pattern::by_magnitude_desc);
    patterns.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(magnitude: f64) -> Pattern {
        Pattern::new(magnitude, PhaseSignature::new(1.0, 0.0, 0.0), PatternOrigin::Composition, 0)
    }

    #[test]
    fn negative_magnitude_is_clamped() {
        assert_eq!(pattern(-3.0).magnitude, 0.0);
        assert_eq!(pattern(f64::NAN).magnitude, 0.0);
    }

    #[test]
    fn retain_most_salient_keeps_top() {
        let mut v: Vec<Pattern> = [3.0, 9.0, 1.0, 7.0].iter().map(|&m| pattern(m)).collect();
        retain_most_salient(&mut v, 2);
        let mags: Vec<f64> = v.iter().map(|p| p.magnitude).collect();
        assert_eq!(mags, vec![9.0, 7.0]);
    }
}
