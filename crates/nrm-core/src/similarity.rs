//! Phase signatures and resonance similarity.
//!
//! Two agents resonate when their signatures point the same way. The
//! signature is derived from energy, depth and scalar phase, so agents with
//! similar energy at the same depth tend to resonate.

use serde::{Deserialize, Serialize};
use std::f64::consts::{E, PI, TAU};

/// The golden ratio, the third signature axis.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Three-component resonance signature (`π`, `e`, `φ` phases).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSignature {
    pub pi: f64,
    pub e: f64,
    pub phi: f64,
}

impl PhaseSignature {
    pub fn new(pi: f64, e: f64, phi: f64) -> Self {
        Self { pi, e, phi }
    }

    /// Derive the signature of an agent with the given state.
    pub fn derive(energy: f64, depth: u32, phase: f64) -> Self {
        let d = depth as f64;
        Self {
            pi: (energy / PI + d * PI).cos(),
            e: (energy / E + d * E).cos(),
            phi: (energy / PHI + d * PHI + phase).cos(),
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.pi, self.e, self.phi]
    }

    pub fn norm(&self) -> f64 {
        (self.pi * self.pi + self.e * self.e + self.phi * self.phi).sqrt()
    }
}

/// How resonance between two agents is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMeasure {
    /// Cosine similarity of the derived signatures, in `[-1, 1]`.
    #[default]
    Cosine,
    /// `1 - d` over the circular distance `d` of scalar phases, in `[1 - π, 1]`.
    PhaseDistance,
    /// `1 - d/π`, the same distance rescaled into `[0, 1]`.
    NormalizedPhaseDistance,
}

/// Compute cosine similarity between two signatures.
///
/// A zero-norm signature has no direction; the result is `0.0`.
pub fn cosine_similarity(a: &PhaseSignature, b: &PhaseSignature) -> f64 {
    let norm = a.norm() * b.norm();
    if norm == 0.0 || !norm.is_finite() {
        return 0.0;
    }
    let dot: f64 = a
        .as_array()
        .iter()
        .zip(b.as_array().iter())
        .map(|(x, y)| x * y)
        .sum();
    (dot / norm).clamp(-1.0, 1.0)
}

/// `1 - |a - b|`, taking the phase difference the short way round.
pub fn phase_distance_similarity(a: f64, b: f64) -> f64 {
    1.0 - circular_distance(a, b)
}

/// Phase distance similarity scaled so opposite phases score `0.0`.
pub fn normalized_phase_distance_similarity(a: f64, b: f64) -> f64 {
    1.0 - circular_distance(a, b) / PI
}

/// Wrap any finite angle into `[0, 2π)`.
pub fn wrap_phase(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Shortest angular distance between two phases, in `[0, π]`.
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = (wrap_phase(a) - wrap_phase(b)).abs();
    d.min(TAU - d)
}

/// Mean direction of two phases. Opposite phases fall back to the first.
pub fn circular_mean(a: f64, b: f64) -> f64 {
    let x = a.cos() + b.cos();
    let y = a.sin() + b.sin();
    if x.abs() < 1e-12 && y.abs() < 1e-12 {
        return wrap_phase(a);
    }
    wrap_phase(y.atan2(x))
}
