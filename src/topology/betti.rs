//! Betti Numbers: Topological Invariants
//!
//! The k-th Betti number βₖ counts the number of k-dimensional
//! "holes" alive at a filtration value t:
//!
//! - β₀: Number of connected components
//! - β₁: Number of 1-dimensional loops/cycles
//! - β₂: Number of 2-dimensional voids/cavities
//!
//! A hole is alive at t when born ≤ t < death; a hole that never dies stays
//! alive through the end of the filtration.

use serde::Serialize;

use super::persistence::PersistentHomology;

/// Betti numbers at a specific filtration value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BettiNumbers {
    /// βₖ for k = 0..=n
    pub values: Vec<usize>,
    pub threshold: f64,
}

impl BettiNumbers {
    /// Count the holes of `homology` alive at `t`.
    pub fn at(homology: &PersistentHomology, t: f64) -> Self {
        let values = (0..=homology.dimension())
            .map(|d| {
                homology
                    .holes(d)
                    .iter()
                    .filter(|g| g.born <= t && (g.is_open() || t < g.death()))
                    .count()
            })
            .collect();
        Self { values, threshold: t }
    }

    /// βₖ, zero above the top dimension
    pub fn beta(&self, k: usize) -> usize {
        self.values.get(k).copied().unwrap_or(0)
    }

    /// Total topological complexity
    pub fn total(&self) -> usize {
        self.values.iter().sum()
    }

    /// Euler characteristic χ = β₀ - β₁ + β₂ - …
    pub fn euler_characteristic(&self) -> i64 {
        self.values
            .iter()
            .enumerate()
            .map(|(k, &b)| if k % 2 == 0 { b as i64 } else { -(b as i64) })
            .sum()
    }
}

/// Betti curve: sequence of Betti numbers across the filtration
#[derive(Debug, Clone, Serialize)]
pub struct BettiCurve {
    pub values: Vec<BettiNumbers>,
}

impl BettiCurve {
    /// Sample `steps + 1` evenly spaced thresholds in [0, 1]
    pub fn compute(homology: &PersistentHomology, steps: usize) -> Self {
        let steps = steps.max(1);
        let values = (0..=steps)
            .map(|i| BettiNumbers::at(homology, i as f64 / steps as f64))
            .collect();
        Self { values }
    }

    /// βₖ curve as `(threshold, βₖ)` pairs
    pub fn beta_curve(&self, k: usize) -> Vec<(f64, usize)> {
        self.values.iter().map(|b| (b.threshold, b.beta(k))).collect()
    }

    /// Area under the βₖ curve (trapezoidal rule)
    pub fn integrated_beta(&self, k: usize) -> f64 {
        self.values
            .windows(2)
            .map(|w| {
                let dt = w[1].threshold - w[0].threshold;
                dt * (w[0].beta(k) + w[1].beta(k)) as f64 / 2.0
            })
            .sum()
    }
}
