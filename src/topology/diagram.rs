//! Persistence Diagrams and Barcodes
//!
//! A persistence interval [b, d) represents a feature that is "born" at
//! filtration value b and "dies" at value d. Values live in [0, 1]; an
//! essential interval is one whose generator never died and is reported
//! with death 1.
//!
//! ## Interpretation
//!
//! - Long-lived features (large d-b) represent robust topological structure
//! - Short-lived features may be noise from the density estimate
//! - The barcode lists the same intervals ordered for plotting

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::TdaResult;

/// A persistence interval [birth, death)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistenceInterval {
    pub birth: f64,
    pub death: f64,
    pub dimension: usize,
    /// The generator is still alive at the end of the filtration
    pub essential: bool,
}

impl PersistenceInterval {
    pub fn new(birth: f64, death: f64, dimension: usize, essential: bool) -> Self {
        Self { birth, death, dimension, essential }
    }

    /// Lifetime of the feature
    pub fn persistence(&self) -> f64 {
        self.death - self.birth
    }

    pub fn is_essential(&self) -> bool {
        self.essential
    }
}

/// Persistence diagram: collection of intervals for each dimension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistenceDiagram {
    pub intervals: Vec<PersistenceInterval>,
    pub max_dimension: usize,
}

impl PersistenceDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interval: PersistenceInterval) {
        if interval.dimension > self.max_dimension {
            self.max_dimension = interval.dimension;
        }
        self.intervals.push(interval);
    }

    /// Get all intervals for a given dimension
    pub fn dim(&self, d: usize) -> Vec<&PersistenceInterval> {
        self.intervals.iter().filter(|i| i.dimension == d).collect()
    }

    /// Intervals of dimension d whose generator died
    pub fn finite_intervals(&self, d: usize) -> Vec<&PersistenceInterval> {
        self.intervals
            .iter()
            .filter(|i| i.dimension == d && !i.is_essential())
            .collect()
    }

    /// Number of intervals (finite and essential) in dimension d
    pub fn count(&self, d: usize) -> usize {
        self.dim(d).len()
    }

    /// Total persistence in dimension d
    pub fn total_persistence(&self, d: usize) -> f64 {
        self.dim(d).iter().map(|i| i.persistence()).sum()
    }

    /// Maximum persistence in dimension d
    pub fn max_persistence(&self, d: usize) -> f64 {
        self.dim(d)
            .iter()
            .map(|i| i.persistence())
            .fold(0.0, f64::max)
    }

    /// Intervals ordered by dimension, then birth, then longest first
    pub fn barcode(&self) -> Vec<PersistenceInterval> {
        let mut bars = self.intervals.clone();
        bars.sort_by(|a, b| {
            a.dimension
                .cmp(&b.dimension)
                .then(a.birth.total_cmp(&b.birth))
                .then(b.persistence().total_cmp(&a.persistence()))
        });
        bars
    }

    pub fn to_json(&self, path: &Path) -> TdaResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersistenceDiagram {
        let mut pd = PersistenceDiagram::new();
        pd.add(PersistenceInterval::new(0.0, 1.0, 0, true));
        pd.add(PersistenceInterval::new(0.2, 0.5, 1, false));
        pd.add(PersistenceInterval::new(0.0, 0.4, 0, false));
        pd.add(PersistenceInterval::new(0.1, 0.9, 1, false));
        pd
    }

    #[test]
    fn test_queries_by_dimension() {
        let pd = sample();
        assert_eq!(pd.max_dimension, 1);
        assert_eq!(pd.count(0), 2);
        assert_eq!(pd.finite_intervals(0).len(), 1);
        assert!((pd.total_persistence(1) - 1.1).abs() < 1e-12);
        assert!((pd.max_persistence(1) - 0.8).abs() < 1e-12);
        assert_eq!(pd.max_persistence(2), 0.0);
    }

    #[test]
    fn test_barcode_order() {
        let bars = sample().barcode();
        let keys: Vec<(usize, f64, f64)> = bars.iter().map(|b| (b.dimension, b.birth, b.death)).collect();
        assert_eq!(
            keys,
            vec![(0, 0.0, 1.0), (0, 0.0, 0.4), (1, 0.1, 0.9), (1, 0.2, 0.5)]
        );
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.json");
        let pd = sample();
        pd.to_json(&path).unwrap();
        let back: PersistenceDiagram =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, pd);
    }
}
