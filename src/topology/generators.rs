//! Homology Generators and Classes over F₂
//!
//! A homology class is a formal sum of generators with coefficients in
//! {0, 1}, i.e. a set of generators where addition is symmetric difference.
//! Sets are stored as sorted id vectors so that addition is a single linear
//! merge, the same cost as adding two sparse boundary-matrix columns.

use std::fmt;
use std::ops::{BitXor, BitXorAssign};

use super::cube::CubeId;

/// Sentinel death of a generator that is never killed.
pub const MAX_FILTRATION_VALUE: f64 = 1.0;

/// Index of a generator in the persistence arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneratorId(pub usize);

/// Index of a homology class in the persistence arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub usize);

/// Sorted, duplicate-free set of generators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GeneratorSet {
    ids: Vec<GeneratorId>,
}

impl GeneratorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(id: GeneratorId) -> Self {
        Self { ids: vec![id] }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, id: GeneratorId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = GeneratorId> + '_ {
        self.ids.iter().copied()
    }

    /// Sum over F₂: ids present in exactly one operand.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let (a, b) = (&self.ids, &other.ids);
        let mut ids = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    ids.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    ids.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        ids.extend_from_slice(&a[i..]);
        ids.extend_from_slice(&b[j..]);
        Self { ids }
    }
}

impl FromIterator<GeneratorId> for GeneratorSet {
    /// Repeated ids cancel in pairs.
    fn from_iter<I: IntoIterator<Item = GeneratorId>>(iter: I) -> Self {
        let mut ids: Vec<GeneratorId> = iter.into_iter().collect();
        ids.sort_unstable();
        let mut kept: Vec<GeneratorId> = Vec::with_capacity(ids.len());
        for id in ids {
            if kept.last() == Some(&id) {
                kept.pop();
            } else {
                kept.push(id);
            }
        }
        Self { ids: kept }
    }
}

impl<'b> BitXor<&'b GeneratorSet> for &GeneratorSet {
    type Output = GeneratorSet;

    fn bitxor(self, rhs: &'b GeneratorSet) -> GeneratorSet {
        self.symmetric_difference(rhs)
    }
}

impl<'b> BitXorAssign<&'b GeneratorSet> for GeneratorSet {
    fn bitxor_assign(&mut self, rhs: &'b GeneratorSet) {
        *self = self.symmetric_difference(rhs);
    }
}

impl fmt::Display for GeneratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ids.is_empty() {
            return write!(f, "0");
        }
        let terms: Vec<String> = self.ids.iter().map(|g| format!("g{}", g.0)).collect();
        write!(f, "{}", terms.join(" + "))
    }
}

/// One basis element of the homology in a fixed dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct HomologyGenerator {
    pub id: GeneratorId,
    pub dimension: usize,
    pub born: f64,
    /// `None` while the generator is alive.
    pub death: Option<f64>,
}

impl HomologyGenerator {
    pub fn new(id: GeneratorId, dimension: usize, born: f64) -> Self {
        Self { id, dimension, born, death: None }
    }

    /// Death value, or [`MAX_FILTRATION_VALUE`] for a generator still alive.
    pub fn death(&self) -> f64 {
        self.death.unwrap_or(MAX_FILTRATION_VALUE)
    }

    pub fn life(&self) -> f64 {
        self.death() - self.born
    }

    pub fn is_open(&self) -> bool {
        self.death.is_none()
    }
}

impl fmt::Display for HomologyGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.id.0)
    }
}

/// A set of generators together with the cubes that currently represent it.
#[derive(Debug, Clone)]
pub struct HomologyClass {
    pub dimension: usize,
    pub generators: GeneratorSet,
    pub representatives: Vec<CubeId>,
    /// False once collapsed into another class.
    pub active: bool,
}

impl HomologyClass {
    pub fn new(dimension: usize, generators: GeneratorSet, representatives: Vec<CubeId>) -> Self {
        Self { dimension, generators, representatives, active: true }
    }

    /// The zero class.
    pub fn is_null(&self) -> bool {
        self.generators.is_empty()
    }
}

impl fmt::Display for HomologyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] in dimension {}", self.generators, self.dimension)
    }
}
