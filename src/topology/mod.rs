//! Topology Module: Cubical Complexes and Persistent Homology
//!
//! Implements the structures that turn a density field into a multiscale
//! summary of its holes:
//! - Uniform grid over the bounding box of a point cloud
//! - Elementary cubes and their borders
//! - Cubical filtration ordered by normalised density
//! - Persistent homology over F₂ with explicit generators and classes
//! - Persistence diagrams and Betti numbers
//!
//! ## Mathematical Background
//!
//! For a density f on a grid, a vertex enters the complex at
//! t = 1 − f(x) / max f and every higher cube enters with its last facet.
//! The sublevel complexes K_t grow with t; persistent homology tracks the
//! birth and death of connected components, loops and voids across them.
//! Dense regions appear first, so a ring of samples produces a loop that is
//! born early and only dies when the sparse centre is filled in.

mod betti;
mod cube;
mod diagram;
mod filtration;
mod generators;
mod grid;
mod persistence;

pub use betti::{BettiCurve, BettiNumbers};
pub use cube::{combinations, Cube, CubeId, CubeKey};
pub use diagram::{PersistenceDiagram, PersistenceInterval};
pub use filtration::Filtration;
pub use generators::{
    ClassId, GeneratorId, GeneratorSet, HomologyClass, HomologyGenerator, MAX_FILTRATION_VALUE,
};
pub use grid::Grid;
pub use persistence::{CubeRole, PersistenceEngine, PersistentHomology};
