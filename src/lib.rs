//! # TDA-Cubical
//!
//! Persistent Homology of Density Filtrations on Cubical Grids
//!
//! ## Theoretical Framework
//!
//! A point cloud sampled from a space carries its topology only implicitly.
//! Smoothing the cloud into a density and sweeping a threshold over that
//! density yields a growing family of cubical complexes whose homology
//! changes exactly where the sampled space has structure.
//!
//! ### Pipeline
//!
//! 1. **Density**: a Gaussian kernel density estimate (or any other
//!    [`DensityField`]) over the cloud
//!
//! 2. **Grid**: a uniform lattice over the bounding box on which the density
//!    is evaluated in one batch
//!
//! 3. **Filtration**: vertices enter at 1 − f/max f, higher cubes with their
//!    last facet, all sorted into a single insertion order
//!
//! 4. **Persistent Homology**: one mod-2 reduction pass that records the
//!    birth and death of every component, loop and void
//!
//! ## Key Result
//!
//! For a dense sample of a space X with moderate noise, the long-lived
//! intervals reproduce the Betti numbers of X:
//!
//!   #{ g ∈ holes(k) : life(g) ≫ 0 } = βₖ(X)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tda_cubical::{FiltrationConfig, Shape};
//!
//! let cloud = Shape::circle().sample(500, 0.05, 42)?;
//! let config = FiltrationConfig { precision: 20, margin: 0.0, ..Default::default() };
//! let homology = cloud.persistent_homology(&config)?;
//! print!("{homology}");
//! # Ok::<(), tda_cubical::TdaError>(())
//! ```
//!
//! ## References
//!
//! - Edelsbrunner & Harer, "Computational Topology" (2010)
//! - Kaczynski, Mischaikow & Mrozek, "Computational Homology" (2004)
//! - Chazal et al., "Persistence-Based Clustering in Riemannian Manifolds" (2013)

pub mod cloud;
pub mod config;
pub mod density;
pub mod error;
pub mod topology;

// Re-exports from topology
pub use topology::{
    // Complex construction
    Cube,
    CubeId,
    CubeKey,
    Filtration,
    Grid,
    // Reduction
    CubeRole,
    GeneratorSet,
    HomologyClass,
    HomologyGenerator,
    PersistenceEngine,
    PersistentHomology,
    // Summaries
    BettiCurve,
    BettiNumbers,
    PersistenceDiagram,
    PersistenceInterval,
};

pub use cloud::{PointCloud, Shape};
pub use config::{FiltrationConfig, SampleConfig};
pub use density::{Bandwidth, DensityField, GaussianKde};
pub use error::{TdaError, TdaResult};
