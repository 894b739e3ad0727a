//! Cubical Filtration of a Density Field
//!
//! Every lattice point becomes a vertex with value `1 − density / maximum`,
//! so dense regions enter the complex first and sparse regions last. Higher
//! cubes take the maximum value of their facets, which makes the filtration
//! monotone: a cube never enters before its border.
//!
//! ## Construction
//!
//! 1. Evaluate the density field on the grid
//! 2. Build vertices, then cubes of dimension 1, 2, …, n in that order
//! 3. Sort all cubes by `(value, dimension, root, directions)` into `body`
//! 4. Optionally prune `body` to the cubes with value below a threshold
//!
//! Cubes live in an arena indexed by [`CubeId`]; the facets of each cube are
//! stored as ids, so the border of a cube always refers to the cubes of the
//! complex itself.

use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

use super::cube::{combinations, Cube, CubeId, CubeKey};
use super::grid::Grid;
use crate::cloud::PointCloud;
use crate::config::{validate_pruning, FiltrationConfig};
use crate::density::DensityField;
use crate::error::{TdaError, TdaResult};

/// Cubical complex over a grid, with its filtration order.
#[derive(Debug, Clone)]
pub struct Filtration {
    grid: Grid,
    densities: ArrayD<f64>,
    maximum: f64,
    cubes: Vec<Cube>,
    faces: Vec<Vec<CubeId>>,
    index: HashMap<CubeKey, CubeId>,
    body: Vec<CubeId>,
}

impl Filtration {
    /// Grid over `cloud`, density from `field`, parameters from `config`.
    pub fn new<F: DensityField + ?Sized>(
        cloud: &PointCloud,
        field: &F,
        config: &FiltrationConfig,
    ) -> TdaResult<Self> {
        config.validate()?;
        let start = Instant::now();
        let grid = Grid::new(cloud, config.precision, config.margin)?;
        debug!(grid = %grid, elapsed = ?start.elapsed(), "grid built");
        Self::from_grid(grid, field, config.pruning)
    }

    /// Evaluate `field` on an existing grid and build the filtration.
    pub fn from_grid<F: DensityField + ?Sized>(
        grid: Grid,
        field: &F,
        pruning: Option<f64>,
    ) -> TdaResult<Self> {
        let start = Instant::now();
        let densities = grid.evaluate(field)?;
        debug!(points = grid.len(), elapsed = ?start.elapsed(), "density evaluated");
        Self::from_density_values(grid, densities, pruning)
    }

    /// Build the filtration from precomputed densities indexed by multi-index.
    pub fn from_density_values(
        grid: Grid,
        densities: ArrayD<f64>,
        pruning: Option<f64>,
    ) -> TdaResult<Self> {
        if let Some(p) = pruning {
            validate_pruning(p)?;
        }
        if densities.shape() != grid.shape().as_slice() {
            return Err(TdaError::InvalidDensityField(format!(
                "density array has shape {:?}, grid has shape {:?}",
                densities.shape(),
                grid.shape()
            )));
        }
        if densities.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(TdaError::InvalidDensityField(
                "densities must be finite and nonnegative".into(),
            ));
        }
        let maximum = densities.iter().copied().fold(0.0, f64::max);
        if maximum <= 0.0 {
            return Err(TdaError::InvalidDensityField(
                "density vanishes on the whole grid".into(),
            ));
        }

        let start = Instant::now();
        let positions: Vec<Vec<usize>> = grid.positions().collect();
        let mut cubes = Vec::new();
        let mut faces = Vec::new();
        let mut index = HashMap::new();

        for position in &positions {
            let value = 1.0 - densities[IxDyn(position)] / maximum;
            index.insert(CubeKey::vertex(position.clone()), CubeId(cubes.len()));
            cubes.push(Cube::new(CubeKey::vertex(position.clone()), value));
            faces.push(Vec::new());
        }

        for dimension in 1..=grid.dimension() {
            let keys: Vec<CubeKey> = positions
                .iter()
                .flat_map(|position| {
                    combinations(&grid.possible_directions(position), dimension)
                        .into_iter()
                        .map(move |directions| CubeKey::new(position.clone(), directions))
                })
                .collect();

            // Values of this dimension depend only on the previous one.
            let built: Vec<(Vec<CubeId>, f64)> = keys
                .par_iter()
                .map(|key| {
                    let border = key
                        .border()
                        .iter()
                        .map(|facet| {
                            index.get(facet).copied().ok_or_else(|| {
                                TdaError::NonMonotoneFiltration(format!(
                                    "facet {facet:?} of {key:?} is not in the complex"
                                ))
                            })
                        })
                        .collect::<TdaResult<Vec<CubeId>>>()?;
                    let value = border
                        .iter()
                        .map(|id| cubes[id.0].value())
                        .fold(f64::NEG_INFINITY, f64::max);
                    Ok::<_, TdaError>((border, value))
                })
                .collect::<TdaResult<_>>()?;

            for (key, (border, value)) in keys.into_iter().zip(built) {
                index.insert(key.clone(), CubeId(cubes.len()));
                cubes.push(Cube::new(key, value));
                faces.push(border);
            }
        }
        debug!(cubes = cubes.len(), elapsed = ?start.elapsed(), "cubical complex built");

        let start = Instant::now();
        let mut body: Vec<CubeId> = (0..cubes.len()).map(CubeId).collect();
        body.sort_by(|&a, &b| filtration_order(&cubes[a.0], &cubes[b.0]));
        debug!(elapsed = ?start.elapsed(), "body sorted");

        let mut filtration = Self { grid, densities, maximum, cubes, faces, index, body };
        if let Some(p) = pruning {
            filtration.prune(p)?;
        }

        info!(
            dimension = filtration.dimension(),
            cubes = filtration.cubes.len(),
            body = filtration.body.len(),
            "filtration ready"
        );
        Ok(filtration)
    }

    /// Drop from `body` every cube whose value is not strictly below `threshold`.
    pub fn prune(&mut self, threshold: f64) -> TdaResult<()> {
        validate_pruning(threshold)?;
        let before = self.body.len();
        let cubes = &self.cubes;
        self.body.retain(|id| cubes[id.0].value() < threshold);
        debug!(threshold, removed = before - self.body.len(), "body pruned");
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Density at every lattice point, indexed by multi-index.
    pub fn densities(&self) -> &ArrayD<f64> {
        &self.densities
    }

    /// Largest density on the grid.
    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    /// Ambient dimension of the grid.
    pub fn dimension(&self) -> usize {
        self.grid.dimension()
    }

    /// Number of cubes in the complex (pruned or not).
    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    pub fn cube(&self, id: CubeId) -> &Cube {
        &self.cubes[id.0]
    }

    pub fn cubes(&self) -> &[Cube] {
        &self.cubes
    }

    pub fn get(&self, key: &CubeKey) -> Option<CubeId> {
        self.index.get(key).copied()
    }

    /// Facets of a cube, as cubes of this complex.
    pub fn border(&self, id: CubeId) -> &[CubeId] {
        &self.faces[id.0]
    }

    /// Cubes in filtration order.
    pub fn body(&self) -> &[CubeId] {
        &self.body
    }

    /// Prefix of `body` with value strictly below `threshold`.
    pub fn up_to(&self, threshold: f64) -> impl Iterator<Item = &Cube> + '_ {
        self.body
            .iter()
            .map(move |id| &self.cubes[id.0])
            .take_while(move |cube| cube.value() < threshold)
    }

    /// Lattice points with their density, least dense first.
    pub fn points_by_density(&self) -> Vec<(Vec<usize>, f64)> {
        let mut points: Vec<(Vec<usize>, f64)> = self
            .grid
            .positions()
            .map(|p| {
                let density = self.densities[IxDyn(&p)];
                (p, density)
            })
            .collect();
        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        points
    }

    /// Alternating count of the cubes in `body` by dimension.
    pub fn euler_characteristic(&self) -> i64 {
        self.body
            .iter()
            .map(|id| {
                if self.cubes[id.0].dimension() % 2 == 0 {
                    1
                } else {
                    -1
                }
            })
            .sum()
    }

    /// Check that no cube precedes one of its facets in value and that `body`
    /// is ascending in `(value, dimension)`.
    pub fn validate(&self) -> TdaResult<()> {
        for (i, cube) in self.cubes.iter().enumerate() {
            if !cube.value().is_finite() {
                return Err(TdaError::NonMonotoneFiltration(format!(
                    "{cube} has a non-finite value"
                )));
            }
            for facet in &self.faces[i] {
                let face = &self.cubes[facet.0];
                if face.value() > cube.value() {
                    return Err(TdaError::NonMonotoneFiltration(format!(
                        "facet {face} enters after {cube}"
                    )));
                }
            }
        }
        for pair in self.body.windows(2) {
            let (a, b) = (&self.cubes[pair[0].0], &self.cubes[pair[1].0]);
            let ascending = a.value() < b.value()
                || (a.value() == b.value() && a.dimension() <= b.dimension());
            if !ascending {
                return Err(TdaError::NonMonotoneFiltration(format!(
                    "{a} is processed before {b}"
                )));
            }
        }
        Ok(())
    }

    /// Override the value of one cube. `body` is not re-sorted.
    pub fn set_value(&mut self, id: CubeId, value: f64) -> TdaResult<()> {
        let cube = self
            .cubes
            .get_mut(id.0)
            .ok_or_else(|| TdaError::InvalidData(format!("no cube with id {}", id.0)))?;
        cube.set_value(value);
        Ok(())
    }
}

/// `(value, dimension, root, directions)`
fn filtration_order(a: &Cube, b: &Cube) -> Ordering {
    a.value()
        .total_cmp(&b.value())
        .then_with(|| a.dimension().cmp(&b.dimension()))
        .then_with(|| a.key().cmp(b.key()))
}

impl fmt::Display for Filtration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filtration of R^{} with {} cubes", self.dimension(), self.body.len())
    }
}
