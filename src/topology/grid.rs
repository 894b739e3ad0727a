//! Uniform Lattice over a Point Cloud
//!
//! The bounding box of the cloud, optionally widened by a margin fraction of
//! each axis range, is sampled with `precision` evenly spaced values per axis
//! (both ends included). A lattice point is addressed by its multi-index
//! `[i₀, …, iₙ₋₁]`; axis `k` of the multi-index is coordinate axis `k`.
//!
//! Lattice points are enumerated in row-major order (last axis fastest), the
//! same order used to reshape density values into an `n`-dimensional array.

use ndarray::{Array1, Array2, ArrayD, IxDyn};
use std::fmt;

use crate::cloud::PointCloud;
use crate::density::DensityField;
use crate::error::{TdaError, TdaResult};

/// Discretized bounding box. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Samples per axis
    axes: Vec<Array1<f64>>,
    precision: usize,
}

impl Grid {
    /// Lattice covering `cloud`, widened by `margin` on both ends of each axis.
    pub fn new(cloud: &PointCloud, precision: usize, margin: f64) -> TdaResult<Self> {
        if let Some(((k, i), x)) = cloud
            .data()
            .indexed_iter()
            .find(|(_, x)| !x.is_finite())
        {
            return Err(TdaError::InvalidGrid(format!(
                "point {i} has non-finite coordinate {x} on axis {k}"
            )));
        }
        Self::from_bounds(&cloud.bounds(), precision, margin)
    }

    /// Lattice over explicit per-axis `(min, max)` intervals.
    pub fn from_bounds(bounds: &[(f64, f64)], precision: usize, margin: f64) -> TdaResult<Self> {
        if precision == 0 {
            return Err(TdaError::InvalidGrid("precision must be positive".into()));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(TdaError::InvalidGrid(format!(
                "margin must be a nonnegative finite fraction, got {margin}"
            )));
        }
        if bounds.is_empty() {
            return Err(TdaError::InvalidGrid("grid needs at least one axis".into()));
        }
        let total = u32::try_from(bounds.len())
            .ok()
            .and_then(|n| precision.checked_pow(n));
        if total.is_none() {
            return Err(TdaError::InvalidGrid(format!(
                "{precision}^{} lattice points overflow the address space",
                bounds.len()
            )));
        }

        let mut axes = Vec::with_capacity(bounds.len());
        for (k, &(lo, hi)) in bounds.iter().enumerate() {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(TdaError::InvalidGrid(format!(
                    "axis {k} has invalid bounds [{lo}, {hi}]"
                )));
            }
            if lo == hi && margin > 0.0 {
                return Err(TdaError::InvalidGrid(format!(
                    "axis {k} is degenerate (min == max == {lo}) and cannot be widened by a margin"
                )));
            }
            let pad = margin * (hi - lo);
            axes.push(linspace(lo - pad, hi + pad, precision));
        }

        Ok(Self { axes, precision })
    }

    /// Ambient dimension `n`.
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Lattice points per axis.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// `[precision; n]`
    pub fn shape(&self) -> Vec<usize> {
        vec![self.precision; self.dimension()]
    }

    /// Total number of lattice points, `precisionⁿ`. Construction rejects overflow.
    pub fn len(&self) -> usize {
        self.precision.pow(self.dimension() as u32)
    }

    /// Always false: a grid has at least one axis and one point per axis.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples along axis `k`.
    pub fn axis(&self, k: usize) -> &Array1<f64> {
        &self.axes[k]
    }

    /// Per-axis `(min, max)` after the margin.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.axes
            .iter()
            .map(|a| (a[0], a[a.len() - 1]))
            .collect()
    }

    /// Distance between consecutive samples on each axis (0 when `precision == 1`).
    pub fn spacing(&self) -> Vec<f64> {
        self.axes
            .iter()
            .map(|a| if a.len() > 1 { a[1] - a[0] } else { 0.0 })
            .collect()
    }

    /// Real coordinates of a lattice point.
    pub fn coordinates(&self, index: &[usize]) -> Array1<f64> {
        index
            .iter()
            .zip(&self.axes)
            .map(|(&i, axis)| axis[i])
            .collect()
    }

    /// Multi-index of the `flat`-th lattice point in row-major order.
    pub fn position(&self, flat: usize) -> Vec<usize> {
        let mut index = vec![0; self.dimension()];
        let mut rest = flat;
        for slot in index.iter_mut().rev() {
            *slot = rest % self.precision;
            rest /= self.precision;
        }
        index
    }

    /// Every multi-index, in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.len()).map(move |flat| self.position(flat))
    }

    /// Axes along which a cube rooted at `index` can extend without leaving the grid.
    pub fn possible_directions(&self, index: &[usize]) -> Vec<usize> {
        index
            .iter()
            .enumerate()
            .filter(|&(_, &i)| i + 1 < self.precision)
            .map(|(k, _)| k)
            .collect()
    }

    /// All lattice points as an `(n, len)` batch, columns in row-major order.
    pub fn points(&self) -> Array2<f64> {
        let mut points = Array2::zeros((self.dimension(), self.len()));
        for (j, index) in self.positions().enumerate() {
            for (k, &i) in index.iter().enumerate() {
                points[[k, j]] = self.axes[k][i];
            }
        }
        points
    }

    /// Evaluate `field` at every lattice point in a single call.
    ///
    /// The result is indexed by multi-index. Fails with `InvalidDensityField`
    /// when the field expects another dimension, returns the wrong number of
    /// values, or returns a non-finite or negative value.
    pub fn evaluate<F: DensityField + ?Sized>(&self, field: &F) -> TdaResult<ArrayD<f64>> {
        if let Some(d) = field.dimension() {
            if d != self.dimension() {
                return Err(TdaError::InvalidDensityField(format!(
                    "field is defined on R^{d}, grid lives in R^{}",
                    self.dimension()
                )));
            }
        }

        let values = field.evaluate(&self.points());
        if values.len() != self.len() {
            return Err(TdaError::InvalidDensityField(format!(
                "expected {} values, field returned {}",
                self.len(),
                values.len()
            )));
        }
        if let Some(flat) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(TdaError::InvalidDensityField(format!(
                "value {} at lattice point {:?}",
                values[flat],
                self.position(flat)
            )));
        }

        ArrayD::from_shape_vec(IxDyn(&self.shape()), values.to_vec())
            .map_err(|e| TdaError::InvalidDensityField(e.to_string()))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Grid of R^{} with shape {:?}", self.dimension(), self.shape())
    }
}

fn linspace(lo: f64, hi: f64, n: usize) -> Array1<f64> {
    if n == 1 {
        return Array1::from_elem(1, lo);
    }
    let step = (hi - lo) / (n - 1) as f64;
    let mut samples = Array1::from_shape_fn(n, |i| lo + i as f64 * step);
    samples[n - 1] = hi;
    samples
}
