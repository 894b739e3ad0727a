//! Cloud Module: Point Clouds in ℝⁿ
//!
//! A [`PointCloud`] is the input of the pipeline: `N` samples in `n`
//! dimensions, stored grouped by axis as an `(n, N)` array. Clouds come from
//! the synthetic [`Shape`] generators or from the semicolon-separated CSV
//! format (one row per axis).
//!
//! ```text
//! point cloud → density field → Grid → Filtration → PersistentHomology
//! ```

mod shapes;

pub use shapes::Shape;

use ndarray::{Array1, Array2};
use std::fmt;
use std::path::Path;

use crate::config::FiltrationConfig;
use crate::density::{Bandwidth, DensityField, GaussianKde};
use crate::error::{TdaError, TdaResult};
use crate::topology::{Filtration, Grid, PersistentHomology};

/// Data cloud of `N` points in ℝⁿ.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// Coordinates, shape `(dimension, N)`
    data: Array2<f64>,
}

impl PointCloud {
    /// Wrap an `(n, N)` coordinate array.
    pub fn new(data: Array2<f64>) -> TdaResult<Self> {
        let (dimension, n) = data.dim();
        if dimension == 0 {
            return Err(TdaError::EmptyInput("point cloud has no axes".into()));
        }
        if n == 0 {
            return Err(TdaError::EmptyInput("point cloud has no points".into()));
        }
        Ok(Self { data })
    }

    /// Build from one coordinate vector per axis.
    pub fn from_axes(axes: Vec<Vec<f64>>) -> TdaResult<Self> {
        let dimension = axes.len();
        let n = axes.first().map(|a| a.len()).unwrap_or(0);
        if let Some(bad) = axes.iter().position(|a| a.len() != n) {
            return Err(TdaError::InvalidData(format!(
                "axis {bad} has {} coordinates, axis 0 has {n}",
                axes[bad].len()
            )));
        }
        let flat: Vec<f64> = axes.into_iter().flatten().collect();
        let data = Array2::from_shape_vec((dimension, n), flat)
            .map_err(|e| TdaError::InvalidData(e.to_string()))?;
        Self::new(data)
    }

    /// Read a CSV cloud: one row per axis, `;`-separated, no header.
    pub fn from_csv(path: &Path) -> TdaResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;

        let mut axes = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let axis = record
                .iter()
                .map(|field| {
                    field.trim().parse::<f64>().map_err(|e| {
                        TdaError::InvalidData(format!("row {row}: '{field}': {e}"))
                    })
                })
                .collect::<TdaResult<Vec<f64>>>()?;
            axes.push(axis);
        }
        Self::from_axes(axes)
    }

    /// Write the cloud in the layout read by [`PointCloud::from_csv`].
    pub fn to_csv(&self, path: &Path) -> TdaResult<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_path(path)?;
        for axis in self.data.rows() {
            writer.write_record(axis.iter().map(|x| x.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Ambient dimension `n`.
    pub fn dimension(&self) -> usize {
        self.data.nrows()
    }

    /// Number of points `N`.
    pub fn len(&self) -> usize {
        self.data.ncols()
    }

    /// Always false: construction rejects empty clouds.
    pub fn is_empty(&self) -> bool {
        self.data.ncols() == 0
    }

    /// Coordinates grouped by axis, shape `(n, N)`.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Coordinates of the i-th point.
    pub fn point(&self, i: usize) -> Array1<f64> {
        self.data.column(i).to_owned()
    }

    /// Per-axis `(min, max)`.
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.data
            .rows()
            .into_iter()
            .map(|axis| {
                axis.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                    (lo.min(x), hi.max(x))
                })
            })
            .collect()
    }

    /// Grid of `precision` points per axis covering the cloud.
    pub fn grid(&self, precision: usize, margin: f64) -> TdaResult<Grid> {
        Grid::new(self, precision, margin)
    }

    /// Gaussian kernel density estimate of the cloud.
    pub fn kde(&self, bandwidth: Bandwidth) -> TdaResult<GaussianKde> {
        GaussianKde::new(self, bandwidth)
    }

    /// Cubical filtration of an arbitrary density field over this cloud's grid.
    pub fn filtration<F: DensityField + ?Sized>(
        &self,
        field: &F,
        config: &FiltrationConfig,
    ) -> TdaResult<Filtration> {
        Filtration::new(self, field, config)
    }

    /// Full pipeline: KDE with the configured bandwidth, filtration, persistence.
    pub fn persistent_homology(&self, config: &FiltrationConfig) -> TdaResult<PersistentHomology> {
        config.validate()?;
        let grid = self.grid(config.precision, config.margin)?;
        let kde = self.kde(config.bandwidth)?;
        let filtration = Filtration::from_grid(grid, &kde, config.pruning)?;
        PersistentHomology::compute(&filtration)
    }
}

impl fmt::Display for PointCloud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data cloud of R^{} with {} points", self.dimension(), self.len())
    }
}
