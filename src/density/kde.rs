//! Gaussian Kernel Density Estimation
//!
//! For data x₁, …, x_N in ℝᵈ the estimate is
//!
//!   f(x) = (1/N) Σᵢ exp(−½ (x − xᵢ)ᵀ C⁻¹ (x − xᵢ)) / √((2π)ᵈ det C)
//!
//! with kernel covariance C = h² Σ, where Σ is the unbiased sample covariance
//! and h the bandwidth factor (Scott's rule h = N^(−1/(d+4)) by default).
//!
//! C is factored once as L Lᵀ. The data are stored whitened (L⁻¹ xᵢ), so each
//! kernel term is a plain squared Euclidean distance.

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::DensityField;
use crate::cloud::PointCloud;
use crate::error::{TdaError, TdaResult};

/// Rule for the bandwidth factor h.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bandwidth {
    /// h = N^(−1/(d+4))
    #[default]
    Scott,
    /// h = (N(d+2)/4)^(−1/(d+4))
    Silverman,
    /// Explicit positive factor
    Factor(f64),
}

impl Bandwidth {
    /// `0` selects Scott's rule, any other value is an explicit factor.
    pub fn from_value(value: f64) -> Self {
        if value == 0.0 {
            Self::Scott
        } else {
            Self::Factor(value)
        }
    }

    pub fn validate(&self) -> TdaResult<()> {
        match *self {
            Self::Factor(h) if !(h.is_finite() && h > 0.0) => Err(TdaError::InvalidConfig(
                format!("bandwidth factor must be positive and finite, got {h}"),
            )),
            _ => Ok(()),
        }
    }

    /// Factor for `n` samples in `d` dimensions.
    pub fn factor(&self, n: usize, d: usize) -> f64 {
        let exponent = -1.0 / (d as f64 + 4.0);
        match *self {
            Self::Scott => (n as f64).powf(exponent),
            Self::Silverman => (n as f64 * (d as f64 + 2.0) / 4.0).powf(exponent),
            Self::Factor(h) => h,
        }
    }
}

/// Gaussian KDE of a point cloud.
#[derive(Debug, Clone)]
pub struct GaussianKde {
    /// Sample covariance Σ of the data, shape `(d, d)`
    data_covariance: Array2<f64>,
    bandwidth: Bandwidth,
    factor: f64,
    /// Lower Cholesky factor of the kernel covariance h²Σ
    cholesky: Array2<f64>,
    /// Data mapped through L⁻¹, shape `(d, N)`
    whitened: Array2<f64>,
    /// 1 / (N √((2π)ᵈ det C))
    norm: f64,
    dataset: Array2<f64>,
}

impl GaussianKde {
    pub fn new(cloud: &PointCloud, bandwidth: Bandwidth) -> TdaResult<Self> {
        bandwidth.validate()?;
        let dataset = cloud.data().clone();
        if dataset.ncols() < 2 {
            return Err(TdaError::InvalidDensityField(
                "kernel density estimation needs at least two points".into(),
            ));
        }

        let mut kde = Self {
            data_covariance: sample_covariance(&dataset),
            bandwidth,
            factor: 0.0,
            cholesky: Array2::zeros((0, 0)),
            whitened: Array2::zeros((0, 0)),
            norm: 0.0,
            dataset,
        };
        kde.refit()?;
        Ok(kde)
    }

    /// Switch the bandwidth rule and refactor the kernel covariance.
    pub fn set_bandwidth(&mut self, bandwidth: Bandwidth) -> TdaResult<()> {
        bandwidth.validate()?;
        self.bandwidth = bandwidth;
        self.refit()
    }

    fn refit(&mut self) -> TdaResult<()> {
        let (d, n) = self.dataset.dim();
        self.factor = self.bandwidth.factor(n, d);
        let covariance = &self.data_covariance * (self.factor * self.factor);
        let cholesky = cholesky(&covariance)?;

        let mut whitened = Array2::zeros((d, n));
        for (i, column) in self.dataset.columns().into_iter().enumerate() {
            let z = forward_substitute(&cholesky, column);
            whitened.column_mut(i).assign(&Array1::from_vec(z));
        }

        let sqrt_det: f64 = cholesky.diag().iter().product();
        self.norm = 1.0 / (n as f64 * (2.0 * PI).powf(d as f64 / 2.0) * sqrt_det);
        self.cholesky = cholesky;
        self.whitened = whitened;
        Ok(())
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Kernel covariance h²Σ.
    pub fn covariance(&self) -> Array2<f64> {
        &self.data_covariance * (self.factor * self.factor)
    }

    /// Density at a single point.
    pub fn density_at(&self, x: ArrayView1<'_, f64>) -> f64 {
        let z = forward_substitute(&self.cholesky, x);
        let sum: f64 = self
            .whitened
            .columns()
            .into_iter()
            .map(|w| {
                let dist_sq: f64 = w.iter().zip(&z).map(|(a, b)| (a - b).powi(2)).sum();
                (-0.5 * dist_sq).exp()
            })
            .sum();
        sum * self.norm
    }
}

impl DensityField for GaussianKde {
    /// Columns are evaluated in parallel. A batch with the wrong number of
    /// rows yields NaN for every column.
    fn evaluate(&self, points: &Array2<f64>) -> Array1<f64> {
        if points.nrows() != self.dataset.nrows() {
            return Array1::from_elem(points.ncols(), f64::NAN);
        }
        let values: Vec<f64> = (0..points.ncols())
            .into_par_iter()
            .map(|j| self.density_at(points.column(j)))
            .collect();
        Array1::from_vec(values)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dataset.nrows())
    }
}

/// Unbiased covariance of an `(d, N)` data array.
fn sample_covariance(data: &Array2<f64>) -> Array2<f64> {
    let (d, n) = data.dim();
    let mean: Vec<f64> = data.rows().into_iter().map(|row| row.sum() / n as f64).collect();
    let mut cov = Array2::<f64>::zeros((d, d));
    for j in 0..d {
        for k in j..d {
            let mut acc = 0.0;
            for i in 0..n {
                acc += (data[[j, i]] - mean[j]) * (data[[k, i]] - mean[k]);
            }
            let value = acc / (n as f64 - 1.0);
            cov[[j, k]] = value;
            cov[[k, j]] = value;
        }
    }
    cov
}

/// Lower-triangular L with L Lᵀ = a.
fn cholesky(a: &Array2<f64>) -> TdaResult<Array2<f64>> {
    let d = a.nrows();
    let mut l = Array2::<f64>::zeros((d, d));
    for j in 0..d {
        let mut diag = a[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if !(diag.is_finite() && diag > a[[j, j]].abs() * 1e-12) {
            return Err(TdaError::InvalidDensityField(
                "kernel covariance is not positive definite (degenerate data)".into(),
            ));
        }
        l[[j, j]] = diag.sqrt();
        for i in j + 1..d {
            let mut acc = a[[i, j]];
            for k in 0..j {
                acc -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = acc / l[[j, j]];
        }
    }
    Ok(l)
}

/// Solve L z = x.
fn forward_substitute(l: &Array2<f64>, x: ArrayView1<'_, f64>) -> Vec<f64> {
    let d = l.nrows();
    let mut z = vec![0.0; d];
    for i in 0..d {
        let mut acc = x[i];
        for k in 0..i {
            acc -= l[[i, k]] * z[k];
        }
        z[i] = acc / l[[i, i]];
    }
    z
}
