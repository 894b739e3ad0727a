//! Density Module: Scalar Fields over Point Clouds
//!
//! The filtration only needs a callable that maps a batch of coordinate
//! vectors to one density per vector. That seam is [`DensityField`]; any
//! closure `Fn(&Array2<f64>) -> Array1<f64>` implements it, and
//! [`GaussianKde`] provides the kernel density estimate used by the pipeline.
//!
//! ## Batch Layout
//!
//! Points are passed as an `(n, batch)` array: row `k` holds the `k`-th
//! coordinate of every query point. A grid evaluates the whole lattice in a
//! single call, so expensive estimators are invoked once.

mod kde;

pub use kde::{Bandwidth, GaussianKde};

use ndarray::{Array1, Array2};

/// A scalar field evaluated in batches.
pub trait DensityField {
    /// Evaluate at every column of `points` (shape `(n, batch)`).
    fn evaluate(&self, points: &Array2<f64>) -> Array1<f64>;

    /// Ambient dimension the field expects, when it has a fixed one.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<F> DensityField for F
where
    F: Fn(&Array2<f64>) -> Array1<f64>,
{
    fn evaluate(&self, points: &Array2<f64>) -> Array1<f64> {
        self(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn total<F: DensityField>(field: &F, points: &Array2<f64>) -> f64 {
        field.evaluate(points).sum()
    }

    #[test]
    fn test_closures_are_fields() {
        let squared_norm = |p: &Array2<f64>| p.map(|x| x * x).sum_axis(ndarray::Axis(0));
        let points = array![[1.0, 2.0], [0.0, 1.0]];
        assert_eq!(squared_norm.evaluate(&points), array![1.0, 5.0]);
        assert_eq!(total(&squared_norm, &points), 6.0);
        assert_eq!(squared_norm.dimension(), None);
    }
}
