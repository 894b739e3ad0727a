//! Synthetic Point Clouds with Known Topology
//!
//! Samples of classical spaces whose homology is known in advance, used to
//! check that the pipeline recovers the expected features:
//!
//! - **S⁰**: two clusters (β₀ = 2)
//! - **S¹**: circle (β₁ = 1)
//! - **S²**: sphere (β₂ = 1)
//! - **T²**: torus (β₁ = 2, β₂ = 1)
//! - **ℝP²**: projective plane embedded in ℝ⁴ (mod-2 β₁ = β₂ = 1)
//! - **S¹ ∨ S¹**: two circles touching at a point (β₁ = 2)
//!
//! Every coordinate is perturbed by Gaussian noise N(0, noise²). Sampling is
//! deterministic for a given seed.

use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::PointCloud;
use crate::error::{TdaError, TdaResult};

/// A space to sample from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Two points `±radius` on the real line
    S0 { radius: f64 },
    /// Circle in the plane
    S1 { center: [f64; 2], radius: f64 },
    /// Sphere in ℝ³
    S2 { center: [f64; 3], radius: f64 },
    /// Torus with tube radius `inner` and central radius `outer`
    T2 { inner: f64, outer: f64 },
    /// Real projective plane (not uniformly distributed)
    Rp2,
    /// Unit circles centred at `(0, ±radius)`
    #[serde(rename = "s1vs1")]
    S1vS1 { radius: f64 },
}

impl Default for Shape {
    fn default() -> Self {
        Self::circle()
    }
}

impl Shape {
    pub fn circle() -> Self {
        Self::S1 { center: [0.0, 0.0], radius: 1.0 }
    }

    pub fn sphere() -> Self {
        Self::S2 { center: [0.0, 0.0, 0.0], radius: 1.0 }
    }

    pub fn torus() -> Self {
        Self::T2 { inner: 1.0, outer: 2.0 }
    }

    /// Ambient dimension of the samples.
    pub fn dimension(&self) -> usize {
        match self {
            Self::S0 { .. } => 1,
            Self::S1 { .. } | Self::S1vS1 { .. } => 2,
            Self::S2 { .. } | Self::T2 { .. } => 3,
            Self::Rp2 => 4,
        }
    }

    /// Draw `points` samples perturbed by N(0, noise²).
    ///
    /// For `S1vS1` the first `points / 2` samples lie on the upper circle and
    /// the rest on the lower one, so an odd count puts the extra point below.
    pub fn sample(&self, points: usize, noise: f64, seed: u64) -> TdaResult<PointCloud> {
        if points == 0 {
            return Err(TdaError::InvalidConfig("points must be positive".into()));
        }
        if !noise.is_finite() || noise < 0.0 {
            return Err(TdaError::InvalidConfig(format!(
                "noise must be a nonnegative finite deviation, got {noise}"
            )));
        }
        let normal = Normal::new(0.0, noise)
            .map_err(|e| TdaError::InvalidConfig(format!("noise {noise}: {e}")))?;
        let angle = Uniform::new(0.0, 2.0 * PI)
            .map_err(|e| TdaError::InvalidConfig(e.to_string()))?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut data = Array2::<f64>::zeros((self.dimension(), points));

        match *self {
            Self::S0 { radius } => {
                for i in 0..points {
                    let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                    data[[0, i]] = radius * side + normal.sample(&mut rng);
                }
            }
            Self::S1 { center, radius } => {
                fill_circle(&mut data, 0..points, center, radius, &angle, &normal, &mut rng);
            }
            Self::S1vS1 { radius } => {
                let half = points / 2;
                fill_circle(&mut data, 0..half, [0.0, radius], 1.0, &angle, &normal, &mut rng);
                fill_circle(&mut data, half..points, [0.0, -radius], 1.0, &angle, &normal, &mut rng);
            }
            Self::S2 { center, radius } => {
                for i in 0..points {
                    let (a, b, c) = sphere_point(&mut rng);
                    data[[0, i]] = center[0] + radius * a + normal.sample(&mut rng);
                    data[[1, i]] = center[1] + radius * b + normal.sample(&mut rng);
                    data[[2, i]] = center[2] + radius * c + normal.sample(&mut rng);
                }
            }
            Self::T2 { inner, outer } => {
                let mut i = 0;
                while i < points {
                    let theta = 2.0 * PI * rng.random::<f64>();
                    let phi = 2.0 * PI * rng.random::<f64>();
                    let w: f64 = rng.random();
                    // Accept proportionally to the area element of the tube.
                    let ring = outer + inner * theta.cos();
                    if w > ring / (inner + outer) {
                        continue;
                    }
                    data[[0, i]] = phi.sin() * ring + normal.sample(&mut rng);
                    data[[1, i]] = inner * theta.sin() + normal.sample(&mut rng);
                    data[[2, i]] = phi.cos() * ring + normal.sample(&mut rng);
                    i += 1;
                }
            }
            Self::Rp2 => {
                for i in 0..points {
                    let (a, b, c) = sphere_point(&mut rng);
                    data[[0, i]] = a * b + normal.sample(&mut rng);
                    data[[1, i]] = b * c + normal.sample(&mut rng);
                    data[[2, i]] = a * c + normal.sample(&mut rng);
                    data[[3, i]] = a * a - b * b + normal.sample(&mut rng);
                }
            }
        }

        PointCloud::new(data)
    }
}

fn fill_circle(
    data: &mut Array2<f64>,
    columns: std::ops::Range<usize>,
    center: [f64; 2],
    radius: f64,
    angle: &Uniform<f64>,
    normal: &Normal<f64>,
    rng: &mut ChaCha8Rng,
) {
    for i in columns {
        let t = angle.sample(rng);
        data[[0, i]] = center[0] + radius * t.cos() + normal.sample(rng);
        data[[1, i]] = center[1] + radius * t.sin() + normal.sample(rng);
    }
}

/// Uniform point on the unit sphere.
fn sphere_point(rng: &mut ChaCha8Rng) -> (f64, f64, f64) {
    let u: f64 = rng.random();
    let v: f64 = rng.random();
    let theta = (2.0 * v - 1.0).acos();
    let phi = 2.0 * PI * u;
    (theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos())
}
