//! Quadrature and grid helpers shared by the kernels and the Limber integral.

use nalgebra::DVector;

use cs_core::Result;

/// Stabilizer added to a normalization integral that falls below it.
///
/// A density selected by an empty or degenerate bin integrates to zero; adding
/// this epsilon keeps the normalized profile finite (all zeros) instead of NaN.
/// The value is part of the numerical contract: changing it changes results for
/// bins whose integral is below it.
pub const NORMALIZATION_EPSILON: f64 = 1e-10;

/// Trapezoid weights `w` such that `∫ y dz ≈ w · y` on the samples `z`.
///
/// `w[0] = (z1 - z0) / 2`, `w[n-1] = (z[n-1] - z[n-2]) / 2` and interior
/// `w[i] = (z[i+1] - z[i-1]) / 2`.
pub fn trapezoid_weights(z: &DVector<f64>) -> DVector<f64> {
    let n = z.len();
    let mut w = DVector::zeros(n);
    for i in 1..n {
        let half = 0.5 * (z[i] - z[i - 1]);
        w[i - 1] += half;
        w[i] += half;
    }
    w
}

/// Trapezoidal integral of `y` over `z`.
pub fn trapz(y: &DVector<f64>, z: &DVector<f64>) -> f64 {
    y.dot(&trapezoid_weights(z))
}

/// Divide `y` by its trapezoidal integral over `z`.
///
/// When the integral is below `epsilon` the denominator becomes
/// `integral + epsilon`, so an all-zero profile stays all-zero.
pub fn normalize(y: &DVector<f64>, z: &DVector<f64>, epsilon: f64) -> DVector<f64> {
    let mut norm = trapz(y, z);
    if norm < epsilon {
        norm += epsilon;
    }
    y / norm
}

/// Evaluate a fallible scalar function on every sample of `z`.
pub fn evaluate_on(
    z: &DVector<f64>,
    mut f: impl FnMut(f64) -> Result<f64>,
) -> Result<DVector<f64>> {
    let values = z.iter().map(|&zi| f(zi)).collect::<Result<Vec<_>>>()?;
    Ok(DVector::from_vec(values))
}
