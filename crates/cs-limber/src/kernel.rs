//! Projection kernels.
//!
//! A kernel turns a normalized redshift profile `n(z)` (integrating to one over
//! the grid) into the line-of-sight weight `K(z)` entering the Limber integral.

use nalgebra::{DMatrix, DVector};

use cs_core::constants::SPEED_OF_LIGHT_KM_S;
use cs_core::{Cosmology, Error, RedshiftGrid, Result};

use crate::math::{evaluate_on, trapezoid_weights};

/// Line-of-sight projection kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Number counts: `K(z) = b n(z) H(z) / c`.
    Clustering,
    /// Convergence: `K(z) = 3/2 b Ωm0 (1+z) χ(z) / D_H² · g(z)`, with `g` the
    /// lensing efficiency of the sources behind `z`.
    WeakLensing,
}

impl Kernel {
    /// Stable name, used to pair kernels with window functions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clustering => "clustering",
            Self::WeakLensing => "weak_lensing",
        }
    }

    /// Display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Clustering => "δ",
            Self::WeakLensing => "κ",
        }
    }

    /// Kernel on the grid `z` for the normalized profile `n` and scalar bias.
    pub fn at_z(
        &self,
        z: &RedshiftGrid,
        n: &DVector<f64>,
        cosmology: &dyn Cosmology,
        bias: f64,
    ) -> Result<DVector<f64>> {
        check_aligned(z, n)?;
        match self {
            Self::Clustering => {
                let hz = evaluate_on(z.as_vector(), |zi| cosmology.hz(zi))?;
                Ok(n.component_mul(&hz) * (bias / SPEED_OF_LIGHT_KM_S))
            }
            Self::WeakLensing => {
                let efficiency = lensing_efficiency(z, n, cosmology)?;
                let dh = cosmology.hubble_distance();
                let prefactor = 1.5 * bias * cosmology.om0() / (dh * dh);
                let geometry =
                    evaluate_on(z.as_vector(), |zi| Ok((1.0 + zi) * cosmology.chi(zi)?))?;
                Ok(geometry.component_mul(&efficiency) * prefactor)
            }
        }
    }
}

/// Masked lensing-efficiency integrand on the `N x N` grid of pairs.
///
/// Entry `(i, j)` is `n(z_j) D_A(z_i, z_j) / χ(z_j)` for lens `z_i` and source
/// `z_j` with `z_i < z_j`, and exactly zero otherwise: a source at or in front
/// of the lens does not contribute.
pub fn lensing_efficiency_integrand(
    z: &RedshiftGrid,
    n: &DVector<f64>,
    cosmology: &dyn Cosmology,
) -> Result<DMatrix<f64>> {
    check_aligned(z, n)?;
    let zs = z.values();
    let nz = zs.len();
    let chi = evaluate_on(z.as_vector(), |zi| cosmology.chi(zi))?;
    // Column 0 is fully masked, so only sources behind the first sample need χ > 0.
    if let Some(j) = (1..nz).find(|&j| !(chi[j] > 0.0)) {
        return Err(Error::Computation(format!(
            "non-positive comoving distance {} at z={}",
            chi[j], zs[j]
        )));
    }

    // D_A(z_i, z_j) on the strict upper triangle, column-major.
    let distances = (0..nz)
        .flat_map(|j| (0..nz).map(move |i| (i, j)))
        .map(|(i, j)| if i < j { cosmology.da12(zs[i], zs[j]) } else { Ok(0.0) })
        .collect::<Result<Vec<_>>>()?;
    let mut integrand = DMatrix::from_vec(nz, nz, distances);

    let source_weight = DVector::from_fn(nz, |j, _| if j == 0 { 0.0 } else { n[j] / chi[j] });
    for (mut column, weight) in integrand.column_iter_mut().zip(source_weight.iter()) {
        column *= *weight;
    }
    Ok(integrand)
}

/// Lensing efficiency `g(z_i) = ∫_{z' > z_i} n(z') D_A(z_i, z') / χ(z') dz'`.
///
/// The trapezoid rule over the source axis is the product of the masked
/// integrand with the trapezoid weight vector.
pub fn lensing_efficiency(
    z: &RedshiftGrid,
    n: &DVector<f64>,
    cosmology: &dyn Cosmology,
) -> Result<DVector<f64>> {
    let integrand = lensing_efficiency_integrand(z, n, cosmology)?;
    Ok(integrand * trapezoid_weights(z.as_vector()))
}

fn check_aligned(z: &RedshiftGrid, n: &DVector<f64>) -> Result<()> {
    if n.len() != z.len() {
        return Err(Error::Validation(format!(
            "density has {} values but the grid has {} points",
            n.len(),
            z.len()
        )));
    }
    Ok(())
}
