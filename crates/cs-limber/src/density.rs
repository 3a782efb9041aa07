//! Source number densities in redshift.

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::DVector;

use cs_core::constants::SPEED_OF_LIGHT_KM_S;
use cs_core::{Cosmology, Error, Result};

use crate::math::evaluate_on;

/// Number density of sources per unit redshift.
#[derive(Debug, Clone)]
pub enum NumberDensity {
    /// Same density at every redshift.
    UniformInRedshift(f64),
    /// Constant comoving volume density `n0` (Mpc^-3), converted to a redshift
    /// density with the comoving-volume Jacobian `4π c χ²/H`.
    UniformInVolume {
        /// Comoving number density in Mpc^-3.
        n0: f64,
        /// Source of `χ(z)` and `H(z)`.
        cosmology: Arc<dyn Cosmology>,
    },
    /// Precomputed values aligned to the query grid.
    ///
    /// The caller must query with the grid the values were computed on; a
    /// length mismatch is reported as [`Error::Validation`].
    Array(DVector<f64>),
}

impl NumberDensity {
    /// Uniform-in-redshift density; must be finite and non-negative.
    pub fn uniform_in_redshift(value: f64) -> Result<Self> {
        check_density(value)?;
        Ok(Self::UniformInRedshift(value))
    }

    /// Uniform-in-comoving-volume density.
    pub fn uniform_in_volume(n0: f64, cosmology: Arc<dyn Cosmology>) -> Result<Self> {
        check_density(n0)?;
        Ok(Self::UniformInVolume { n0, cosmology })
    }

    /// Array-valued density.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if let Some((i, v)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Validation(format!(
                "number density value {i} must be finite, got {v}"
            )));
        }
        Ok(Self::Array(DVector::from_vec(values)))
    }

    /// Density evaluated on `z`; the result has the same length as `z`.
    pub fn at_z(&self, z: &DVector<f64>) -> Result<DVector<f64>> {
        match self {
            Self::UniformInRedshift(value) => Ok(DVector::from_element(z.len(), *value)),
            Self::UniformInVolume { n0, cosmology } => {
                let prefactor = 4.0 * PI * SPEED_OF_LIGHT_KM_S * n0;
                evaluate_on(z, |zi| Ok(prefactor * cosmology.chi2_over_hz(zi)?))
            }
            Self::Array(values) => {
                if values.len() != z.len() {
                    return Err(Error::Validation(format!(
                        "array number density has {} values but the grid has {} points",
                        values.len(),
                        z.len()
                    )));
                }
                Ok(values.clone())
            }
        }
    }
}

fn check_density(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!(
            "number density must be finite and >= 0, got {value}"
        )));
    }
    Ok(())
}
