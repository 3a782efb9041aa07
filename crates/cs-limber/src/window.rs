//! Redshift window functions selecting one bin of a tracer.
//!
//! The lognormal variants model a distance measurement with scatter `σ` in
//! `ln D_L` (the GW case, where redshift is inferred from luminosity distance):
//!
//! - clustering: probability that a source at `z` is assigned to the bin,
//!   `S(z) = ½ [erfc(x_low) − erfc(x_high)]`;
//! - lensing: `(e^{−x_high²} − e^{−x_low²}) / (σ√(2π))`, which equals
//!   `−dS / d ln D_L`.
//!
//! with `x_b = (ln D_L(b) − ln D_L(z)) / (σ√2)`.

use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

use nalgebra::DVector;
use statrs::function::erf::erfc;

use cs_core::{Cosmology, Error, Result};

use crate::math::evaluate_on;

/// Window function of a bin, to be multiplied with the number density.
#[derive(Debug, Clone)]
pub enum WindowFunction {
    /// Indicator of `low <= z <= high`. A degenerate bin (`low == high`) selects
    /// nothing, even when its edge falls on a grid sample.
    Box,
    /// Smoothed box for sources with log-normal distance errors.
    LognormalClustering {
        /// Scatter in `ln D_L`.
        sigma: f64,
        /// Source of `D_L(z)`.
        cosmology: Arc<dyn Cosmology>,
    },
    /// Lensing weight for sources with log-normal distance errors.
    LognormalLensing {
        /// Scatter in `ln D_L`.
        sigma: f64,
        /// Source of `D_L(z)`.
        cosmology: Arc<dyn Cosmology>,
    },
}

impl WindowFunction {
    /// Log-normal clustering window with scatter `sigma > 0`.
    pub fn lognormal_clustering(cosmology: Arc<dyn Cosmology>, sigma: f64) -> Result<Self> {
        check_sigma(sigma)?;
        Ok(Self::LognormalClustering { sigma, cosmology })
    }

    /// Log-normal lensing window with scatter `sigma > 0`.
    pub fn lognormal_lensing(cosmology: Arc<dyn Cosmology>, sigma: f64) -> Result<Self> {
        check_sigma(sigma)?;
        Ok(Self::LognormalLensing { sigma, cosmology })
    }

    /// Short name used in labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::LognormalClustering { .. } => "lognormal_clustering",
            Self::LognormalLensing { .. } => "lognormal_lensing",
        }
    }

    /// Window evaluated on `z` for the bin `[low, high]`.
    pub fn at_z(&self, z: &DVector<f64>, low: f64, high: f64) -> Result<DVector<f64>> {
        match self {
            Self::Box if low == high => Ok(DVector::zeros(z.len())),
            Self::Box => Ok(z.map(|zi| if zi >= low && zi <= high { 1.0 } else { 0.0 })),
            Self::LognormalClustering { sigma, cosmology } => {
                let (ln_dlow, ln_dhigh) = ln_edge_distances(cosmology.as_ref(), low, high)?;
                let norm = sigma * SQRT_2;
                evaluate_on(z, |zi| {
                    let Some(ln_d) = sample_ln_distance(cosmology.as_ref(), zi)? else {
                        return Ok(0.0);
                    };
                    let x_low = (ln_dlow - ln_d) / norm;
                    let x_high = (ln_dhigh - ln_d) / norm;
                    Ok(0.5 * (erfc(x_low) - erfc(x_high)))
                })
            }
            Self::LognormalLensing { sigma, cosmology } => {
                let (ln_dlow, ln_dhigh) = ln_edge_distances(cosmology.as_ref(), low, high)?;
                let arg_norm = sigma * SQRT_2;
                let pdf_norm = sigma * (2.0 * PI).sqrt();
                evaluate_on(z, |zi| {
                    let Some(ln_d) = sample_ln_distance(cosmology.as_ref(), zi)? else {
                        return Ok(0.0);
                    };
                    let x_low = (ln_dlow - ln_d) / arg_norm;
                    let x_high = (ln_dhigh - ln_d) / arg_norm;
                    Ok(((-x_high * x_high).exp() - (-x_low * x_low).exp()) / pdf_norm)
                })
            }
        }
    }
}

fn check_sigma(sigma: f64) -> Result<()> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(Error::Validation(format!(
            "lognormal window needs finite sigma > 0, got {sigma}"
        )));
    }
    Ok(())
}

/// `ln D_L` of a bin edge; the log-normal model is undefined where `D_L <= 0`.
fn ln_distance(cosmology: &dyn Cosmology, z: f64) -> Result<f64> {
    positive_ln(cosmology.dl(z)?, z)
}

/// `ln D_L(z)` at a grid sample, or `None` at the observer (`D_L = 0`).
///
/// There both `x_low` and `x_high` diverge to `+∞`, so both windows vanish.
fn sample_ln_distance(cosmology: &dyn Cosmology, z: f64) -> Result<Option<f64>> {
    let d = cosmology.dl(z)?;
    if d == 0.0 {
        return Ok(None);
    }
    positive_ln(d, z).map(Some)
}

fn positive_ln(d: f64, z: f64) -> Result<f64> {
    if !(d > 0.0) {
        return Err(Error::Validation(format!(
            "lognormal window needs a positive luminosity distance, got D_L({z}) = {d}"
        )));
    }
    Ok(d.ln())
}

fn ln_edge_distances(cosmology: &dyn Cosmology, low: f64, high: f64) -> Result<(f64, f64)> {
    Ok((ln_distance(cosmology, low)?, ln_distance(cosmology, high)?))
}
