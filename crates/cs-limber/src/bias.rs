//! Tracer bias models.

use std::sync::Arc;

use cs_core::{Cosmology, Error, Result};

/// Growth index `γ` in `f(z) ≈ Ωm(z)^γ`.
pub const GROWTH_INDEX: f64 = 0.55;

/// Linear growth rate `f(z) ≈ Ωm(z)^0.55`.
pub fn linear_growth_rate(z: f64, cosmology: &dyn Cosmology) -> Result<f64> {
    Ok(cosmology.om(z)?.powf(GROWTH_INDEX))
}

/// Multiplicative bias as a function of redshift.
#[derive(Debug, Clone)]
pub enum Bias {
    /// Redshift-independent bias.
    Constant(f64),
    /// `sqrt(1 + z)`.
    SqrtOnePlusZ,
    /// `b1 + b2 / f(z)` with `f` the linear growth rate.
    GrowthRate {
        /// Constant term.
        b1: f64,
        /// Coefficient of `1 / f(z)`.
        b2: f64,
        /// Source of `Ωm(z)`.
        cosmology: Arc<dyn Cosmology>,
    },
}

impl Bias {
    /// Constant bias; must be finite.
    pub fn constant(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::Validation(format!("bias must be finite, got {value}")));
        }
        Ok(Self::Constant(value))
    }

    /// Growth-rate bias `b1 + b2 / f(z)`.
    pub fn growth_rate(cosmology: Arc<dyn Cosmology>, b1: f64, b2: f64) -> Result<Self> {
        if !(b1.is_finite() && b2.is_finite()) {
            return Err(Error::Validation(format!(
                "growth-rate bias needs finite b1, b2, got ({b1}, {b2})"
            )));
        }
        Ok(Self::GrowthRate { b1, b2, cosmology })
    }

    /// Bias at redshift `z`.
    pub fn at(&self, z: f64) -> Result<f64> {
        match self {
            Self::Constant(value) => Ok(*value),
            Self::SqrtOnePlusZ => Ok((1.0 + z).sqrt()),
            Self::GrowthRate { b1, b2, cosmology } => {
                let f = linear_growth_rate(z, cosmology.as_ref())?;
                Ok(b1 + b2 / f)
            }
        }
    }
}

impl Default for Bias {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}
