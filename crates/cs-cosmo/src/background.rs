//! Flat ΛCDM expansion history.

use std::sync::Arc;

use cs_core::constants::SPEED_OF_LIGHT_KM_S;
use cs_core::{Cosmology, Error, MatterPowerSpectrum, Result};

use crate::interp::locate;

/// Default number of intervals in the comoving-distance table.
const DEFAULT_TABLE_INTERVALS: usize = 8192;

/// Flat ΛCDM background: `H(z) = H0 sqrt(Ωm0 (1+z)^3 + 1 - Ωm0)`.
///
/// `χ(z)` is tabulated once on `[0, z_max]` by cumulative Simpson quadrature
/// of `c / H`. A query between two nodes adds a three-point Simpson estimate
/// of the remaining piece, so the table resolution only affects accuracy at
/// the 1e-12 level. Queries above `z_max` fail with [`Error::OutOfRange`].
#[derive(Debug, Clone)]
pub struct FlatLcdm {
    h0: f64,
    om0: f64,
    table_z: Vec<f64>,
    table_chi: Vec<f64>,
    power: Arc<dyn MatterPowerSpectrum>,
}

impl FlatLcdm {
    /// Planck 2018 (TT,TE,EE+lowE+lensing) Hubble constant in km/s/Mpc.
    pub const PLANCK18_H0: f64 = 67.36;
    /// Planck 2018 matter density parameter.
    pub const PLANCK18_OM0: f64 = 0.3153;

    /// Create a background valid up to `z_max`.
    pub fn new(h0: f64, om0: f64, z_max: f64, power: Arc<dyn MatterPowerSpectrum>) -> Result<Self> {
        Self::with_table_intervals(h0, om0, z_max, DEFAULT_TABLE_INTERVALS, power)
    }

    /// Planck 2018 background valid up to `z_max`.
    pub fn planck18(z_max: f64, power: Arc<dyn MatterPowerSpectrum>) -> Result<Self> {
        Self::new(Self::PLANCK18_H0, Self::PLANCK18_OM0, z_max, power)
    }

    /// Create a background with an explicit table resolution.
    pub fn with_table_intervals(
        h0: f64,
        om0: f64,
        z_max: f64,
        intervals: usize,
        power: Arc<dyn MatterPowerSpectrum>,
    ) -> Result<Self> {
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(Error::Validation(format!("H0 must be finite and > 0, got {h0}")));
        }
        if !om0.is_finite() || !(0.0..=1.0).contains(&om0) {
            return Err(Error::Validation(format!(
                "Om0 must lie in [0, 1] for a flat model, got {om0}"
            )));
        }
        if !z_max.is_finite() || z_max <= 0.0 {
            return Err(Error::Validation(format!("z_max must be finite and > 0, got {z_max}")));
        }
        if intervals == 0 {
            return Err(Error::Validation("distance table needs at least one interval".to_string()));
        }

        let mut cosmo = Self { h0, om0, table_z: Vec::new(), table_chi: Vec::new(), power };
        let dz = z_max / intervals as f64;
        let mut table_z = Vec::with_capacity(intervals + 1);
        let mut table_chi = Vec::with_capacity(intervals + 1);
        table_z.push(0.0);
        table_chi.push(0.0);
        let mut acc = 0.0;
        for i in 0..intervals {
            let a = dz * i as f64;
            let b = if i + 1 == intervals { z_max } else { dz * (i + 1) as f64 };
            acc += cosmo.simpson_segment(a, b);
            table_z.push(b);
            table_chi.push(acc);
        }
        cosmo.table_z = table_z;
        cosmo.table_chi = table_chi;
        tracing::debug!(h0, om0, z_max, intervals, "tabulated comoving distance");
        Ok(cosmo)
    }

    /// Largest redshift for which distances are available.
    pub fn z_max(&self) -> f64 {
        self.table_z[self.table_z.len() - 1]
    }

    #[inline]
    fn e_of_z(&self, z: f64) -> f64 {
        (self.om0 * (1.0 + z).powi(3) + (1.0 - self.om0)).sqrt()
    }

    /// Simpson estimate of `∫_a^b c / H(z) dz`.
    fn simpson_segment(&self, a: f64, b: f64) -> f64 {
        let integrand = |z: f64| SPEED_OF_LIGHT_KM_S / (self.h0 * self.e_of_z(z));
        (b - a) / 6.0 * (integrand(a) + 4.0 * integrand(0.5 * (a + b)) + integrand(b))
    }
}

impl Cosmology for FlatLcdm {
    fn h0(&self) -> f64 {
        self.h0
    }

    fn om0(&self) -> f64 {
        self.om0
    }

    fn hz(&self, z: f64) -> Result<f64> {
        if !z.is_finite() || z < 0.0 {
            return Err(Error::OutOfRange {
                quantity: "Hubble rate",
                value: z,
                low: 0.0,
                high: f64::INFINITY,
            });
        }
        Ok(self.h0 * self.e_of_z(z))
    }

    fn chi(&self, z: f64) -> Result<f64> {
        let (i, _) = locate(&self.table_z, z).ok_or(Error::OutOfRange {
            quantity: "comoving distance",
            value: z,
            low: 0.0,
            high: self.z_max(),
        })?;
        Ok(self.table_chi[i] + self.simpson_segment(self.table_z[i], z))
    }

    fn matter_power_spectrum_interpolator(&self) -> Result<Arc<dyn MatterPowerSpectrum>> {
        Ok(Arc::clone(&self.power))
    }
}
