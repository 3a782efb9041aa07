//! Provider traits consumed by the Limber engine.
//!
//! The engine never solves for the expansion history or the matter power
//! spectrum itself. It asks a [`Cosmology`] for distances and expansion rates
//! and for a [`MatterPowerSpectrum`] interpolator, and propagates whatever
//! errors those providers return.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use nalgebra::DVector;

use crate::constants::{GRAVITATIONAL_CONSTANT, SPEED_OF_LIGHT_KM_S};
use crate::{Error, Result};

/// Two-argument matter power spectrum `P_m(z, k)`.
///
/// `k` is in 1/Mpc (no `h` units) and `P_m` in Mpc^3.
pub trait MatterPowerSpectrum: Send + Sync + fmt::Debug {
    /// Evaluate `P_m` at a single `(z, k)`.
    fn pm(&self, z: f64, k: f64) -> Result<f64>;

    /// Evaluate along the paired points `(z[i], k[i])`.
    ///
    /// This is a diagonal evaluation, not an outer product over `z` and `k`.
    fn pm_paired(&self, z: &DVector<f64>, k: &DVector<f64>) -> Result<DVector<f64>> {
        if z.len() != k.len() {
            return Err(Error::Validation(format!(
                "paired power spectrum evaluation needs equal lengths, got z={} k={}",
                z.len(),
                k.len()
            )));
        }
        let values =
            z.iter().zip(k.iter()).map(|(&zi, &ki)| self.pm(zi, ki)).collect::<Result<Vec<_>>>()?;
        Ok(DVector::from_vec(values))
    }
}

/// Expansion history and distance provider.
///
/// Implementors supply `H0`, `Ωm0`, `H(z)`, `χ(z)` and a power spectrum. The
/// remaining queries have flat-universe defaults expressed in terms of those;
/// override them for curved models or when the backend has a better answer.
pub trait Cosmology: Send + Sync + fmt::Debug {
    /// Hubble constant in km/s/Mpc.
    fn h0(&self) -> f64;

    /// Present-day matter density parameter.
    fn om0(&self) -> f64;

    /// Hubble rate `H(z)` in km/s/Mpc.
    fn hz(&self, z: f64) -> Result<f64>;

    /// Comoving radial distance `χ(z)` in Mpc.
    fn chi(&self, z: f64) -> Result<f64>;

    /// Matter power spectrum interpolator bound to this background.
    fn matter_power_spectrum_interpolator(&self) -> Result<Arc<dyn MatterPowerSpectrum>>;

    /// Hubble distance `c / H0` in Mpc.
    fn hubble_distance(&self) -> f64 {
        SPEED_OF_LIGHT_KM_S / self.h0()
    }

    /// Dimensionless expansion rate `E(z) = H(z) / H0`.
    fn efunc(&self, z: f64) -> Result<f64> {
        Ok(self.hz(z)? / self.h0())
    }

    /// Matter density parameter at redshift `z`: `Ωm0 (1+z)^3 / E(z)^2`.
    fn om(&self, z: f64) -> Result<f64> {
        let e = self.efunc(z)?;
        Ok(self.om0() * (1.0 + z).powi(3) / (e * e))
    }

    /// Luminosity distance in Mpc.
    fn dl(&self, z: f64) -> Result<f64> {
        Ok((1.0 + z) * self.chi(z)?)
    }

    /// Angular-diameter distance in Mpc.
    fn angular_diameter_distance(&self, z: f64) -> Result<f64> {
        Ok(self.chi(z)? / (1.0 + z))
    }

    /// Angular-diameter distance between `z1` and `z2` (flat universe).
    ///
    /// Negative when `z1 > z2`; callers that need a lens/source ordering mask
    /// it themselves.
    fn da12(&self, z1: f64, z2: f64) -> Result<f64> {
        Ok((self.chi(z2)? - self.chi(z1)?) / (1.0 + z2))
    }

    /// `χ(z)^2 / H(z)`, the comoving-volume Jacobian up to `4πc`.
    fn chi2_over_hz(&self, z: f64) -> Result<f64> {
        let chi = self.chi(z)?;
        Ok(chi * chi / self.hz(z)?)
    }

    /// `χ(z)^2 H(z)`, the Limber projection Jacobian.
    fn chi2hz(&self, z: f64) -> Result<f64> {
        let chi = self.chi(z)?;
        Ok(chi * chi * self.hz(z)?)
    }

    /// Critical density today, `3 H0^2 / (8 π G)`, in M_sun / Mpc^3.
    fn critical_density0(&self) -> f64 {
        3.0 * self.h0() * self.h0() / (8.0 * PI * GRAVITATIONAL_CONSTANT)
    }

    /// Critical surface density `c^2 / (4 π G) · D_s / (D_l D_ls)` in M_sun / Mpc^2.
    fn critical_surface_density(&self, z_lens: f64, z_source: f64) -> Result<f64> {
        if z_source <= z_lens {
            return Err(Error::Validation(format!(
                "critical surface density needs z_lens < z_source, got {z_lens} >= {z_source}"
            )));
        }
        let ds = self.angular_diameter_distance(z_source)?;
        let dl = self.angular_diameter_distance(z_lens)?;
        let dls = self.da12(z_lens, z_source)?;
        let prefactor =
            SPEED_OF_LIGHT_KM_S * SPEED_OF_LIGHT_KM_S / (4.0 * PI * GRAVITATIONAL_CONSTANT);
        Ok(prefactor * ds / (dl * dls))
    }
}
