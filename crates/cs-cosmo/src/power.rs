//! Matter power spectrum interpolators.

use std::path::Path;

use cs_core::{Error, MatterPowerSpectrum, Result};
use serde::{Deserialize, Serialize};

use crate::interp::{lerp, locate};

/// `P_m(z, k) = value` everywhere.
///
/// Useful for isolating the geometric part of a Limber integral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantPowerSpectrum {
    value: f64,
}

impl ConstantPowerSpectrum {
    /// Create a constant spectrum; `value` must be finite and non-negative.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::Validation(format!(
                "constant power must be finite and >= 0, got {value}"
            )));
        }
        Ok(Self { value })
    }
}

impl MatterPowerSpectrum for ConstantPowerSpectrum {
    fn pm(&self, _z: f64, _k: f64) -> Result<f64> {
        Ok(self.value)
    }
}

/// On-disk `P(z, k)` table.
///
/// `pk[i][j]` is the power at `z[i]`, `k[j]`. `k` is in 1/Mpc and `pk` in Mpc^3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerTable {
    /// Redshift nodes, strictly increasing.
    pub z: Vec<f64>,
    /// Wavenumber nodes, strictly increasing and positive.
    pub k: Vec<f64>,
    /// Power values, one row per redshift.
    pub pk: Vec<Vec<f64>>,
}

/// Bilinear interpolator in `(z, ln k)` over `ln P`.
///
/// Queries outside the tabulated `z` range are rejected. Queries outside the
/// `k` range are rejected too, unless power-law extrapolation from the two
/// outermost nodes is enabled with [`TabulatedPowerSpectrum::with_k_extrapolation`].
#[derive(Debug, Clone)]
pub struct TabulatedPowerSpectrum {
    z: Vec<f64>,
    ln_k: Vec<f64>,
    /// Row-major `nz x nk`.
    ln_pk: Vec<f64>,
    extrapolate_k: bool,
}

impl TabulatedPowerSpectrum {
    /// Build from a validated table.
    pub fn from_table(table: PowerTable) -> Result<Self> {
        let PowerTable { z, k, pk } = table;
        if z.len() < 2 || k.len() < 2 {
            return Err(Error::Validation(format!(
                "power table needs at least 2 nodes per axis, got nz={} nk={}",
                z.len(),
                k.len()
            )));
        }
        if !is_strictly_increasing(&z) {
            return Err(Error::Validation(
                "power table z nodes must be strictly increasing".to_string(),
            ));
        }
        if k.iter().any(|&v| !v.is_finite() || v <= 0.0) || !is_strictly_increasing(&k) {
            return Err(Error::Validation(
                "power table k nodes must be positive and strictly increasing".to_string(),
            ));
        }
        if pk.len() != z.len() {
            return Err(Error::Validation(format!(
                "power table has {} rows, expected one per z node ({})",
                pk.len(),
                z.len()
            )));
        }

        let nk = k.len();
        let mut ln_pk = Vec::with_capacity(z.len() * nk);
        for (i, row) in pk.iter().enumerate() {
            if row.len() != nk {
                return Err(Error::Validation(format!(
                    "power table row {i} has {} entries, expected {nk}",
                    row.len()
                )));
            }
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() || p <= 0.0 {
                    return Err(Error::Validation(format!(
                        "power table entry ({i}, {j}) must be > 0, got {p}"
                    )));
                }
                ln_pk.push(p.ln());
            }
        }

        Ok(Self { z, ln_k: k.iter().map(|v| v.ln()).collect(), ln_pk, extrapolate_k: false })
    }

    /// Extrapolate `ln P` linearly in `ln k` beyond the tabulated wavenumbers.
    pub fn with_k_extrapolation(mut self) -> Self {
        self.extrapolate_k = true;
        self
    }

    /// Load a [`PowerTable`] from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading power table");
        let json = std::fs::read_to_string(path)?;
        let table: PowerTable = serde_json::from_str(&json)?;
        Self::from_table(table)
    }

    /// Tabulated redshift range.
    pub fn z_range(&self) -> (f64, f64) {
        (self.z[0], self.z[self.z.len() - 1])
    }

    /// Tabulated wavenumber range in 1/Mpc.
    pub fn k_range(&self) -> (f64, f64) {
        (self.ln_k[0].exp(), self.ln_k[self.ln_k.len() - 1].exp())
    }
}

impl MatterPowerSpectrum for TabulatedPowerSpectrum {
    fn pm(&self, z: f64, k: f64) -> Result<f64> {
        let (zlo, zhi) = self.z_range();
        let (iz, tz) =
            locate(&self.z, z).ok_or(Error::OutOfRange {
                quantity: "power spectrum redshift",
                value: z,
                low: zlo,
                high: zhi,
            })?;
        let (klo, khi) = self.k_range();
        let ln_k = if k > 0.0 { k.ln() } else { f64::NAN };
        let nk = self.ln_k.len();
        let (ik, tk) = match locate(&self.ln_k, ln_k) {
            Some(cell) => cell,
            None if self.extrapolate_k && ln_k.is_finite() => {
                // Reuse the outermost cell; t falls outside [0, 1].
                let i = if ln_k < self.ln_k[0] { 0 } else { nk - 2 };
                (i, (ln_k - self.ln_k[i]) / (self.ln_k[i + 1] - self.ln_k[i]))
            }
            None => {
                return Err(Error::OutOfRange {
                    quantity: "power spectrum wavenumber",
                    value: k,
                    low: klo,
                    high: khi,
                });
            }
        };

        let at = |i: usize, j: usize| self.ln_pk[i * nk + j];
        let lower = lerp(at(iz, ik), at(iz, ik + 1), tk);
        let upper = lerp(at(iz + 1, ik), at(iz + 1, ik + 1), tk);
        Ok(lerp(lower, upper, tz).exp())
    }
}

fn is_strictly_increasing(xs: &[f64]) -> bool {
    xs.iter().all(|v| v.is_finite()) && xs.windows(2).all(|w| w[1] > w[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn power_law_table() -> PowerTable {
        // P = A (1+z)^-2 k^-1, exactly log-bilinear in (z, ln k) along k only.
        let z = vec![0.0, 0.5, 1.0];
        let k = vec![1e-3, 1e-2, 1e-1, 1.0];
        let pk = z
            .iter()
            .map(|&zi: &f64| k.iter().map(|&kj| 1e4 / (1.0 + zi).powi(2) / kj).collect())
            .collect();
        PowerTable { z, k, pk }
    }

    #[test]
    fn test_nodes_are_reproduced() {
        let p = TabulatedPowerSpectrum::from_table(power_law_table()).unwrap();
        assert_relative_eq!(p.pm(0.5, 1e-2).unwrap(), 1e4 / 2.25 / 1e-2, max_relative = 1e-12);
        assert_relative_eq!(p.pm(1.0, 1.0).unwrap(), 1e4 / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_power_law_in_k_is_exact_between_nodes() {
        let p = TabulatedPowerSpectrum::from_table(power_law_table()).unwrap();
        let k = 3e-2;
        assert_relative_eq!(p.pm(0.0, k).unwrap(), 1e4 / k, max_relative = 1e-10);
    }

    #[test]
    fn test_out_of_table_queries_fail() {
        let p = TabulatedPowerSpectrum::from_table(power_law_table()).unwrap();
        assert!(matches!(p.pm(1.2, 0.1), Err(Error::OutOfRange { .. })));
        assert!(matches!(p.pm(0.2, 2.0), Err(Error::OutOfRange { .. })));
        assert!(p.pm(0.2, 0.0).is_err());
    }

    #[test]
    fn test_k_extrapolation_continues_power_law() {
        let p =
            TabulatedPowerSpectrum::from_table(power_law_table()).unwrap().with_k_extrapolation();
        assert_relative_eq!(p.pm(0.0, 10.0).unwrap(), 1e4 / 10.0, max_relative = 1e-10);
        assert_relative_eq!(p.pm(0.0, 1e-4).unwrap(), 1e4 / 1e-4, max_relative = 1e-10);
        assert!(p.pm(1.5, 0.1).is_err());
        assert!(p.pm(0.5, -1.0).is_err());
    }

    #[test]
    fn test_malformed_tables_rejected() {
        let mut t = power_law_table();
        t.pk[1].pop();
        assert!(TabulatedPowerSpectrum::from_table(t).is_err());

        let mut t = power_law_table();
        t.k[2] = t.k[1];
        assert!(TabulatedPowerSpectrum::from_table(t).is_err());

        let mut t = power_law_table();
        t.pk[0][0] = -1.0;
        assert!(TabulatedPowerSpectrum::from_table(t).is_err());
    }

    #[test]
    fn test_table_json_roundtrip_through_file() {
        let path = std::env::temp_dir().join(format!("cs_cosmo_power_{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&power_law_table()).unwrap()).unwrap();
        let p = TabulatedPowerSpectrum::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(p.z_range(), (0.0, 1.0));
    }

    #[test]
    fn test_constant_power() {
        let p = ConstantPowerSpectrum::new(2.5).unwrap();
        assert_eq!(p.pm(0.3, 42.0).unwrap(), 2.5);
        assert!(ConstantPowerSpectrum::new(f64::NAN).is_err());
    }
}
