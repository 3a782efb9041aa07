//! Run configuration (JSON) for the `cls` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cs_limber::GwGalaxyParams;
use serde::{Deserialize, Serialize};

/// Everything needed to reproduce one run. Written next to the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Number of equal-width redshift bins.
    pub nbins: usize,
    /// Lower edge of the redshift range (grid start and first bin edge).
    pub zmin: f64,
    /// Upper edge of the redshift range.
    pub zmax: f64,
    /// Number of points of the redshift grid.
    pub npoints: usize,
    /// Index of the galaxy bin every GW bin is correlated with.
    pub galbin: usize,
    /// Multipoles.
    pub ells: Vec<u32>,
    /// Hubble constant, km/s/Mpc.
    pub h0: f64,
    /// Matter density parameter.
    pub om0: f64,
    /// Tabulated matter power spectrum (JSON). Without it `P_m = 1`.
    pub power_table: Option<PathBuf>,
    /// Power-law extrapolation of the table beyond its `k` range.
    pub extrapolate_k: bool,
    /// Tracer parameters.
    pub tracers: GwGalaxyParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            nbins: 6,
            zmin: 1e-3,
            zmax: 1.2,
            npoints: 1000,
            galbin: 3,
            ells: vec![100],
            h0: 67.36,
            om0: 0.3153,
            power_table: None,
            extrapolate_k: true,
            tracers: GwGalaxyParams::default(),
        }
    }
}

impl RunConfig {
    /// Read a configuration file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.nbins == 0 {
            bail!("nbins must be > 0");
        }
        if self.galbin >= self.nbins {
            bail!("galbin {} out of range for {} bins", self.galbin, self.nbins);
        }
        if !(self.zmin > 0.0 && self.zmax > self.zmin) {
            bail!(
                "redshift range must satisfy 0 < zmin < zmax, got ({}, {})",
                self.zmin,
                self.zmax
            );
        }
        if self.npoints < 2 {
            bail!("npoints must be >= 2, got {}", self.npoints);
        }
        if self.ells.is_empty() {
            bail!("at least one multipole is required");
        }
        Ok(())
    }
}
