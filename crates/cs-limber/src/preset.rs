//! Ready-made tracer pairs and the spectrum blocks of a GW × galaxy run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use cs_core::{Cosmology, RedshiftGrid, Result};

use crate::bias::Bias;
use crate::density::NumberDensity;
use crate::kernel::Kernel;
use crate::power::Power;
use crate::survey::CrossSpectra;
use crate::tracer::Tracer;
use crate::window::WindowFunction;

/// Parameters of the gravitational-wave × galaxy cross-correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GwGalaxyParams {
    /// Comoving density of GW events, Mpc^-3.
    pub ngw: f64,
    /// Comoving density of galaxies, Mpc^-3.
    pub ng: f64,
    /// Scatter of `ln D_L` for GW events.
    pub sigma_lnd: f64,
    /// Constant GW bias.
    pub bias_gw: f64,
    /// Constant galaxy bias.
    pub bias_g: f64,
}

impl Default for GwGalaxyParams {
    fn default() -> Self {
        Self { ngw: 3e-6, ng: 1e-3, sigma_lnd: 0.05, bias_gw: 1.0, bias_g: 1.0 }
    }
}

/// GW and galaxy tracers.
///
/// GW events are uniform in comoving volume and observed through clustering
/// and lensing, each smeared by the log-normal distance error. Galaxies are
/// uniform in comoving volume with spectroscopic (box) bins and clustering only.
pub fn gw_galaxy_tracers(
    cosmology: Arc<dyn Cosmology>,
    params: &GwGalaxyParams,
) -> Result<(Tracer, Tracer)> {
    let gw = Tracer::new(
        "gw",
        NumberDensity::uniform_in_volume(params.ngw, Arc::clone(&cosmology))?,
        Bias::constant(params.bias_gw)?,
        vec![
            (
                Kernel::Clustering,
                WindowFunction::lognormal_clustering(Arc::clone(&cosmology), params.sigma_lnd)?,
            ),
            (
                Kernel::WeakLensing,
                WindowFunction::lognormal_lensing(Arc::clone(&cosmology), params.sigma_lnd)?,
            ),
        ],
    )?;
    let galaxy = Tracer::new(
        "galaxy",
        NumberDensity::uniform_in_volume(params.ng, cosmology)?,
        Bias::constant(params.bias_g)?,
        vec![(Kernel::Clustering, WindowFunction::Box)],
    )?;
    Ok((gw, galaxy))
}

/// The three tracer pairings of a GW × galaxy run, keyed by block name.
///
/// Together they hold every spectrum of the run:
/// - `gw_gw`: GW clustering auto-spectrum, clustering × lensing and lensing auto;
/// - `galaxy_galaxy`: galaxy auto-spectrum;
/// - `gw_galaxy`: GW clustering × galaxies and GW lensing × galaxies.
pub fn gw_galaxy_spectra(
    power: &Power,
    gw: &Tracer,
    galaxy: &Tracer,
    z: &RedshiftGrid,
) -> Vec<(&'static str, CrossSpectra)> {
    let block = |t1: &Tracer, t2: &Tracer| {
        CrossSpectra::new(power.clone(), t1.clone(), t2.clone(), z.clone())
    };
    vec![
        ("gw_gw", block(gw, gw)),
        ("galaxy_galaxy", block(galaxy, galaxy)),
        ("gw_galaxy", block(gw, galaxy)),
    ]
}
