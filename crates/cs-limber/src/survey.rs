//! Batch evaluation of `C_ℓ` over multipoles and bin pairs.

use rayon::prelude::*;
use serde::Serialize;

use cs_core::{RadialBin, RedshiftGrid, Result};

use crate::power::Power;
use crate::tracer::Tracer;

/// One `(ℓ, bin1, bin2)` evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct ClsEntry {
    /// Multipole.
    pub l: u32,
    /// Bin of the first tracer.
    pub bin1: RadialBin,
    /// Bin of the second tracer.
    pub bin2: RadialBin,
    /// `cls[i][j]` between kernel `i` of the first tracer and kernel `j` of the second.
    pub cls: Vec<Vec<f64>>,
}

/// All evaluations of one run, with kernel labels for both tracers.
#[derive(Debug, Clone, Serialize)]
pub struct ClsTable {
    /// Row labels (`"<tracer> <kernel>"`) of every `cls` matrix.
    pub labels1: Vec<String>,
    /// Column labels of every `cls` matrix.
    pub labels2: Vec<String>,
    /// Evaluations, ordered by multipole then by bin pair.
    pub entries: Vec<ClsEntry>,
}

/// Two tracers, a shared redshift grid and a [`Power`] evaluator.
#[derive(Debug, Clone)]
pub struct CrossSpectra {
    power: Power,
    tracer1: Tracer,
    tracer2: Tracer,
    z: RedshiftGrid,
}

impl CrossSpectra {
    /// Bundle the inputs of a run.
    pub fn new(power: Power, tracer1: Tracer, tracer2: Tracer, z: RedshiftGrid) -> Self {
        Self { power, tracer1, tracer2, z }
    }

    /// The shared grid.
    pub fn grid(&self) -> &RedshiftGrid {
        &self.z
    }

    /// Evaluate every `(ℓ, pair)` combination.
    ///
    /// With `parallel`, evaluations are spread over the rayon pool; every
    /// evaluation only reads shared state, and the output order is the same
    /// either way.
    pub fn compute(
        &self,
        ells: &[u32],
        pairs: &[(RadialBin, RadialBin)],
        parallel: bool,
    ) -> Result<ClsTable> {
        let jobs: Vec<(u32, RadialBin, RadialBin)> =
            ells.iter().flat_map(|&l| pairs.iter().map(move |&(b1, b2)| (l, b1, b2))).collect();
        tracing::debug!(
            multipoles = ells.len(),
            pairs = pairs.len(),
            parallel,
            "computing cross spectra"
        );

        let run = |&(l, bin1, bin2): &(u32, RadialBin, RadialBin)| -> Result<ClsEntry> {
            let m = self.power.cls(l, &bin1, &bin2, &self.tracer1, &self.tracer2, &self.z)?;
            let cls = m.row_iter().map(|row| row.iter().copied().collect()).collect();
            Ok(ClsEntry { l, bin1, bin2, cls })
        };
        let entries = if parallel {
            jobs.par_iter().map(run).collect::<Result<Vec<_>>>()?
        } else {
            jobs.iter().map(run).collect::<Result<Vec<_>>>()?
        };

        Ok(ClsTable { labels1: self.tracer1.labels(), labels2: self.tracer2.labels(), entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::Bias;
    use crate::density::NumberDensity;
    use crate::kernel::Kernel;
    use crate::window::WindowFunction;
    use cs_core::Cosmology;
    use cs_cosmo::{ConstantPowerSpectrum, FlatLcdm};
    use std::sync::Arc;

    fn setup() -> CrossSpectra {
        let unit = Arc::new(ConstantPowerSpectrum::new(1.0).unwrap());
        let cosmo: Arc<dyn Cosmology> = Arc::new(FlatLcdm::planck18(2.0, unit).unwrap());
        let tracer = Tracer::new(
            "galaxy",
            NumberDensity::uniform_in_volume(1e-3, Arc::clone(&cosmo)).unwrap(),
            Bias::default(),
            vec![
                (Kernel::Clustering, WindowFunction::Box),
                (Kernel::WeakLensing, WindowFunction::Box),
            ],
        )
        .unwrap();
        let z = RedshiftGrid::linspace(0.001, 1.2, 80).unwrap();
        CrossSpectra::new(Power::new(cosmo).unwrap(), tracer.clone(), tracer, z)
    }

    #[test]
    fn test_parallel_matches_serial() {
        let spectra = setup();
        let bins = RadialBin::equal_width(0.001, 1.2, 3).unwrap();
        let pairs: Vec<_> = bins.iter().map(|b| (*b, bins[1])).collect();
        let serial = spectra.compute(&[10, 100], &pairs, false).unwrap();
        let parallel = spectra.compute(&[10, 100], &pairs, true).unwrap();
        assert_eq!(serial.entries.len(), 6);
        for (a, b) in serial.entries.iter().zip(parallel.entries.iter()) {
            assert_eq!(a.l, b.l);
            assert_eq!(a.bin1, b.bin1);
            assert_eq!(a.cls, b.cls);
        }
        assert_eq!(serial.entries[0].l, 10);
        assert_eq!(serial.entries[3].l, 100);
    }

    #[test]
    fn test_table_serializes_with_labels() {
        let spectra = setup();
        let bins = RadialBin::equal_width(0.001, 1.2, 2).unwrap();
        let table = spectra.compute(&[50], &[(bins[0], bins[1])], false).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["labels1"][1], "galaxy weak_lensing");
        assert_eq!(json["entries"][0]["cls"].as_array().unwrap().len(), 2);
    }
}
