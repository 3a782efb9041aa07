//! Angular power spectra in the Limber approximation.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};

use cs_core::constants::SPEED_OF_LIGHT_KM_S;
use cs_core::{Cosmology, Error, MatterPowerSpectrum, RadialBin, RedshiftGrid, Result};

use crate::math::{evaluate_on, trapezoid_weights};
use crate::tracer::Tracer;

/// Angular cross-power spectra between tracers for one cosmology.
#[derive(Debug, Clone)]
pub struct Power {
    cosmology: Arc<dyn Cosmology>,
    pm: Arc<dyn MatterPowerSpectrum>,
}

impl Power {
    /// Bind to a cosmology; its power spectrum interpolator is fetched once.
    pub fn new(cosmology: Arc<dyn Cosmology>) -> Result<Self> {
        let pm = cosmology.matter_power_spectrum_interpolator()?;
        Ok(Self { cosmology, pm })
    }

    /// The bound cosmology.
    pub fn cosmology(&self) -> &dyn Cosmology {
        self.cosmology.as_ref()
    }

    /// Limber wavenumbers `k(z) = (ℓ + 1/2) / χ(z)` in 1/Mpc.
    pub fn k(&self, l: u32, z: &RedshiftGrid) -> Result<DVector<f64>> {
        let ell = f64::from(l) + 0.5;
        evaluate_on(z.as_vector(), |zi| {
            let chi = self.cosmology.chi(zi)?;
            if !(chi > 0.0) {
                return Err(Error::Computation(format!(
                    "Limber wavenumber undefined where χ({zi}) = {chi}"
                )));
            }
            Ok(ell / chi)
        })
    }

    /// `C_ℓ` between every kernel of `tracer1` (bin `bin1`) and every kernel of
    /// `tracer2` (bin `bin2`).
    ///
    /// Entry `(i, j)` is `∫ c K1_i(z) K2_j(z) P_m(z, k(z)) / (χ²(z) H(z)) dz` by
    /// the trapezoid rule on `z`. The result has shape
    /// `(tracer1.nkernels(), tracer2.nkernels())`.
    pub fn cls(
        &self,
        l: u32,
        bin1: &RadialBin,
        bin2: &RadialBin,
        tracer1: &Tracer,
        tracer2: &Tracer,
        z: &RedshiftGrid,
    ) -> Result<DMatrix<f64>> {
        tracing::debug!(l, z1 = bin1.center(), z2 = bin2.center(), nz = z.len(), "computing cls");

        let k = self.k(l, z)?;
        let pm = self.pm.pm_paired(z.as_vector(), &k)?;

        let kfs1 = tracer1.compute_kernel_functions(bin1, self.cosmology(), z)?;
        let kfs2 = tracer2.compute_kernel_functions(bin2, self.cosmology(), z)?;

        let chi2hz = evaluate_on(z.as_vector(), |zi| self.cosmology.chi2hz(zi))?;
        let weights = trapezoid_weights(z.as_vector());
        let line_of_sight = pm.component_mul(&weights).component_div(&chi2hz) * SPEED_OF_LIGHT_KM_S;

        // Σ_z K1[i, z] w(z) K2[j, z]: scale the columns of K1, then contract.
        let mut weighted = kfs1;
        for (mut column, factor) in weighted.column_iter_mut().zip(line_of_sight.iter()) {
            column *= *factor;
        }
        let out = weighted * kfs2.transpose();

        if let Some(bad) = out.iter().find(|v| !v.is_finite()) {
            return Err(Error::Computation(format!("non-finite C_ℓ {bad} at ℓ={l}")));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::Bias;
    use crate::density::NumberDensity;
    use crate::kernel::Kernel;
    use crate::math::trapz;
    use crate::window::WindowFunction;
    use approx::assert_relative_eq;
    use cs_cosmo::{ConstantPowerSpectrum, FlatLcdm};

    fn planck() -> Arc<dyn Cosmology> {
        Arc::new(
            FlatLcdm::planck18(2.0, Arc::new(ConstantPowerSpectrum::new(1.0).unwrap())).unwrap(),
        )
    }

    fn gw(cosmo: &Arc<dyn Cosmology>) -> Tracer {
        Tracer::new(
            "gw",
            NumberDensity::uniform_in_volume(3e-6, Arc::clone(cosmo)).unwrap(),
            Bias::constant(1.2).unwrap(),
            vec![
                (
                    Kernel::Clustering,
                    WindowFunction::lognormal_clustering(Arc::clone(cosmo), 0.05).unwrap(),
                ),
                (
                    Kernel::WeakLensing,
                    WindowFunction::lognormal_lensing(Arc::clone(cosmo), 0.05).unwrap(),
                ),
            ],
        )
        .unwrap()
    }

    fn galaxy(cosmo: &Arc<dyn Cosmology>) -> Tracer {
        Tracer::new(
            "galaxy",
            NumberDensity::uniform_in_volume(1e-3, Arc::clone(cosmo)).unwrap(),
            Bias::SqrtOnePlusZ,
            vec![
                (Kernel::Clustering, WindowFunction::Box),
                (Kernel::WeakLensing, WindowFunction::Box),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_limber_wavenumber() {
        let cosmo = planck();
        let power = Power::new(Arc::clone(&cosmo)).unwrap();
        let z = RedshiftGrid::linspace(0.1, 1.0, 5).unwrap();
        let k = power.k(100, &z).unwrap();
        for (i, &zi) in z.values().iter().enumerate() {
            assert_relative_eq!(k[i], 100.5 / cosmo.chi(zi).unwrap(), max_relative = 1e-14);
        }
    }

    #[test]
    fn test_limber_wavenumber_undefined_at_origin() {
        let power = Power::new(planck()).unwrap();
        let z = RedshiftGrid::new(vec![0.0, 0.5]).unwrap();
        assert!(matches!(power.k(10, &z), Err(Error::Computation(_))));
    }

    #[test]
    fn test_shape_matches_kernel_counts() {
        let cosmo = planck();
        let power = Power::new(Arc::clone(&cosmo)).unwrap();
        let z = RedshiftGrid::linspace(0.001, 1.2, 150).unwrap();
        let b1 = RadialBin::new(0.2, 0.4).unwrap();
        let b2 = RadialBin::new(0.6, 0.8).unwrap();
        let cls = power.cls(100, &b1, &b2, &gw(&cosmo), &galaxy(&cosmo), &z).unwrap();
        assert_eq!(cls.shape(), (2, 2));
    }

    #[test]
    fn test_swap_symmetry_with_lensing() {
        let cosmo = planck();
        let power = Power::new(Arc::clone(&cosmo)).unwrap();
        let z = RedshiftGrid::linspace(0.001, 1.2, 150).unwrap();
        let b1 = RadialBin::new(0.2, 0.4).unwrap();
        let b2 = RadialBin::new(0.6, 0.8).unwrap();
        let (t1, t2) = (gw(&cosmo), galaxy(&cosmo));
        let forward = power.cls(100, &b1, &b2, &t1, &t2, &z).unwrap();
        let backward = power.cls(100, &b2, &b1, &t2, &t1, &z).unwrap();
        let scale = forward.amax();
        assert!(scale > 0.0);
        for i in 0..t1.nkernels() {
            for j in 0..t2.nkernels() {
                assert_relative_eq!(
                    forward[(i, j)],
                    backward[(j, i)],
                    max_relative = 1e-12,
                    epsilon = 1e-12 * scale
                );
            }
        }
    }

    #[test]
    fn test_matches_direct_integral() {
        let cosmo = planck();
        let power = Power::new(Arc::clone(&cosmo)).unwrap();
        let z = RedshiftGrid::linspace(0.001, 1.2, 120).unwrap();
        let b1 = RadialBin::new(0.1, 0.7).unwrap();
        let b2 = RadialBin::new(0.4, 1.0).unwrap();
        let (t1, t2) = (gw(&cosmo), galaxy(&cosmo));
        let cls = power.cls(30, &b1, &b2, &t1, &t2, &z).unwrap();

        let kfs1 = t1.compute_kernel_functions(&b1, cosmo.as_ref(), &z).unwrap();
        let kfs2 = t2.compute_kernel_functions(&b2, cosmo.as_ref(), &z).unwrap();
        let chi2hz = z.as_vector().map(|zi| cosmo.chi2hz(zi).unwrap());
        let scale = cls.amax();
        for i in 0..2 {
            for j in 0..2 {
                let integrand = DVector::from_fn(z.len(), |n, _| {
                    SPEED_OF_LIGHT_KM_S * kfs1[(i, n)] * kfs2[(j, n)] / chi2hz[n]
                });
                let expected = trapz(&integrand, z.as_vector());
                assert_relative_eq!(
                    cls[(i, j)],
                    expected,
                    max_relative = 1e-12,
                    epsilon = 1e-12 * scale
                );
            }
        }
    }

    #[test]
    fn test_provider_errors_propagate() {
        // Background tabulated only to z = 1, queried on a grid reaching 1.2.
        let unit = Arc::new(ConstantPowerSpectrum::new(1.0).unwrap());
        let cosmo: Arc<dyn Cosmology> = Arc::new(FlatLcdm::planck18(1.0, unit).unwrap());
        let power = Power::new(Arc::clone(&cosmo)).unwrap();
        let z = RedshiftGrid::linspace(0.001, 1.2, 50).unwrap();
        let bin = RadialBin::new(0.2, 0.4).unwrap();
        let t = galaxy(&cosmo);
        assert!(matches!(power.cls(100, &bin, &bin, &t, &t, &z), Err(Error::OutOfRange { .. })));
    }
}
