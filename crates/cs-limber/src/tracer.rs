//! Tracers: one population observed through one or more kernels.

use nalgebra::{DMatrix, DVector};

use cs_core::{Cosmology, Error, RadialBin, RedshiftGrid, Result};

use crate::bias::Bias;
use crate::density::NumberDensity;
use crate::kernel::Kernel;
use crate::math::{NORMALIZATION_EPSILON, normalize};
use crate::window::WindowFunction;

/// A number density and a bias observed through `(kernel, window)` pairs.
///
/// Each kernel owns exactly one window function. The pairing is fixed at
/// construction and kernels are unique, so looking a window up by kernel name
/// is unambiguous.
#[derive(Debug, Clone)]
pub struct Tracer {
    name: String,
    density: NumberDensity,
    bias: Bias,
    pairs: Vec<(Kernel, WindowFunction)>,
    normalization_epsilon: f64,
}

impl Tracer {
    /// Build a tracer from explicit `(kernel, window)` pairs.
    pub fn new(
        name: impl Into<String>,
        density: NumberDensity,
        bias: Bias,
        pairs: Vec<(Kernel, WindowFunction)>,
    ) -> Result<Self> {
        let name = name.into();
        if pairs.is_empty() {
            return Err(Error::Validation(format!("tracer '{name}' needs at least one kernel")));
        }
        for (i, (kernel, _)) in pairs.iter().enumerate() {
            if pairs[..i].iter().any(|(other, _)| other == kernel) {
                return Err(Error::Validation(format!(
                    "tracer '{name}' registers kernel '{}' twice",
                    kernel.name()
                )));
            }
        }
        Ok(Self { name, density, bias, pairs, normalization_epsilon: NORMALIZATION_EPSILON })
    }

    /// Build a tracer from parallel kernel and window lists.
    ///
    /// The lists must have the same length; element `i` of `windows` is the
    /// window of `kernels[i]`.
    pub fn from_lists(
        name: impl Into<String>,
        density: NumberDensity,
        bias: Bias,
        kernels: Vec<Kernel>,
        windows: Vec<WindowFunction>,
    ) -> Result<Self> {
        if kernels.len() != windows.len() {
            return Err(Error::Validation(format!(
                "tracer needs one window function per kernel, got {} kernels and {} windows",
                kernels.len(),
                windows.len()
            )));
        }
        Self::new(name, density, bias, kernels.into_iter().zip(windows).collect())
    }

    /// Override the normalization stabilizer (default [`NORMALIZATION_EPSILON`]).
    pub fn with_normalization_epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !epsilon.is_finite() || epsilon <= 0.0 {
            return Err(Error::Validation(format!(
                "normalization epsilon must be finite and > 0, got {epsilon}"
            )));
        }
        self.normalization_epsilon = epsilon;
        Ok(self)
    }

    /// Tracer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of kernels (rows of [`Tracer::compute_kernel_functions`]).
    pub fn nkernels(&self) -> usize {
        self.pairs.len()
    }

    /// Kernels in construction order.
    pub fn kernels(&self) -> impl Iterator<Item = Kernel> + '_ {
        self.pairs.iter().map(|(kernel, _)| *kernel)
    }

    /// `"<tracer> <kernel>"` labels in construction order.
    pub fn labels(&self) -> Vec<String> {
        self.kernels().map(|k| format!("{} {}", self.name, k.name())).collect()
    }

    /// The bias model.
    pub fn bias(&self) -> &Bias {
        &self.bias
    }

    /// Window function registered for the kernel called `kernel_name`.
    pub fn window_for(&self, kernel_name: &str) -> Result<&WindowFunction> {
        self.pairs
            .iter()
            .find(|(kernel, _)| kernel.name() == kernel_name)
            .map(|(_, window)| window)
            .ok_or_else(|| {
                Error::Validation(format!(
                    "tracer '{}' has no window function for kernel '{kernel_name}'",
                    self.name
                ))
            })
    }

    /// `density × window` on `z`, divided by its trapezoidal integral.
    ///
    /// If the integral is below the normalization epsilon, the epsilon is added
    /// to it before dividing. An empty bin therefore yields zeros rather than NaN.
    pub fn normalized_density(
        &self,
        bin: &RadialBin,
        window: &WindowFunction,
        z: &RedshiftGrid,
    ) -> Result<DVector<f64>> {
        let zv = z.as_vector();
        let density = self.density.at_z(zv)?;
        let selection = window.at_z(zv, bin.low(), bin.high())?;
        Ok(normalize(&density.component_mul(&selection), zv, self.normalization_epsilon))
    }

    /// Kernel functions for `bin`, one row per kernel in construction order.
    ///
    /// The bias is evaluated once, at the bin centre.
    pub fn compute_kernel_functions(
        &self,
        bin: &RadialBin,
        cosmology: &dyn Cosmology,
        z: &RedshiftGrid,
    ) -> Result<DMatrix<f64>> {
        let bias = self.bias.at(bin.center())?;
        let mut out = DMatrix::zeros(self.nkernels(), z.len());
        for (i, (kernel, window)) in self.pairs.iter().enumerate() {
            let n = self.normalized_density(bin, window, z)?;
            let k = kernel.at_z(z, &n, cosmology, bias)?;
            out.set_row(i, &k.transpose());
        }
        Ok(out)
    }
}
