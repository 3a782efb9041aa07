//! # cs-limber
//!
//! Angular cross-power spectra between redshift-distributed tracers in the
//! Limber approximation.
//!
//! The pipeline, leaves first:
//! - [`Bias`], [`NumberDensity`] and [`WindowFunction`] describe a population
//!   and how one redshift bin selects it;
//! - [`Kernel`] turns a normalized profile into a projection kernel
//!   (clustering, or weak lensing through the lensing efficiency);
//! - [`Tracer`] binds a density and a bias to `(kernel, window)` pairs;
//! - [`Power`] integrates products of kernels against the matter power
//!   spectrum of a [`cs_core::Cosmology`].
//!
//! [`CrossSpectra`] batches evaluations over multipoles and bin pairs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bias;
pub mod density;
pub mod kernel;
pub mod math;
pub mod power;
pub mod preset;
pub mod survey;
pub mod tracer;
pub mod window;

pub use bias::Bias;
pub use density::NumberDensity;
pub use kernel::Kernel;
pub use math::NORMALIZATION_EPSILON;
pub use power::Power;
pub use preset::{GwGalaxyParams, gw_galaxy_spectra, gw_galaxy_tracers};
pub use survey::{ClsEntry, ClsTable, CrossSpectra};
pub use tracer::Tracer;
pub use window::WindowFunction;
