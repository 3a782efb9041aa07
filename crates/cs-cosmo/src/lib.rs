//! # cs-cosmo
//!
//! Concrete [`cs_core::Cosmology`] providers.
//!
//! This crate provides:
//! - [`FlatLcdm`], a flat ΛCDM background with a tabulated comoving distance.
//! - [`ConstantPowerSpectrum`], a scale- and time-independent toy spectrum.
//! - [`TabulatedPowerSpectrum`], an interpolator over a `P(z, k)` table produced
//!   by an external Boltzmann solver.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod power;

mod interp;

pub use background::FlatLcdm;
pub use power::{ConstantPowerSpectrum, PowerTable, TabulatedPowerSpectrum};
