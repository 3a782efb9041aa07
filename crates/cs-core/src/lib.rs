//! # cs-core
//!
//! Shared building blocks for the cross-spectrum workspace:
//! - the error type and `Result` alias used by every crate,
//! - the [`Cosmology`] and [`MatterPowerSpectrum`] provider traits that the
//!   Limber engine consumes,
//! - small validated value types ([`RadialBin`], [`RedshiftGrid`]),
//! - physical constants in the units used throughout (Mpc, km/s, M_sun).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Cosmology, MatterPowerSpectrum};
pub use types::{RadialBin, RedshiftGrid};

/// Workspace version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
