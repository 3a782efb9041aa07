//! Physical constants.
//!
//! Distances are in Mpc, velocities in km/s and masses in solar masses, so that
//! `H(z)` is in km/s/Mpc and `c / H` is a distance in Mpc.

/// Speed of light in km/s.
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Newton's constant in `Mpc (km/s)^2 / M_sun`.
pub const GRAVITATIONAL_CONSTANT: f64 = 4.300_917_270e-9;
