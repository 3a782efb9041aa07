//! Error types for the cross-spectrum workspace

use thiserror::Error;

/// Cross-spectrum error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration (bins, grids, tracer composition, model parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A provider was queried outside the range it can answer for
    #[error("{quantity} requested at {value}, outside the supported range [{low}, {high}]")]
    OutOfRange {
        /// Name of the queried quantity (e.g. "comoving distance").
        quantity: &'static str,
        /// Offending argument.
        value: f64,
        /// Lowest supported argument.
        low: f64,
        /// Highest supported argument.
        high: f64,
    },

    /// Numerical fault during integration
    #[error("Computation error: {0}")]
    Computation(String),

    /// The provider cannot supply the requested quantity
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message_names_quantity() {
        let err =
            Error::OutOfRange { quantity: "comoving distance", value: 9.0, low: 0.0, high: 5.0 };
        let msg = err.to_string();
        assert!(msg.contains("comoving distance"), "{msg}");
        assert!(msg.contains("[0, 5]"), "{msg}");
    }
}
