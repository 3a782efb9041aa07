//! Validated value types shared by the engine and the CLI.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A redshift interval `[low, high]` selecting one tracer bin.
///
/// Deserialization goes through [`RadialBin::new`], so a parsed bin is as
/// valid as a constructed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BinEdges")]
pub struct RadialBin {
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct BinEdges {
    low: f64,
    high: f64,
}

impl TryFrom<BinEdges> for RadialBin {
    type Error = Error;

    fn try_from(edges: BinEdges) -> Result<Self> {
        Self::new(edges.low, edges.high)
    }
}

impl RadialBin {
    /// Create a bin, rejecting non-finite edges and `low > high`.
    ///
    /// `low == high` is allowed: it is a degenerate bin, and a box window
    /// selects nothing from it.
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) {
            return Err(Error::Validation(format!("bin edges must be finite, got ({low}, {high})")));
        }
        if low > high {
            return Err(Error::Validation(format!(
                "bin edges must satisfy low <= high, got ({low}, {high})"
            )));
        }
        Ok(Self { low, high })
    }

    /// Split `[zmin, zmax]` into `n` contiguous bins of equal width.
    pub fn equal_width(zmin: f64, zmax: f64, n: usize) -> Result<Vec<Self>> {
        if n == 0 {
            return Err(Error::Validation("number of bins must be > 0".to_string()));
        }
        if !(zmin.is_finite() && zmax.is_finite()) || zmin >= zmax {
            return Err(Error::Validation(format!(
                "binning range must satisfy zmin < zmax, got ({zmin}, {zmax})"
            )));
        }
        let width = (zmax - zmin) / n as f64;
        (0..n)
            .map(|i| {
                let low = zmin + width * i as f64;
                // Pin the last edge so rounding never leaves a gap at zmax.
                let high = if i + 1 == n { zmax } else { zmin + width * (i + 1) as f64 };
                Self::new(low, high)
            })
            .collect()
    }

    /// Lower edge.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper edge.
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Bin centre `(low + high) / 2`.
    pub fn center(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Whether `z` lies in the closed interval.
    pub fn contains(&self, z: f64) -> bool {
        z >= self.low && z <= self.high
    }
}

/// Strictly increasing, finite redshift sampling shared by every integral of
/// one computation.
#[derive(Debug, Clone, PartialEq)]
pub struct RedshiftGrid {
    z: DVector<f64>,
}

impl RedshiftGrid {
    /// Wrap explicit redshift samples.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() < 2 {
            return Err(Error::Validation(format!(
                "redshift grid needs at least 2 points, got {}",
                values.len()
            )));
        }
        if let Some((i, z)) = values.iter().enumerate().find(|(_, z)| !z.is_finite() || **z < 0.0) {
            return Err(Error::Validation(format!(
                "redshift grid point {i} must be finite and >= 0, got {z}"
            )));
        }
        if let Some(i) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(Error::Validation(format!(
                "redshift grid must be strictly increasing, got z[{}]={} >= z[{}]={}",
                i,
                values[i],
                i + 1,
                values[i + 1]
            )));
        }
        Ok(Self { z: DVector::from_vec(values) })
    }

    /// `n` evenly spaced points from `start` to `stop` inclusive.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Result<Self> {
        if n < 2 {
            return Err(Error::Validation(format!("linspace needs n >= 2, got {n}")));
        }
        let step = (stop - start) / (n - 1) as f64;
        let mut values: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        values[n - 1] = stop;
        Self::new(values)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Always false: a grid has at least two points.
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Samples as a column vector.
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.z
    }

    /// Samples as a slice.
    pub fn values(&self) -> &[f64] {
        self.z.as_slice()
    }

    /// First sample.
    pub fn min(&self) -> f64 {
        self.z[0]
    }

    /// Last sample.
    pub fn max(&self) -> f64 {
        self.z[self.z.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bin_center() {
        let bin = RadialBin::new(0.2, 0.6).unwrap();
        assert_relative_eq!(bin.center(), 0.4, epsilon = 1e-15);
        assert!(bin.contains(0.2));
        assert!(bin.contains(0.6));
        assert!(!bin.contains(0.61));
    }

    #[test]
    fn test_bin_rejects_inverted_edges() {
        assert!(RadialBin::new(0.6, 0.2).is_err());
        assert!(RadialBin::new(f64::NAN, 0.2).is_err());
        assert!(RadialBin::new(0.3, 0.3).is_ok());
    }

    #[test]
    fn test_bin_deserialization_validates_edges() {
        let bin: RadialBin = serde_json::from_str(r#"{"low": 0.2, "high": 0.6}"#).unwrap();
        assert_eq!(bin, RadialBin::new(0.2, 0.6).unwrap());
        let inverted = serde_json::from_str::<RadialBin>(r#"{"low": 0.6, "high": 0.2}"#);
        assert!(inverted.is_err());
        let json = serde_json::to_string(&bin).unwrap();
        assert_eq!(serde_json::from_str::<RadialBin>(&json).unwrap(), bin);
    }

    #[test]
    fn test_equal_width_bins_tile_range() {
        let bins = RadialBin::equal_width(0.001, 1.2, 6).unwrap();
        assert_eq!(bins.len(), 6);
        assert_eq!(bins[0].low(), 0.001);
        assert_eq!(bins[5].high(), 1.2);
        for pair in bins.windows(2) {
            assert_eq!(pair[0].high(), pair[1].low());
        }
        assert!(RadialBin::equal_width(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_grid_validation() {
        assert!(RedshiftGrid::new(vec![0.1]).is_err());
        assert!(RedshiftGrid::new(vec![0.1, 0.1]).is_err());
        assert!(RedshiftGrid::new(vec![0.2, 0.1]).is_err());
        assert!(RedshiftGrid::new(vec![0.1, f64::INFINITY]).is_err());
        assert!(RedshiftGrid::new(vec![-0.1, 0.1]).is_err());
        assert!(RedshiftGrid::new(vec![0.0, 0.1, 0.3]).is_ok());
    }

    #[test]
    fn test_linspace_endpoints() {
        let grid = RedshiftGrid::linspace(0.001, 1.2, 200).unwrap();
        assert_eq!(grid.len(), 200);
        assert_eq!(grid.min(), 0.001);
        assert_eq!(grid.max(), 1.2);
    }
}
