//! Table lookup helpers.

/// Locate `x` in the strictly increasing `xs`.
///
/// Returns `(i, t)` such that `x = xs[i] + t * (xs[i+1] - xs[i])` with
/// `t` in `[0, 1]`, or `None` when `x` is outside `[xs[0], xs[n-1]]`.
pub(crate) fn locate(xs: &[f64], x: f64) -> Option<(usize, f64)> {
    let n = xs.len();
    if n < 2 || !x.is_finite() || x < xs[0] || x > xs[n - 1] {
        return None;
    }
    // First index with xs[idx] > x, clamped so that (i, i+1) is a valid cell.
    let upper = xs.partition_point(|&v| v <= x).clamp(1, n - 1);
    let i = upper - 1;
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    Some((i, t))
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_interior_and_edges() {
        let xs = [0.0, 1.0, 3.0];
        assert_eq!(locate(&xs, 0.0), Some((0, 0.0)));
        assert_eq!(locate(&xs, 2.0), Some((1, 0.5)));
        assert_eq!(locate(&xs, 3.0), Some((1, 1.0)));
        assert_eq!(locate(&xs, -0.1), None);
        assert_eq!(locate(&xs, 3.1), None);
        assert_eq!(locate(&xs, f64::NAN), None);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 4.0, 0.25), 2.5);
    }
}
