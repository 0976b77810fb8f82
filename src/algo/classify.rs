//! Truncation of scalar fields for display.
//!
//! Before a field is colour-mapped its values are clamped to a window
//! `[lo, hi]`. The window is given either directly or as a pair of
//! percentiles of the field's distribution.

use crate::error::{BridgeError, Result};

/// The `q`-th percentile of `data`, `q` in `[0, 100]`.
///
/// Uses linear interpolation between the two nearest ranks. Non-finite values
/// are ignored. Returns `None` when no finite value is present.
///
/// ```
/// use surfbridge::algo::classify::percentile;
///
/// let data = [4.0, 1.0, 3.0, 2.0];
/// assert_eq!(percentile(&data, 50.0), Some(2.5));
/// assert_eq!(percentile(&data, 100.0), Some(4.0));
/// ```
pub fn percentile(data: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let t = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * t)
}

/// Resolve the truncation window.
///
/// With `as_percentiles` the bounds are percentiles (clamped to `[0, 100]`);
/// otherwise they are used as given. A field without finite values yields
/// `(0, 0)` in percentile mode.
pub fn truncation_bounds(
    data: &[f64],
    min: f64,
    max: f64,
    as_percentiles: bool,
) -> Result<(f64, f64)> {
    if min.is_nan() || max.is_nan() {
        let value = format!("[{}, {}]", min, max);
        return Err(BridgeError::invalid_param("bounds", value, "must be numbers"));
    }
    if min > max {
        return Err(BridgeError::invalid_param(
            "bounds",
            format!("[{}, {}]", min, max),
            "lower bound exceeds upper bound",
        ));
    }

    if !as_percentiles {
        return Ok((min, max));
    }

    let lo = percentile(data, min).unwrap_or(0.0);
    let hi = percentile(data, max).unwrap_or(0.0);
    Ok((lo, hi))
}

/// Clamp every value into `[lo, hi]`. Non-finite values are kept as they are.
pub fn truncate(data: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    data.iter()
        .map(|&x| if x.is_finite() { x.clamp(lo, hi) } else { x })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data: Vec<f64> = (0..=10).map(f64::from).collect();
        assert_eq!(percentile(&data, 0.0), Some(0.0));
        assert_eq!(percentile(&data, 25.0), Some(2.5));
        assert_eq!(percentile(&data, 100.0), Some(10.0));
        assert_eq!(percentile(&data, 1000.0), Some(10.0));
    }

    #[test]
    fn test_percentile_ignores_non_finite() {
        assert_eq!(percentile(&[f64::NAN, 1.0, f64::INFINITY, 3.0], 50.0), Some(2.0));
        assert_eq!(percentile(&[f64::NAN], 50.0), None);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_bounds_absolute_and_percentile() {
        let data = [5.0, -5.0, 0.0, 10.0, -10.0];
        assert_eq!(truncation_bounds(&data, -1.0, 1.0, false).unwrap(), (-1.0, 1.0));
        assert_eq!(truncation_bounds(&data, 25.0, 75.0, true).unwrap(), (-5.0, 5.0));
        // Default settings cover the whole range.
        assert_eq!(truncation_bounds(&data, 0.0, 1000.0, true).unwrap(), (-10.0, 10.0));
    }

    #[test]
    fn test_bounds_rejects_inverted() {
        assert!(matches!(
            truncation_bounds(&[1.0], 2.0, 1.0, false),
            Err(BridgeError::InvalidParameter { name: "bounds", .. })
        ));
    }

    #[test]
    fn test_truncate() {
        let out = truncate(&[-3.0, 0.5, 9.0, f64::NAN], 0.0, 1.0);
        assert_eq!(&out[..3], &[0.0, 0.5, 1.0]);
        assert!(out[3].is_nan());
    }
}
