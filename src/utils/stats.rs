//! Statistical utility functions.

use std::cmp::Ordering;

/// Sort a copy of `values` in ascending order. NaNs compare equal to everything.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Quantile of an ascending slice with linear interpolation between order statistics.
///
/// With `h = (n - 1) * p`, returns `x[floor(h)] + (h - floor(h)) * (x[floor(h) + 1] - x[floor(h)])`.
/// Returns NaN for an empty slice.
///
/// # Example
/// ```
/// use benchmark_draws::utils::quantile_sorted;
///
/// let x = [0.0, 10.0, 20.0, 30.0, 40.0];
/// assert_eq!(quantile_sorted(&x, 0.5), 20.0);
/// assert_eq!(quantile_sorted(&x, 0.125), 5.0);
/// ```
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Edges of `n_bins` equal-frequency bins: the quantiles at `0, 1/n, ..., 1`.
pub fn quantile_edges(values: &[f64], n_bins: usize) -> Vec<f64> {
    let sorted = sorted(values);
    (0..=n_bins)
        .map(|i| quantile_sorted(&sorted, i as f64 / n_bins as f64))
        .collect()
}
