//! Equal-frequency binning of predicted values.

use crate::error::{BenchmarkError, Result};
use crate::utils::quantile_edges;

/// Contiguous bins given by strictly increasing edges.
///
/// Bin 1 is `[e0, e1]`; bin `i > 1` is `(e_{i-1}, e_i]`. Labels run `1..=n_bins`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileBins {
    edges: Vec<f64>,
}

impl QuantileBins {
    /// Fit `n_bins` equal-frequency bins to `values`.
    ///
    /// # Errors
    /// - `InvalidParameter` if `n_bins` is zero
    /// - `InvalidInput` if `values` is empty or contains non-finite numbers
    /// - `NonUniqueBinEdges` if two quantile edges coincide
    pub fn fit(values: &[f64], n_bins: usize) -> Result<Self> {
        if n_bins == 0 {
            return Err(BenchmarkError::InvalidParameter(
                "number of bins must be positive".to_string(),
            ));
        }
        if values.is_empty() {
            return Err(BenchmarkError::InvalidInput(
                "cannot bin an empty set of predictions".to_string(),
            ));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(BenchmarkError::InvalidInput(
                "predictions to bin must be finite".to_string(),
            ));
        }
        Self::from_edges(quantile_edges(values, n_bins))
    }

    /// Bins from explicit edges, which must be strictly increasing.
    pub fn from_edges(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(BenchmarkError::InvalidParameter(
                "at least two bin edges are required".to_string(),
            ));
        }
        if edges.iter().any(|e| e.is_nan()) {
            return Err(BenchmarkError::InvalidInput("bin edge is NaN".to_string()));
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BenchmarkError::NonUniqueBinEdges);
        }
        Ok(Self { edges })
    }

    /// Replace the outermost edges by `lower` and `upper`.
    pub fn with_bounds(&self, lower: f64, upper: f64) -> Result<Self> {
        let mut edges = self.edges.clone();
        let last = edges.len() - 1;
        edges[0] = lower;
        edges[last] = upper;
        Self::from_edges(edges).map_err(|_| {
            BenchmarkError::InvalidParameter(format!(
                "bounds [{lower}, {upper}] do not enclose the inner bin edges"
            ))
        })
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin label (1-based) of `value`, or `None` outside `[e0, e_n]`.
    pub fn label(&self, value: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value.is_nan() || value < first || value > last {
            return None;
        }
        // First edge index with value <= edge; bin 1 is closed on the left.
        let idx = self.edges[1..].partition_point(|&e| e < value);
        Some(idx + 1)
    }
}
