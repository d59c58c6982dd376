//! Residual-binned bootstrap draws.
//!
//! Historical residuals (actual minus predicted) are pooled by the quantile
//! bin of the prediction they belong to. A new draw for a prediction adds a
//! residual resampled from the pool of the prediction's bin, then clips the
//! result to the configured bounds. Bins and pools are rebuilt on every call.

use super::binning::QuantileBins;
use crate::core::{DrawKey, DrawTable, Level, PredictionRow, PredictionTable, UnitMonth};
use crate::error::{BenchmarkError, Result};
use crate::sampling::resample_pool;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Configuration for residual-binned bootstrap draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidualBootstrapConfig {
    /// Number of equal-frequency bins of the historical predictions.
    pub n_bins: usize,
    /// Draws generated per target prediction.
    pub n_draws: usize,
    /// Draws below this value are clipped to it; also the lowest bin edge.
    pub lower_bound: f64,
    /// Draws above this value are clipped to it; also the highest bin edge. None is unbounded.
    pub upper_bound: Option<f64>,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for ResidualBootstrapConfig {
    fn default() -> Self {
        Self {
            n_bins: 5,
            n_draws: 1,
            lower_bound: 0.0,
            upper_bound: None,
            seed: None,
        }
    }
}

impl ResidualBootstrapConfig {
    /// Create a config with `n_bins` bins and `n_draws` draws per target.
    pub fn new(n_bins: usize, n_draws: usize) -> Self {
        Self {
            n_bins,
            n_draws,
            ..Default::default()
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Upper bound as a number, infinite when unbounded.
    pub fn upper(&self) -> f64 {
        self.upper_bound.unwrap_or(f64::INFINITY)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_draws == 0 {
            return Err(BenchmarkError::InvalidParameter(
                "number of draws must be positive".to_string(),
            ));
        }
        if self.lower_bound.is_nan() || self.upper().is_nan() || self.lower_bound >= self.upper() {
            return Err(BenchmarkError::InvalidParameter(format!(
                "lower bound {} must be below upper bound {}",
                self.lower_bound,
                self.upper()
            )));
        }
        Ok(())
    }
}

/// A historical (actual, predicted) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualSample {
    #[serde(flatten)]
    pub key: UnitMonth,
    pub actual: f64,
    pub predicted: f64,
}

impl ResidualSample {
    pub fn residual(&self) -> f64 {
        self.actual - self.predicted
    }
}

/// Historical actuals paired with the predictions made for them.
#[derive(Debug, Clone, PartialEq)]
pub struct ActualsPredictions {
    level: Level,
    rows: Vec<ResidualSample>,
}

impl ActualsPredictions {
    /// Build from rows, rejecting duplicate keys and non-finite values.
    pub fn from_rows(level: Level, rows: Vec<ResidualSample>) -> Result<Self> {
        let mut seen = HashSet::new();
        for row in &rows {
            if !row.actual.is_finite() || !row.predicted.is_finite() {
                return Err(BenchmarkError::InvalidInput(format!(
                    "non-finite actual or prediction at month {}, unit {}",
                    row.key.month_id, row.key.unit_id
                )));
            }
            if !seen.insert(row.key) {
                return Err(BenchmarkError::DuplicateKey {
                    month_id: row.key.month_id,
                    unit_id: row.key.unit_id,
                });
            }
        }
        Ok(Self { level, rows })
    }

    /// Pair actuals and predictions by key. Only keys present in both are kept,
    /// in the order of `actuals`.
    pub fn join(actuals: &PredictionTable, predictions: &PredictionTable) -> Result<Self> {
        actuals.level().ensure(predictions.level())?;
        let predicted: HashMap<UnitMonth, f64> = predictions
            .rows()
            .iter()
            .map(|r| (r.key, r.prediction))
            .collect();
        let rows = actuals
            .rows()
            .iter()
            .filter_map(|a| {
                predicted.get(&a.key).map(|&p| ResidualSample {
                    key: a.key,
                    actual: a.prediction,
                    predicted: p,
                })
            })
            .collect();
        Self::from_rows(actuals.level(), rows)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn rows(&self) -> &[ResidualSample] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The predictions as a keyed table.
    pub fn predictions(&self) -> Result<PredictionTable> {
        let rows = self
            .rows
            .iter()
            .map(|r| PredictionRow {
                key: r.key,
                prediction: r.predicted,
            })
            .collect();
        PredictionTable::from_rows(self.level, rows)
    }
}

/// Residual pools per quantile bin of the historical predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualBins {
    bins: QuantileBins,
    pools: Vec<Vec<f64>>,
    lower_bound: f64,
    upper_bound: f64,
}

impl ResidualBins {
    /// Bin the historical predictions and pool their residuals per bin.
    ///
    /// The outer bin edges are replaced by `lower_bound` and `upper_bound`.
    pub fn fit(
        history: &ActualsPredictions,
        n_bins: usize,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<Self> {
        let predicted: Vec<f64> = history.rows().iter().map(|r| r.predicted).collect();
        let fitted = QuantileBins::fit(&predicted, n_bins)?;

        let mut pools = vec![Vec::new(); n_bins];
        for row in history.rows() {
            // Every historical prediction lies within the fitted edges.
            if let Some(label) = fitted.label(row.predicted) {
                pools[label - 1].push(row.residual());
            }
        }

        Ok(Self {
            bins: fitted.with_bounds(lower_bound, upper_bound)?,
            pools,
            lower_bound,
            upper_bound,
        })
    }

    pub fn bins(&self) -> &QuantileBins {
        &self.bins
    }

    /// Residuals of bin `label` (1-based).
    pub fn pool(&self, label: usize) -> &[f64] {
        label
            .checked_sub(1)
            .and_then(|i| self.pools.get(i))
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    /// Bin label of a prediction against the bounded edges.
    pub fn classify(&self, predicted: f64) -> Result<usize> {
        self.bins.label(predicted).ok_or_else(|| {
            BenchmarkError::InvalidInput(format!(
                "prediction {predicted} lies outside [{}, {}]",
                self.lower_bound, self.upper_bound
            ))
        })
    }

    /// `n_draws` clipped draws of `predicted` plus a residual from its bin's pool.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        predicted: f64,
        n_draws: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        let label = self.classify(predicted)?;
        let pool = self.pool(label);
        if pool.is_empty() {
            return Err(BenchmarkError::EmptyResidualPool { bin: label });
        }
        let residuals = resample_pool(pool, n_draws, rng)?;
        Ok(residuals
            .into_iter()
            .map(|r| (predicted + r).clamp(self.lower_bound, self.upper_bound))
            .collect())
    }
}

/// Residual-binned bootstrap draws seeded from `config.seed`.
///
/// Draws are generated for `targets` when given, otherwise for the
/// historical predictions themselves. Draw ids run `1..=n_draws`.
///
/// # Example
/// ```
/// use benchmark_draws::bootstrap::{
///     bootstrap_draws, ActualsPredictions, ResidualBootstrapConfig, ResidualSample,
/// };
/// use benchmark_draws::core::{Level, UnitMonth};
///
/// let rows = (0..20u32)
///     .map(|i| ResidualSample {
///         key: UnitMonth::new(457, i),
///         actual: (i % 7) as f64,
///         predicted: i as f64,
///     })
///     .collect();
/// let history = ActualsPredictions::from_rows(Level::Cm, rows).unwrap();
/// let config = ResidualBootstrapConfig::new(4, 10).with_seed(42);
/// let draws = bootstrap_draws(&history, None, &config).unwrap();
/// assert_eq!(draws.len(), 200);
/// assert!(draws.outcomes().all(|d| d >= 0.0));
/// ```
pub fn bootstrap_draws(
    history: &ActualsPredictions,
    targets: Option<&PredictionTable>,
    config: &ResidualBootstrapConfig,
) -> Result<DrawTable> {
    let mut rng: StdRng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    bootstrap_draws_with_rng(history, targets, config, &mut rng)
}

/// Residual-binned bootstrap draws using a caller-supplied generator.
pub fn bootstrap_draws_with_rng<R: Rng + ?Sized>(
    history: &ActualsPredictions,
    targets: Option<&PredictionTable>,
    config: &ResidualBootstrapConfig,
    rng: &mut R,
) -> Result<DrawTable> {
    config.validate()?;
    let bins = ResidualBins::fit(history, config.n_bins, config.lower_bound, config.upper())?;

    let owned;
    let targets = match targets {
        Some(t) => {
            history.level().ensure(t.level())?;
            t
        }
        None => {
            owned = history.predictions()?;
            &owned
        }
    };

    let mut out = DrawTable::with_capacity(history.level(), targets.len() * config.n_draws);
    for row in targets.rows() {
        let draws = bins.draw(row.prediction, config.n_draws, rng)?;
        for (i, value) in draws.into_iter().enumerate() {
            out.push(DrawKey::new(row.key, i as u32 + 1), value);
        }
    }
    log::debug!(
        "bootstrapped {} draws for {} targets over {} bins",
        out.len(),
        targets.len(),
        config.n_bins
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(pairs: &[(f64, f64)]) -> ActualsPredictions {
        let rows = pairs
            .iter()
            .enumerate()
            .map(|(i, &(actual, predicted))| ResidualSample {
                key: UnitMonth::new(457, i as u32),
                actual,
                predicted,
            })
            .collect();
        ActualsPredictions::from_rows(Level::Cm, rows).unwrap()
    }

    /// 50 predictions 0..50; low predictions carry residual -100, high ones +3.
    fn split_history() -> ActualsPredictions {
        let pairs: Vec<(f64, f64)> = (0..50)
            .map(|i| {
                let p = i as f64;
                if i < 10 {
                    (p - 100.0, p)
                } else {
                    (p + 3.0, p)
                }
            })
            .collect();
        history(&pairs)
    }

    #[test]
    fn config_builder() {
        let config = ResidualBootstrapConfig::new(10, 100)
            .with_bounds(-1.0, Some(1e6))
            .with_seed(7);
        assert_eq!(config.n_bins, 10);
        assert_eq!(config.n_draws, 100);
        assert_eq!(config.lower_bound, -1.0);
        assert_eq!(config.upper(), 1e6);
        assert_eq!(config.seed, Some(7));
        assert_eq!(ResidualBootstrapConfig::default().upper(), f64::INFINITY);
    }

    #[test]
    fn config_validation() {
        assert!(ResidualBootstrapConfig::new(5, 0).validate().is_err());
        assert!(ResidualBootstrapConfig::new(5, 1)
            .with_bounds(10.0, Some(1.0))
            .validate()
            .is_err());
    }

    #[test]
    fn pools_follow_prediction_bins() {
        let bins = ResidualBins::fit(&split_history(), 5, 0.0, f64::INFINITY).unwrap();
        assert_eq!(bins.bins().n_bins(), 5);
        assert_eq!(bins.bins().edges()[0], 0.0);
        assert_eq!(bins.bins().edges()[5], f64::INFINITY);
        // Bin 1 holds predictions 0..=9.8, all with residual -100.
        assert!(bins.pool(1).iter().all(|&r| r == -100.0));
        assert!(bins.pool(3).iter().all(|&r| r == 3.0));
        let total: usize = (1..=5).map(|b| bins.pool(b).len()).sum();
        assert_eq!(total, 50);
        assert!(bins.pool(0).is_empty());
        assert!(bins.pool(6).is_empty());
    }

    #[test]
    fn lowest_bin_draws_only_its_residuals() {
        let config = ResidualBootstrapConfig::new(5, 200).with_seed(3);
        let targets =
            PredictionTable::from_columns(Level::Cm, &[469, 469], &[1, 2], &[5.0, 40.0]).unwrap();
        let draws = bootstrap_draws(&split_history(), Some(&targets), &config).unwrap();

        // 5 - 100 clips to the lower bound.
        assert!(draws
            .outcomes_for(UnitMonth::new(469, 1))
            .iter()
            .all(|&d| d == 0.0));
        assert!(draws
            .outcomes_for(UnitMonth::new(469, 2))
            .iter()
            .all(|&d| d == 43.0));
    }

    #[test]
    fn draws_respect_bounds() {
        // Residuals of +-20 push draws past both bounds.
        let pairs: Vec<(f64, f64)> = (0..40)
            .map(|i| {
                let p = i as f64;
                if i % 2 == 0 {
                    (p + 20.0, p)
                } else {
                    (p - 20.0, p)
                }
            })
            .collect();
        let config = ResidualBootstrapConfig::new(5, 20)
            .with_bounds(0.0, Some(45.0))
            .with_seed(11);
        let draws = bootstrap_draws(&history(&pairs), None, &config).unwrap();
        assert_eq!(draws.len(), 40 * 20);
        assert!(draws.outcomes().all(|d| (0.0..=45.0).contains(&d)));
    }

    #[test]
    fn draw_ids_start_at_one() {
        let config = ResidualBootstrapConfig::new(2, 4).with_seed(1);
        let draws = bootstrap_draws(&split_history(), None, &config).unwrap();
        assert_eq!(draws.len(), 200);
        assert_eq!(draws.check_contiguous_draws(1), Ok(4));
    }

    #[test]
    fn empty_pool_is_an_error() {
        // Edges 0, 2.5, 5, 7.5, 10: bins 2 and 3 hold no historical prediction.
        let hist = history(&[(1.0, 0.0), (12.0, 10.0)]);
        let config = ResidualBootstrapConfig::new(4, 3).with_seed(5);
        let targets = PredictionTable::from_columns(Level::Cm, &[469], &[1], &[4.0]).unwrap();
        assert_eq!(
            bootstrap_draws(&hist, Some(&targets), &config),
            Err(BenchmarkError::EmptyResidualPool { bin: 2 })
        );
    }

    #[test]
    fn targets_outside_bounds_rejected() {
        let config = ResidualBootstrapConfig::new(5, 1).with_seed(5);
        let targets = PredictionTable::from_columns(Level::Cm, &[469], &[1], &[-3.0]).unwrap();
        assert!(matches!(
            bootstrap_draws(&split_history(), Some(&targets), &config),
            Err(BenchmarkError::InvalidInput(_))
        ));
    }

    #[test]
    fn target_level_must_match_history() {
        let config = ResidualBootstrapConfig::new(5, 1).with_seed(5);
        let targets = PredictionTable::from_columns(Level::Pgm, &[469], &[1], &[3.0]).unwrap();
        assert!(matches!(
            bootstrap_draws(&split_history(), Some(&targets), &config),
            Err(BenchmarkError::LevelMismatch { .. })
        ));
    }

    #[test]
    fn join_pairs_by_key() {
        let actuals =
            PredictionTable::from_columns(Level::Cm, &[1, 1, 2], &[1, 2, 1], &[5.0, 0.0, 2.0])
                .unwrap();
        let preds =
            PredictionTable::from_columns(Level::Cm, &[1, 2], &[1, 1], &[4.0, 3.0]).unwrap();
        let joined = ActualsPredictions::join(&actuals, &preds).unwrap();
        assert_eq!(joined.len(), 2);
        assert_eq!(joined.rows()[0].residual(), 1.0);
        assert_eq!(joined.rows()[1].residual(), -1.0);
    }

    #[test]
    fn seeded_runs_reproduce() {
        let config = ResidualBootstrapConfig::new(5, 10).with_seed(99);
        let a = bootstrap_draws(&split_history(), None, &config).unwrap();
        let b = bootstrap_draws(&split_history(), None, &config).unwrap();
        assert_eq!(a, b);
    }
}
