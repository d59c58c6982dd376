//! Per-row samplers turning one expected value into a vector of draws.

use crate::error::{BenchmarkError, Result};
use rand::Rng;
use rand_distr::{Distribution, Poisson};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parametric distribution used to expand point predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawDistribution {
    /// Poisson with rate equal to the point prediction.
    #[default]
    Poisson,
    /// Uniform on `[prediction, prediction]`, i.e. a point mass at the prediction.
    Uniform,
}

impl fmt::Display for DrawDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawDistribution::Poisson => f.write_str("poisson"),
            DrawDistribution::Uniform => f.write_str("uniform"),
        }
    }
}

/// How a single row is turned into draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampler<'a> {
    /// Poisson draws with rate `max(expected, 0)`.
    Poisson,
    /// `n` copies of `max(expected, 0)`.
    ///
    /// The uniform bounds are both the prediction, so this is a degenerate
    /// distribution. Benchmark outputs built with it depend on that.
    Uniform,
    /// Draws with replacement from a fixed pool, ignoring the row's value.
    Resample(&'a [f64]),
}

impl From<DrawDistribution> for Sampler<'static> {
    fn from(distribution: DrawDistribution) -> Self {
        match distribution {
            DrawDistribution::Poisson => Sampler::Poisson,
            DrawDistribution::Uniform => Sampler::Uniform,
        }
    }
}

impl Sampler<'_> {
    /// Produce `n_draws` outcomes for one row.
    ///
    /// # Errors
    /// `InvalidInput` if `expected` is NaN or infinite, if `n_draws` is zero,
    /// or if a resampling pool is empty.
    ///
    /// # Example
    /// ```
    /// use benchmark_draws::sampling::Sampler;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let draws = Sampler::Poisson.sample(3.5, 100, &mut rng).unwrap();
    /// assert_eq!(draws.len(), 100);
    /// assert!(draws.iter().all(|d| *d >= 0.0 && d.fract() == 0.0));
    /// ```
    pub fn sample<R: Rng + ?Sized>(
        &self,
        expected: f64,
        n_draws: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>> {
        if !expected.is_finite() {
            return Err(BenchmarkError::InvalidInput(format!(
                "expected value must be finite, got {expected}"
            )));
        }
        if n_draws == 0 {
            return Err(BenchmarkError::InvalidInput(
                "number of draws must be positive".to_string(),
            ));
        }

        match self {
            Sampler::Poisson => sample_poisson(expected.max(0.0), n_draws, rng),
            Sampler::Uniform => Ok(vec![expected.max(0.0); n_draws]),
            Sampler::Resample(pool) => resample_pool(pool, n_draws, rng),
        }
    }
}

fn sample_poisson<R: Rng + ?Sized>(rate: f64, n_draws: usize, rng: &mut R) -> Result<Vec<f64>> {
    // rand_distr rejects a zero rate; Poisson(0) is a point mass at 0.
    if rate == 0.0 {
        return Ok(vec![0.0; n_draws]);
    }
    let poisson = Poisson::new(rate).map_err(|e| {
        BenchmarkError::InvalidInput(format!("invalid Poisson rate {rate}: {e}"))
    })?;
    Ok((0..n_draws).map(|_| poisson.sample(rng)).collect())
}

/// Draw `n_draws` values from `pool` with replacement.
pub(crate) fn resample_pool<R: Rng + ?Sized>(
    pool: &[f64],
    n_draws: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    if pool.is_empty() {
        return Err(BenchmarkError::InvalidInput(
            "cannot resample from an empty pool".to_string(),
        ));
    }
    let n = pool.len();
    Ok((0..n_draws).map(|_| pool[rng.gen_range(0..n)]).collect())
}
