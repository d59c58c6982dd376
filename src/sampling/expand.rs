//! Expansion of point-prediction tables into long-format draw tables.

use super::sampler::Sampler;
use crate::core::{DrawKey, DrawTable, Level, PredictionTable};
use crate::error::{BenchmarkError, Result};
use rand::Rng;

/// Expand every row of `table` into `n_draws` simulated outcomes.
///
/// The output holds one row per (month, unit, draw) with draw indices
/// `0..n_draws` within each (month, unit) group, in input row order.
/// `level` must match the level the table was built for.
///
/// # Example
/// ```
/// use benchmark_draws::core::{Level, PredictionTable};
/// use benchmark_draws::sampling::{expand, Sampler};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let table = PredictionTable::from_columns(Level::Cm, &[457, 457], &[57, 58], &[3.0, 0.0]).unwrap();
/// let mut rng = StdRng::seed_from_u64(42);
/// let draws = expand(&table, 10, Level::Cm, &Sampler::Poisson, &mut rng).unwrap();
/// assert_eq!(draws.len(), 20);
/// ```
pub fn expand<R: Rng + ?Sized>(
    table: &PredictionTable,
    n_draws: usize,
    level: Level,
    sampler: &Sampler<'_>,
    rng: &mut R,
) -> Result<DrawTable> {
    level.ensure(table.level())?;
    if n_draws == 0 {
        return Err(BenchmarkError::InvalidParameter(
            "number of draws must be positive".to_string(),
        ));
    }

    let mut expanded = DrawTable::with_capacity(level, table.len() * n_draws);
    for row in table.rows() {
        let draws = sampler.sample(row.prediction, n_draws, rng)?;
        for (draw, outcome) in draws.into_iter().enumerate() {
            expanded.push(DrawKey::new(row.key, draw as u32), outcome);
        }
    }
    Ok(expanded)
}
