//! Collapse of draw tables into per-(month, unit) summaries.

use crate::core::{DrawTable, Level, UnitMonth};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Upper edges of the first five fatality categories; the sixth is open.
pub const SEVERITY_CUTOFFS: [f64; 5] = [0.0, 10.0, 100.0, 1000.0, 10_000.0];

/// Names of the six fatality categories.
pub const SEVERITY_LABELS: [&str; 6] = ["0", "1-10", "11-100", "101-1000", "1001-10000", ">10000"];

/// Category index (0-5) of an outcome.
///
/// Categories are `(-inf, 0]`, `(0, 10]`, `(10, 100]`, `(100, 1000]`,
/// `(1000, 10000]` and `(10000, inf)`.
pub fn severity_bucket(outcome: f64) -> usize {
    SEVERITY_CUTOFFS.partition_point(|&c| c < outcome)
}

/// Summary of the draws of one (month, unit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(flatten)]
    pub key: UnitMonth,
    pub mean_log_prediction: f64,
    /// Sample standard deviation (n - 1); NaN for a single draw.
    pub std_log_prediction: f64,
    pub draw_count: usize,
    /// Share of draws per category, in the order of [`SEVERITY_LABELS`].
    pub proportions: [f64; 6],
}

/// One summary row per (month, unit), ordered by month then unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    level: Level,
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: UnitMonth) -> Option<&SummaryRow> {
        self.rows
            .binary_search_by(|r| r.key.cmp(&key))
            .ok()
            .map(|i| &self.rows[i])
    }
}

/// Aggregate draws to mean and standard deviation of `log1p(outcome)` and
/// the category shares, per (month, unit).
///
/// # Example
/// ```
/// use benchmark_draws::aggregate::aggregate;
/// use benchmark_draws::core::{Level, PredictionTable, UnitMonth};
/// use benchmark_draws::sampling::{expand, Sampler};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let table = PredictionTable::from_columns(Level::Cm, &[457], &[57], &[20.0]).unwrap();
/// let draws = expand(&table, 4, Level::Cm, &Sampler::Uniform, &mut StdRng::seed_from_u64(1)).unwrap();
/// let summary = aggregate(&draws, Level::Cm).unwrap();
/// let row = summary.get(UnitMonth::new(457, 57)).unwrap();
/// assert!((row.mean_log_prediction - 20f64.ln_1p()).abs() < 1e-12);
/// assert_eq!(row.proportions[2], 1.0);
/// ```
pub fn aggregate(draws: &DrawTable, level: Level) -> Result<SummaryTable> {
    level.ensure(draws.level())?;

    let rows = draws
        .groups()
        .into_iter()
        .map(|(key, outcomes)| summarize(key, &outcomes))
        .collect();
    Ok(SummaryTable { level, rows })
}

fn summarize(key: UnitMonth, outcomes: &[f64]) -> SummaryRow {
    let logs: Vec<f64> = outcomes.iter().map(|o| o.ln_1p()).collect();

    let mut counts = [0usize; 6];
    for &o in outcomes {
        counts[severity_bucket(o)] += 1;
    }
    let n = outcomes.len();
    let proportions = counts.map(|c| c as f64 / n as f64);

    SummaryRow {
        key,
        mean_log_prediction: logs.iter().mean(),
        std_log_prediction: logs.iter().std_dev(),
        draw_count: n,
        proportions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DrawKey, DrawRow};
    use approx::assert_relative_eq;

    fn draws(rows: &[(u32, u32, f64)]) -> DrawTable {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, &(m, u, o))| DrawRow {
                key: DrawKey::new(UnitMonth::new(m, u), i as u32),
                outcome: o,
            })
            .collect();
        DrawTable::from_rows(Level::Cm, rows).unwrap()
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(severity_bucket(-1.0), 0);
        assert_eq!(severity_bucket(0.0), 0);
        assert_eq!(severity_bucket(0.5), 1);
        assert_eq!(severity_bucket(1.0), 1);
        assert_eq!(severity_bucket(10.0), 1);
        assert_eq!(severity_bucket(11.0), 2);
        assert_eq!(severity_bucket(100.0), 2);
        assert_eq!(severity_bucket(101.0), 3);
        assert_eq!(severity_bucket(1000.0), 3);
        assert_eq!(severity_bucket(1001.0), 4);
        assert_eq!(severity_bucket(10_000.0), 4);
        assert_eq!(severity_bucket(10_001.0), 5);
    }

    #[test]
    fn single_group_summary() {
        let table = draws(&[(457, 57, 0.0), (457, 57, 0.0), (457, 57, 5.0), (457, 57, 50.0)]);
        let summary = aggregate(&table, Level::Cm).unwrap();
        assert_eq!(summary.len(), 1);

        let row = &summary.rows()[0];
        let expected_mean = (0.0 + 0.0 + 5f64.ln_1p() + 50f64.ln_1p()) / 4.0;
        assert_relative_eq!(row.mean_log_prediction, expected_mean, epsilon = 1e-12);
        assert_relative_eq!(row.proportions.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_eq!(row.proportions, [0.5, 0.25, 0.25, 0.0, 0.0, 0.0]);
        assert_eq!(row.draw_count, 4);

        let logs = [0.0, 0.0, 5f64.ln_1p(), 50f64.ln_1p()];
        let var = logs.iter().map(|l| (l - expected_mean).powi(2)).sum::<f64>() / 3.0;
        assert_relative_eq!(row.std_log_prediction, var.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn single_draw_has_nan_std() {
        let table = draws(&[(457, 57, 3.0)]);
        let summary = aggregate(&table, Level::Cm).unwrap();
        assert!(summary.rows()[0].std_log_prediction.is_nan());
    }

    #[test]
    fn one_row_per_group() {
        let table = draws(&[
            (458, 1, 1.0),
            (457, 2, 2.0),
            (457, 1, 3.0),
            (458, 1, 20_000.0),
            (457, 2, 2.0),
        ]);
        let summary = aggregate(&table, Level::Cm).unwrap();
        assert_eq!(summary.len(), 3);
        let keys: Vec<_> = summary.rows().iter().map(|r| r.key).collect();
        assert_eq!(
            keys,
            vec![
                UnitMonth::new(457, 1),
                UnitMonth::new(457, 2),
                UnitMonth::new(458, 1)
            ]
        );
        let row = summary.get(UnitMonth::new(458, 1)).unwrap();
        assert_eq!(row.proportions, [0.0, 0.5, 0.0, 0.0, 0.0, 0.5]);
        let row = summary.get(UnitMonth::new(457, 2)).unwrap();
        assert_eq!(row.std_log_prediction, 0.0);
    }

    #[test]
    fn level_checked() {
        let table = draws(&[(457, 57, 3.0)]);
        assert!(aggregate(&table, Level::Pgm).is_err());
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        let summary = aggregate(&DrawTable::new(Level::Pgm), Level::Pgm).unwrap();
        assert!(summary.is_empty());
    }
}
