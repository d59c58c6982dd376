//! Calendar-year slicing of month-indexed tables.
//!
//! Month `(year - 1980) * 12 + m` is month `m` of `year`, so a calendar year
//! is a contiguous block of twelve month ids. Slicing never fails on sparse
//! inputs: a year without rows yields an empty table.

use crate::core::{
    ActualsTable, DrawTable, Level, MonthId, PredictionRow, PredictionTable, StepPredictionTable,
};
use crate::error::{BenchmarkError, Result};
use std::ops::RangeInclusive;

/// Forecast step used for month `m` of a calendar year is `m + SC_STEP_OFFSET`.
pub const SC_STEP_OFFSET: u32 = 2;

/// Tables that can be restricted to a range of months.
pub trait MonthIndexed: Sized {
    fn slice_months(&self, months: &RangeInclusive<u32>) -> Self;
}

impl MonthIndexed for PredictionTable {
    fn slice_months(&self, months: &RangeInclusive<u32>) -> Self {
        PredictionTable::slice_months(self, months)
    }
}

impl MonthIndexed for ActualsTable {
    fn slice_months(&self, months: &RangeInclusive<u32>) -> Self {
        ActualsTable::slice_months(self, months)
    }
}

impl MonthIndexed for DrawTable {
    fn slice_months(&self, months: &RangeInclusive<u32>) -> Self {
        let mut sliced = DrawTable::new(self.level());
        for row in self.rows() {
            if months.contains(&row.key.month_id) {
                sliced.push(row.key, row.outcome);
            }
        }
        sliced
    }
}

/// Rows of `table` falling in calendar year `year`.
///
/// # Example
/// ```
/// use benchmark_draws::core::{Level, PredictionTable};
/// use benchmark_draws::partition::extract_year;
///
/// let table = PredictionTable::from_columns(Level::Cm, &[120, 121, 132, 133], &[1; 4], &[1.0; 4]).unwrap();
/// assert_eq!(extract_year(1990, &table).unwrap().len(), 2);
/// ```
pub fn extract_year<T: MonthIndexed>(year: i32, table: &T) -> Result<T> {
    let months = MonthId::year_range(year)?;
    Ok(table.slice_months(&months))
}

/// Source of one point prediction per (month, unit) for a calendar year.
///
/// Ensemble members and single-model benchmarks are expanded from anything
/// implementing this trait.
pub trait PointSource {
    /// Spatial level of the predictions.
    fn level(&self) -> Level;

    /// Point predictions, on the count scale, for every month of `year`.
    fn year_predictions(&self, year: i32) -> Result<PredictionTable>;
}

impl PointSource for PredictionTable {
    fn level(&self) -> Level {
        PredictionTable::level(self)
    }

    fn year_predictions(&self, year: i32) -> Result<PredictionTable> {
        extract_year(year, self)
    }
}

impl PointSource for StepPredictionTable {
    fn level(&self) -> Level {
        StepPredictionTable::level(self)
    }

    fn year_predictions(&self, year: i32) -> Result<PredictionTable> {
        extract_sc_predictions(year, self)
    }
}

/// Calendar-year predictions assembled from a step-wise forecast table.
///
/// Month `m` (1-12) of the year is read from step `m + 2` and mapped back
/// from log1p to counts.
pub fn extract_sc_predictions(year: i32, table: &StepPredictionTable) -> Result<PredictionTable> {
    let months = MonthId::year_range(year)?;

    let mut rows = Vec::new();
    for row in table.rows() {
        if !months.contains(&row.key.month_id) {
            continue;
        }
        let step = row.key.month().month() + SC_STEP_OFFSET;
        let column = table.step_index(step).ok_or_else(|| {
            BenchmarkError::InvalidInput(format!("missing column step_pred_{step}"))
        })?;
        rows.push(PredictionRow {
            key: row.key,
            prediction: row.values[column].exp_m1(),
        });
    }

    if rows.is_empty() {
        log::debug!("no step predictions for {year}");
    }
    PredictionTable::from_rows(table.level(), rows)
}
