//! Keyed input tables: point predictions, observed actuals and step-wise forecasts.

use super::month::{Level, MonthId};
use crate::error::{BenchmarkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Composite (month, spatial unit) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitMonth {
    pub month_id: u32,
    pub unit_id: u32,
}

impl UnitMonth {
    pub fn new(month_id: u32, unit_id: u32) -> Self {
        Self { month_id, unit_id }
    }

    pub fn month(&self) -> MonthId {
        MonthId(self.month_id)
    }
}

/// Reject tables whose key columns disagree in length with the value column.
fn check_lengths(months: &[u32], units: &[u32], values: usize) -> Result<()> {
    if units.len() != months.len() {
        return Err(BenchmarkError::DimensionMismatch {
            expected: months.len(),
            got: units.len(),
        });
    }
    if values != months.len() {
        return Err(BenchmarkError::DimensionMismatch {
            expected: months.len(),
            got: values,
        });
    }
    Ok(())
}

fn check_unique<'a>(keys: impl Iterator<Item = &'a UnitMonth>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(*key) {
            return Err(BenchmarkError::DuplicateKey {
                month_id: key.month_id,
                unit_id: key.unit_id,
            });
        }
    }
    Ok(())
}

/// One expected fatality count for a (month, unit).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    #[serde(flatten)]
    pub key: UnitMonth,
    pub prediction: f64,
}

/// Point predictions keyed by (month, unit), one value per key.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    level: Level,
    rows: Vec<PredictionRow>,
}

impl PredictionTable {
    /// Create an empty table.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            rows: Vec::new(),
        }
    }

    /// Build from rows, rejecting duplicate keys and non-finite predictions.
    pub fn from_rows(level: Level, rows: Vec<PredictionRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| !r.prediction.is_finite()) {
            return Err(BenchmarkError::InvalidInput(format!(
                "non-finite prediction {} at month {}, unit {}",
                bad.prediction, bad.key.month_id, bad.key.unit_id
            )));
        }
        check_unique(rows.iter().map(|r| &r.key))?;
        Ok(Self { level, rows })
    }

    /// Build from parallel key and value columns.
    pub fn from_columns(
        level: Level,
        month_ids: &[u32],
        unit_ids: &[u32],
        predictions: &[f64],
    ) -> Result<Self> {
        check_lengths(month_ids, unit_ids, predictions.len())?;
        let rows = month_ids
            .iter()
            .zip(unit_ids)
            .zip(predictions)
            .map(|((&m, &u), &p)| PredictionRow {
                key: UnitMonth::new(m, u),
                prediction: p,
            })
            .collect();
        Self::from_rows(level, rows)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn rows(&self) -> &[PredictionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All prediction values in row order.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.prediction).collect()
    }

    /// Rows whose month lies in `months`, in their original order.
    pub fn slice_months(&self, months: &RangeInclusive<u32>) -> Self {
        Self {
            level: self.level,
            rows: self
                .rows
                .iter()
                .filter(|r| months.contains(&r.key.month_id))
                .copied()
                .collect(),
        }
    }
}

/// Observed fatalities on the log1p scale; `None` marks a missing observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualsRow {
    #[serde(flatten)]
    pub key: UnitMonth,
    pub ln_ged_sb_dep: Option<f64>,
}

/// Observed outcomes keyed by (month, unit).
#[derive(Debug, Clone, PartialEq)]
pub struct ActualsTable {
    level: Level,
    rows: Vec<ActualsRow>,
}

impl ActualsTable {
    /// Build from rows. Missing values are allowed; NaN is treated as missing.
    pub fn from_rows(level: Level, rows: Vec<ActualsRow>) -> Result<Self> {
        check_unique(rows.iter().map(|r| &r.key))?;
        let rows = rows
            .into_iter()
            .map(|r| ActualsRow {
                ln_ged_sb_dep: r.ln_ged_sb_dep.filter(|v| !v.is_nan()),
                ..r
            })
            .collect();
        Ok(Self { level, rows })
    }

    /// Build from parallel key and log1p value columns.
    pub fn from_columns(
        level: Level,
        month_ids: &[u32],
        unit_ids: &[u32],
        ln_values: &[Option<f64>],
    ) -> Result<Self> {
        check_lengths(month_ids, unit_ids, ln_values.len())?;
        let rows = month_ids
            .iter()
            .zip(unit_ids)
            .zip(ln_values)
            .map(|((&m, &u), &v)| ActualsRow {
                key: UnitMonth::new(m, u),
                ln_ged_sb_dep: v,
            })
            .collect();
        Self::from_rows(level, rows)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn rows(&self) -> &[ActualsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows whose month lies in `months`, in their original order.
    pub fn slice_months(&self, months: &RangeInclusive<u32>) -> Self {
        Self {
            level: self.level,
            rows: self
                .rows
                .iter()
                .filter(|r| months.contains(&r.key.month_id))
                .copied()
                .collect(),
        }
    }

    /// Back-transform to fatality counts with expm1, filling missing values with 0.
    pub fn to_counts(&self) -> Result<PredictionTable> {
        let rows = self
            .rows
            .iter()
            .map(|r| PredictionRow {
                key: r.key,
                prediction: r.ln_ged_sb_dep.unwrap_or(0.0).exp_m1(),
            })
            .collect();
        PredictionTable::from_rows(self.level, rows)
    }
}

/// One row of a step-wise forecast table; `values[i]` belongs to `steps[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    #[serde(flatten)]
    pub key: UnitMonth,
    pub values: Vec<f64>,
}

/// Wide table of log1p predictions per forecast step (`step_pred_<s>` columns).
#[derive(Debug, Clone, PartialEq)]
pub struct StepPredictionTable {
    level: Level,
    steps: Vec<u32>,
    rows: Vec<StepRow>,
}

impl StepPredictionTable {
    /// Build from rows carrying one value per step in `steps`.
    pub fn from_rows(level: Level, steps: Vec<u32>, rows: Vec<StepRow>) -> Result<Self> {
        let mut seen_steps = HashSet::new();
        if let Some(dup) = steps.iter().find(|s| !seen_steps.insert(**s)) {
            return Err(BenchmarkError::InvalidInput(format!(
                "step {dup} listed more than once"
            )));
        }
        for row in &rows {
            if row.values.len() != steps.len() {
                return Err(BenchmarkError::DimensionMismatch {
                    expected: steps.len(),
                    got: row.values.len(),
                });
            }
        }
        check_unique(rows.iter().map(|r| &r.key))?;
        Ok(Self { level, steps, rows })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    pub fn rows(&self) -> &[StepRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column position of a forecast step.
    pub fn step_index(&self, step: u32) -> Option<usize> {
        self.steps.iter().position(|&s| s == step)
    }
}
