//! Long-format draw tables produced by expansion and bootstrapping.

use super::month::Level;
use super::table::{PredictionTable, UnitMonth};
use crate::error::{BenchmarkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Composite key of one simulated outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DrawKey {
    pub month_id: u32,
    pub unit_id: u32,
    pub draw: u32,
}

impl DrawKey {
    pub fn new(key: UnitMonth, draw: u32) -> Self {
        Self {
            month_id: key.month_id,
            unit_id: key.unit_id,
            draw,
        }
    }

    pub fn unit_month(&self) -> UnitMonth {
        UnitMonth::new(self.month_id, self.unit_id)
    }
}

/// One simulated outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawRow {
    #[serde(flatten)]
    pub key: DrawKey,
    pub outcome: f64,
}

/// Draws keyed by (month, unit, draw).
///
/// Tables from a single expansion hold each key once. Tables merged across
/// ensemble members may repeat a draw index within a (month, unit) group.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawTable {
    level: Level,
    rows: Vec<DrawRow>,
}

impl DrawTable {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            rows: Vec::new(),
        }
    }

    pub fn with_capacity(level: Level, capacity: usize) -> Self {
        Self {
            level,
            rows: Vec::with_capacity(capacity),
        }
    }

    /// Build from existing rows, rejecting non-finite outcomes.
    pub fn from_rows(level: Level, rows: Vec<DrawRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| !r.outcome.is_finite()) {
            return Err(BenchmarkError::InvalidInput(format!(
                "non-finite outcome at month {}, unit {}, draw {}",
                bad.key.month_id, bad.key.unit_id, bad.key.draw
            )));
        }
        Ok(Self { level, rows })
    }

    pub(crate) fn push(&mut self, key: DrawKey, outcome: f64) {
        self.rows.push(DrawRow { key, outcome });
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn rows(&self) -> &[DrawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn outcomes(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.outcome)
    }

    /// Row-stack another table below this one. Draw indices are kept as-is.
    pub fn append(&mut self, other: DrawTable) -> Result<()> {
        self.level.ensure(other.level)?;
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Row-stack a sequence of tables.
    pub fn concat(level: Level, tables: impl IntoIterator<Item = DrawTable>) -> Result<Self> {
        let mut merged = Self::new(level);
        for table in tables {
            merged.append(table)?;
        }
        Ok(merged)
    }

    /// Outcomes grouped by (month, unit), groups ordered by key.
    pub fn groups(&self) -> BTreeMap<UnitMonth, Vec<f64>> {
        let mut groups: BTreeMap<UnitMonth, Vec<f64>> = BTreeMap::new();
        for row in &self.rows {
            groups
                .entry(row.key.unit_month())
                .or_default()
                .push(row.outcome);
        }
        groups
    }

    /// Outcomes of one (month, unit) group in row order.
    pub fn outcomes_for(&self, key: UnitMonth) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.key.unit_month() == key)
            .map(|r| r.outcome)
            .collect()
    }

    /// Verify that every group numbers its draws `base..base + n` without gaps or repeats,
    /// with the same `n` across groups. Returns `n`.
    pub fn check_contiguous_draws(&self, base: u32) -> Result<usize> {
        let mut indices: BTreeMap<UnitMonth, Vec<u32>> = BTreeMap::new();
        for row in &self.rows {
            indices
                .entry(row.key.unit_month())
                .or_default()
                .push(row.key.draw);
        }

        let mut expected_len: Option<usize> = None;
        for (key, mut draws) in indices {
            draws.sort_unstable();
            let n = draws.len();
            if let Some(expected) = expected_len {
                if expected != n {
                    return Err(BenchmarkError::DimensionMismatch { expected, got: n });
                }
            }
            expected_len = Some(n);
            for (offset, &draw) in draws.iter().enumerate() {
                if draw != base + offset as u32 {
                    return Err(BenchmarkError::InvalidInput(format!(
                        "draw indices of month {}, unit {} are not contiguous from {base}",
                        key.month_id, key.unit_id
                    )));
                }
            }
        }
        Ok(expected_len.unwrap_or(0))
    }
}

/// A calendar year of source predictions together with its expanded draws.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRecord {
    pub year: i32,
    pub source: PredictionTable,
    pub draws: DrawTable,
}

/// Draws for one calendar year, without the predictions they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct YearDraws {
    pub year: i32,
    pub draws: DrawTable,
}

impl From<YearRecord> for YearDraws {
    fn from(record: YearRecord) -> Self {
        Self {
            year: record.year,
            draws: record.draws,
        }
    }
}
