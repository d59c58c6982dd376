//! Persistence of benchmark tables.
//!
//! One table is written per (model, year). File naming follows the
//! benchmark convention `bm_{level}_{model}_expanded_{year}` for draws and
//! `{level}_actuals_{year}` for observed outcomes. The storage format is up
//! to the [`TableSink`] implementation.

use crate::aggregate::SummaryTable;
use crate::core::{ActualsTable, DrawTable, Level, PredictionTable, UnitMonth, YearDraws};
use crate::ensemble::ModelExpansion;
use crate::error::Result;
use crate::partition::extract_year;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Name of the draw table of `model` for `year`.
pub fn model_table_name(level: Level, model: &str, year: i32) -> String {
    format!("bm_{level}_{model}_expanded_{year}")
}

/// Name of the actuals table for `year`, or for all years when `None`.
pub fn actuals_table_name(level: Level, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("{level}_actuals_{year}"),
        None => format!("{level}_actuals_allyears"),
    }
}

/// Destination for finished tables.
pub trait TableSink {
    /// Store a draw table under `name`.
    fn write_draws(&mut self, name: &str, table: &DrawTable) -> Result<()>;

    /// Store one observed or predicted count per (month, unit) under `name`.
    fn write_outcomes(&mut self, name: &str, table: &PredictionTable) -> Result<()>;

    /// Store an aggregated summary under `name`.
    fn write_summary(&mut self, name: &str, table: &SummaryTable) -> Result<()>;
}

/// A named benchmark and its per-year draws.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    pub name: String,
    pub years: Vec<YearDraws>,
}

impl Benchmark {
    pub fn new(name: impl Into<String>, years: Vec<YearDraws>) -> Self {
        Self {
            name: name.into(),
            years,
        }
    }
}

impl From<ModelExpansion> for Benchmark {
    fn from(expansion: ModelExpansion) -> Self {
        Self {
            name: expansion.name,
            years: expansion.years.into_iter().map(YearDraws::from).collect(),
        }
    }
}

/// Write every year of every benchmark. Returns the table names in write order.
///
/// Fails with `LevelMismatch` if a draw table is not at `level`.
pub fn save_models<S: TableSink + ?Sized>(
    sink: &mut S,
    level: Level,
    benchmarks: &[Benchmark],
) -> Result<Vec<String>> {
    let mut written = Vec::new();
    for benchmark in benchmarks {
        for record in &benchmark.years {
            level.ensure(record.draws.level())?;
            let name = model_table_name(level, &benchmark.name, record.year);
            log::info!("writing {name}");
            sink.write_draws(&name, &record.draws)?;
            written.push(name);
        }
    }
    Ok(written)
}

/// Write observed counts per year and for all years together.
///
/// Actuals are mapped back from log1p to counts, missing values as 0.
pub fn save_actuals<S: TableSink + ?Sized>(
    sink: &mut S,
    actuals: &ActualsTable,
    years: &[i32],
) -> Result<Vec<String>> {
    let level = actuals.level();
    let counts = actuals.to_counts()?;

    let mut written = Vec::with_capacity(years.len() + 1);
    for &year in years {
        let name = actuals_table_name(level, Some(year));
        log::info!("writing {name}");
        sink.write_outcomes(&name, &extract_year(year, &counts)?)?;
        written.push(name);
    }
    let name = actuals_table_name(level, None);
    log::info!("writing {name}");
    sink.write_outcomes(&name, &counts)?;
    written.push(name);
    Ok(written)
}

#[derive(Serialize)]
struct OutcomeRow {
    #[serde(flatten)]
    key: UnitMonth,
    outcome: f64,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    level: Level,
    rows: &'a [T],
}

/// Writes each table as `{root}/{name}.json`.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    root: PathBuf,
}

impl JsonDirSink {
    /// Use `root` as output directory, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a table called `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn write<T: Serialize>(&self, name: &str, level: Level, rows: &[T]) -> Result<()> {
        let mut writer = BufWriter::new(File::create(self.path_for(name))?);
        serde_json::to_writer(&mut writer, &Envelope { level, rows })?;
        writer.flush()?;
        Ok(())
    }
}

impl TableSink for JsonDirSink {
    fn write_draws(&mut self, name: &str, table: &DrawTable) -> Result<()> {
        self.write(name, table.level(), table.rows())
    }

    fn write_outcomes(&mut self, name: &str, table: &PredictionTable) -> Result<()> {
        let rows: Vec<OutcomeRow> = table
            .rows()
            .iter()
            .map(|r| OutcomeRow {
                key: r.key,
                outcome: r.prediction,
            })
            .collect();
        self.write(name, table.level(), &rows)
    }

    fn write_summary(&mut self, name: &str, table: &SummaryTable) -> Result<()> {
        self.write(name, table.level(), table.rows())
    }
}

/// Keeps written tables in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    draws: BTreeMap<String, DrawTable>,
    outcomes: BTreeMap<String, PredictionTable>,
    summaries: BTreeMap<String, SummaryTable>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self, name: &str) -> Option<&DrawTable> {
        self.draws.get(name)
    }

    pub fn outcomes(&self, name: &str) -> Option<&PredictionTable> {
        self.outcomes.get(name)
    }

    pub fn summary(&self, name: &str) -> Option<&SummaryTable> {
        self.summaries.get(name)
    }

    /// Names of all stored tables, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .draws
            .keys()
            .chain(self.outcomes.keys())
            .chain(self.summaries.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

impl TableSink for MemorySink {
    fn write_draws(&mut self, name: &str, table: &DrawTable) -> Result<()> {
        self.draws.insert(name.to_string(), table.clone());
        Ok(())
    }

    fn write_outcomes(&mut self, name: &str, table: &PredictionTable) -> Result<()> {
        self.outcomes.insert(name.to_string(), table.clone());
        Ok(())
    }

    fn write_summary(&mut self, name: &str, table: &SummaryTable) -> Result<()> {
        self.summaries.insert(name.to_string(), table.clone());
        Ok(())
    }
}
