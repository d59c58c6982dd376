//! Multi-model ensemble of draws.
//!
//! Each constituent model is expanded on its own with an equal share of the
//! draw budget, and the per-model draws are row-stacked per year.

use crate::core::{DrawTable, Level, YearDraws, YearRecord};
use crate::error::{BenchmarkError, Result};
use crate::partition::PointSource;
use crate::sampling::{expand, DrawDistribution, Sampler};
use rand::Rng;

/// A named ensemble member and its point predictions.
pub struct ModelDescriptor {
    name: String,
    predictions: Box<dyn PointSource>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, predictions: impl PointSource + 'static) -> Self {
        Self {
            name: name.into(),
            predictions: Box::new(predictions),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predictions(&self) -> &dyn PointSource {
        self.predictions.as_ref()
    }
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("level", &self.predictions.level())
            .finish()
    }
}

/// Per-year draws of one ensemble member.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelExpansion {
    pub name: String,
    pub years: Vec<YearRecord>,
}

/// Output of [`merge`]: the member expansions and the merged per-year tables.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleDraws {
    pub draws_per_model: usize,
    pub members: Vec<ModelExpansion>,
    pub merged: Vec<YearDraws>,
}

/// Draws allotted to each of `n_models` out of `total_draws`.
///
/// Uses floor division. The remainder `total_draws % n_models` is dropped,
/// which keeps historical benchmark outputs reproducible.
///
/// # Example
/// ```
/// use benchmark_draws::ensemble::draws_per_model;
///
/// assert_eq!(draws_per_model(100, 3).unwrap(), 33);
/// ```
pub fn draws_per_model(total_draws: usize, n_models: usize) -> Result<usize> {
    if n_models == 0 {
        return Err(BenchmarkError::InvalidParameter(
            "ensemble needs at least one model".to_string(),
        ));
    }
    let share = total_draws / n_models;
    if share == 0 {
        return Err(BenchmarkError::InvalidParameter(format!(
            "{total_draws} draws cannot be shared across {n_models} models"
        )));
    }
    Ok(share)
}

/// Expand one model for every year in `years` with `n_draws` draws per row.
pub fn expand_model<R: Rng + ?Sized>(
    model: &ModelDescriptor,
    level: Level,
    years: &[i32],
    n_draws: usize,
    distribution: DrawDistribution,
    rng: &mut R,
) -> Result<ModelExpansion> {
    let sampler = Sampler::from(distribution);
    let mut records = Vec::with_capacity(years.len());
    for &year in years {
        log::info!("expanding {} for {year}", model.name());
        let source = model.predictions().year_predictions(year)?;
        let draws = expand(&source, n_draws, level, &sampler, rng)?;
        records.push(YearRecord {
            year,
            source,
            draws,
        });
    }
    Ok(ModelExpansion {
        name: model.name().to_string(),
        years: records,
    })
}

/// Expand every model with an equal share of `total_draws` and row-stack the
/// results per year, in model order.
///
/// Draw indices are not renumbered: a (month, unit) group of a merged table
/// holds `draws_per_model` draws from each model, each model numbering its
/// own from 0.
pub fn merge<R: Rng + ?Sized>(
    models: &[ModelDescriptor],
    level: Level,
    years: &[i32],
    total_draws: usize,
    distribution: DrawDistribution,
    rng: &mut R,
) -> Result<EnsembleDraws> {
    let per_model = draws_per_model(total_draws, models.len())?;
    let dropped = total_draws - per_model * models.len();
    if dropped > 0 {
        log::info!(
            "{total_draws} draws over {} models: {per_model} per model, {dropped} dropped",
            models.len()
        );
    }

    let mut members = Vec::with_capacity(models.len());
    for model in models {
        members.push(expand_model(
            model,
            level,
            years,
            per_model,
            distribution,
            rng,
        )?);
    }

    let merged = years
        .iter()
        .enumerate()
        .map(|(i, &year)| -> Result<YearDraws> {
            log::debug!("merging {} models for {year}", members.len());
            let tables = members.iter().map(|m| m.years[i].draws.clone());
            Ok(YearDraws {
                year,
                draws: DrawTable::concat(level, tables)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(EnsembleDraws {
        draws_per_model: per_model,
        members,
        merged,
    })
}
