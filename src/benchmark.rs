//! Benchmark runners: year-by-year expansion of one model, of observed
//! actuals, or of an ensemble of models.

use crate::config::ExpansionConfig;
use crate::core::{ActualsTable, YearRecord};
use crate::ensemble::{merge, EnsembleDraws, ModelDescriptor};
use crate::error::Result;
use crate::partition::{extract_year, PointSource};
use crate::sampling::{expand, Sampler};
use rand::Rng;

/// Expand one model's point predictions for every configured year using the
/// configured distribution.
pub fn distribution_expand_single<R: Rng + ?Sized>(
    predictions: &dyn PointSource,
    config: &ExpansionConfig,
    rng: &mut R,
) -> Result<Vec<YearRecord>> {
    config.validate()?;
    let sampler = Sampler::from(config.distribution);

    let mut records = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        log::info!("expanding {} predictions for {year}", config.distribution);
        let source = predictions.year_predictions(year)?;
        let draws = expand(&source, config.draws, config.level, &sampler, rng)?;
        records.push(YearRecord {
            year,
            source,
            draws,
        });
    }
    Ok(records)
}

/// Bootstrap benchmark from observed outcomes.
///
/// Actuals are mapped back from log1p to counts (missing as 0). For each
/// year, every (month, unit) draws with replacement from the pool of that
/// year's observed counts.
pub fn bootstrap_expand_actuals<R: Rng + ?Sized>(
    actuals: &ActualsTable,
    config: &ExpansionConfig,
    rng: &mut R,
) -> Result<Vec<YearRecord>> {
    config.validate()?;
    let counts = actuals.to_counts()?;

    let mut records = Vec::with_capacity(config.years.len());
    for &year in &config.years {
        log::info!("bootstrapping actuals for {year}");
        let source = extract_year(year, &counts)?;
        let pool = source.values();
        let draws = expand(
            &source,
            config.draws,
            config.level,
            &Sampler::Resample(&pool),
            rng,
        )?;
        records.push(YearRecord {
            year,
            source,
            draws,
        });
    }
    Ok(records)
}

/// Ensemble benchmark: each model gets `config.draws / models.len()` draws.
pub fn distribution_expand_ensemble<R: Rng + ?Sized>(
    models: &[ModelDescriptor],
    config: &ExpansionConfig,
    rng: &mut R,
) -> Result<EnsembleDraws> {
    config.validate()?;
    merge(
        models,
        config.level,
        &config.years,
        config.draws,
        config.distribution,
        rng,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Level, PredictionTable, UnitMonth};
    use crate::error::BenchmarkError;
    use crate::sampling::DrawDistribution;

    fn predictions() -> PredictionTable {
        let months: Vec<u32> = (457..=480).collect();
        let units = vec![57; months.len()];
        let values: Vec<f64> = months.iter().map(|&m| (m - 456) as f64).collect();
        PredictionTable::from_columns(Level::Cm, &months, &units, &values).unwrap()
    }

    #[test]
    fn single_model_expands_each_year() {
        let config = ExpansionConfig::new(Level::Cm, vec![2018, 2019])
            .with_draws(20)
            .with_seed(42);
        let mut rng = config.rng();
        let records = distribution_expand_single(&predictions(), &config, &mut rng).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].year, 2019);
        assert_eq!(records[0].source.len(), 12);
        assert_eq!(records[0].draws.len(), 12 * 20);
        assert_eq!(records[1].draws.check_contiguous_draws(0), Ok(20));
    }

    #[test]
    fn uniform_single_model_repeats_predictions() {
        let config = ExpansionConfig::new(Level::Cm, vec![2019])
            .with_draws(3)
            .with_distribution(DrawDistribution::Uniform);
        let mut rng = config.rng();
        let records = distribution_expand_single(&predictions(), &config, &mut rng).unwrap();
        assert_eq!(
            records[0].draws.outcomes_for(UnitMonth::new(469, 57)),
            vec![13.0; 3]
        );
    }

    #[test]
    fn actuals_bootstrap_draws_from_same_year() {
        let months: Vec<u32> = (457..=480).collect();
        let units = vec![1; months.len()];
        // 2018 holds counts 0 and 9, 2019 holds 99 only; one value missing.
        let ln: Vec<Option<f64>> = months
            .iter()
            .map(|&m| match m {
                457 => None,
                458..=468 => Some(9f64.ln_1p()),
                _ => Some(99f64.ln_1p()),
            })
            .collect();
        let actuals = ActualsTable::from_columns(Level::Cm, &months, &units, &ln).unwrap();

        let config = ExpansionConfig::new(Level::Cm, vec![2018, 2019])
            .with_draws(50)
            .with_seed(8);
        let mut rng = config.rng();
        let records = bootstrap_expand_actuals(&actuals, &config, &mut rng).unwrap();

        assert!(records[0]
            .draws
            .outcomes()
            .all(|d| d == 0.0 || (d - 9.0).abs() < 1e-9));
        assert!(records[1].draws.outcomes().all(|d| (d - 99.0).abs() < 1e-9));
        assert_eq!(records[1].draws.len(), 12 * 50);
    }

    #[test]
    fn ensemble_runner_uses_config() {
        let models = vec![
            ModelDescriptor::new("m1", predictions()),
            ModelDescriptor::new("m2", predictions()),
        ];
        let config = ExpansionConfig::new(Level::Cm, vec![2018])
            .with_draws(11)
            .with_seed(1);
        let mut rng = config.rng();
        let result = distribution_expand_ensemble(&models, &config, &mut rng).unwrap();
        assert_eq!(result.draws_per_model, 5);
        assert_eq!(result.merged[0].draws.len(), 12 * 10);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = ExpansionConfig::new(Level::Cm, vec![]);
        let mut rng = config.rng();
        assert!(matches!(
            distribution_expand_single(&predictions(), &config, &mut rng),
            Err(BenchmarkError::InvalidParameter(_))
        ));
    }
}
