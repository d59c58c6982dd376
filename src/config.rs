//! Run configuration for benchmark expansion.

use crate::core::{Level, MonthId};
use crate::error::{BenchmarkError, Result};
use crate::sampling::DrawDistribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by the single-model, actuals and ensemble expansions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Total draws per (month, unit). Split evenly across ensemble members.
    pub draws: usize,
    /// Spatial level of the input tables.
    pub level: Level,
    /// Distribution used to expand point predictions.
    pub distribution: DrawDistribution,
    /// Calendar years to expand, in output order.
    pub years: Vec<i32>,
    /// Random seed for reproducibility (None for random).
    pub seed: Option<u64>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            draws: 1000,
            level: Level::Cm,
            distribution: DrawDistribution::Poisson,
            years: vec![2018, 2019, 2020, 2021],
            seed: None,
        }
    }
}

impl ExpansionConfig {
    /// Create a config for `level` and `years` with default draws and distribution.
    pub fn new(level: Level, years: Vec<i32>) -> Self {
        Self {
            level,
            years,
            ..Default::default()
        }
    }

    pub fn with_draws(mut self, draws: usize) -> Self {
        self.draws = draws;
        self
    }

    pub fn with_distribution(mut self, distribution: DrawDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read a config from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.draws == 0 {
            return Err(BenchmarkError::InvalidParameter(
                "number of draws must be positive".to_string(),
            ));
        }
        if self.years.is_empty() {
            return Err(BenchmarkError::InvalidParameter(
                "at least one year is required".to_string(),
            ));
        }
        // Every year must map onto the month index.
        for &year in &self.years {
            MonthId::year_range(year)?;
        }
        Ok(())
    }

    /// Generator seeded from `seed`, or from system entropy when unset.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
