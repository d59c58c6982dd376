//! # benchmark-draws
//!
//! Draw-based benchmark models for monthly conflict-fatality forecasts.
//!
//! Point predictions per (month, unit) are expanded into a fixed number of
//! stochastic draws, partitioned into calendar years, merged across an
//! ensemble of models, or bootstrapped from binned historical residuals.
//! Draw tables can be collapsed into per-unit summaries and written out in
//! the usual `bm_{level}_{model}_expanded_{year}` layout.

#![allow(clippy::type_complexity)]

pub mod aggregate;
pub mod benchmark;
pub mod bootstrap;
pub mod config;
pub mod core;
pub mod ensemble;
pub mod error;
pub mod partition;
pub mod persist;
pub mod sampling;
pub mod utils;

pub use error::{BenchmarkError, Result};

pub mod prelude {
    pub use crate::aggregate::{aggregate, SummaryTable};
    pub use crate::benchmark::{
        bootstrap_expand_actuals, distribution_expand_ensemble, distribution_expand_single,
    };
    pub use crate::bootstrap::{bootstrap_draws, ResidualBootstrapConfig};
    pub use crate::config::ExpansionConfig;
    pub use crate::core::{
        ActualsTable, DrawTable, Level, MonthId, PredictionTable, StepPredictionTable, UnitMonth,
    };
    pub use crate::ensemble::{merge, ModelDescriptor};
    pub use crate::error::{BenchmarkError, Result};
    pub use crate::partition::{extract_sc_predictions, extract_year, PointSource};
    pub use crate::persist::{save_actuals, save_models, TableSink};
    pub use crate::sampling::{expand, DrawDistribution, Sampler};
}
