//! Residual-binned bootstrap of point predictions.

mod binning;
mod residual;

pub use binning::QuantileBins;
pub use residual::{
    bootstrap_draws, bootstrap_draws_with_rng, ActualsPredictions, ResidualBins,
    ResidualBootstrapConfig, ResidualSample,
};
