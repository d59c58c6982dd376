//! Ensemble benchmarks built from several constituent models.

mod merge;

pub use merge::{
    draws_per_model, expand_model, merge, EnsembleDraws, ModelDescriptor, ModelExpansion,
};
