//! Error types for the benchmark-draws library.

use crate::core::Level;
use thiserror::Error;

/// Result type alias for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchmarkError>;

/// Errors that can occur while expanding, bootstrapping or persisting draws.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BenchmarkError {
    /// Malformed value handed to a sampler or table constructor.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A residual bin has no historical residuals to resample from.
    #[error("empty residual pool for bin {bin}")]
    EmptyResidualPool { bin: usize },

    /// Column lengths of a table do not agree.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The same (month, unit) key occurs twice in a keyed table.
    #[error("duplicate key: month {month_id}, unit {unit_id}")]
    DuplicateKey { month_id: u32, unit_id: u32 },

    /// A table was handed to an operation declared for another spatial level.
    #[error("level mismatch: expected {expected}, got {got}")]
    LevelMismatch { expected: Level, got: Level },

    /// Quantile binning produced repeated edges.
    #[error("bin edges must be unique; reduce the number of bins")]
    NonUniqueBinEdges,

    /// Filesystem failure while persisting a table.
    #[error("io error: {0}")]
    Io(String),

    /// Table could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for BenchmarkError {
    fn from(err: std::io::Error) -> Self {
        BenchmarkError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BenchmarkError {
    fn from(err: serde_json::Error) -> Self {
        BenchmarkError::Serialization(err.to_string())
    }
}
