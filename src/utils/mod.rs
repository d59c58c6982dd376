//! Utility functions shared by the samplers and the residual bootstrap.

pub mod stats;

pub use stats::{quantile_edges, quantile_sorted};
