//! Draw expansion: per-row samplers and the table expander built on them.

mod expand;
mod sampler;

pub use expand::expand;
pub use sampler::{DrawDistribution, Sampler};
pub(crate) use sampler::resample_pool;
