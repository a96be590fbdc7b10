//! Small, pure numeric helpers used by the indicator pipelines.

pub mod ols;
pub mod stats;
