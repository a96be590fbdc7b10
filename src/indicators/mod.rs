//! Indicator pipelines: derived columns, time series, and summaries computed
//! from the ingested datasets.
//!
//! Everything here is pure (slices in, values out) so the CLI reports and the
//! TUI pages share one implementation of the arithmetic.

pub mod correlation;
pub mod education;
pub mod literacy;
pub mod wealth;
