//! Terminal reporting.
//!
//! Formatting code lives in one place so:
//! - the indicator pipelines stay clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;
