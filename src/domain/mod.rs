//! Domain types shared across ingest, indicators, reports, and the TUI.

mod types;

pub use types::*;
