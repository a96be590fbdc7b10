//! hexastat: a terminal explorer for French commune statistics.
//!
//! Three data families share one pipeline: education attainment by diploma
//! tier (1968-2022 censuses), election results (2022 presidential and
//! legislative), real-estate and fiscal wealth tables, and historical
//! literacy series (1816-1946). The `hexastat` binary exposes them through
//! report subcommands and an interactive TUI.

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod tui;
