//! Command-line parsing for the commune-statistics explorer.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the indicator/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DiplomaTier, ElectionKind, WealthTable};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hexastat", version, about = "Terminal explorer for French commune statistics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI.
    ///
    /// This uses the same data/page pipeline as the report subcommands, but
    /// renders results in a terminal UI using Ratatui.
    Tui(CommonArgs),
    /// Print the education report: commune table, top departments, gender gap,
    /// national trends, and the multi-year distribution.
    Education(EducationArgs),
    /// Print education-vs-votes correlations for one election.
    Correlate(CorrelateArgs),
    /// Print describe statistics for one wealth table.
    Wealth(WealthArgs),
    /// Print commune literacy history and national literacy trends.
    Literacy(LiteracyArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct CommonArgs {
    /// Root directory of the CSV tree (defaults to ./Data, or HEXASTAT_DATA_DIR).
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use the built-in synthetic dataset instead of reading CSVs.
    #[arg(long)]
    pub sample: bool,

    /// Analysis year for education/correlation views.
    #[arg(short = 'y', long, default_value_t = 2022)]
    pub year: u16,

    /// Which election file feeds the vote columns.
    #[arg(short = 'e', long, value_enum, default_value_t = ElectionKind::Presidential)]
    pub election: ElectionKind,

    /// Show top-N departments in ranking views.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the report's main table to CSV. A directory target gets a
    /// timestamped file inside it.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct EducationArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Show only communes whose name contains this substring (case-insensitive).
    #[arg(long, value_name = "NAME")]
    pub commune: Option<String>,

    /// Maximum commune rows to print.
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct CorrelateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Plot the scatter for this candidate (matched case-insensitively).
    #[arg(long, value_name = "NAME")]
    pub candidate: Option<String>,

    /// Education indicator for the scatter x-axis (defaults to attainment).
    #[arg(long, value_enum)]
    pub tier: Option<DiplomaTier>,
}

#[derive(Debug, Parser, Clone)]
pub struct WealthArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Which wealth table to describe.
    #[arg(short = 't', long, value_enum, default_value_t = WealthTable::Isf)]
    pub table: WealthTable,

    /// Department to summarize (defaults to the first one in the table).
    #[arg(short = 'd', long, value_name = "NAME")]
    pub department: Option<String>,

    /// Also print this commune's per-column breakdown.
    #[arg(short = 'c', long, value_name = "NAME")]
    pub commune: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct LiteracyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Department for the commune comparison.
    #[arg(short = 'd', long, value_name = "NAME")]
    pub department: Option<String>,

    /// Commune whose literacy history to print.
    #[arg(short = 'c', long, value_name = "NAME")]
    pub commune: Option<String>,

    /// Comparison year (defaults to the commune's latest available year).
    #[arg(long, value_name = "YEAR")]
    pub at: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_education_defaults() {
        let cli = Cli::parse_from(["hexastat", "education", "--sample"]);
        match cli.command {
            Command::Education(args) => {
                assert!(args.common.sample);
                assert_eq!(args.common.year, 2022);
                assert_eq!(args.common.top, 5);
                assert_eq!(args.limit, 20);
            }
            _ => panic!("expected education subcommand"),
        }
    }

    #[test]
    fn parses_election_value_enum() {
        let cli = Cli::parse_from(["hexastat", "correlate", "-e", "leg", "-y", "2014"]);
        match cli.command {
            Command::Correlate(args) => {
                assert_eq!(args.common.election, ElectionKind::Legislative);
                assert_eq!(args.common.year, 2014);
            }
            _ => panic!("expected correlate subcommand"),
        }
    }

    #[test]
    fn parses_wealth_table_kebab_names() {
        let cli = Cli::parse_from(["hexastat", "wealth", "-t", "terres", "-d", "Ain"]);
        match cli.command {
            Command::Wealth(args) => {
                assert_eq!(args.table, WealthTable::Terres);
                assert_eq!(args.department.as_deref(), Some("Ain"));
            }
            _ => panic!("expected wealth subcommand"),
        }
    }
}
