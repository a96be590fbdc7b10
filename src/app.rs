//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the CSV tree (or the synthetic sample)
//! - computes indicator pages
//! - prints reports/plots
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Command, CommonArgs, CorrelateArgs, EducationArgs, LiteracyArgs, WealthArgs};
use crate::domain::AppConfig;
use crate::error::AppError;
use crate::indicators::{education, literacy};
use crate::plot::ascii::{self, PlotSeries};
use crate::report::format;

pub mod pipeline;

/// Entry point for the `hexastat` binary.
pub fn run() -> Result<(), AppError> {
    // .env may carry HEXASTAT_DATA_DIR; missing files are fine.
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We want `hexastat` and `hexastat --sample` to behave like
    // `hexastat tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => crate::tui::run(config_from_common(&args)),
        Command::Education(args) => handle_education(args),
        Command::Correlate(args) => handle_correlate(args),
        Command::Wealth(args) => handle_wealth(args),
        Command::Literacy(args) => handle_literacy(args),
    }
}

pub fn config_from_common(args: &CommonArgs) -> AppConfig {
    AppConfig {
        data_dir: pipeline::resolve_data_dir(args.data_dir.clone()),
        sample: args.sample,
        year: args.year,
        election: args.election,
        top_n: args.top,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    }
}

fn handle_education(args: EducationArgs) -> Result<(), AppError> {
    let config = config_from_common(&args.common);
    let ds = pipeline::Datasets::load(&config)?;
    let page = pipeline::education_page(&ds, &config)?;

    print!("{}", format::format_header("Education", &config.year.to_string()));

    if let Some(needle) = &args.commune {
        let matches: Vec<education::AttainmentRow> = education::search_attainment(&page.table, needle)
            .into_iter()
            .cloned()
            .collect();
        if matches.is_empty() {
            return Err(AppError::empty(format!("No commune matches '{needle}'.")));
        }
        print!("{}", format::format_attainment_table(&matches, args.limit));
    } else {
        print!("{}", format::format_attainment_table(&page.table, args.limit));
    }

    println!();
    print!("{}", format::format_top_departments(&page.top_departments, page.year));
    println!();
    print!("{}", format::format_gender_gap(&page.gender_gap));
    println!();
    print!("{}", format::format_series("Higher-education graduates (men)", &page.tier_counts.men));
    println!();
    print!("{}", format::format_series("Higher-education graduates (women)", &page.tier_counts.women));
    println!();
    print!("{}", format::format_series("Higher-education graduates (total)", &page.tier_counts.total));
    println!();
    print!("{}", format::format_distributions(&page.distributions));

    if config.plot {
        let plot = ascii::render_year_plot(
            &[
                PlotSeries {
                    label: "mean psup (higher education %)",
                    marker: '*',
                    series: &page.national_sup,
                },
                PlotSeries {
                    label: "mean pbac (baccalaureat %)",
                    marker: '+',
                    series: &page.national_bac,
                },
            ],
            config.plot_width,
            config.plot_height,
        );
        println!();
        print!("{plot}");
    }

    if let Some(path) = &config.export {
        let path = resolve_export(path, "attainment");
        crate::io::export::write_attainment_csv(&path, &page.table)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_correlate(args: CorrelateArgs) -> Result<(), AppError> {
    let config = config_from_common(&args.common);
    let ds = pipeline::Datasets::load(&config)?;
    let page = pipeline::correlation_page(&ds, &config)?;

    print!(
        "{}",
        format::format_header("Correlation", &format!("{} {}", page.kind.display_name(), page.year))
    );
    print!("{}", format::format_correlations(&page.matrix, page.kind, page.year));

    if let Some(name) = &args.candidate {
        let idx = page
            .candidates
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                AppError::input(format!(
                    "Unknown candidate '{name}'. Known: {}.",
                    page.candidates.join(", ")
                ))
            })?;

        if config.plot {
            let (pairs, trend) = page.scatter(idx, args.tier);
            let x_label = args
                .tier
                .map(|t| t.display_name())
                .unwrap_or("attainment %");
            let plot = ascii::render_scatter_plot(
                &pairs,
                trend.as_ref(),
                config.plot_width,
                config.plot_height,
                x_label,
                &format!("{} share %", page.candidates[idx]),
            );
            println!();
            print!("{plot}");
        }
    }

    if let Some(path) = &config.export {
        let path = resolve_export(path, "correlations");
        crate::io::export::write_correlations_csv(&path, &page.matrix)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_wealth(args: WealthArgs) -> Result<(), AppError> {
    let config = config_from_common(&args.common);
    let ds = pipeline::Datasets::load(&config)?;
    let page = pipeline::wealth_page(
        &ds,
        args.table,
        args.department.as_deref(),
        args.commune.as_deref(),
    )?;

    print!("{}", format::format_header("Wealth", page.table.display_name()));
    print!(
        "{}",
        format::format_wealth_summary(page.table, &page.department, &page.summaries)
    );
    if let Some(breakdown) = &page.breakdown {
        println!();
        print!("{}", format::format_commune_breakdown(breakdown));
    }

    if let Some(path) = &config.export {
        let path = resolve_export(path, "wealth_summary");
        crate::io::export::write_wealth_summary_csv(&path, &page.summaries)?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_literacy(args: LiteracyArgs) -> Result<(), AppError> {
    let config = config_from_common(&args.common);
    let ds = pipeline::Datasets::load(&config)?;
    let page = pipeline::literacy_page(&ds)?;

    print!("{}", format::format_header("Literacy", "1816-1946"));

    if let Some(name) = &args.commune {
        let row = ds
            .literacy
            .iter()
            .filter(|r| args.department.as_deref().is_none_or(|d| r.department == d))
            .find(|r| r.commune.eq_ignore_ascii_case(name))
            .ok_or_else(|| AppError::input(format!("Unknown commune '{name}'.")))?;

        let history = literacy::commune_history(row);
        print!(
            "{}",
            format::format_literacy_commune(&row.commune, &history, literacy::progression(&history))
        );

        let at = args.at.or_else(|| literacy::latest_percent(row).map(|(y, _)| y));
        if let Some(year) = at {
            if let Some(cmp) =
                literacy::department_comparison(&ds.literacy, &row.department, &row.commune, year)
            {
                println!();
                print!("{}", format::format_department_comparison(&cmp));
            }
        }
        println!();
    }

    print!("{}", format::format_national_literacy(&page.national));

    if config.plot {
        let plot = ascii::render_year_plot(
            &[
                PlotSeries {
                    label: "mean literate share %",
                    marker: '*',
                    series: &page.national.literate_percent,
                },
            ],
            config.plot_width,
            config.plot_height,
        );
        println!();
        print!("{plot}");
    }

    if let Some(path) = &config.export {
        let path = resolve_export(path, "literacy_series");
        crate::io::export::write_series_csv(
            &path,
            &[
                ("peralpha_mean", &page.national.literate_percent),
                ("palpha_mean", &page.national.literate_count),
                ("conjsign_mean", &page.national.signing),
                ("conjnosi_mean", &page.national.not_signing),
            ],
        )?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

/// Resolve an `--export` target: a directory gets a timestamped file inside
/// it, anything else is taken verbatim.
fn resolve_export(path: &Path, stem: &str) -> PathBuf {
    if path.is_dir() {
        crate::io::export::timestamped_path(path, stem)
    } else {
        path.to_path_buf()
    }
}

/// Rewrite argv so `hexastat` defaults to `hexastat tui`.
///
/// Rules:
/// - `hexastat`                      -> `hexastat tui`
/// - `hexastat --sample ...`         -> `hexastat tui --sample ...`
/// - `hexastat --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "tui" | "education" | "correlate" | "wealth" | "literacy"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(args(&["hexastat"])), args(&["hexastat", "tui"]));
    }

    #[test]
    fn leading_flag_is_forwarded_to_tui() {
        assert_eq!(
            rewrite_args(args(&["hexastat", "--sample"])),
            args(&["hexastat", "tui", "--sample"])
        );
    }

    #[test]
    fn export_directory_targets_get_timestamped_files() {
        let dir = std::env::temp_dir();
        let resolved = resolve_export(&dir, "attainment");
        assert_eq!(resolved.parent(), Some(dir.as_path()));
        let name = resolved.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("attainment_"));
        assert!(name.ends_with(".csv"));

        let file = dir.join("hexastat_out.csv");
        assert_eq!(resolve_export(&file, "attainment"), file);
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        assert_eq!(
            rewrite_args(args(&["hexastat", "education", "-y", "2014"])),
            args(&["hexastat", "education", "-y", "2014"])
        );
        assert_eq!(rewrite_args(args(&["hexastat", "--help"])), args(&["hexastat", "--help"]));
    }
}
