//! CSV export of indicator tables.
//!
//! Exports are the "portable" side of the dashboard: the same rows the
//! terminal renders, written with stable headers so they can be reloaded
//! in a spreadsheet or notebook.

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::domain::YearSeries;
use crate::error::AppError;
use crate::indicators::correlation::CandidateCorrelation;
use crate::indicators::education::AttainmentRow;
use crate::indicators::wealth::ColumnSummary;

/// `<dir>/<stem>_<timestamp>.csv`, so repeated exports never clobber.
pub fn timestamped_path(dir: &Path, stem: &str) -> PathBuf {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{stem}_{ts}.csv"))
}

fn writer(path: &Path) -> Result<csv::Writer<std::fs::File>, AppError> {
    csv::Writer::from_path(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create export file '{}': {e}",
            path.display()
        ))
    })
}

fn finish(mut w: csv::Writer<std::fs::File>, path: &Path) -> Result<(), AppError> {
    w.flush()
        .map_err(|e| AppError::runtime(format!("Failed to write '{}': {e}", path.display())))
}

pub fn write_attainment_csv(path: &Path, rows: &[AttainmentRow]) -> Result<(), AppError> {
    let mut w = writer(path)?;
    w.write_record(["code", "commune", "department", "graduates", "no_diploma", "percent"])
        .map_err(|e| AppError::runtime(format!("Failed to write export header: {e}")))?;
    for r in rows {
        w.write_record([
            r.code.as_str(),
            r.commune.as_str(),
            r.department.as_str(),
            &format!("{:.0}", r.graduates),
            &format!("{:.0}", r.without_diploma),
            &format!("{:.4}", r.percent),
        ])
        .map_err(|e| AppError::runtime(format!("Failed to write export row: {e}")))?;
    }
    finish(w, path)
}

pub fn write_correlations_csv(
    path: &Path,
    matrix: &[CandidateCorrelation],
) -> Result<(), AppError> {
    let mut w = writer(path)?;
    w.write_record(["candidate", "r_attainment", "r_sup", "r_bac", "r_nodip", "n"])
        .map_err(|e| AppError::runtime(format!("Failed to write export header: {e}")))?;
    for c in matrix {
        w.write_record([
            c.candidate.as_str(),
            &fmt_r(c.attainment),
            &fmt_r(c.sup),
            &fmt_r(c.bac),
            &fmt_r(c.nodip),
            &c.n.to_string(),
        ])
        .map_err(|e| AppError::runtime(format!("Failed to write export row: {e}")))?;
    }
    finish(w, path)
}

/// Write several year-indexed series side by side. Years are the union of
/// all series; a series missing a year gets an empty cell.
pub fn write_series_csv(path: &Path, columns: &[(&str, &YearSeries)]) -> Result<(), AppError> {
    let mut w = writer(path)?;

    let mut header = vec!["year".to_string()];
    header.extend(columns.iter().map(|(name, _)| name.to_string()));
    w.write_record(&header)
        .map_err(|e| AppError::runtime(format!("Failed to write export header: {e}")))?;

    let mut years: Vec<u16> = columns
        .iter()
        .flat_map(|(_, s)| s.years.iter().copied())
        .collect();
    years.sort_unstable();
    years.dedup();

    for year in years {
        let mut record = vec![year.to_string()];
        for (_, series) in columns {
            let cell = series
                .years
                .iter()
                .position(|&y| y == year)
                .map(|i| format!("{:.4}", series.values[i]))
                .unwrap_or_default();
            record.push(cell);
        }
        w.write_record(&record)
            .map_err(|e| AppError::runtime(format!("Failed to write export row: {e}")))?;
    }
    finish(w, path)
}

pub fn write_wealth_summary_csv(path: &Path, summaries: &[ColumnSummary]) -> Result<(), AppError> {
    let mut w = writer(path)?;
    w.write_record(["column", "count", "mean", "std", "min", "q25", "median", "q75", "max"])
        .map_err(|e| AppError::runtime(format!("Failed to write export header: {e}")))?;
    for s in summaries {
        let d = &s.describe;
        w.write_record([
            s.column.as_str(),
            &d.count.to_string(),
            &format!("{:.4}", d.mean),
            &format!("{:.4}", d.std),
            &format!("{:.4}", d.min),
            &format!("{:.4}", d.q25),
            &format!("{:.4}", d.median),
            &format!("{:.4}", d.q75),
            &format!("{:.4}", d.max),
        ])
        .map_err(|e| AppError::runtime(format!("Failed to write export row: {e}")))?;
    }
    finish(w, path)
}

fn fmt_r(r: Option<f64>) -> String {
    match r {
        Some(v) => format!("{v:.6}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_csv_unions_years() {
        let dir = std::env::temp_dir();
        let path = dir.join("hexastat_test_series.csv");

        let mut a = YearSeries::default();
        a.push(2020, 1.0);
        a.push(2021, 2.0);
        let mut b = YearSeries::default();
        b.push(2021, 3.0);

        write_series_csv(&path, &[("psup", &a), ("pbac", &b)]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("year,psup,pbac"));
        assert_eq!(lines.next(), Some("2020,1.0000,"));
        assert_eq!(lines.next(), Some("2021,2.0000,3.0000"));
    }

    #[test]
    fn attainment_csv_round_numbers() {
        let dir = std::env::temp_dir();
        let path = dir.join("hexastat_test_attainment.csv");

        let rows = vec![AttainmentRow {
            code: "01001".to_string(),
            commune: "Bourg".to_string(),
            department: "Ain".to_string(),
            graduates: 120.0,
            without_diploma: 380.0,
            percent: 24.0,
        }];
        write_attainment_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert!(text.starts_with("code,commune,department"));
        assert!(text.contains("01001,Bourg,Ain,120,380,24.0000"));
    }

    #[test]
    fn timestamped_path_keeps_stem() {
        let p = timestamped_path(Path::new("exports"), "correlations");
        let name = p.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("correlations_"));
        assert!(name.ends_with(".csv"));
    }
}
