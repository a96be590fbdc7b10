//! Fixed-width table formatting for the CLI reports.

use crate::domain::{ElectionKind, WealthTable, YearSeries};
use crate::indicators::correlation::{self, CandidateCorrelation};
use crate::indicators::education::{AttainmentRow, GenderGapSeries, YearDistribution};
use crate::indicators::literacy::{DepartmentComparison, NationalLiteracy, Progression};
use crate::indicators::wealth::{ColumnSummary, CommuneBreakdown};
use crate::math::stats::Describe;

pub fn format_header(page: &str, detail: &str) -> String {
    format!("=== hexastat - {page} ({detail}) ===\n")
}

/// Per-commune attainment table, truncated to `limit` rows.
pub fn format_attainment_table(rows: &[AttainmentRow], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<8} {:<24} {:<16} {:>12} {:>12} {:>8}\n",
        "code", "commune", "department", "graduates", "no diploma", "pct"
    ));
    out.push_str(&format!(
        "{:-<8} {:-<24} {:-<16} {:-<12} {:-<12} {:-<8}\n",
        "", "", "", "", "", ""
    ));
    for r in rows.iter().take(limit) {
        out.push_str(&format!(
            "{:<8} {:<24} {:<16} {:>12.0} {:>12.0} {:>8.2}\n",
            truncate(&r.code, 8),
            truncate(&r.commune, 24),
            truncate(&r.department, 16),
            r.graduates,
            r.without_diploma,
            r.percent,
        ));
    }
    if rows.len() > limit {
        out.push_str(&format!("... and {} more communes\n", rows.len() - limit));
    }
    out
}

pub fn format_top_departments(top: &[(String, f64)], year: u16) -> String {
    let mut out = String::new();
    out.push_str(&format!("Top departments by higher-education share, {year}:\n"));
    for (i, (name, pct)) in top.iter().enumerate() {
        out.push_str(&format!("{:>3}. {:<24} {:>7.2}%\n", i + 1, truncate(name, 24), pct));
    }
    out
}

pub fn format_gender_gap(gap: &GenderGapSeries) -> String {
    let mut out = String::new();
    out.push_str("Mean higher-education counts per commune, by sex:\n");
    out.push_str(&format!("{:<6} {:>12} {:>12} {:>10}\n", "year", "men", "women", "gap"));
    for ((&year, &men), &women) in gap
        .men
        .years
        .iter()
        .zip(&gap.men.values)
        .zip(&gap.women.values)
    {
        out.push_str(&format!(
            "{:<6} {:>12.1} {:>12.1} {:>10.1}\n",
            year,
            men,
            women,
            men - women
        ));
    }
    out
}

pub fn format_series(label: &str, series: &YearSeries) -> String {
    let mut out = String::new();
    out.push_str(&format!("{label}:\n"));
    for (&year, &v) in series.years.iter().zip(&series.values) {
        out.push_str(&format!("{:<6} {:>14.2}\n", year, v));
    }
    out
}

/// Distribution summary lines plus a small inline histogram per year.
pub fn format_distributions(dists: &[YearDistribution]) -> String {
    let mut out = String::new();
    out.push_str("Commune attainment distribution by year:\n");
    out.push_str(&format!(
        "{:<6} {:>6} {:>10} {:>10} {:>10}  histogram\n",
        "year", "n", "median", "min", "max"
    ));
    for d in dists {
        let max_count = d.histogram.max_count().max(1);
        let bars: String = d
            .histogram
            .counts
            .iter()
            .map(|&c| spark_char(c, max_count))
            .collect();
        out.push_str(&format!(
            "{:<6} {:>6} {:>10.2} {:>10.2} {:>10.2}  {bars}\n",
            d.year, d.n, d.median, d.min, d.max
        ));
    }
    out
}

fn spark_char(count: usize, max: usize) -> char {
    const LEVELS: [char; 5] = [' ', '.', ':', '|', '#'];
    let idx = (count * (LEVELS.len() - 1)).div_ceil(max).min(LEVELS.len() - 1);
    LEVELS[idx]
}

/// Candidate correlation matrix with plain-language readings.
pub fn format_correlations(
    matrix: &[CandidateCorrelation],
    kind: ElectionKind,
    year: u16,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Education vs. {} vote share, {year} (Pearson r per commune):\n",
        kind.display_name()
    ));
    out.push_str(&format!(
        "{:<20} {:>8} {:>8} {:>8} {:>8} {:>7}  reading\n",
        "candidate", "attain", "sup", "bac", "nodip", "n"
    ));
    out.push_str(&format!(
        "{:-<20} {:-<8} {:-<8} {:-<8} {:-<8} {:-<7}  {:-<18}\n",
        "", "", "", "", "", "", ""
    ));
    for c in matrix {
        let reading = c
            .attainment
            .map(correlation::interpret)
            .unwrap_or("too few communes");
        out.push_str(&format!(
            "{:<20} {:>8} {:>8} {:>8} {:>8} {:>7}  {reading}\n",
            truncate(&c.candidate, 20),
            fmt_r(c.attainment),
            fmt_r(c.sup),
            fmt_r(c.bac),
            fmt_r(c.nodip),
            c.n,
        ));
    }
    out
}

pub fn format_wealth_summary(
    table: WealthTable,
    department: &str,
    summaries: &[ColumnSummary],
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} in {department}, per-commune summary:\n",
        table.display_name()
    ));
    out.push_str(&format!(
        "{:<20} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
        "column", "n", "mean", "min", "q25", "median", "max"
    ));
    for s in summaries {
        let d = &s.describe;
        out.push_str(&format!(
            "{:<20} {:>6} {:>12.1} {:>12.1} {:>12.1} {:>12.1} {:>12.1}\n",
            truncate(&s.column, 20),
            d.count,
            d.mean,
            d.min,
            d.q25,
            d.median,
            d.max,
        ));
    }
    out
}

pub fn format_commune_breakdown(breakdown: &CommuneBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}:\n", breakdown.commune));
    let total: f64 = breakdown.entries.iter().map(|(_, v)| v).sum();
    for (column, value) in &breakdown.entries {
        let share = if total > 0.0 { value / total * 100.0 } else { 0.0 };
        out.push_str(&format!(
            "  {:<20} {:>14.1} {:>7.1}%\n",
            truncate(column, 20),
            value,
            share
        ));
    }
    out
}

pub fn format_literacy_commune(
    commune: &str,
    history: &YearSeries,
    progression: Option<Progression>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Literate share in {commune}:\n"));
    for (&year, &v) in history.years.iter().zip(&history.values) {
        out.push_str(&format!("{:<6} {:>7.1}%\n", year, v));
    }
    if let Some(p) = progression {
        out.push_str(&format!(
            "Change {}-{}: {:+.1} points\n",
            p.first_year, p.last_year, p.change
        ));
    }
    out
}

pub fn format_department_comparison(cmp: &DepartmentComparison) -> String {
    let d = &cmp.describe;
    let mut out = String::new();
    out.push_str(&format!(
        "{} vs. {} in {}: {:.1}% (rank {}/{})\n",
        cmp.commune, cmp.department, cmp.year, cmp.commune_value, cmp.rank, cmp.total
    ));
    out.push_str(&format_describe_line(d));
    out
}

pub fn format_national_literacy(national: &NationalLiteracy) -> String {
    let mut out = String::new();
    out.push_str("National literacy trends (commune means):\n");
    out.push_str(&format!(
        "{:<6} {:>10} {:>12} {:>12} {:>12}\n",
        "year", "literate%", "literate", "signing", "not signing"
    ));
    for (i, (&year, &pct)) in national
        .literate_percent
        .years
        .iter()
        .zip(&national.literate_percent.values)
        .enumerate()
    {
        out.push_str(&format!(
            "{:<6} {:>9.1}% {:>12} {:>12} {:>12}\n",
            year,
            pct,
            fmt_at(&national.literate_count, i),
            fmt_at(&national.signing, i),
            fmt_at(&national.not_signing, i),
        ));
    }
    out
}

fn fmt_at(series: &YearSeries, idx: usize) -> String {
    match series.values.get(idx) {
        Some(v) => format!("{v:.0}"),
        None => "-".to_string(),
    }
}

fn format_describe_line(d: &Describe) -> String {
    format!(
        "department: n={} mean={:.1} q25={:.1} median={:.1} q75={:.1}\n",
        d.count, d.mean, d.q25, d.median, d.q75
    )
}

fn fmt_r(r: Option<f64>) -> String {
    match r {
        Some(v) => format!("{v:+.3}"),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::stats;

    #[test]
    fn attainment_table_truncates_and_counts_rest() {
        let rows: Vec<AttainmentRow> = (0..4)
            .map(|i| AttainmentRow {
                code: format!("{i:03}"),
                commune: format!("Commune-{i}"),
                department: "Ain".to_string(),
                graduates: 10.0,
                without_diploma: 90.0,
                percent: 10.0,
            })
            .collect();
        let text = format_attainment_table(&rows, 2);
        assert!(text.contains("Commune-0"));
        assert!(text.contains("Commune-1"));
        assert!(!text.contains("Commune-3"));
        assert!(text.contains("and 2 more communes"));
    }

    #[test]
    fn correlations_show_reading_and_missing_values() {
        let matrix = vec![CandidateCorrelation {
            candidate: "MACRON".to_string(),
            attainment: Some(0.42),
            sup: Some(0.40),
            bac: None,
            nodip: Some(-0.38),
            n: 120,
        }];
        let text = format_correlations(&matrix, ElectionKind::Presidential, 2022);
        assert!(text.contains("presidential"));
        assert!(text.contains("+0.420"));
        assert!(text.contains("moderate"));
        // Missing bac coefficient renders as a dash.
        assert!(text.contains(" - "));
    }

    #[test]
    fn series_table_lists_year_value_pairs() {
        let mut s = YearSeries::default();
        s.push(1968, 1200.0);
        s.push(1975, 2400.0);
        let text = format_series("Higher-education graduates (total)", &s);
        assert!(text.starts_with("Higher-education graduates (total):\n"));
        assert!(text.contains("1968"));
        assert!(text.contains("2400.00"));
    }

    #[test]
    fn wealth_summary_lists_columns() {
        let describe = stats::describe(&[1.0, 2.0, 3.0]).unwrap();
        let text = format_wealth_summary(
            WealthTable::Isf,
            "Ain",
            &[ColumnSummary {
                column: "patrimoine2017".to_string(),
                describe,
            }],
        );
        assert!(text.contains("ISF"));
        assert!(text.contains("patrimoine2017"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("abc", 8), "abc");
        assert_eq!(truncate("abcdefghij", 6), "abcde.");
    }
}
