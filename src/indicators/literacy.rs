//! Historical literacy indicators (1816-1946).
//!
//! Commune-level history, department comparison at a chosen year, and the
//! national signature/literacy trends.

use std::collections::BTreeSet;

use crate::domain::{LiteracyRow, YearSeries};
use crate::math::stats;

/// `peralpha` history for one commune (missing years skipped by construction).
pub fn commune_history(row: &LiteracyRow) -> YearSeries {
    let mut out = YearSeries::default();
    for (&year, &v) in &row.literate_percent {
        out.push(year, v);
    }
    out
}

/// Latest available `(year, peralpha)` for a commune.
pub fn latest_percent(row: &LiteracyRow) -> Option<(u16, f64)> {
    row.literate_percent
        .iter()
        .next_back()
        .map(|(&y, &v)| (y, v))
}

/// First-to-last change of a series, in its own units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progression {
    pub first_year: u16,
    pub last_year: u16,
    pub change: f64,
}

pub fn progression(series: &YearSeries) -> Option<Progression> {
    let (first_year, first) = series.first()?;
    let (last_year, last) = series.last()?;
    if first_year == last_year {
        return None;
    }
    Some(Progression {
        first_year,
        last_year,
        change: last - first,
    })
}

/// Department-level comparison of `peralpha{year}` around one commune.
#[derive(Debug, Clone)]
pub struct DepartmentComparison {
    pub year: u16,
    pub department: String,
    pub commune: String,
    pub commune_value: f64,
    pub describe: stats::Describe,
    /// 1-based rank of the commune within its department, best first.
    pub rank: usize,
    pub total: usize,
}

/// Compare one commune against its department for a chosen year.
///
/// `None` when the commune has no value that year or the department has no
/// usable rows.
pub fn department_comparison(
    rows: &[LiteracyRow],
    department: &str,
    commune: &str,
    year: u16,
) -> Option<DepartmentComparison> {
    let dep_rows: Vec<&LiteracyRow> = rows.iter().filter(|r| r.department == department).collect();
    let commune_value = dep_rows
        .iter()
        .find(|r| r.commune == commune)?
        .literate_percent
        .get(&year)
        .copied()?;

    let values: Vec<f64> = dep_rows
        .iter()
        .filter_map(|r| r.literate_percent.get(&year).copied())
        .collect();
    let describe = stats::describe(&values)?;

    // Descending rank: communes strictly above ours come first.
    let rank = 1 + values.iter().filter(|&&v| v > commune_value).count();

    Some(DepartmentComparison {
        year,
        department: department.to_string(),
        commune: commune.to_string(),
        commune_value,
        describe,
        rank,
        total: values.len(),
    })
}

/// National commune-mean series for the four literacy families.
#[derive(Debug, Clone, Default)]
pub struct NationalLiteracy {
    /// Mean `conjsign{year}`.
    pub signing: YearSeries,
    /// Mean `conjnosi{year}`.
    pub not_signing: YearSeries,
    /// Mean `palpha{year}`.
    pub literate_count: YearSeries,
    /// Mean `peralpha{year}`.
    pub literate_percent: YearSeries,
}

pub fn national_series(rows: &[LiteracyRow]) -> NationalLiteracy {
    let mut out = NationalLiteracy::default();

    let fill = |select: fn(&LiteracyRow) -> &std::collections::BTreeMap<u16, f64>,
                target: &mut YearSeries| {
        let mut years: BTreeSet<u16> = BTreeSet::new();
        for r in rows {
            years.extend(select(r).keys().copied());
        }
        for year in years {
            let values: Vec<f64> = rows.iter().filter_map(|r| select(r).get(&year).copied()).collect();
            if let Some(m) = stats::mean(&values) {
                target.push(year, m);
            }
        }
    };

    fill(|r| &r.signing, &mut out.signing);
    fill(|r| &r.not_signing, &mut out.not_signing);
    fill(|r| &r.literate_count, &mut out.literate_count);
    fill(|r| &r.literate_percent, &mut out.literate_percent);
    out
}

/// Unique department names across the literacy rows, sorted.
pub fn departments(rows: &[LiteracyRow]) -> Vec<String> {
    let mut out: Vec<String> = rows.iter().map(|r| r.department.clone()).collect();
    out.sort();
    out.dedup();
    out
}

/// Unique commune names within a department, sorted.
pub fn communes_in(rows: &[LiteracyRow], department: &str) -> Vec<String> {
    let mut out: Vec<String> = rows
        .iter()
        .filter(|r| r.department == department)
        .map(|r| r.commune.clone())
        .collect();
    out.sort();
    out.dedup();
    out
}

pub fn find_commune<'a>(
    rows: &'a [LiteracyRow],
    department: &str,
    commune: &str,
) -> Option<&'a LiteracyRow> {
    rows.iter()
        .find(|r| r.department == department && r.commune == commune)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, dep: &str, commune: &str, peralpha: &[(u16, f64)]) -> LiteracyRow {
        LiteracyRow {
            code: code.to_string(),
            commune: commune.to_string(),
            department: dep.to_string(),
            literate_percent: peralpha.iter().copied().collect(),
            literate_count: Default::default(),
            signing: Default::default(),
            not_signing: Default::default(),
        }
    }

    #[test]
    fn latest_percent_picks_newest_year() {
        let r = row("001", "Ain", "Bourg", &[(1816, 30.0), (1900, 70.0), (1946, 95.0)]);
        assert_eq!(latest_percent(&r), Some((1946, 95.0)));
    }

    #[test]
    fn progression_first_to_last() {
        let r = row("001", "Ain", "Bourg", &[(1816, 30.0), (1946, 95.0)]);
        let p = progression(&commune_history(&r)).unwrap();
        assert_eq!(p.first_year, 1816);
        assert_eq!(p.last_year, 1946);
        assert!((p.change - 65.0).abs() < 1e-12);
    }

    #[test]
    fn department_comparison_ranks_descending() {
        let rows = vec![
            row("001", "Ain", "Bourg", &[(1900, 70.0)]),
            row("002", "Ain", "Ambronay", &[(1900, 90.0)]),
            row("003", "Ain", "Ceyzeriat", &[(1900, 50.0)]),
            row("004", "Aisne", "Laon", &[(1900, 99.0)]),
        ];

        let cmp = department_comparison(&rows, "Ain", "Bourg", 1900).unwrap();
        assert_eq!(cmp.rank, 2);
        assert_eq!(cmp.total, 3);
        assert!((cmp.describe.mean - 70.0).abs() < 1e-12);
        assert!((cmp.commune_value - 70.0).abs() < 1e-12);
    }

    #[test]
    fn department_comparison_missing_year_is_none() {
        let rows = vec![row("001", "Ain", "Bourg", &[(1900, 70.0)])];
        assert!(department_comparison(&rows, "Ain", "Bourg", 1910).is_none());
    }

    #[test]
    fn national_series_means_per_year() {
        let mut a = row("001", "Ain", "Bourg", &[(1900, 60.0)]);
        a.signing.insert(1900, 100.0);
        let mut b = row("002", "Ain", "Ambronay", &[(1900, 80.0)]);
        b.signing.insert(1900, 300.0);

        let national = national_series(&[a, b]);
        assert_eq!(national.literate_percent.years, vec![1900]);
        assert!((national.literate_percent.values[0] - 70.0).abs() < 1e-12);
        assert!((national.signing.values[0] - 200.0).abs() < 1e-12);
    }
}
