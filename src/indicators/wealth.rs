//! Wealth-table exploration: department/commune selection, column summaries,
//! and per-commune breakdowns.

use crate::domain::WealthDataset;
use crate::math::stats::{self, Describe, Histogram};

/// Unique department names, sorted.
pub fn departments(ds: &WealthDataset) -> Vec<String> {
    let mut out: Vec<String> = ds.rows.iter().map(|r| r.department.clone()).collect();
    out.sort();
    out.dedup();
    out
}

/// Unique commune names within a department, sorted.
pub fn communes_in(ds: &WealthDataset, department: &str) -> Vec<String> {
    let mut out: Vec<String> = ds
        .rows
        .iter()
        .filter(|r| r.department == department)
        .map(|r| r.commune.clone())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn column_index(ds: &WealthDataset, column: &str) -> Option<usize> {
    ds.columns.iter().position(|c| c == column)
}

fn column_values(ds: &WealthDataset, department: &str, idx: usize) -> Vec<f64> {
    ds.rows
        .iter()
        .filter(|r| r.department == department)
        .filter_map(|r| *r.values.get(idx)?)
        .collect()
}

/// `describe()`-style summary for one column over a department's communes.
#[derive(Debug, Clone)]
pub struct ColumnSummary {
    pub column: String,
    pub describe: Describe,
}

/// Summaries for the selected columns; columns with no usable values are
/// omitted.
pub fn describe_columns(
    ds: &WealthDataset,
    department: &str,
    columns: &[String],
) -> Vec<ColumnSummary> {
    let mut out = Vec::new();
    for column in columns {
        let Some(idx) = column_index(ds, column) else { continue };
        let values = column_values(ds, department, idx);
        if let Some(describe) = stats::describe(&values) {
            out.push(ColumnSummary {
                column: column.clone(),
                describe,
            });
        }
    }
    out
}

/// One commune's values across the selected columns (the long-format
/// "melt" feeding the bar/pie views).
#[derive(Debug, Clone)]
pub struct CommuneBreakdown {
    pub commune: String,
    /// `(column, value)` entries; missing cells are omitted.
    pub entries: Vec<(String, f64)>,
}

pub fn commune_breakdown(
    ds: &WealthDataset,
    department: &str,
    commune: &str,
    columns: &[String],
) -> Option<CommuneBreakdown> {
    let row = ds
        .rows
        .iter()
        .find(|r| r.department == department && r.commune == commune)?;

    let mut entries = Vec::new();
    for column in columns {
        let idx = column_index(ds, column)?;
        if let Some(v) = row.values.get(idx).copied().flatten() {
            entries.push((column.clone(), v));
        }
    }
    Some(CommuneBreakdown {
        commune: commune.to_string(),
        entries,
    })
}

/// 10-bin histogram of one column over a department's communes.
pub fn column_histogram(
    ds: &WealthDataset,
    department: &str,
    column: &str,
    bins: usize,
) -> Option<Histogram> {
    let idx = column_index(ds, column)?;
    stats::histogram(&column_values(ds, department, idx), bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{WealthRow, WealthTable};

    fn dataset() -> WealthDataset {
        WealthDataset {
            table: WealthTable::Isf,
            columns: vec!["base2020".to_string(), "taxe2020".to_string()],
            rows: vec![
                WealthRow {
                    department: "Ain".to_string(),
                    commune: "Bourg".to_string(),
                    values: vec![Some(100.0), Some(10.0)],
                },
                WealthRow {
                    department: "Ain".to_string(),
                    commune: "Ambronay".to_string(),
                    values: vec![Some(300.0), None],
                },
                WealthRow {
                    department: "Aisne".to_string(),
                    commune: "Laon".to_string(),
                    values: vec![Some(200.0), Some(20.0)],
                },
            ],
        }
    }

    #[test]
    fn departments_and_communes_are_sorted_unique() {
        let ds = dataset();
        assert_eq!(departments(&ds), vec!["Ain", "Aisne"]);
        assert_eq!(communes_in(&ds, "Ain"), vec!["Ambronay", "Bourg"]);
    }

    #[test]
    fn describe_columns_filters_by_department() {
        let ds = dataset();
        let cols = vec!["base2020".to_string(), "taxe2020".to_string()];
        let summaries = describe_columns(&ds, "Ain", &cols);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].describe.count, 2);
        assert!((summaries[0].describe.mean - 200.0).abs() < 1e-12);
        // Only Bourg has taxe2020 in Ain.
        assert_eq!(summaries[1].describe.count, 1);
    }

    #[test]
    fn breakdown_skips_missing_cells() {
        let ds = dataset();
        let cols = vec!["base2020".to_string(), "taxe2020".to_string()];
        let b = commune_breakdown(&ds, "Ain", "Ambronay", &cols).unwrap();
        assert_eq!(b.entries, vec![("base2020".to_string(), 300.0)]);
    }

    #[test]
    fn histogram_covers_department_values() {
        let ds = dataset();
        let h = column_histogram(&ds, "Ain", "base2020", 2).unwrap();
        assert_eq!(h.counts.iter().sum::<usize>(), 2);
    }
}
