//! CSV ingest and normalization.
//!
//! The source files share one convention: identity columns (`codecommune`,
//! `nomcommune`, `nomdep`) plus wide year-suffixed column families such as
//! `suph1962` (higher-education men, 1962), `psup2014` (percent with a
//! higher-education diploma), `peralpha1846`, or `voixMACRON`. This module
//! turns those wide rows into the year-indexed domain types.
//!
//! Design goals:
//! - **Strict schema** for required identity columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden type inference)
//! - **Separation of concerns**: no indicator arithmetic here

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{
    CommuneEducation, DepartmentEducation, DiplomaTier, ElectionDataset, ElectionKind, ElectionRow,
    LiteracyRow, Sex, TierTotals, WealthDataset, WealthRow, WealthTable,
};
use crate::error::AppError;

/// What a year-suffixed (or identity) header means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFamily {
    /// `codecommune`
    CommuneCode,
    /// `nomcommune`
    CommuneName,
    /// `nomdep`
    DepartmentName,
    /// Sexed diploma count, e.g. `suph1962`, `nodipf2022`.
    TierCount { tier: DiplomaTier, sex: Sex, year: u16 },
    /// Both-sex diploma count (department files), e.g. `sup2014`.
    TierTotal { tier: DiplomaTier, year: u16 },
    /// Precomputed percentage, e.g. `psup2014`, `pbac1985`.
    TierPercent { tier: DiplomaTier, year: u16 },
    /// `voix{CANDIDATE}` vote count; the candidate keeps the raw header casing.
    Votes { candidate: String },
    /// `peralpha{year}` literate share.
    LiteracyPercent { year: u16 },
    /// `palpha{year}` literate head count.
    LiteracyCount { year: u16 },
    /// `conjsign{year}` spouses able to sign.
    Signing { year: u16 },
    /// `conjnosi{year}` spouses unable to sign.
    NotSigning { year: u16 },
    /// Anything else (kept only by the wealth loader, as a numeric column).
    Other,
}

/// Classify one raw header cell.
///
/// Sexed families are matched before their aggregate prefixes (`suph…` before
/// `sup…`), and the literacy families before `p…` percentage ones, so the
/// longest known prefix wins.
pub fn classify_header(raw: &str) -> ColumnFamily {
    let name = normalize_header_name(raw);

    match name.as_str() {
        "codecommune" => return ColumnFamily::CommuneCode,
        "nomcommune" => return ColumnFamily::CommuneName,
        "nomdep" => return ColumnFamily::DepartmentName,
        _ => {}
    }

    if let Some(rest) = name.strip_prefix("peralpha") {
        if let Some(year) = parse_year_suffix(rest) {
            return ColumnFamily::LiteracyPercent { year };
        }
    }
    if let Some(rest) = name.strip_prefix("palpha") {
        if let Some(year) = parse_year_suffix(rest) {
            return ColumnFamily::LiteracyCount { year };
        }
    }
    if let Some(rest) = name.strip_prefix("conjsign") {
        if let Some(year) = parse_year_suffix(rest) {
            return ColumnFamily::Signing { year };
        }
    }
    if let Some(rest) = name.strip_prefix("conjnosi") {
        if let Some(year) = parse_year_suffix(rest) {
            return ColumnFamily::NotSigning { year };
        }
    }

    for tier in DiplomaTier::ALL {
        let prefix = tier.column_prefix();

        // Sexed count: `{tier}{h|f}{year}`.
        for sex in [Sex::Men, Sex::Women] {
            let sexed = format!("{prefix}{}", sex.column_suffix());
            if let Some(rest) = name.strip_prefix(sexed.as_str()) {
                if let Some(year) = parse_year_suffix(rest) {
                    return ColumnFamily::TierCount { tier, sex, year };
                }
            }
        }

        // Percentage: `p{tier}{year}`.
        let pct = format!("p{prefix}");
        if let Some(rest) = name.strip_prefix(pct.as_str()) {
            if let Some(year) = parse_year_suffix(rest) {
                return ColumnFamily::TierPercent { tier, year };
            }
        }

        // Aggregate count: `{tier}{year}`.
        if let Some(rest) = name.strip_prefix(prefix) {
            if let Some(year) = parse_year_suffix(rest) {
                return ColumnFamily::TierTotal { tier, year };
            }
        }
    }

    // Vote columns keep the raw candidate spelling after the prefix.
    let raw = raw.trim().trim_start_matches('\u{feff}');
    if raw.len() > 4 && raw[..4].eq_ignore_ascii_case("voix") {
        return ColumnFamily::Votes {
            candidate: raw[4..].to_string(),
        };
    }

    ColumnFamily::Other
}

fn parse_year_suffix(rest: &str) -> Option<u16> {
    if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: u16 = rest.parse().ok()?;
    // Plausible census range; anything else is a lookalike column.
    (1500..=2100).contains(&year).then_some(year)
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿codecommune"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Per-file ingest summary: what was read, what survived, what was skipped.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_used: usize,
    pub row_errors: Vec<RowError>,
}

impl IngestReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            rows_read: 0,
            rows_used: 0,
            row_errors: Vec::new(),
        }
    }

    fn log(&self) {
        log::info!(
            "loaded {}: {} rows used / {} read",
            self.path.display(),
            self.rows_used,
            self.rows_read
        );
        if !self.row_errors.is_empty() {
            log::warn!(
                "{}: skipped {} malformed rows (first: line {}: {})",
                self.path.display(),
                self.row_errors.len(),
                self.row_errors[0].line,
                self.row_errors[0].message
            );
        }
    }
}

struct CsvFile {
    headers: Vec<String>,
    families: Vec<ColumnFamily>,
    records: Vec<(usize, StringRecord)>,
}

fn open_csv(path: &Path) -> Result<CsvFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers of '{}': {e}", path.display())))?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let families = headers.iter().map(|h| classify_header(h)).collect();

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header line and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        match result {
            Ok(r) => records.push((line, r)),
            Err(e) => records.push((line, {
                // Keep the slot so the caller can report the parse error with
                // its line number; an empty record parses to "missing id".
                log::debug!("{}: line {line}: CSV parse error: {e}", path.display());
                StringRecord::new()
            })),
        }
    }

    Ok(CsvFile {
        headers,
        families,
        records,
    })
}

fn field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn require_column(file: &CsvFile, family: &ColumnFamily, path: &Path, name: &str) -> Result<usize, AppError> {
    file.families
        .iter()
        .position(|f| f == family)
        .ok_or_else(|| {
            AppError::input(format!(
                "'{}' is missing the required `{name}` column.",
                path.display()
            ))
        })
}

/// Load commune-level diploma counts (`diplomescommunes.csv`).
pub fn load_commune_education(path: &Path) -> Result<(Vec<CommuneEducation>, IngestReport), AppError> {
    let file = open_csv(path)?;
    let code_idx = require_column(&file, &ColumnFamily::CommuneCode, path, "codecommune")?;
    let name_idx = file.families.iter().position(|f| *f == ColumnFamily::CommuneName);
    let dep_idx = file.families.iter().position(|f| *f == ColumnFamily::DepartmentName);

    let mut report = IngestReport::new(path);
    let mut out = Vec::with_capacity(file.records.len());

    for (line, record) in &file.records {
        report.rows_read += 1;
        let Some(code) = field(record, code_idx) else {
            report.row_errors.push(RowError {
                line: *line,
                id: None,
                message: "Missing `codecommune`.".to_string(),
            });
            continue;
        };

        let mut row = CommuneEducation {
            code: code.to_string(),
            commune: name_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            department: dep_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            years: Default::default(),
        };

        for (idx, family) in file.families.iter().enumerate() {
            if let ColumnFamily::TierCount { tier, sex, year } = family {
                if let Some(v) = parse_opt_f64(field(record, idx)) {
                    row.years.entry(*year).or_default().set(*tier, *sex, v);
                }
            }
        }

        out.push(row);
        report.rows_used += 1;
    }

    if out.is_empty() {
        return Err(AppError::empty(format!(
            "No usable commune rows in '{}'.",
            path.display()
        )));
    }
    report.log();
    Ok((out, report))
}

/// Load department-level diploma data (`diplomesdepartements.csv`).
pub fn load_department_education(
    path: &Path,
) -> Result<(Vec<DepartmentEducation>, IngestReport), AppError> {
    let file = open_csv(path)?;
    let dep_idx = require_column(&file, &ColumnFamily::DepartmentName, path, "nomdep")?;

    let mut report = IngestReport::new(path);
    let mut out = Vec::with_capacity(file.records.len());

    for (line, record) in &file.records {
        report.rows_read += 1;
        let Some(department) = field(record, dep_idx) else {
            report.row_errors.push(RowError {
                line: *line,
                id: None,
                message: "Missing `nomdep`.".to_string(),
            });
            continue;
        };

        let mut row = DepartmentEducation {
            department: department.to_string(),
            counts: Default::default(),
            totals: Default::default(),
            percent_sup: Default::default(),
            percent_bac: Default::default(),
        };

        for (idx, family) in file.families.iter().enumerate() {
            let value = parse_opt_f64(field(record, idx));
            let Some(v) = value else { continue };
            match family {
                ColumnFamily::TierCount { tier, sex, year } => {
                    row.counts.entry(*year).or_default().set(*tier, *sex, v);
                }
                ColumnFamily::TierTotal { tier, year } => {
                    row.totals
                        .entry(*year)
                        .or_insert_with(TierTotals::default)
                        .set(*tier, v);
                }
                ColumnFamily::TierPercent { tier, year } => match tier {
                    DiplomaTier::Sup => {
                        row.percent_sup.insert(*year, v);
                    }
                    DiplomaTier::Bac => {
                        row.percent_bac.insert(*year, v);
                    }
                    DiplomaTier::Nodip => {}
                },
                _ => {}
            }
        }

        out.push(row);
        report.rows_used += 1;
    }

    if out.is_empty() {
        return Err(AppError::empty(format!(
            "No usable department rows in '{}'.",
            path.display()
        )));
    }
    report.log();
    Ok((out, report))
}

/// Load one election file (`Pres2022.csv` / `Legis2022.csv`).
pub fn load_election(path: &Path, kind: ElectionKind) -> Result<(ElectionDataset, IngestReport), AppError> {
    let file = open_csv(path)?;
    let code_idx = require_column(&file, &ColumnFamily::CommuneCode, path, "codecommune")?;
    let name_idx = file.families.iter().position(|f| *f == ColumnFamily::CommuneName);
    let dep_idx = file.families.iter().position(|f| *f == ColumnFamily::DepartmentName);

    // Vote columns in file order; the candidate list is shared by all rows.
    let mut vote_cols: Vec<(usize, String)> = Vec::new();
    for (idx, family) in file.families.iter().enumerate() {
        if let ColumnFamily::Votes { candidate } = family {
            vote_cols.push((idx, candidate.clone()));
        }
    }
    if vote_cols.is_empty() {
        return Err(AppError::input(format!(
            "'{}' has no `voix…` vote columns.",
            path.display()
        )));
    }

    let mut report = IngestReport::new(path);
    let mut rows = Vec::with_capacity(file.records.len());

    for (line, record) in &file.records {
        report.rows_read += 1;
        let Some(code) = field(record, code_idx) else {
            report.row_errors.push(RowError {
                line: *line,
                id: None,
                message: "Missing `codecommune`.".to_string(),
            });
            continue;
        };

        let votes = vote_cols
            .iter()
            .map(|(idx, _)| parse_opt_f64(field(record, *idx)))
            .collect();

        rows.push(ElectionRow {
            code: code.to_string(),
            commune: name_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            department: dep_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            votes,
        });
        report.rows_used += 1;
    }

    if rows.is_empty() {
        return Err(AppError::empty(format!(
            "No usable election rows in '{}'.",
            path.display()
        )));
    }
    report.log();

    Ok((
        ElectionDataset {
            kind,
            candidates: vote_cols.into_iter().map(|(_, c)| c).collect(),
            rows,
        },
        report,
    ))
}

/// Load one wealth table. Every non-identity column is kept as a numeric
/// column under its original (lowercased) name.
pub fn load_wealth(path: &Path, table: WealthTable) -> Result<(WealthDataset, IngestReport), AppError> {
    let file = open_csv(path)?;
    let dep_idx = require_column(&file, &ColumnFamily::DepartmentName, path, "nomdep")?;
    let name_idx = require_column(&file, &ColumnFamily::CommuneName, path, "nomcommune")?;

    let mut value_cols: Vec<(usize, String)> = Vec::new();
    for (idx, header) in file.headers.iter().enumerate() {
        if idx == dep_idx || idx == name_idx {
            continue;
        }
        let lowered = normalize_header_name(header);
        // Commune codes are identity, not a measurement.
        if lowered == "codecommune" || lowered == "dep" {
            continue;
        }
        value_cols.push((idx, lowered));
    }

    let mut report = IngestReport::new(path);
    let mut rows = Vec::with_capacity(file.records.len());

    for (line, record) in &file.records {
        report.rows_read += 1;
        let (Some(department), Some(commune)) = (field(record, dep_idx), field(record, name_idx)) else {
            report.row_errors.push(RowError {
                line: *line,
                id: None,
                message: "Missing `nomdep` or `nomcommune`.".to_string(),
            });
            continue;
        };

        let values = value_cols
            .iter()
            .map(|(idx, _)| parse_opt_f64(field(record, *idx)))
            .collect();

        rows.push(WealthRow {
            department: department.to_string(),
            commune: commune.to_string(),
            values,
        });
        report.rows_used += 1;
    }

    if rows.is_empty() {
        return Err(AppError::empty(format!(
            "No usable rows in '{}'.",
            path.display()
        )));
    }
    report.log();

    Ok((
        WealthDataset {
            table,
            columns: value_cols.into_iter().map(|(_, c)| c).collect(),
            rows,
        },
        report,
    ))
}

/// Load commune literacy history (`alphabetisationcommunes.csv`).
pub fn load_literacy(path: &Path) -> Result<(Vec<LiteracyRow>, IngestReport), AppError> {
    let file = open_csv(path)?;
    let code_idx = require_column(&file, &ColumnFamily::CommuneCode, path, "codecommune")?;
    let name_idx = file.families.iter().position(|f| *f == ColumnFamily::CommuneName);
    let dep_idx = file.families.iter().position(|f| *f == ColumnFamily::DepartmentName);

    let mut report = IngestReport::new(path);
    let mut out = Vec::with_capacity(file.records.len());

    for (line, record) in &file.records {
        report.rows_read += 1;
        let Some(code) = field(record, code_idx) else {
            report.row_errors.push(RowError {
                line: *line,
                id: None,
                message: "Missing `codecommune`.".to_string(),
            });
            continue;
        };

        let mut row = LiteracyRow {
            code: code.to_string(),
            commune: name_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            department: dep_idx.and_then(|i| field(record, i)).unwrap_or("").to_string(),
            literate_percent: Default::default(),
            literate_count: Default::default(),
            signing: Default::default(),
            not_signing: Default::default(),
        };

        for (idx, family) in file.families.iter().enumerate() {
            let Some(v) = parse_opt_f64(field(record, idx)) else { continue };
            match family {
                ColumnFamily::LiteracyPercent { year } => {
                    row.literate_percent.insert(*year, v);
                }
                ColumnFamily::LiteracyCount { year } => {
                    row.literate_count.insert(*year, v);
                }
                ColumnFamily::Signing { year } => {
                    row.signing.insert(*year, v);
                }
                ColumnFamily::NotSigning { year } => {
                    row.not_signing.insert(*year, v);
                }
                _ => {}
            }
        }

        out.push(row);
        report.rows_used += 1;
    }

    if out.is_empty() {
        return Err(AppError::empty(format!(
            "No usable literacy rows in '{}'.",
            path.display()
        )));
    }
    report.log();
    Ok((out, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_sexed_diploma_counts() {
        assert_eq!(
            classify_header("suph1962"),
            ColumnFamily::TierCount {
                tier: DiplomaTier::Sup,
                sex: Sex::Men,
                year: 1962
            }
        );
        assert_eq!(
            classify_header("nodipf2022"),
            ColumnFamily::TierCount {
                tier: DiplomaTier::Nodip,
                sex: Sex::Women,
                year: 2022
            }
        );
        assert_eq!(
            classify_header("bach2014"),
            ColumnFamily::TierCount {
                tier: DiplomaTier::Bac,
                sex: Sex::Men,
                year: 2014
            }
        );
    }

    #[test]
    fn classify_totals_and_percentages() {
        assert_eq!(
            classify_header("sup2014"),
            ColumnFamily::TierTotal {
                tier: DiplomaTier::Sup,
                year: 2014
            }
        );
        assert_eq!(
            classify_header("psup2014"),
            ColumnFamily::TierPercent {
                tier: DiplomaTier::Sup,
                year: 2014
            }
        );
        assert_eq!(
            classify_header("pbac1985"),
            ColumnFamily::TierPercent {
                tier: DiplomaTier::Bac,
                year: 1985
            }
        );
    }

    #[test]
    fn classify_literacy_families() {
        assert_eq!(classify_header("peralpha1846"), ColumnFamily::LiteracyPercent { year: 1846 });
        assert_eq!(classify_header("palpha1846"), ColumnFamily::LiteracyCount { year: 1846 });
        assert_eq!(classify_header("conjsign1880"), ColumnFamily::Signing { year: 1880 });
        assert_eq!(classify_header("conjnosi1880"), ColumnFamily::NotSigning { year: 1880 });
    }

    #[test]
    fn classify_votes_preserves_candidate_casing() {
        assert_eq!(
            classify_header("voixMACRON"),
            ColumnFamily::Votes {
                candidate: "MACRON".to_string()
            }
        );
        assert_eq!(
            classify_header("voixLePen"),
            ColumnFamily::Votes {
                candidate: "LePen".to_string()
            }
        );
    }

    #[test]
    fn classify_identity_columns_with_bom() {
        assert_eq!(classify_header("\u{feff}codecommune"), ColumnFamily::CommuneCode);
        assert_eq!(classify_header(" NOMDEP "), ColumnFamily::DepartmentName);
    }

    #[test]
    fn classify_rejects_lookalikes() {
        // No year suffix, out-of-range year, or unrelated names.
        assert_eq!(classify_header("sup"), ColumnFamily::Other);
        assert_eq!(classify_header("sup12"), ColumnFamily::Other);
        assert_eq!(classify_header("suph9999"), ColumnFamily::Other);
        assert_eq!(classify_header("superficie2014"), ColumnFamily::Other);
        assert_eq!(classify_header("voix"), ColumnFamily::Other);
    }

    #[test]
    fn year_suffix_bounds() {
        assert_eq!(parse_year_suffix("1816"), Some(1816));
        assert_eq!(parse_year_suffix("2022"), Some(2022));
        assert_eq!(parse_year_suffix(""), None);
        assert_eq!(parse_year_suffix("20a2"), None);
    }
}
