//! Shared data/page pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest (or sample generation) -> indicator computation -> page structs
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::PathBuf;

use serde::Serialize;

use crate::data::sample::{generate_sample, SampleSpec};
use crate::domain::{
    AppConfig, CommuneEducation, DepartmentEducation, DiplomaTier, ElectionDataset, ElectionKind,
    LiteracyRow, WealthDataset, WealthTable, YearSeries,
};
use crate::error::AppError;
use crate::indicators::correlation::{self, CandidateCorrelation, MergedCommune};
use crate::indicators::education::{
    self, GenderGapSeries, TierCountSeries, YearDistribution, DISTRIBUTION_YEARS, GENDER_GAP_YEARS,
};
use crate::indicators::literacy::{self, NationalLiteracy};
use crate::indicators::wealth::{self, ColumnSummary, CommuneBreakdown};
use crate::io::ingest;
use crate::math::ols::{fit_trend, TrendLine};

/// Everything the pages read, loaded once up front.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub communes: Vec<CommuneEducation>,
    pub departments: Vec<DepartmentEducation>,
    pub presidential: ElectionDataset,
    pub legislative: ElectionDataset,
    /// Wealth tables that loaded successfully (a table with an incompatible
    /// schema is skipped with a warning, not fatal).
    pub wealth: Vec<WealthDataset>,
    pub literacy: Vec<LiteracyRow>,
}

impl Datasets {
    /// Load all datasets, either from the CSV tree or from the synthetic
    /// sample when `config.sample` is set.
    pub fn load(config: &AppConfig) -> Result<Self, AppError> {
        if config.sample {
            log::info!("using the built-in synthetic dataset");
            let sample = generate_sample(&SampleSpec::default())?;
            return Ok(Self {
                communes: sample.communes,
                departments: sample.departments,
                presidential: sample.presidential,
                legislative: sample.legislative,
                wealth: sample.wealth,
                literacy: sample.literacy,
            });
        }

        let data_dir = &config.data_dir;
        let diplomes = data_dir.join("Diplomes_csv");
        let elections = data_dir.join("Elections_csv");
        let capital = data_dir.join("Capital_immobilier_csv");
        let alpha = data_dir.join("Alphabetisation");

        let (communes, _) = ingest::load_commune_education(&diplomes.join("diplomescommunes.csv"))?;
        let (departments, _) =
            ingest::load_department_education(&diplomes.join("diplomesdepartements.csv"))?;
        let (presidential, _) =
            ingest::load_election(&elections.join("Pres2022.csv"), ElectionKind::Presidential)?;
        let (legislative, _) =
            ingest::load_election(&elections.join("Legis2022.csv"), ElectionKind::Legislative)?;
        let (literacy, _) = ingest::load_literacy(&alpha.join("alphabetisationcommunes.csv"))?;

        let mut wealth = Vec::new();
        for table in WealthTable::ALL {
            let path = capital.join(table.file_name());
            match ingest::load_wealth(&path, table) {
                Ok((ds, _)) => wealth.push(ds),
                Err(e) => log::warn!("skipping wealth table '{}': {e}", path.display()),
            }
        }

        Ok(Self {
            communes,
            departments,
            presidential,
            legislative,
            wealth,
            literacy,
        })
    }

    pub fn election(&self, kind: ElectionKind) -> &ElectionDataset {
        match kind {
            ElectionKind::Presidential => &self.presidential,
            ElectionKind::Legislative => &self.legislative,
        }
    }

    pub fn wealth_table(&self, table: WealthTable) -> Option<&WealthDataset> {
        self.wealth.iter().find(|ds| ds.table == table)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            communes: self.communes.len(),
            departments: self.departments.len(),
            presidential_candidates: self.presidential.candidates.len(),
            legislative_candidates: self.legislative.candidates.len(),
            wealth_tables: self
                .wealth
                .iter()
                .map(|ds| ds.table.display_name().to_string())
                .collect(),
            literacy_rows: self.literacy.len(),
        }
    }
}

/// Dataset shape, serialized into debug bundles.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub communes: usize,
    pub departments: usize,
    pub presidential_candidates: usize,
    pub legislative_candidates: usize,
    pub wealth_tables: Vec<String>,
    pub literacy_rows: usize,
}

/// All computed outputs of the education page for one year.
#[derive(Debug, Clone)]
pub struct EducationPage {
    pub year: u16,
    /// Per-commune rows, highest attainment first.
    pub table: Vec<education::AttainmentRow>,
    pub top_departments: Vec<(String, f64)>,
    pub gender_gap: GenderGapSeries,
    pub national_sup: YearSeries,
    pub national_bac: YearSeries,
    /// Summed higher-education counts per year (men / women / total).
    pub tier_counts: TierCountSeries,
    pub distributions: Vec<YearDistribution>,
}

pub fn education_page(ds: &Datasets, config: &AppConfig) -> Result<EducationPage, AppError> {
    let mut table = education::attainment_table(&ds.communes, config.year);
    if table.is_empty() {
        return Err(AppError::empty(format!(
            "No commune has usable diploma counts for {}.",
            config.year
        )));
    }
    table.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(std::cmp::Ordering::Equal));

    Ok(EducationPage {
        year: config.year,
        table,
        top_departments: education::top_departments(&ds.departments, config.year, config.top_n),
        gender_gap: education::gender_gap_series(&ds.communes, GENDER_GAP_YEARS),
        national_sup: education::national_percent_series(&ds.departments, DiplomaTier::Sup),
        national_bac: education::national_percent_series(&ds.departments, DiplomaTier::Bac),
        tier_counts: education::national_tier_counts(&ds.departments, DiplomaTier::Sup),
        distributions: education::distribution_by_year(&ds.communes, &DISTRIBUTION_YEARS, 10),
    })
}

/// Education-vs-votes outputs for one election and year.
#[derive(Debug, Clone)]
pub struct CorrelationPage {
    pub kind: ElectionKind,
    pub year: u16,
    pub candidates: Vec<String>,
    pub merged: Vec<MergedCommune>,
    pub matrix: Vec<CandidateCorrelation>,
}

impl CorrelationPage {
    /// Scatter pairs plus an OLS trend for one candidate/tier selection.
    pub fn scatter(
        &self,
        candidate_idx: usize,
        tier: Option<DiplomaTier>,
    ) -> (Vec<(f64, f64)>, Option<TrendLine>) {
        let pairs = correlation::scatter_pairs(&self.merged, candidate_idx, tier);
        let trend = fit_trend(&pairs);
        (pairs, trend)
    }
}

pub fn correlation_page(ds: &Datasets, config: &AppConfig) -> Result<CorrelationPage, AppError> {
    let election = ds.election(config.election);
    let merged = correlation::merge_education_votes(election, &ds.communes, config.year);
    if merged.is_empty() {
        return Err(AppError::empty(format!(
            "No commune joins the {} file with {} education data.",
            election.kind.display_name(),
            config.year
        )));
    }
    let matrix = correlation::correlation_matrix(&merged, &election.candidates);
    Ok(CorrelationPage {
        kind: election.kind,
        year: config.year,
        candidates: election.candidates.clone(),
        merged,
        matrix,
    })
}

/// Wealth describe/breakdown outputs for one table and department.
#[derive(Debug, Clone)]
pub struct WealthPage {
    pub table: WealthTable,
    pub department: String,
    pub columns: Vec<String>,
    pub summaries: Vec<ColumnSummary>,
    pub breakdown: Option<CommuneBreakdown>,
}

pub fn wealth_page(
    ds: &Datasets,
    table: WealthTable,
    department: Option<&str>,
    commune: Option<&str>,
) -> Result<WealthPage, AppError> {
    let dataset = ds
        .wealth_table(table)
        .ok_or_else(|| AppError::empty(format!("Table '{}' is not loaded.", table.display_name())))?;

    let departments = wealth::departments(dataset);
    let department = match department {
        Some(name) => {
            if !departments.iter().any(|d| d == name) {
                return Err(AppError::input(format!(
                    "Unknown department '{name}' in '{}'.",
                    table.display_name()
                )));
            }
            name.to_string()
        }
        None => departments
            .first()
            .cloned()
            .ok_or_else(|| AppError::empty("No departments in the selected wealth table."))?,
    };

    let summaries = wealth::describe_columns(dataset, &department, &dataset.columns);
    let breakdown = commune
        .map(|c| {
            wealth::commune_breakdown(dataset, &department, c, &dataset.columns).ok_or_else(|| {
                AppError::input(format!("Unknown commune '{c}' in {department}."))
            })
        })
        .transpose()?;

    Ok(WealthPage {
        table,
        department,
        columns: dataset.columns.clone(),
        summaries,
        breakdown,
    })
}

/// National literacy trends plus the selector lists the views need.
#[derive(Debug, Clone)]
pub struct LiteracyPage {
    pub national: NationalLiteracy,
    pub departments: Vec<String>,
}

pub fn literacy_page(ds: &Datasets) -> Result<LiteracyPage, AppError> {
    if ds.literacy.is_empty() {
        return Err(AppError::empty("No literacy rows loaded."));
    }
    Ok(LiteracyPage {
        national: literacy::national_series(&ds.literacy),
        departments: literacy::departments(&ds.literacy),
    })
}

/// Resolve the data directory: flag value, or `HEXASTAT_DATA_DIR`, or `./Data`.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("HEXASTAT_DATA_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./Data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            sample: true,
            ..AppConfig::default()
        }
    }

    #[test]
    fn sample_datasets_feed_every_page() {
        let config = sample_config();
        let ds = Datasets::load(&config).unwrap();

        let education = education_page(&ds, &config).unwrap();
        assert!(!education.table.is_empty());
        assert!(!education.top_departments.is_empty());
        assert!(!education.gender_gap.men.is_empty());
        assert!(!education.tier_counts.total.is_empty());
        assert!(!education.distributions.is_empty());

        let correlation = correlation_page(&ds, &config).unwrap();
        assert_eq!(correlation.matrix.len(), correlation.candidates.len());
        let (pairs, trend) = correlation.scatter(0, None);
        assert!(!pairs.is_empty());
        assert!(trend.is_some());

        let wealth = wealth_page(&ds, WealthTable::Isf, None, None).unwrap();
        assert!(!wealth.summaries.is_empty());

        let literacy = literacy_page(&ds).unwrap();
        assert!(!literacy.national.literate_percent.is_empty());
    }

    #[test]
    fn education_table_is_sorted_descending() {
        let config = sample_config();
        let ds = Datasets::load(&config).unwrap();
        let page = education_page(&ds, &config).unwrap();
        for pair in page.table.windows(2) {
            assert!(pair[0].percent >= pair[1].percent);
        }
    }

    #[test]
    fn wealth_page_rejects_unknown_department() {
        let config = sample_config();
        let ds = Datasets::load(&config).unwrap();
        let err = wealth_page(&ds, WealthTable::Isf, Some("Nowhere"), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_year_yields_empty_exit_code() {
        let mut config = sample_config();
        config.year = 1900;
        let ds = Datasets::load(&config).unwrap();
        let err = education_page(&ds, &config).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
