//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the indicator pipelines
//! - exported to CSV/JSON
//! - rendered by both the CLI reports and the TUI

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sex split used by the year-suffixed diploma columns (`…h…` / `…f…`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Men,
    Women,
}

impl Sex {
    /// Column suffix used by the source files (`h` = hommes, `f` = femmes).
    pub fn column_suffix(self) -> char {
        match self {
            Sex::Men => 'h',
            Sex::Women => 'f',
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Sex::Men => "men",
            Sex::Women => "women",
        }
    }
}

/// Diploma tiers tracked by the education datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DiplomaTier {
    /// Higher education (`sup` column family).
    Sup,
    /// Baccalauréat (`bac` column family).
    Bac,
    /// No diploma (`nodip` column family).
    Nodip,
}

impl DiplomaTier {
    pub const ALL: [DiplomaTier; 3] = [DiplomaTier::Sup, DiplomaTier::Bac, DiplomaTier::Nodip];

    /// Column-family prefix in the source CSVs.
    pub fn column_prefix(self) -> &'static str {
        match self {
            DiplomaTier::Sup => "sup",
            DiplomaTier::Bac => "bac",
            DiplomaTier::Nodip => "nodip",
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            DiplomaTier::Sup => "higher education",
            DiplomaTier::Bac => "baccalaureat",
            DiplomaTier::Nodip => "no diploma",
        }
    }
}

/// Which election file feeds the vote columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElectionKind {
    /// Presidential 2022 (`Pres2022.csv`).
    #[value(name = "pres")]
    Presidential,
    /// Legislative 2022 (`Legis2022.csv`).
    #[value(name = "leg")]
    Legislative,
}

impl ElectionKind {
    pub fn display_name(self) -> &'static str {
        match self {
            ElectionKind::Presidential => "presidential",
            ElectionKind::Legislative => "legislative",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ElectionKind::Presidential => ElectionKind::Legislative,
            ElectionKind::Legislative => ElectionKind::Presidential,
        }
    }
}

/// The five real-estate / fiscal wealth tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WealthTable {
    /// Communal property-tax bases (`basesfiscalescommunes.csv`).
    BasesFiscales,
    /// National real-estate capital series (`capitalimmobilier.csv`).
    CapitalImmobilier,
    /// Per-commune real-estate capital (`capitalimmobiliercommunes.csv`).
    CapitalCommunes,
    /// Wealth-tax (ISF) assessments per commune (`isfcommunes.csv`).
    Isf,
    /// Agricultural land values per commune (`terrescommunes.csv`).
    Terres,
}

impl WealthTable {
    pub const ALL: [WealthTable; 5] = [
        WealthTable::BasesFiscales,
        WealthTable::CapitalImmobilier,
        WealthTable::CapitalCommunes,
        WealthTable::Isf,
        WealthTable::Terres,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            WealthTable::BasesFiscales => "Bases fiscales (communes)",
            WealthTable::CapitalImmobilier => "Capital immobilier",
            WealthTable::CapitalCommunes => "Capital immobilier (communes)",
            WealthTable::Isf => "ISF (communes)",
            WealthTable::Terres => "Terres (communes)",
        }
    }

    /// File name under `<data-dir>/Capital_immobilier_csv/`.
    pub fn file_name(self) -> &'static str {
        match self {
            WealthTable::BasesFiscales => "basesfiscalescommunes.csv",
            WealthTable::CapitalImmobilier => "capitalimmobilier.csv",
            WealthTable::CapitalCommunes => "capitalimmobiliercommunes.csv",
            WealthTable::Isf => "isfcommunes.csv",
            WealthTable::Terres => "terrescommunes.csv",
        }
    }
}

/// Diploma counts for one year, split by tier and sex.
///
/// All fields are optional: old census years frequently miss whole families,
/// and a missing count must not be silently treated as zero when it decides
/// whether a ratio can be formed at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierCounts {
    pub sup_men: Option<f64>,
    pub sup_women: Option<f64>,
    pub bac_men: Option<f64>,
    pub bac_women: Option<f64>,
    pub nodip_men: Option<f64>,
    pub nodip_women: Option<f64>,
}

impl TierCounts {
    pub fn get(&self, tier: DiplomaTier, sex: Sex) -> Option<f64> {
        match (tier, sex) {
            (DiplomaTier::Sup, Sex::Men) => self.sup_men,
            (DiplomaTier::Sup, Sex::Women) => self.sup_women,
            (DiplomaTier::Bac, Sex::Men) => self.bac_men,
            (DiplomaTier::Bac, Sex::Women) => self.bac_women,
            (DiplomaTier::Nodip, Sex::Men) => self.nodip_men,
            (DiplomaTier::Nodip, Sex::Women) => self.nodip_women,
        }
    }

    pub fn set(&mut self, tier: DiplomaTier, sex: Sex, value: f64) {
        let slot = match (tier, sex) {
            (DiplomaTier::Sup, Sex::Men) => &mut self.sup_men,
            (DiplomaTier::Sup, Sex::Women) => &mut self.sup_women,
            (DiplomaTier::Bac, Sex::Men) => &mut self.bac_men,
            (DiplomaTier::Bac, Sex::Women) => &mut self.bac_women,
            (DiplomaTier::Nodip, Sex::Men) => &mut self.nodip_men,
            (DiplomaTier::Nodip, Sex::Women) => &mut self.nodip_women,
        };
        *slot = Some(value);
    }

    /// Both-sex total for one tier. `None` when both counts are missing.
    pub fn tier_total(&self, tier: DiplomaTier) -> Option<f64> {
        let men = self.get(tier, Sex::Men);
        let women = self.get(tier, Sex::Women);
        match (men, women) {
            (None, None) => None,
            (m, w) => Some(m.unwrap_or(0.0) + w.unwrap_or(0.0)),
        }
    }

    /// Six-column population total. `None` when every count is missing.
    pub fn population(&self) -> Option<f64> {
        let mut total = 0.0;
        let mut any = false;
        for tier in DiplomaTier::ALL {
            if let Some(v) = self.tier_total(tier) {
                total += v;
                any = true;
            }
        }
        any.then_some(total)
    }

    pub fn is_empty(&self) -> bool {
        self.population().is_none()
    }
}

/// One commune row of the education dataset, with year-indexed counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuneEducation {
    /// Normalized INSEE commune code (kept as an opaque string).
    pub code: String,
    pub commune: String,
    pub department: String,
    pub years: BTreeMap<u16, TierCounts>,
}

/// Both-sex tier totals for one year (department-level aggregate columns).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierTotals {
    pub sup: Option<f64>,
    pub bac: Option<f64>,
    pub nodip: Option<f64>,
}

impl TierTotals {
    pub fn get(&self, tier: DiplomaTier) -> Option<f64> {
        match tier {
            DiplomaTier::Sup => self.sup,
            DiplomaTier::Bac => self.bac,
            DiplomaTier::Nodip => self.nodip,
        }
    }

    pub fn set(&mut self, tier: DiplomaTier, value: f64) {
        match tier {
            DiplomaTier::Sup => self.sup = Some(value),
            DiplomaTier::Bac => self.bac = Some(value),
            DiplomaTier::Nodip => self.nodip = Some(value),
        }
    }
}

/// One department row of the education dataset.
///
/// Department files carry three column families per year: sexed counts
/// (`suph2014`), aggregate counts (`sup2014`), and precomputed percentages
/// (`psup2014`, `pbac2014`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentEducation {
    pub department: String,
    pub counts: BTreeMap<u16, TierCounts>,
    pub totals: BTreeMap<u16, TierTotals>,
    /// `psup{year}`: percent with a higher-education diploma.
    pub percent_sup: BTreeMap<u16, f64>,
    /// `pbac{year}`: baccalaureat success percent.
    pub percent_bac: BTreeMap<u16, f64>,
}

/// One commune row of an election file. Votes are aligned with the dataset's
/// candidate list; a missing cell stays `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionRow {
    pub code: String,
    pub commune: String,
    pub department: String,
    pub votes: Vec<Option<f64>>,
}

/// A parsed election file: candidate names (from `voix…` headers, file order)
/// plus per-commune vote rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectionDataset {
    pub kind: ElectionKind,
    pub candidates: Vec<String>,
    pub rows: Vec<ElectionRow>,
}

/// One commune row of a wealth table: numeric cells aligned with `columns`
/// of the owning [`WealthDataset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthRow {
    pub department: String,
    pub commune: String,
    pub values: Vec<Option<f64>>,
}

/// A parsed wealth table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WealthDataset {
    pub table: WealthTable,
    /// Numeric column names, file order.
    pub columns: Vec<String>,
    pub rows: Vec<WealthRow>,
}

/// One commune row of the literacy dataset, with year-indexed series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiteracyRow {
    pub code: String,
    pub commune: String,
    pub department: String,
    /// `peralpha{year}`: literate share of the population, percent.
    pub literate_percent: BTreeMap<u16, f64>,
    /// `palpha{year}`: literate head count.
    pub literate_count: BTreeMap<u16, f64>,
    /// `conjsign{year}`: spouses able to sign their marriage certificate.
    pub signing: BTreeMap<u16, f64>,
    /// `conjnosi{year}`: spouses unable to sign.
    pub not_signing: BTreeMap<u16, f64>,
}

/// A year-indexed numeric series, kept as parallel vectors for plotting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearSeries {
    pub years: Vec<u16>,
    pub values: Vec<f64>,
}

impl YearSeries {
    pub fn push(&mut self, year: u16, value: f64) {
        self.years.push(year);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first(&self) -> Option<(u16, f64)> {
        Some((*self.years.first()?, *self.values.first()?))
    }

    pub fn last(&self) -> Option<(u16, f64)> {
        Some((*self.years.last()?, *self.values.last()?))
    }

    /// `(year, value)` pairs as `f64` points for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.years
            .iter()
            .zip(&self.values)
            .map(|(&y, &v)| (f64::from(y), v))
            .collect()
    }
}

/// A full run's configuration as understood by the page pipelines.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory holding the CSV tree (`Diplomes_csv/`, ...).
    pub data_dir: PathBuf,
    /// Use the built-in synthetic dataset instead of reading CSVs.
    pub sample: bool,
    /// Analysis year for education/correlation views.
    pub year: u16,
    pub election: ElectionKind,
    /// How many departments to show in "top departments" views.
    pub top_n: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./Data"),
            sample: false,
            year: 2022,
            election: ElectionKind::Presidential,
            top_n: 5,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_total_treats_single_sex_as_partial_sum() {
        let mut c = TierCounts::default();
        c.set(DiplomaTier::Sup, Sex::Men, 10.0);
        assert_eq!(c.tier_total(DiplomaTier::Sup), Some(10.0));
        assert_eq!(c.tier_total(DiplomaTier::Bac), None);
    }

    #[test]
    fn population_is_none_when_all_missing() {
        let c = TierCounts::default();
        assert!(c.population().is_none());
        assert!(c.is_empty());
    }

    #[test]
    fn population_sums_all_six_columns() {
        let mut c = TierCounts::default();
        c.set(DiplomaTier::Sup, Sex::Men, 1.0);
        c.set(DiplomaTier::Sup, Sex::Women, 2.0);
        c.set(DiplomaTier::Bac, Sex::Men, 3.0);
        c.set(DiplomaTier::Bac, Sex::Women, 4.0);
        c.set(DiplomaTier::Nodip, Sex::Men, 5.0);
        c.set(DiplomaTier::Nodip, Sex::Women, 6.0);
        assert_eq!(c.population(), Some(21.0));
    }

    #[test]
    fn year_series_points_are_aligned() {
        let mut s = YearSeries::default();
        s.push(2010, 1.5);
        s.push(2011, 2.5);
        assert_eq!(s.points(), vec![(2010.0, 1.5), (2011.0, 2.5)]);
        assert_eq!(s.first(), Some((2010, 1.5)));
        assert_eq!(s.last(), Some((2011, 2.5)));
    }
}
