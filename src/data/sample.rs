//! Synthetic commune dataset generation.
//!
//! Produces a small France-shaped bundle (education, elections, wealth,
//! literacy) with the statistical structure the real files have: attainment
//! rising over time, a gender gap closing by the early 1960s, vote shares
//! correlated with attainment, and literacy climbing through the 19th
//! century. Everything is seeded so runs and tests are reproducible.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{
    CommuneEducation, DepartmentEducation, DiplomaTier, ElectionDataset, ElectionKind,
    ElectionRow, LiteracyRow, Sex, TierCounts, TierTotals, WealthDataset, WealthRow, WealthTable,
};
use crate::error::AppError;

const DEPARTMENT_NAMES: [&str; 8] = [
    "Ain",
    "Aisne",
    "Allier",
    "Ardennes",
    "Aube",
    "Aveyron",
    "Calvados",
    "Creuse",
];

/// Census-style years carried by the education rows.
const EDUCATION_YEARS: [u16; 17] = [
    1945, 1950, 1955, 1960, 1962, 1965, 1975, 1985, 1995, 2005, 2010, 2012, 2014, 2015, 2018,
    2020, 2022,
];

/// Years carried by the literacy series.
const LITERACY_YEARS: [u16; 14] = [
    1816, 1826, 1836, 1846, 1856, 1866, 1876, 1886, 1896, 1906, 1921, 1931, 1936, 1946,
];

const PRESIDENTIAL_CANDIDATES: [&str; 6] =
    ["MACRON", "LE PEN", "MELENCHON", "ZEMMOUR", "PECRESSE", "JADOT"];

const LEGISLATIVE_CANDIDATES: [&str; 5] = ["ENSEMBLE", "RN", "NUPES", "LR", "DIVERS"];

/// Shape of the generated bundle.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct SampleSpec {
    pub departments: usize,
    /// Communes per department.
    pub communes: usize,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            departments: 6,
            communes: 12,
            seed: 42,
        }
    }
}

/// The full synthetic bundle, mirroring what the CSV tree would provide.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub communes: Vec<CommuneEducation>,
    pub departments: Vec<DepartmentEducation>,
    pub presidential: ElectionDataset,
    pub legislative: ElectionDataset,
    pub wealth: Vec<WealthDataset>,
    pub literacy: Vec<LiteracyRow>,
}

struct CommuneSeed {
    code: String,
    name: String,
    department: String,
    dep_idx: usize,
    population: f64,
    /// Persistent attainment offset, percentage points.
    offset: f64,
}

pub fn generate_sample(spec: &SampleSpec) -> Result<SampleData, AppError> {
    if spec.departments == 0 || spec.departments > DEPARTMENT_NAMES.len() {
        return Err(AppError::input(format!(
            "Sample department count must be 1..={}.",
            DEPARTMENT_NAMES.len()
        )));
    }
    if spec.communes == 0 {
        return Err(AppError::input("Sample commune count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(spec));
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let seeds = commune_seeds(spec, &mut rng, &normal);

    let communes = education_rows(&seeds, &mut rng, &normal);
    let departments = department_rows(&communes);
    let presidential = election(
        ElectionKind::Presidential,
        &PRESIDENTIAL_CANDIDATES,
        &seeds,
        &communes,
        &mut rng,
        &normal,
    );
    let legislative = election(
        ElectionKind::Legislative,
        &LEGISLATIVE_CANDIDATES,
        &seeds,
        &communes,
        &mut rng,
        &normal,
    );
    let wealth = WealthTable::ALL
        .iter()
        .map(|&table| wealth_table(table, &seeds, &mut rng, &normal))
        .collect();
    let literacy = literacy_rows(&seeds, &mut rng, &normal);

    Ok(SampleData {
        communes,
        departments,
        presidential,
        legislative,
        wealth,
        literacy,
    })
}

fn sample_seed(spec: &SampleSpec) -> u64 {
    let mut hasher = DefaultHasher::new();
    spec.hash(&mut hasher);
    hasher.finish()
}

fn commune_seeds(spec: &SampleSpec, rng: &mut StdRng, normal: &Normal<f64>) -> Vec<CommuneSeed> {
    let mut seeds = Vec::with_capacity(spec.departments * spec.communes);
    for dep_idx in 0..spec.departments {
        let department = DEPARTMENT_NAMES[dep_idx];
        for i in 0..spec.communes {
            // Roughly log-normal commune size, floored at a hamlet.
            let population = (600.0 * normal.sample(rng).exp()).clamp(80.0, 60_000.0);
            seeds.push(CommuneSeed {
                code: format!("{:02}{:03}", dep_idx + 1, i + 1),
                name: format!("{department}-sur-{:03}", i + 1),
                department: department.to_string(),
                dep_idx,
                population,
                offset: normal.sample(rng) * 4.0,
            });
        }
    }
    seeds
}

/// Baseline higher-education share (percent) for a year, before commune and
/// department effects.
fn sup_baseline(year: u16) -> f64 {
    let u = f64::from(year.saturating_sub(1945)) / f64::from(2022 - 1945);
    2.0 + u * 33.0
}

/// Women-to-men ratio inside the `sup` tier. Well below 1 right after the
/// war, closed by the early 1960s.
fn gender_ratio(year: u16) -> f64 {
    if year >= 1962 {
        return 1.0;
    }
    let u = f64::from(year.saturating_sub(1945)) / f64::from(1962 - 1945);
    0.55 + u * 0.45
}

fn education_rows(
    seeds: &[CommuneSeed],
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> Vec<CommuneEducation> {
    let mid = (DEPARTMENT_NAMES.len() as f64 - 1.0) / 2.0;
    seeds
        .iter()
        .map(|seed| {
            let dep_effect = (seed.dep_idx as f64 - mid) * 1.5;
            let mut years = BTreeMap::new();
            for year in EDUCATION_YEARS {
                let sup_share = (sup_baseline(year) + dep_effect + seed.offset
                    + normal.sample(rng))
                .clamp(0.5, 60.0);
                let bac_share =
                    (10.0 + 0.3 * sup_share + normal.sample(rng) * 2.0).clamp(1.0, 40.0);
                let nodip_share = (100.0 - sup_share - bac_share).max(1.0);

                let ratio = (gender_ratio(year) + normal.sample(rng) * 0.02).max(0.1);
                let mut counts = TierCounts::default();
                split_tier(
                    &mut counts,
                    DiplomaTier::Sup,
                    seed.population * sup_share / 100.0,
                    ratio,
                );
                split_tier(
                    &mut counts,
                    DiplomaTier::Bac,
                    seed.population * bac_share / 100.0,
                    (ratio + 1.0) / 2.0,
                );
                split_tier(
                    &mut counts,
                    DiplomaTier::Nodip,
                    seed.population * nodip_share / 100.0,
                    1.0,
                );
                years.insert(year, counts);
            }
            CommuneEducation {
                code: seed.code.clone(),
                commune: seed.name.clone(),
                department: seed.department.clone(),
                years,
            }
        })
        .collect()
}

/// Split a tier total between the sexes given a women-to-men ratio.
fn split_tier(counts: &mut TierCounts, tier: DiplomaTier, total: f64, women_to_men: f64) {
    let women = total * women_to_men / (1.0 + women_to_men);
    counts.set(tier, Sex::Women, women.round());
    counts.set(tier, Sex::Men, (total - women).round());
}

fn department_rows(communes: &[CommuneEducation]) -> Vec<DepartmentEducation> {
    let mut by_department: BTreeMap<String, DepartmentEducation> = BTreeMap::new();
    for commune in communes {
        let dep = by_department
            .entry(commune.department.clone())
            .or_insert_with(|| DepartmentEducation {
                department: commune.department.clone(),
                counts: BTreeMap::new(),
                totals: BTreeMap::new(),
                percent_sup: BTreeMap::new(),
                percent_bac: BTreeMap::new(),
            });
        for (&year, counts) in &commune.years {
            let agg = dep.counts.entry(year).or_default();
            for tier in DiplomaTier::ALL {
                for sex in [Sex::Men, Sex::Women] {
                    if let Some(v) = counts.get(tier, sex) {
                        agg.set(tier, sex, agg.get(tier, sex).unwrap_or(0.0) + v);
                    }
                }
            }
        }
    }

    let mut out: Vec<DepartmentEducation> = by_department.into_values().collect();
    for dep in &mut out {
        for (&year, counts) in &dep.counts {
            let mut totals = TierTotals::default();
            for tier in DiplomaTier::ALL {
                if let Some(v) = counts.tier_total(tier) {
                    totals.set(tier, v);
                }
            }
            dep.totals.insert(year, totals);
            if let Some(pop) = counts.population() {
                if pop > 0.0 {
                    if let Some(sup) = counts.tier_total(DiplomaTier::Sup) {
                        dep.percent_sup.insert(year, sup / pop * 100.0);
                    }
                    if let Some(bac) = counts.tier_total(DiplomaTier::Bac) {
                        dep.percent_bac.insert(year, bac / pop * 100.0);
                    }
                }
            }
        }
    }
    out
}

fn election(
    kind: ElectionKind,
    candidates: &[&str],
    seeds: &[CommuneSeed],
    communes: &[CommuneEducation],
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> ElectionDataset {
    let rows = seeds
        .iter()
        .zip(communes)
        .map(|(seed, edu)| {
            let attainment = edu
                .years
                .get(&2022)
                .and_then(|c| {
                    let sup = c.tier_total(DiplomaTier::Sup)?;
                    let pop = c.population()?;
                    (pop > 0.0).then(|| sup / pop * 100.0)
                })
                .unwrap_or(20.0);

            // First candidate leans with attainment, second against, the
            // rest is noise around a fixed base.
            let mut weights: Vec<f64> = candidates
                .iter()
                .enumerate()
                .map(|(idx, _)| {
                    let base = match idx {
                        0 => 18.0 + 0.6 * attainment,
                        1 => 38.0 - 0.5 * attainment,
                        _ => 12.0,
                    };
                    (base + normal.sample(rng) * 3.0).max(0.5)
                })
                .collect();
            let total_weight: f64 = weights.iter().sum();
            for w in &mut weights {
                *w /= total_weight;
            }

            let turnout = seed.population * 0.72;
            ElectionRow {
                code: seed.code.clone(),
                commune: seed.name.clone(),
                department: seed.department.clone(),
                votes: weights.iter().map(|w| Some((w * turnout).round())).collect(),
            }
        })
        .collect();

    ElectionDataset {
        kind,
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

fn wealth_columns(table: WealthTable) -> &'static [&'static str] {
    match table {
        WealthTable::BasesFiscales => &["bases2018", "bases2019", "bases2020"],
        WealthTable::CapitalImmobilier => &["capital2018", "capital2019", "capital2020"],
        WealthTable::CapitalCommunes => &["capital2020", "capitalparhab2020"],
        WealthTable::Isf => &["redevables2017", "patrimoine2017", "impot2017"],
        WealthTable::Terres => &["surface2020", "valeur2020"],
    }
}

fn wealth_table(
    table: WealthTable,
    seeds: &[CommuneSeed],
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> WealthDataset {
    let columns: Vec<String> = wealth_columns(table).iter().map(|c| c.to_string()).collect();
    let rows = seeds
        .iter()
        .map(|seed| {
            // Wealth scales with size and with the commune's attainment tilt.
            let scale = seed.population * (1.0 + seed.offset / 20.0).max(0.2);
            let values = columns
                .iter()
                .enumerate()
                .map(|(idx, _)| {
                    // A sprinkle of missing cells, like the real tables.
                    if rng.r#gen::<f64>() < 0.04 {
                        return None;
                    }
                    let level = scale * (1.0 + idx as f64 * 0.05);
                    Some((level * (1.0 + normal.sample(rng) * 0.15)).max(0.0).round())
                })
                .collect();
            WealthRow {
                department: seed.department.clone(),
                commune: seed.name.clone(),
                values,
            }
        })
        .collect();

    WealthDataset {
        table,
        columns,
        rows,
    }
}

/// Logistic literacy curve, percent, centered on the 1870s.
fn literacy_baseline(year: u16) -> f64 {
    let x = (f64::from(year) - 1872.0) / 28.0;
    100.0 / (1.0 + (-x).exp())
}

fn literacy_rows(
    seeds: &[CommuneSeed],
    rng: &mut StdRng,
    normal: &Normal<f64>,
) -> Vec<LiteracyRow> {
    seeds
        .iter()
        .map(|seed| {
            let mut row = LiteracyRow {
                code: seed.code.clone(),
                commune: seed.name.clone(),
                department: seed.department.clone(),
                literate_percent: BTreeMap::new(),
                literate_count: BTreeMap::new(),
                signing: BTreeMap::new(),
                not_signing: BTreeMap::new(),
            };
            for year in LITERACY_YEARS {
                let percent = (literacy_baseline(year) + seed.offset
                    + normal.sample(rng) * 2.0)
                    .clamp(1.0, 99.5);
                let marriages = (seed.population * 0.008).max(1.0);
                row.literate_percent.insert(year, percent);
                row.literate_count
                    .insert(year, (seed.population * percent / 100.0).round());
                row.signing
                    .insert(year, (marriages * 2.0 * percent / 100.0).round());
                row.not_signing
                    .insert(year, (marriages * 2.0 * (100.0 - percent) / 100.0).round());
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_deterministic() {
        let spec = SampleSpec::default();
        let a = generate_sample(&spec).unwrap();
        let b = generate_sample(&spec).unwrap();
        assert_eq!(a.communes.len(), b.communes.len());
        assert_eq!(
            a.communes[0].years.get(&2022),
            b.communes[0].years.get(&2022)
        );
        assert_eq!(a.presidential.rows[0].votes, b.presidential.rows[0].votes);
    }

    #[test]
    fn rejects_empty_shapes() {
        let spec = SampleSpec {
            departments: 0,
            ..SampleSpec::default()
        };
        assert_eq!(generate_sample(&spec).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn education_years_cover_the_census_range() {
        let data = generate_sample(&SampleSpec::default()).unwrap();
        let first = &data.communes[0];
        assert!(first.years.contains_key(&1945));
        assert!(first.years.contains_key(&2022));
        let counts = first.years[&2022];
        assert!(counts.population().unwrap() > 0.0);
    }

    #[test]
    fn gender_gap_closes_by_1962() {
        let data = generate_sample(&SampleSpec::default()).unwrap();
        let mut early = 0.0;
        let mut late = 0.0;
        for c in &data.communes {
            let c1945 = c.years[&1945];
            let c1962 = c.years[&1962];
            early += c1945.sup_women.unwrap_or(0.0) / c1945.sup_men.unwrap_or(1.0).max(1.0);
            late += c1962.sup_women.unwrap_or(0.0) / c1962.sup_men.unwrap_or(1.0).max(1.0);
        }
        assert!(early < late, "expected the women/men ratio to rise");
    }

    #[test]
    fn elections_align_with_commune_codes() {
        let data = generate_sample(&SampleSpec::default()).unwrap();
        assert_eq!(data.presidential.rows.len(), data.communes.len());
        assert_eq!(data.presidential.candidates.len(), 6);
        assert_eq!(data.legislative.candidates.len(), 5);
        for (row, edu) in data.presidential.rows.iter().zip(&data.communes) {
            assert_eq!(row.code, edu.code);
            assert!(row.votes.iter().flatten().sum::<f64>() > 0.0);
        }
    }

    #[test]
    fn wealth_bundle_has_all_tables() {
        let data = generate_sample(&SampleSpec::default()).unwrap();
        assert_eq!(data.wealth.len(), WealthTable::ALL.len());
        for ds in &data.wealth {
            assert_eq!(ds.rows.len(), data.communes.len());
            for row in &ds.rows {
                assert_eq!(row.values.len(), ds.columns.len());
            }
        }
    }

    #[test]
    fn literacy_rises_over_time() {
        let data = generate_sample(&SampleSpec::default()).unwrap();
        for row in &data.literacy {
            let first = row.literate_percent[&1816];
            let last = row.literate_percent[&1946];
            assert!(last > first, "literacy should climb: {first} -> {last}");
        }
    }
}
