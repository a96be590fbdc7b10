//! Education-indicator pipeline.
//!
//! The recurring arithmetic of the dashboard lives here:
//! percentage-of-population-with-diploma calculations, gender-gap series,
//! year-indexed time-series assembly, and distribution summaries.
//!
//! Conventions (shared invariants):
//! - year-suffixed families are summed over both sexes *before* any ratio
//! - a percentage is only produced from a positive denominator
//! - produced percentages are clamped to `[0, 100]`

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use crate::domain::{CommuneEducation, DepartmentEducation, DiplomaTier, Sex, TierCounts, YearSeries};
use crate::math::stats::{self, Histogram};

/// Sample years used by the multi-year distribution view.
pub const DISTRIBUTION_YEARS: [u16; 9] = [1945, 1955, 1965, 1975, 1985, 1995, 2005, 2015, 2022];

/// Census years with commune-level sexed counts used by the gender-gap view.
pub const GENDER_GAP_YEARS: RangeInclusive<u16> = 1945..=1962;

/// Department `psup` series window shown by the trends view.
pub const DEPARTMENT_TREND_YEARS: RangeInclusive<u16> = 2010..=2022;

/// Share of the population holding a higher-education diploma, over the
/// six-column total (both sexes, all tiers). `None` when the total is not
/// positive.
pub fn attainment_percent(counts: &TierCounts) -> Option<f64> {
    let total = counts.population()?;
    if total <= 0.0 {
        return None;
    }
    let sup = counts.tier_total(DiplomaTier::Sup).unwrap_or(0.0);
    Some(((sup / total) * 100.0).clamp(0.0, 100.0))
}

/// Narrow two-tier variant used by the distribution view: higher-education
/// counts over higher-education + no-diploma counts.
pub fn two_tier_percent(counts: &TierCounts) -> Option<f64> {
    let sup = counts.tier_total(DiplomaTier::Sup)?;
    let nodip = counts.tier_total(DiplomaTier::Nodip)?;
    let total = sup + nodip;
    if total <= 0.0 {
        return None;
    }
    Some(((sup / total) * 100.0).clamp(0.0, 100.0))
}

/// Per-tier shares over the six-column total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierShares {
    pub sup: f64,
    pub bac: f64,
    pub nodip: f64,
}

impl TierShares {
    pub fn get(&self, tier: DiplomaTier) -> f64 {
        match tier {
            DiplomaTier::Sup => self.sup,
            DiplomaTier::Bac => self.bac,
            DiplomaTier::Nodip => self.nodip,
        }
    }
}

pub fn tier_shares(counts: &TierCounts) -> Option<TierShares> {
    let total = counts.population()?;
    if total <= 0.0 {
        return None;
    }
    let share = |tier| (counts.tier_total(tier).unwrap_or(0.0) / total * 100.0).clamp(0.0, 100.0);
    Some(TierShares {
        sup: share(DiplomaTier::Sup),
        bac: share(DiplomaTier::Bac),
        nodip: share(DiplomaTier::Nodip),
    })
}

/// One commune line of the detail table for a chosen year.
#[derive(Debug, Clone)]
pub struct AttainmentRow {
    pub code: String,
    pub commune: String,
    pub department: String,
    /// sup + bac counts (both sexes).
    pub graduates: f64,
    /// nodip counts (both sexes).
    pub without_diploma: f64,
    /// graduates / (graduates + without) * 100.
    pub percent: f64,
}

/// Build the per-commune detail table for `year`. Communes with no counts for
/// that year, or a non-positive denominator, are omitted.
pub fn attainment_table(rows: &[CommuneEducation], year: u16) -> Vec<AttainmentRow> {
    let mut out = Vec::new();
    for row in rows {
        let Some(counts) = row.years.get(&year) else { continue };
        let graduates = counts.tier_total(DiplomaTier::Sup).unwrap_or(0.0)
            + counts.tier_total(DiplomaTier::Bac).unwrap_or(0.0);
        let without = counts.tier_total(DiplomaTier::Nodip).unwrap_or(0.0);
        let total = graduates + without;
        if total <= 0.0 {
            continue;
        }
        out.push(AttainmentRow {
            code: row.code.clone(),
            commune: row.commune.clone(),
            department: row.department.clone(),
            graduates,
            without_diploma: without,
            percent: ((graduates / total) * 100.0).clamp(0.0, 100.0),
        });
    }
    out
}

/// Case-insensitive substring search over commune names.
pub fn search_attainment<'a>(table: &'a [AttainmentRow], needle: &str) -> Vec<&'a AttainmentRow> {
    let needle = needle.to_lowercase();
    table
        .iter()
        .filter(|r| r.commune.to_lowercase().contains(&needle))
        .collect()
}

/// Commune-mean higher-education counts per sex, per year.
#[derive(Debug, Clone, Default)]
pub struct GenderGapSeries {
    pub men: YearSeries,
    pub women: YearSeries,
}

/// Mean `suph{year}` / `supf{year}` across communes for each year in `years`
/// where at least one commune has the column.
pub fn gender_gap_series(rows: &[CommuneEducation], years: RangeInclusive<u16>) -> GenderGapSeries {
    let mut out = GenderGapSeries::default();
    for year in years {
        let men: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.years.get(&year)?.get(DiplomaTier::Sup, Sex::Men))
            .collect();
        let women: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.years.get(&year)?.get(DiplomaTier::Sup, Sex::Women))
            .collect();
        if let (Some(m), Some(w)) = (stats::mean(&men), stats::mean(&women)) {
            out.men.push(year, m);
            out.women.push(year, w);
        }
    }
    out
}

/// Top-N departments by `psup{year}`, descending.
pub fn top_departments(deps: &[DepartmentEducation], year: u16, n: usize) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = deps
        .iter()
        .filter_map(|d| Some((d.department.clone(), *d.percent_sup.get(&year)?)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}

/// `psup{year}` series for one department over `years` (missing years skipped).
pub fn department_percent_series(
    dep: &DepartmentEducation,
    years: RangeInclusive<u16>,
) -> YearSeries {
    let mut out = YearSeries::default();
    for year in years {
        if let Some(&v) = dep.percent_sup.get(&year) {
            out.push(year, v);
        }
    }
    out
}

/// Department-mean percentage series for a tier (`psup` or `pbac`) over all
/// years any department reports.
pub fn national_percent_series(deps: &[DepartmentEducation], tier: DiplomaTier) -> YearSeries {
    let mut years: BTreeSet<u16> = BTreeSet::new();
    for d in deps {
        let map = match tier {
            DiplomaTier::Sup => &d.percent_sup,
            DiplomaTier::Bac => &d.percent_bac,
            DiplomaTier::Nodip => return YearSeries::default(),
        };
        years.extend(map.keys().copied());
    }

    let mut out = YearSeries::default();
    for year in years {
        let values: Vec<f64> = deps
            .iter()
            .filter_map(|d| {
                let map = match tier {
                    DiplomaTier::Sup => &d.percent_sup,
                    DiplomaTier::Bac => &d.percent_bac,
                    DiplomaTier::Nodip => unreachable!(),
                };
                map.get(&year).copied()
            })
            .collect();
        if let Some(m) = stats::mean(&values) {
            out.push(year, m);
        }
    }
    out
}

/// National count series for one tier: summed over departments, split by sex.
#[derive(Debug, Clone, Default)]
pub struct TierCountSeries {
    pub total: YearSeries,
    pub men: YearSeries,
    pub women: YearSeries,
}

pub fn national_tier_counts(deps: &[DepartmentEducation], tier: DiplomaTier) -> TierCountSeries {
    let mut years: BTreeSet<u16> = BTreeSet::new();
    for d in deps {
        years.extend(d.totals.keys().copied());
        years.extend(d.counts.keys().copied());
    }

    let mut out = TierCountSeries::default();
    for year in years {
        let mut total = 0.0;
        let mut men = 0.0;
        let mut women = 0.0;
        let mut any_total = false;
        let mut any_sexed = false;

        for d in deps {
            if let Some(v) = d.totals.get(&year).and_then(|t| t.get(tier)) {
                total += v;
                any_total = true;
            }
            if let Some(c) = d.counts.get(&year) {
                if let Some(v) = c.get(tier, Sex::Men) {
                    men += v;
                    any_sexed = true;
                }
                if let Some(v) = c.get(tier, Sex::Women) {
                    women += v;
                    any_sexed = true;
                }
            }
        }

        // Fall back to the sexed sum when the aggregate family is absent.
        if !any_total && any_sexed {
            total = men + women;
            any_total = true;
        }
        if any_total {
            out.total.push(year, total);
        }
        if any_sexed {
            out.men.push(year, men);
            out.women.push(year, women);
        }
    }
    out
}

/// Distribution of the commune attainment percent for one sample year.
#[derive(Debug, Clone)]
pub struct YearDistribution {
    pub year: u16,
    pub n: usize,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub histogram: Histogram,
}

/// Distribution summaries over the two-tier attainment percent for each
/// requested year with any usable communes.
pub fn distribution_by_year(
    rows: &[CommuneEducation],
    years: &[u16],
    bins: usize,
) -> Vec<YearDistribution> {
    let mut out = Vec::new();
    for &year in years {
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|r| two_tier_percent(r.years.get(&year)?))
            .collect();
        let Some(histogram) = stats::histogram(&values, bins) else { continue };
        let Some(median) = stats::median(&values) else { continue };
        out.push(YearDistribution {
            year,
            n: values.len(),
            median,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            histogram,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TierTotals;
    use std::collections::BTreeMap;

    fn counts(sup: (f64, f64), bac: (f64, f64), nodip: (f64, f64)) -> TierCounts {
        TierCounts {
            sup_men: Some(sup.0),
            sup_women: Some(sup.1),
            bac_men: Some(bac.0),
            bac_women: Some(bac.1),
            nodip_men: Some(nodip.0),
            nodip_women: Some(nodip.1),
        }
    }

    fn commune(code: &str, year: u16, c: TierCounts) -> CommuneEducation {
        let mut years = BTreeMap::new();
        years.insert(year, c);
        CommuneEducation {
            code: code.to_string(),
            commune: format!("Commune {code}"),
            department: "Testdep".to_string(),
            years,
        }
    }

    #[test]
    fn attainment_percent_known_fixture() {
        // 30 sup out of a population of 200 -> 15%.
        let c = counts((10.0, 20.0), (40.0, 30.0), (60.0, 40.0));
        assert!((attainment_percent(&c).unwrap() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn attainment_percent_zero_population_is_none() {
        let c = counts((0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
        assert!(attainment_percent(&c).is_none());
        assert!(attainment_percent(&TierCounts::default()).is_none());
    }

    #[test]
    fn two_tier_percent_matches_hand_math() {
        // 30 sup vs 90 nodip -> 25%.
        let mut c = TierCounts::default();
        c.set(DiplomaTier::Sup, Sex::Men, 10.0);
        c.set(DiplomaTier::Sup, Sex::Women, 20.0);
        c.set(DiplomaTier::Nodip, Sex::Men, 50.0);
        c.set(DiplomaTier::Nodip, Sex::Women, 40.0);
        assert!((two_tier_percent(&c).unwrap() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn tier_shares_sum_to_100() {
        let c = counts((10.0, 20.0), (40.0, 30.0), (60.0, 40.0));
        let s = tier_shares(&c).unwrap();
        assert!((s.sup + s.bac + s.nodip - 100.0).abs() < 1e-9);
        assert!((s.sup - 15.0).abs() < 1e-12);
        assert!((s.bac - 35.0).abs() < 1e-12);
        assert!((s.nodip - 50.0).abs() < 1e-12);
    }

    #[test]
    fn attainment_table_skips_empty_denominators() {
        let rows = vec![
            commune("001", 2022, counts((5.0, 5.0), (10.0, 10.0), (30.0, 40.0))),
            commune("002", 2022, counts((0.0, 0.0), (0.0, 0.0), (0.0, 0.0))),
            commune("003", 2010, counts((1.0, 1.0), (1.0, 1.0), (1.0, 1.0))),
        ];
        let table = attainment_table(&rows, 2022);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].code, "001");
        // 30 graduates / 100 total.
        assert!((table[0].percent - 30.0).abs() < 1e-12);
        assert!((table[0].graduates - 30.0).abs() < 1e-12);
        assert!((table[0].without_diploma - 70.0).abs() < 1e-12);
    }

    #[test]
    fn gender_gap_series_averages_across_communes() {
        let mut a = commune("001", 1950, TierCounts::default());
        a.years.get_mut(&1950).unwrap().set(DiplomaTier::Sup, Sex::Men, 10.0);
        a.years.get_mut(&1950).unwrap().set(DiplomaTier::Sup, Sex::Women, 4.0);
        let mut b = commune("002", 1950, TierCounts::default());
        b.years.get_mut(&1950).unwrap().set(DiplomaTier::Sup, Sex::Men, 20.0);
        b.years.get_mut(&1950).unwrap().set(DiplomaTier::Sup, Sex::Women, 6.0);

        let gap = gender_gap_series(&[a, b], 1950..=1950);
        assert_eq!(gap.men.years, vec![1950]);
        assert!((gap.men.values[0] - 15.0).abs() < 1e-12);
        assert!((gap.women.values[0] - 5.0).abs() < 1e-12);
    }

    fn department(name: &str, psup: &[(u16, f64)]) -> DepartmentEducation {
        DepartmentEducation {
            department: name.to_string(),
            counts: BTreeMap::new(),
            totals: BTreeMap::new(),
            percent_sup: psup.iter().copied().collect(),
            percent_bac: BTreeMap::new(),
        }
    }

    #[test]
    fn top_departments_ranks_descending() {
        let deps = vec![
            department("A", &[(2022, 20.0)]),
            department("B", &[(2022, 35.0)]),
            department("C", &[(2022, 28.0)]),
            department("D", &[(2010, 99.0)]), // no 2022 value
        ];
        let top = top_departments(&deps, 2022, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, "B");
        assert_eq!(top[1].0, "C");
    }

    #[test]
    fn national_percent_series_means_by_year() {
        let deps = vec![
            department("A", &[(2020, 10.0), (2021, 20.0)]),
            department("B", &[(2020, 30.0)]),
        ];
        let series = national_percent_series(&deps, DiplomaTier::Sup);
        assert_eq!(series.years, vec![2020, 2021]);
        assert!((series.values[0] - 20.0).abs() < 1e-12);
        assert!((series.values[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn national_tier_counts_prefers_aggregate_and_falls_back_to_sexed() {
        let mut a = department("A", &[]);
        let mut totals = TierTotals::default();
        totals.set(DiplomaTier::Sup, 100.0);
        a.totals.insert(2020, totals);

        let mut b = department("B", &[]);
        let mut c = TierCounts::default();
        c.set(DiplomaTier::Sup, Sex::Men, 30.0);
        c.set(DiplomaTier::Sup, Sex::Women, 50.0);
        b.counts.insert(2021, c);

        let series = national_tier_counts(&[a, b], DiplomaTier::Sup);
        assert_eq!(series.total.years, vec![2020, 2021]);
        assert!((series.total.values[0] - 100.0).abs() < 1e-12);
        assert!((series.total.values[1] - 80.0).abs() < 1e-12);
        assert_eq!(series.men.years, vec![2021]);
    }

    #[test]
    fn distribution_by_year_summaries() {
        let rows: Vec<CommuneEducation> = (0..10)
            .map(|i| {
                let mut c = TierCounts::default();
                c.set(DiplomaTier::Sup, Sex::Men, i as f64);
                c.set(DiplomaTier::Sup, Sex::Women, 0.0);
                c.set(DiplomaTier::Nodip, Sex::Men, 10.0 - i as f64);
                c.set(DiplomaTier::Nodip, Sex::Women, 0.0);
                commune(&format!("{i:03}"), 1995, c)
            })
            .collect();

        let dists = distribution_by_year(&rows, &[1995, 2005], 5);
        assert_eq!(dists.len(), 1);
        let d = &dists[0];
        assert_eq!(d.year, 1995);
        assert_eq!(d.n, 10);
        assert!(d.min >= 0.0 && d.max <= 100.0);
        assert_eq!(d.histogram.counts.iter().sum::<usize>(), 10);
    }
}
