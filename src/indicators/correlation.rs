//! Education-vs-votes correlation analysis.
//!
//! Election rows are joined to commune education rows on the commune code
//! (inner join), votes are converted to per-commune shares, and Pearson
//! coefficients are computed between education indicators and each
//! candidate's share.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::domain::{CommuneEducation, DiplomaTier, ElectionDataset};
use crate::indicators::education::{self, TierShares};
use crate::math::stats;

/// One commune surviving the election/education join for a given year.
#[derive(Debug, Clone)]
pub struct MergedCommune {
    pub code: String,
    pub commune: String,
    pub department: String,
    /// Higher-education share of the six-column population, percent.
    pub attainment: f64,
    pub shares: TierShares,
    /// Vote share per candidate (aligned with the dataset's candidate list),
    /// percent of the commune's total votes. `None` when the cell was missing.
    pub vote_shares: Vec<Option<f64>>,
}

/// Inner-join election rows with commune education rows on commune code.
///
/// A commune is kept only when it has counts for `year` with a positive
/// population and a positive total vote count.
pub fn merge_education_votes(
    election: &ElectionDataset,
    communes: &[CommuneEducation],
    year: u16,
) -> Vec<MergedCommune> {
    let by_code: HashMap<&str, &CommuneEducation> =
        communes.iter().map(|c| (c.code.as_str(), c)).collect();

    let mut out = Vec::new();
    for row in &election.rows {
        let Some(edu) = by_code.get(row.code.trim()) else { continue };
        let Some(counts) = edu.years.get(&year) else { continue };
        let Some(attainment) = education::attainment_percent(counts) else { continue };
        let Some(shares) = education::tier_shares(counts) else { continue };

        let total_votes: f64 = row.votes.iter().flatten().sum();
        if total_votes <= 0.0 {
            continue;
        }

        let vote_shares = row
            .votes
            .iter()
            .map(|v| v.map(|v| (v / total_votes) * 100.0))
            .collect();

        out.push(MergedCommune {
            code: row.code.clone(),
            commune: if row.commune.is_empty() {
                edu.commune.clone()
            } else {
                row.commune.clone()
            },
            department: if row.department.is_empty() {
                edu.department.clone()
            } else {
                row.department.clone()
            },
            attainment,
            shares,
            vote_shares,
        });
    }
    out
}

/// Correlation coefficients for one candidate against the education
/// indicators. `None` when too few usable pairs remain.
#[derive(Debug, Clone)]
pub struct CandidateCorrelation {
    pub candidate: String,
    /// vs. attainment percent (six-column higher-education share).
    pub attainment: Option<f64>,
    pub sup: Option<f64>,
    pub bac: Option<f64>,
    pub nodip: Option<f64>,
    /// Communes contributing at least the attainment pair.
    pub n: usize,
}

/// Compute the full tier × candidate correlation matrix.
///
/// Candidates are independent, so the matrix is computed in parallel; with
/// ~35k communes and a dozen candidates this keeps the TUI refresh instant.
pub fn correlation_matrix(
    merged: &[MergedCommune],
    candidates: &[String],
) -> Vec<CandidateCorrelation> {
    candidates
        .par_iter()
        .enumerate()
        .map(|(idx, candidate)| {
            let pairs_for = |pick: fn(&MergedCommune) -> f64| -> Vec<(f64, f64)> {
                merged
                    .iter()
                    .filter_map(|m| Some((pick(m), (*m.vote_shares.get(idx)?)?)))
                    .collect()
            };

            let attainment_pairs = pairs_for(|m| m.attainment);
            CandidateCorrelation {
                candidate: candidate.clone(),
                n: attainment_pairs.len(),
                attainment: stats::pearson(&attainment_pairs),
                sup: stats::pearson(&pairs_for(|m| m.shares.sup)),
                bac: stats::pearson(&pairs_for(|m| m.shares.bac)),
                nodip: stats::pearson(&pairs_for(|m| m.shares.nodip)),
            }
        })
        .collect()
}

/// `(indicator, vote share)` scatter pairs for one candidate.
pub fn scatter_pairs(
    merged: &[MergedCommune],
    candidate_idx: usize,
    tier: Option<DiplomaTier>,
) -> Vec<(f64, f64)> {
    merged
        .iter()
        .filter_map(|m| {
            let x = match tier {
                None => m.attainment,
                Some(t) => m.shares.get(t),
            };
            let y = (*m.vote_shares.get(candidate_idx)?)?;
            Some((x, y))
        })
        .collect()
}

/// Plain-language reading of a coefficient, with the dashboard's thresholds.
pub fn interpret(r: f64) -> &'static str {
    let a = r.abs();
    if a < 0.1 {
        "very weak or none"
    } else if a < 0.3 {
        "weak"
    } else {
        "moderate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElectionKind, ElectionRow, Sex, TierCounts};
    use std::collections::BTreeMap;

    fn commune(code: &str, year: u16, sup: f64, nodip: f64) -> CommuneEducation {
        let mut counts = TierCounts::default();
        counts.set(DiplomaTier::Sup, Sex::Men, sup / 2.0);
        counts.set(DiplomaTier::Sup, Sex::Women, sup / 2.0);
        counts.set(DiplomaTier::Bac, Sex::Men, 0.0);
        counts.set(DiplomaTier::Bac, Sex::Women, 0.0);
        counts.set(DiplomaTier::Nodip, Sex::Men, nodip / 2.0);
        counts.set(DiplomaTier::Nodip, Sex::Women, nodip / 2.0);
        let mut years = BTreeMap::new();
        years.insert(year, counts);
        CommuneEducation {
            code: code.to_string(),
            commune: format!("C{code}"),
            department: "D".to_string(),
            years,
        }
    }

    fn election(rows: Vec<ElectionRow>) -> ElectionDataset {
        ElectionDataset {
            kind: ElectionKind::Presidential,
            candidates: vec!["ALPHA".to_string(), "BETA".to_string()],
            rows,
        }
    }

    fn vote_row(code: &str, a: f64, b: f64) -> ElectionRow {
        ElectionRow {
            code: code.to_string(),
            commune: String::new(),
            department: String::new(),
            votes: vec![Some(a), Some(b)],
        }
    }

    #[test]
    fn merge_is_an_inner_join_on_commune_code() {
        let communes = vec![commune("001", 2022, 20.0, 80.0), commune("002", 2022, 50.0, 50.0)];
        let e = election(vec![
            vote_row("001", 60.0, 40.0),
            vote_row("999", 10.0, 0.0), // no education row
        ]);

        let merged = merge_education_votes(&e, &communes, 2022);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].code, "001");
        assert!((merged[0].attainment - 20.0).abs() < 1e-12);
        assert!((merged[0].vote_shares[0].unwrap() - 60.0).abs() < 1e-12);
        assert!((merged[0].vote_shares[1].unwrap() - 40.0).abs() < 1e-12);
    }

    #[test]
    fn merge_drops_zero_vote_and_zero_population_communes() {
        let communes = vec![commune("001", 2022, 0.0, 0.0), commune("002", 2022, 10.0, 90.0)];
        let e = election(vec![vote_row("001", 50.0, 50.0), vote_row("002", 0.0, 0.0)]);
        assert!(merge_education_votes(&e, &communes, 2022).is_empty());
    }

    #[test]
    fn correlation_matrix_signs_match_construction() {
        // Attainment rises with ALPHA share and falls with BETA share.
        let communes: Vec<CommuneEducation> = (0..20)
            .map(|i| commune(&format!("{i:03}"), 2022, i as f64 + 1.0, 100.0 - i as f64))
            .collect();
        let rows: Vec<ElectionRow> = (0..20)
            .map(|i| vote_row(&format!("{i:03}"), 10.0 + i as f64, 50.0 - i as f64))
            .collect();
        let e = election(rows);

        let merged = merge_education_votes(&e, &communes, 2022);
        assert_eq!(merged.len(), 20);
        let matrix = correlation_matrix(&merged, &e.candidates);
        assert_eq!(matrix.len(), 2);
        assert!(matrix[0].attainment.unwrap() > 0.9);
        assert!(matrix[1].attainment.unwrap() < -0.9);
        // sup share mirrors attainment here; nodip moves opposite.
        assert!(matrix[0].sup.unwrap() > 0.9);
        assert!(matrix[0].nodip.unwrap() < -0.9);
    }

    #[test]
    fn interpret_thresholds() {
        assert_eq!(interpret(0.05), "very weak or none");
        assert_eq!(interpret(-0.2), "weak");
        assert_eq!(interpret(0.45), "moderate");
    }
}
