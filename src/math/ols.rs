//! Least-squares trendline fitting for scatter views.
//!
//! The correlation page overlays an OLS regression line on the
//! indicator-vs-votes scatter. The design matrix is a trivial `[1, x]`, but we
//! still solve via SVD so near-degenerate inputs (all communes sharing one
//! indicator value) degrade to `None` instead of a wild slope.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted `y = intercept + slope * x` line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub intercept: f64,
    pub slope: f64,
}

impl TrendLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a simple regression line through `(x, y)` pairs.
///
/// Non-finite pairs are dropped; needs at least 2 usable points.
pub fn fit_trend(pairs: &[(f64, f64)]) -> Option<TrendLine> {
    let usable: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if usable.len() < 2 {
        return None;
    }

    let n = usable.len();
    let mut design = DMatrix::zeros(n, 2);
    let mut target = DVector::zeros(n);
    for (i, (x, y)) in usable.into_iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
        target[i] = y;
    }

    let beta = solve_least_squares(&design, &target)?;
    Some(TrendLine {
        intercept: beta[0],
        slope: beta[1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn fit_trend_recovers_line() {
        let pairs: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 4.0 - 0.5 * i as f64)).collect();
        let line = fit_trend(&pairs).unwrap();
        assert!((line.intercept - 4.0).abs() < 1e-8);
        assert!((line.slope + 0.5).abs() < 1e-8);
        assert!((line.predict(10.0) + 1.0).abs() < 1e-8);
    }

    #[test]
    fn fit_trend_rejects_degenerate_input() {
        assert!(fit_trend(&[(1.0, 1.0)]).is_none());
    }
}
