//! Descriptive statistics: mean/std, quantiles, histograms, Pearson correlation.
//!
//! All functions return `Option` instead of NaN so callers can distinguish
//! "no data" from a computed value. Quantiles use linear interpolation between
//! order statistics, matching the conventions of the spreadsheet-style
//! summaries these reports replace.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator). `None` for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile with linear interpolation. `q` in `[0, 1]`; input need not be sorted.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Eight-number summary in the shape of a dataframe `describe()` block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// Sample std dev; 0.0 for a single observation.
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

pub fn describe(values: &[f64]) -> Option<Describe> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(Describe {
        count: finite.len(),
        mean: mean(&finite)?,
        std: std_dev(&finite).unwrap_or(0.0),
        min: finite.iter().copied().fold(f64::INFINITY, f64::min),
        q25: quantile(&finite, 0.25)?,
        median: quantile(&finite, 0.5)?,
        q75: quantile(&finite, 0.75)?,
        max: finite.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` edges; bin `i` covers `[edges[i], edges[i+1])`, the last bin
    /// is closed on the right.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(bin_center, count)` points for plotting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| ((self.edges[i] + self.edges[i + 1]) / 2.0, c as f64))
            .collect()
    }
}

/// Bin finite values into `bins` equal-width buckets. `None` when no finite
/// values remain or `bins == 0`. A degenerate range (all values equal) yields
/// a single fully-populated middle bin.
pub fn histogram(values: &[f64], bins: usize) -> Option<Histogram> {
    if bins == 0 {
        return None;
    }
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    let edges: Vec<f64> = if span <= 0.0 {
        // All values identical: synthesize a unit-wide range around them.
        (0..=bins)
            .map(|i| min - 0.5 + i as f64 / bins as f64)
            .collect()
    } else {
        (0..=bins).map(|i| min + span * i as f64 / bins as f64).collect()
    };

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = if span <= 0.0 {
            bins / 2
        } else {
            (((v - min) / span) * bins as f64).floor() as usize
        };
        counts[idx.min(bins - 1)] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Pearson correlation over `(x, y)` pairs.
///
/// Pairs with a non-finite member are dropped (pairwise deletion). Returns
/// `None` with fewer than 2 usable pairs or when either side has zero
/// variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let usable: Vec<(f64, f64)> = pairs
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    if usable.len() < 2 {
        return None;
    }

    let n = usable.len() as f64;
    let mx = usable.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = usable.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in usable {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then_some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_basic() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&xs).unwrap() - 5.0).abs() < 1e-12);
        // Sample std of the classic example: sqrt(32/7).
        assert!((std_dev(&xs).unwrap() - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn quantile_interpolates() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&xs, 0.5).unwrap() - 2.5).abs() < 1e-12);
        assert!((quantile(&xs, 0.25).unwrap() - 1.75).abs() < 1e-12);
        assert_eq!(quantile(&xs, 0.0), Some(1.0));
        assert_eq!(quantile(&xs, 1.0), Some(4.0));
    }

    #[test]
    fn describe_matches_hand_computation() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(d.count, 5);
        assert!((d.mean - 3.0).abs() < 1e-12);
        assert!((d.median - 3.0).abs() < 1e-12);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 5.0);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let xs = [0.0, 0.1, 0.5, 0.9, 1.0];
        let h = histogram(&xs, 2).unwrap();
        assert_eq!(h.counts.iter().sum::<usize>(), xs.len());
        // Max value lands in the last (right-closed) bin.
        assert_eq!(h.counts, vec![2, 3]);
    }

    #[test]
    fn histogram_degenerate_range() {
        let h = histogram(&[3.0, 3.0, 3.0], 4).unwrap();
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
        assert_eq!(h.edges.len(), 5);
    }

    #[test]
    fn pearson_perfect_correlation() {
        let pairs: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        assert!((pearson(&pairs).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_drops_non_finite_pairs() {
        let pairs = vec![(0.0, 0.0), (1.0, 1.0), (f64::NAN, 5.0), (2.0, 2.0)];
        assert!((pearson(&pairs).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_rejects_zero_variance() {
        let pairs = vec![(1.0, 5.0), (1.0, 7.0), (1.0, 9.0)];
        assert!(pearson(&pairs).is_none());
    }
}
