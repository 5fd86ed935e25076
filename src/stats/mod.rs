//! Statistics used around ladder selection.
//!
//! ## Core Statistics
//!
//! - [`Summary`]: Descriptive statistics (mean, median, min/max, p95)
//! - [`mean`], [`percentile`]: Basic statistical functions
//!
//! ## Rate-Distortion Analysis
//!
//! - [`bd_rate`]: Bjontegaard Delta Rate between two rate-quality curves
//! - [`chart`]: SVG rate-quality charts

#[cfg(feature = "chart")]
pub mod chart;

#[cfg(feature = "chart")]
pub use chart::{ChartConfig, ChartPoint, ChartSeries, LineStyle, generate_svg};

use serde::{Deserialize, Serialize};

/// Descriptive statistics for a set of measurements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Median value.
    pub median: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl Summary {
    /// Compute summary statistics for a slice of values.
    ///
    /// Returns `None` if the slice is empty.
    #[must_use]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        Some(Self {
            count,
            mean: sorted.iter().sum::<f64>() / count as f64,
            median: percentile_sorted(&sorted, 0.5),
            min: sorted[0],
            max: sorted[count - 1],
            p95: percentile_sorted(&sorted, 0.95),
        })
    }
}

//=============================================================================
// Core Statistical Functions
//=============================================================================

/// Compute arithmetic mean.
///
/// # Example
///
/// ```
/// use bitrate_ladder::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute percentile using linear interpolation (R-7 method).
///
/// The percentile `p` should be in the range 0.0 to 1.0.
///
/// # Example
///
/// ```
/// use bitrate_ladder::stats::percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);
/// assert!((percentile(&values, 0.25) - 2.0).abs() < 0.001); // Q1
/// assert!((percentile(&values, 0.95) - 4.8).abs() < 0.001);
/// ```
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Percentile of pre-sorted values, `p` in 0-1.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

//=============================================================================
// BD-Rate
//=============================================================================

/// Calculate BD-Rate (Bjontegaard Delta Rate).
///
/// BD-Rate measures the average bitrate difference between two rate-quality
/// curves at the same quality level. A negative value means the test curve
/// is more efficient (lower bitrate at same quality).
///
/// Log-rate is interpolated piecewise-linearly as a function of quality and
/// the difference is integrated exactly over the overlapping quality range.
/// Curves need at least two distinct quality values.
///
/// # Arguments
///
/// * `reference` - Reference curve points (bitrate, quality).
/// * `test` - Test curve points (bitrate, quality).
///
/// # Returns
///
/// BD-Rate as a percentage, or `None` when the curves have no common
/// quality interval. Negative = test is better.
///
/// # Example
///
/// ```
/// use bitrate_ladder::stats::bd_rate;
///
/// let reference = [(1000.0, 80.0), (2000.0, 90.0)];
/// let test = [(1100.0, 80.0), (2200.0, 90.0)];
/// let bd = bd_rate(&reference, &test).unwrap();
/// assert!((bd - 10.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn bd_rate(reference: &[(f64, f64)], test: &[(f64, f64)]) -> Option<f64> {
    let reference = log_rate_curve(reference)?;
    let test = log_rate_curve(test)?;

    // Find overlapping quality range
    let min_quality = reference[0].0.max(test[0].0);
    let max_quality = reference.last()?.0.min(test.last()?.0);
    if max_quality <= min_quality {
        return None;
    }

    // The difference of two piecewise-linear curves is linear between the
    // union of their knots, so the trapezoidal rule is exact there.
    let mut knots: Vec<f64> = reference
        .iter()
        .chain(test.iter())
        .map(|&(q, _)| q)
        .filter(|&q| q > min_quality && q < max_quality)
        .collect();
    knots.push(min_quality);
    knots.push(max_quality);
    knots.sort_by(f64::total_cmp);
    knots.dedup();

    let delta = |q: f64| log_rate_at(&test, q) - log_rate_at(&reference, q);
    let area: f64 = knots
        .windows(2)
        .map(|w| (delta(w[0]) + delta(w[1])) / 2.0 * (w[1] - w[0]))
        .sum();

    let avg_delta = area / (max_quality - min_quality);
    Some((avg_delta.exp() - 1.0) * 100.0)
}

/// Convert (bitrate, quality) points to (quality, ln bitrate) sorted by
/// quality. Equal qualities keep the cheapest rate.
fn log_rate_curve(points: &[(f64, f64)]) -> Option<Vec<(f64, f64)>> {
    if points
        .iter()
        .any(|&(rate, quality)| !(rate.is_finite() && rate > 0.0 && quality.is_finite()))
    {
        return None;
    }

    let mut curve: Vec<(f64, f64)> = points.iter().map(|&(r, q)| (q, r.ln())).collect();
    curve.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    curve.dedup_by(|later, earlier| later.0 == earlier.0);

    (curve.len() >= 2).then_some(curve)
}

/// Log-rate at `quality`, clamped to the curve's end values.
fn log_rate_at(curve: &[(f64, f64)], quality: f64) -> f64 {
    let (first_q, first_r) = curve[0];
    let (last_q, last_r) = curve[curve.len() - 1];
    if quality <= first_q {
        return first_r;
    }
    if quality >= last_q {
        return last_r;
    }

    for w in curve.windows(2) {
        let (q0, r0) = w[0];
        let (q1, r1) = w[1];
        if quality <= q1 {
            return r0 + (quality - q0) / (q1 - q0) * (r1 - r0);
        }
    }
    last_r
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_compute() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let summary = Summary::compute(&values).unwrap();

        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 0.001);
        assert!((summary.median - 3.0).abs() < 0.001);
        assert!((summary.min - 1.0).abs() < 0.001);
        assert!((summary.max - 5.0).abs() < 0.001);
        assert!((summary.p95 - 4.8).abs() < 0.001);
    }

    #[test]
    fn test_summary_empty() {
        assert!(Summary::compute(&[]).is_none());
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 0.0) - 1.0).abs() < 0.001);
        assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);
        assert!((percentile(&values, 1.0) - 5.0).abs() < 0.001);
        assert_eq!(percentile(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn test_bd_rate_same_curve() {
        let curve = vec![(500.0, 80.0), (1000.0, 90.0), (2000.0, 95.0)];
        let bd = bd_rate(&curve, &curve).unwrap();
        assert!(bd.abs() < 1e-9);
    }

    #[test]
    fn test_bd_rate_sign() {
        let reference = [(1000.0, 80.0), (2000.0, 90.0)];
        let cheaper = [(900.0, 80.0), (1800.0, 90.0)];
        let bd = bd_rate(&reference, &cheaper).unwrap();
        assert!((bd + 10.0).abs() < 1e-9);
        let back = bd_rate(&cheaper, &reference).unwrap();
        assert!((back - 100.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_bd_rate_partial_overlap() {
        // Test curve covers only 85-95; the rate ratio is 2x wherever both exist.
        let reference = [(1000.0, 80.0), (2000.0, 90.0), (4000.0, 100.0)];
        let test = [(2 * 1414, 85.0), (4000, 90.0), (2 * 2828, 95.0)]
            .map(|(r, q)| (f64::from(r), q));
        let bd = bd_rate(&reference, &test).unwrap();
        // ln ratio is ln(2) at the knots up to rounding of sqrt(2) * 1000.
        assert!((bd - 100.0).abs() < 0.1, "bd = {bd}");
    }

    #[test]
    fn test_bd_rate_no_overlap() {
        let low = [(500.0, 60.0), (1000.0, 70.0)];
        let high = [(2000.0, 80.0), (4000.0, 90.0)];
        assert!(bd_rate(&low, &high).is_none());
    }

    #[test]
    fn test_bd_rate_needs_two_qualities() {
        assert!(bd_rate(&[(1000.0, 80.0)], &[(1000.0, 80.0), (2000.0, 90.0)]).is_none());
        assert!(bd_rate(&[(1000.0, 80.0), (1200.0, 80.0)], &[(1000.0, 80.0), (2000.0, 90.0)]).is_none());
        assert!(bd_rate(&[(0.0, 80.0), (2000.0, 90.0)], &[(1000.0, 80.0), (2000.0, 90.0)]).is_none());
    }
}
