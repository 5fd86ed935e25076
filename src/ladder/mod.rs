//! Bitrate ladder selection.
//!
//! The pipeline runs in fixed stages over an [`RdTable`]:
//!
//! 1. [`ParetoFront::compute`] drops samples that some cheaper sample
//!    matches or beats on quality.
//! 2. [`upper_hull`] keeps the Pareto points on the upper convex hull, so
//!    each rung buys less quality per kbps than the one before.
//! 3. [`TieBreaker`] settles near-identical or collinear candidates with a
//!    local BD-Rate comparison.
//! 4. [`Ladder::assemble`] builds the result and checks its invariants.
//!
//! [`select_ladder`] runs all of them.

mod assemble;
mod hull;
mod pareto;
mod tie_break;

pub use assemble::{AnnotatedSample, HullSegment, HullVertex, Ladder, check_monotonic};
pub use hull::{cross, is_collinear, slope, upper_hull};
pub use pareto::ParetoFront;
pub use tie_break::{Decision, Duel, Resolution, TieBreaker, UnresolvedTie};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::table::RdTable;

/// A table sample projected to (bitrate, quality) space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullPoint {
    /// Index of the sample in the [`RdTable`].
    pub index: usize,
    /// Bitrate in kbps.
    pub x: f64,
    /// Mean quality.
    pub y: f64,
}

impl HullPoint {
    #[must_use]
    pub fn new(index: usize, x: f64, y: f64) -> Self {
        Self { index, x, y }
    }
}

/// Project every table entry, in table order.
#[must_use]
pub fn table_points(table: &RdTable) -> Vec<HullPoint> {
    table
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| HullPoint::new(i, entry.x(), entry.y()))
        .collect()
}

/// Tolerances for treating two samples as occupying the same position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderOptions {
    /// Bitrate difference (kbps) within which samples are near-identical.
    pub bitrate_epsilon_kbps: f64,
    /// Quality difference within which samples are near-identical.
    pub quality_epsilon: f64,
}

impl Default for LadderOptions {
    fn default() -> Self {
        Self {
            bitrate_epsilon_kbps: 1.0,
            quality_epsilon: 0.01,
        }
    }
}

impl LadderOptions {
    /// Set the bitrate epsilon.
    #[must_use]
    pub fn with_bitrate_epsilon(mut self, kbps: f64) -> Self {
        self.bitrate_epsilon_kbps = kbps;
        self
    }

    /// Set the quality epsilon.
    #[must_use]
    pub fn with_quality_epsilon(mut self, epsilon: f64) -> Self {
        self.quality_epsilon = epsilon;
        self
    }

    /// Both epsilons must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("bitrate_epsilon_kbps", self.bitrate_epsilon_kbps),
            ("quality_epsilon", self.quality_epsilon),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Select the bitrate ladder for a complete set of measured samples.
///
/// # Errors
///
/// - [`Error::Config`] for invalid options.
/// - [`Error::EmptyInput`] when `samples` is empty.
/// - [`Error::Validation`] for a malformed or duplicate sample.
/// - [`Error::InvariantViolation`] if the assembled ladder is not monotone.
///
/// # Example
///
/// ```
/// use bitrate_ladder::{Codec, LadderOptions, QualitySummary, Sample, select_ladder};
///
/// let samples: Vec<Sample> = [(1000.0, 70.0), (2000.0, 80.0), (3000.0, 88.0), (4000.0, 89.0), (5000.0, 95.0)]
///     .iter()
///     .enumerate()
///     .map(|(i, &(kbps, vmaf))| {
///         Sample::new(format!("p{i}"), kbps, 1920, 1080, Codec::H264, QualitySummary::uniform(vmaf))
///     })
///     .collect();
///
/// let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
/// assert_eq!(ladder.selected_ids(), ["p0", "p1", "p2", "p4"]);
/// ```
pub fn select_ladder(samples: &[Sample], options: &LadderOptions) -> Result<Ladder> {
    options.validate()?;
    let table = RdTable::build(samples)?;

    let points = table_points(&table);
    let front = ParetoFront::compute(&points);
    let hull = upper_hull(&front.points);
    let resolution = TieBreaker::new(&table, options).resolve(&front, &hull);

    Ladder::assemble(&table, &resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{Codec, QualitySummary};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample(id: &str, kbps: f64, quality: f64) -> Sample {
        Sample::new(id, kbps, 1920, 1080, Codec::H264, QualitySummary::uniform(quality))
    }

    fn annotated<'l>(ladder: &'l Ladder, id: &str) -> &'l AnnotatedSample {
        ladder
            .samples
            .iter()
            .find(|s| s.sample.id() == id)
            .unwrap()
    }

    #[test]
    fn test_reference_ladder() {
        let samples = vec![
            sample("a", 1000.0, 70.0),
            sample("b", 2000.0, 80.0),
            sample("c", 3000.0, 88.0),
            sample("d", 4000.0, 89.0),
            sample("e", 5000.0, 95.0),
        ];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();

        assert_eq!(ladder.selected_ids(), ["a", "b", "c", "e"]);
        assert_eq!(ladder.segments.len(), 3);
        assert!((ladder.segments[0].slope - 0.01).abs() < 1e-12);
        assert!(!annotated(&ladder, "d").is_selected);
        assert!(annotated(&ladder, "d").tie_break_against.is_none());
        assert!(ladder.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let err = select_ladder(&[], &LadderOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput));
    }

    #[test]
    fn test_single_sample() {
        let ladder =
            select_ladder(&[sample("only", 800.0, 60.0)], &LadderOptions::default()).unwrap();
        assert_eq!(ladder.selected_ids(), ["only"]);
        assert!(ladder.segments.is_empty());
        assert!(annotated(&ladder, "only").is_selected);
    }

    #[test]
    fn test_same_bitrate_keeps_higher_quality() {
        let samples = vec![sample("q85", 4000.0, 85.0), sample("q90", 4000.0, 90.0)];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
        assert_eq!(ladder.selected_ids(), ["q90"]);
        assert!(!annotated(&ladder, "q85").is_selected);
    }

    #[test]
    fn test_duplicate_position_annotated() {
        let samples = vec![
            sample("a", 500.0, 75.0),
            sample("c", 1000.0, 85.0),
            sample("b", 1000.0, 85.0),
            sample("d", 1500.0, 90.0),
        ];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
        assert_eq!(ladder.selected_ids(), ["a", "c", "d"]);
        assert_eq!(annotated(&ladder, "b").tie_break_against.as_deref(), Some("c"));
    }

    #[test]
    fn test_samples_keep_input_order() {
        let samples = vec![
            sample("hi", 3000.0, 90.0),
            sample("lo", 1000.0, 70.0),
            sample("mid", 2000.0, 82.0),
        ];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
        let order: Vec<&str> = ladder.samples.iter().map(|s| s.sample.id()).collect();
        assert_eq!(order, ["hi", "lo", "mid"]);
        assert_eq!(ladder.selected_ids(), ["lo", "mid", "hi"]);
    }

    #[test]
    fn test_invalid_options() {
        let options = LadderOptions::default().with_quality_epsilon(-0.5);
        let err = select_ladder(&[sample("a", 1.0, 1.0)], &options).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let options = LadderOptions::default().with_bitrate_epsilon(f64::NAN);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validation_error_propagates() {
        let err = select_ladder(&[sample("bad", -5.0, 50.0)], &LadderOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "bitrate_kbps", .. }));
    }

    #[test]
    fn test_random_ladders_are_monotone() {
        let mut rng = StdRng::seed_from_u64(7);
        for round in 0..200 {
            let n = rng.random_range(1..25);
            let samples: Vec<Sample> = (0..n)
                .map(|i| {
                    // Coarse grid so exact ties show up.
                    let kbps = f64::from(rng.random_range(1..20u32)) * 250.0;
                    let quality = f64::from(rng.random_range(0..=50u32)) * 2.0;
                    sample(&format!("s{round}_{i}"), kbps, quality)
                })
                .collect();

            let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
            assert!(!ladder.selected_ids().is_empty());
            check_monotonic(&ladder.hull).unwrap();

            let selected = ladder.samples.iter().filter(|s| s.is_selected).count();
            assert_eq!(selected, ladder.selected_ids().len());
            for s in &ladder.samples {
                if let Some(winner) = &s.tie_break_against {
                    assert!(!s.is_selected);
                    assert!(ladder.selected_ids().contains(winner));
                }
            }

            assert_eq!(positions(&reversed_ladder(&samples)), positions(&ladder));
        }
    }

    fn positions(ladder: &Ladder) -> Vec<(f64, f64)> {
        ladder
            .hull
            .iter()
            .map(|v| (v.bitrate_kbps, v.quality_mean))
            .collect()
    }

    fn reversed_ladder(samples: &[Sample]) -> Ladder {
        let mut reversed = samples.to_vec();
        reversed.reverse();
        select_ladder(&reversed, &LadderOptions::default()).unwrap()
    }

    #[test]
    fn test_flat_near_tie_not_selected() {
        let samples = vec![
            sample("a", 1000.0, 75.0),
            sample("b", 3001.0, 94.005),
            sample("top", 4001.5, 94.01),
            sample("flat", 4001.0, 94.005),
        ];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
        assert_eq!(ladder.selected_ids(), ["a", "b", "top"]);
        assert_eq!(annotated(&ladder, "flat").tie_break_against.as_deref(), Some("top"));
        assert!(ladder.diagnostics.is_empty());
    }

    #[test]
    fn test_random_near_ties_keep_ladder_efficient() {
        let mut rng = StdRng::seed_from_u64(11);
        for round in 0..2000 {
            let n = rng.random_range(1..30);
            let samples: Vec<Sample> = (0..n)
                .map(|i| {
                    // Clusters a few steps wide, with steps under both epsilons.
                    let kbps = f64::from(rng.random_range(1..6u32)) * 1000.0
                        + f64::from(rng.random_range(0..5u32)) * 0.5;
                    let quality = f64::from(rng.random_range(0..4u32)) * 5.0
                        + 75.0
                        + f64::from(rng.random_range(0..5u32)) * 0.005;
                    sample(&format!("s{round}_{i}"), kbps, quality)
                })
                .collect();

            let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
            check_monotonic(&ladder.hull).unwrap();

            for v in &ladder.hull {
                let dominated = samples.iter().any(|s| {
                    let (x, y) = (s.bitrate_kbps(), s.quality_mean());
                    x <= v.bitrate_kbps
                        && y >= v.quality_mean
                        && (x < v.bitrate_kbps || y > v.quality_mean)
                });
                assert!(!dominated, "round {round}: rung {} is dominated", v.id);
            }

            let selected = ladder.selected_ids();
            for s in &ladder.samples {
                if let Some(winner) = &s.tie_break_against {
                    assert!(!s.is_selected);
                    assert!(selected.contains(winner), "round {round}: {winner} not selected");
                }
            }

            assert_eq!(positions(&reversed_ladder(&samples)), positions(&ladder));
        }
    }
}
