//! Ladder output: selected rungs, hull geometry and annotated samples.

use serde::{Deserialize, Serialize};

use super::{HullPoint, Resolution, UnresolvedTie, slope};
use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::table::RdTable;

/// One selected rung on the hull.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullVertex {
    pub id: String,
    pub bitrate_kbps: f64,
    pub quality_mean: f64,
}

/// Straight hull edge between two consecutive rungs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullSegment {
    pub from_id: String,
    pub to_id: String,
    /// Quality gained per kbps.
    pub slope: f64,
}

/// Input sample plus its selection outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedSample {
    #[serde(flatten)]
    pub sample: Sample,
    pub is_selected: bool,
    /// Id of the rung that beat this sample in a tie-break.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break_against: Option<String>,
}

/// A selected bitrate ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ladder {
    /// Rungs in ascending bitrate.
    pub hull: Vec<HullVertex>,
    pub segments: Vec<HullSegment>,
    /// Every input sample, in input order.
    pub samples: Vec<AnnotatedSample>,
    #[serde(default)]
    pub diagnostics: Vec<UnresolvedTie>,
    selected: Vec<String>,
}

impl Ladder {
    /// Build the ladder from resolved rungs and verify it is monotone.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`] when bitrate is not strictly increasing
    /// or quality decreases between rungs.
    pub fn assemble(table: &RdTable, resolution: &Resolution) -> Result<Self> {
        let id_of = |index: usize| table.get(index).sample.id().to_string();

        let hull: Vec<HullVertex> = resolution
            .rungs
            .iter()
            .map(|p| HullVertex {
                id: id_of(p.index),
                bitrate_kbps: p.x,
                quality_mean: p.y,
            })
            .collect();
        check_monotonic(&hull)?;

        let segments = resolution
            .rungs
            .windows(2)
            .map(|w| HullSegment {
                from_id: id_of(w[0].index),
                to_id: id_of(w[1].index),
                slope: slope(&w[0], &w[1]),
            })
            .collect();

        let selected_rows: Vec<usize> = resolution.rungs.iter().map(|p: &HullPoint| p.index).collect();
        let mut samples: Vec<(usize, AnnotatedSample)> = table
            .entries()
            .iter()
            .enumerate()
            .map(|(row, entry)| {
                let annotated = AnnotatedSample {
                    sample: entry.sample.clone(),
                    is_selected: selected_rows.contains(&row),
                    tie_break_against: resolution
                        .tie_break_against
                        .get(row)
                        .copied()
                        .flatten()
                        .map(id_of),
                };
                (entry.input_index, annotated)
            })
            .collect();
        samples.sort_by_key(|(input_index, _)| *input_index);

        Ok(Self {
            selected: hull.iter().map(|v| v.id.clone()).collect(),
            hull,
            segments,
            samples: samples.into_iter().map(|(_, s)| s).collect(),
            diagnostics: resolution.diagnostics.clone(),
        })
    }

    /// Selected sample ids in ascending bitrate.
    #[must_use]
    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }
}

/// Check that rungs are strictly increasing in bitrate and non-decreasing
/// in quality.
pub fn check_monotonic(hull: &[HullVertex]) -> Result<()> {
    for w in hull.windows(2) {
        let (lo, hi) = (&w[0], &w[1]);
        if hi.bitrate_kbps <= lo.bitrate_kbps {
            return Err(Error::InvariantViolation(format!(
                "bitrate not increasing: '{}' at {} kbps follows '{}' at {} kbps",
                hi.id, hi.bitrate_kbps, lo.id, lo.bitrate_kbps
            )));
        }
        if hi.quality_mean < lo.quality_mean {
            return Err(Error::InvariantViolation(format!(
                "quality decreasing: '{}' at {} follows '{}' at {}",
                hi.id, hi.quality_mean, lo.id, lo.quality_mean
            )));
        }
    }
    Ok(())
}
