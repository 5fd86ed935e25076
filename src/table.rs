//! Validated, ordered rate-quality table.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::sample::Sample;

/// One row of an [`RdTable`].
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// The measured sample.
    pub sample: Sample,
    /// Position of the sample in the caller's input.
    pub input_index: usize,
}

impl TableEntry {
    /// Bitrate, the x coordinate.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.sample.bitrate_kbps()
    }

    /// Mean quality, the y coordinate.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.sample.quality_mean()
    }
}

/// Samples sorted by ascending bitrate, then descending mean quality, then
/// input order.
///
/// Entries with identical `(bitrate, quality)` are kept side by side; the
/// tie-breaker decides between them.
#[derive(Debug, Clone)]
pub struct RdTable {
    entries: Vec<TableEntry>,
}

impl RdTable {
    /// Validate and sort a set of samples.
    ///
    /// # Example
    ///
    /// ```
    /// use bitrate_ladder::{Codec, QualitySummary, RdTable, Sample};
    ///
    /// let samples = vec![
    ///     Sample::new("hi", 2000.0, 1920, 1080, Codec::H264, QualitySummary::uniform(92.0)),
    ///     Sample::new("lo", 500.0, 640, 360, Codec::H264, QualitySummary::uniform(71.0)),
    /// ];
    /// let table = RdTable::build(&samples).unwrap();
    /// assert_eq!(table.entries()[0].sample.id(), "lo");
    /// ```
    pub fn build(samples: &[Sample]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut seen = HashSet::with_capacity(samples.len());
        for sample in samples {
            sample.validate()?;
            if !seen.insert(sample.id()) {
                return Err(Error::invalid(sample.id(), "id", "is not unique"));
            }
        }

        let mut entries: Vec<TableEntry> = samples
            .iter()
            .enumerate()
            .map(|(input_index, sample)| TableEntry {
                sample: sample.clone(),
                input_index,
            })
            .collect();

        // Validation rules out NaN, so partial_cmp never yields None here.
        entries.sort_by(|a, b| {
            a.x()
                .partial_cmp(&b.x())
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.y().partial_cmp(&a.y()).unwrap_or(Ordering::Equal))
                .then_with(|| a.input_index.cmp(&b.input_index))
        });

        Ok(Self { entries })
    }

    /// Rows in table order.
    #[must_use]
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Row at table position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &TableEntry {
        &self.entries[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
