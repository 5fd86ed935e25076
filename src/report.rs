//! Ladder report serialized to JSON.
//!
//! The report is the hand-off format between `select`/`assemble` and the
//! `plot` command: every sample with its selection outcome, the selected
//! ladder, the hull geometry and any unresolved ties.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ladder::{AnnotatedSample, HullSegment, HullVertex, Ladder, UnresolvedTie};

/// Where the samples came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source video or measurement file.
    pub path: Option<PathBuf>,
    /// Free-form key/value metadata (encoder settings, VMAF model, ...).
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Hull geometry of the selected ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HullReport {
    pub points: Vec<HullVertex>,
    pub segments: Vec<HullSegment>,
}

/// Full result of one ladder selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderReport {
    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub generated_at: chrono::DateTime<chrono::Utc>,

    pub source: SourceInfo,

    /// Every sample in input order, annotated.
    pub points: Vec<AnnotatedSample>,

    /// Selected sample ids in ascending bitrate.
    pub selected_ladder: Vec<String>,

    pub hull: HullReport,

    #[serde(default)]
    pub diagnostics: Vec<UnresolvedTie>,
}

impl LadderReport {
    /// Create a report from a selected ladder, timestamped now.
    #[must_use]
    pub fn new(ladder: Ladder, source: SourceInfo) -> Self {
        Self {
            generated_at: chrono::Utc::now(),
            source,
            selected_ladder: ladder.selected_ids().to_vec(),
            points: ladder.samples,
            hull: HullReport {
                points: ladder.hull,
                segments: ladder.segments,
            },
            diagnostics: ladder.diagnostics,
        }
    }

    /// Samples that made it onto the ladder, in input order.
    pub fn selected_points(&self) -> impl Iterator<Item = &AnnotatedSample> {
        self.points.iter().filter(|p| p.is_selected)
    }
}

/// Write a report as pretty JSON, creating parent directories.
pub fn write_report(report: &LadderReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    log::info!(
        "Wrote report with {} rungs to {}",
        report.selected_ladder.len(),
        path.display()
    );
    Ok(())
}

/// Load a report written by [`write_report`].
pub fn read_report(path: impl AsRef<Path>) -> Result<LadderReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let report: LadderReport = serde_json::from_str(&content)?;
    log::debug!("Loaded report {} ({} points)", path.display(), report.points.len());
    Ok(report)
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::{LadderOptions, select_ladder};
    use crate::sample::{Codec, QualitySummary, Sample};

    fn report() -> LadderReport {
        let samples = vec![
            Sample::new("a", 1000.0, 1280, 720, Codec::H265, QualitySummary::uniform(70.0)),
            Sample::new("b", 2000.0, 1920, 1080, Codec::H265, QualitySummary::uniform(82.0)),
            Sample::new("c", 2500.0, 1920, 1080, Codec::H265, QualitySummary::uniform(81.0)),
        ];
        let ladder = select_ladder(&samples, &LadderOptions::default()).unwrap();
        let mut source = SourceInfo {
            path: Some(PathBuf::from("clip.mp4")),
            ..SourceInfo::default()
        };
        source.metadata.insert("model".into(), "vmaf_v0.6.1".into());
        LadderReport::new(ladder, source)
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["selected_ladder"], serde_json::json!(["a", "b"]));
        assert_eq!(json["hull"]["segments"][0]["from_id"], "a");
        assert_eq!(json["points"][2]["id"], "c");
        assert_eq!(json["points"][2]["is_selected"], false);
        assert_eq!(json["source"]["metadata"]["model"], "vmaf_v0.6.1");
        assert!(json["generated_at"].as_str().unwrap().contains('T'));
    }

    #[test]
    fn test_write_and_read_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        let original = report();
        write_report(&original, &path).unwrap();
        let loaded = read_report(&path).unwrap();

        assert_eq!(loaded.selected_ladder, original.selected_ladder);
        assert_eq!(loaded.generated_at, original.generated_at);
        assert_eq!(loaded.selected_points().count(), 2);
        assert_eq!(loaded.points[0].sample, original.points[0].sample);
    }

    #[test]
    fn test_read_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_report(dir.path().join("absent.json")).is_err());
    }
}
