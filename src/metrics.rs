//! VMAF log pooling.
//!
//! libvmaf JSON logs carry per-frame scores under `frames[].metrics.vmaf`
//! and, in newer versions, a `pooled_metrics.vmaf` block. Frame scores are
//! preferred; the pooled block is only used when no frame carries a score.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::sample::QualitySummary;
use crate::stats::Summary;

/// Pooled VMAF scores of one encode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VmafMetrics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    /// Frames that carried a score; 0 when read from pooled values.
    pub frame_count: usize,
}

impl VmafMetrics {
    /// The quality summary a [`Sample`](crate::Sample) is built from.
    #[must_use]
    pub fn summary(&self) -> QualitySummary {
        QualitySummary {
            mean: self.mean,
            min: self.min,
            max: self.max,
            p95: self.p95,
        }
    }
}

/// Read and pool a libvmaf JSON log.
pub fn parse_vmaf_log(path: impl AsRef<Path>) -> Result<VmafMetrics> {
    let path = path.as_ref();
    let fail = |reason: String| Error::VmafLog {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| fail(format!("could not read: {e}")))?;
    let payload: Value =
        serde_json::from_str(&content).map_err(|e| fail(format!("invalid JSON: {e}")))?;
    let metrics = parse_vmaf_payload(&payload).map_err(|e| match e {
        Error::VmafLog { reason, .. } => fail(reason),
        other => other,
    })?;

    log::debug!(
        "Pooled {} ({} frames): mean {:.3}",
        path.display(),
        metrics.frame_count,
        metrics.mean
    );
    Ok(metrics)
}

/// Pool an already parsed libvmaf JSON payload.
///
/// # Example
///
/// ```
/// use bitrate_ladder::metrics::parse_vmaf_payload;
///
/// let payload = serde_json::json!({
///     "frames": [
///         {"metrics": {"vmaf": 90.0}},
///         {"metrics": {"vmaf": 94.0}},
///     ]
/// });
/// let metrics = parse_vmaf_payload(&payload).unwrap();
/// assert_eq!(metrics.frame_count, 2);
/// assert!((metrics.mean - 92.0).abs() < 1e-9);
/// ```
pub fn parse_vmaf_payload(payload: &Value) -> Result<VmafMetrics> {
    let fail = |reason: &str| Error::VmafLog {
        path: Default::default(),
        reason: reason.to_string(),
    };

    let Some(root) = payload.as_object() else {
        return Err(fail("payload must be a JSON object"));
    };

    let frame_scores: Vec<f64> = root
        .get("frames")
        .and_then(Value::as_array)
        .map(|frames| {
            frames
                .iter()
                .filter_map(|frame| frame.get("metrics")?.get("vmaf")?.as_f64())
                .collect()
        })
        .unwrap_or_default();

    if let Some(summary) = Summary::compute(&frame_scores) {
        return Ok(VmafMetrics {
            mean: summary.mean,
            min: summary.min,
            max: summary.max,
            p95: summary.p95,
            frame_count: summary.count,
        });
    }

    let pooled = root.get("pooled_metrics").and_then(|p| p.get("vmaf"));
    let field = |name: &str| pooled.and_then(|p| p.get(name)).and_then(Value::as_f64);
    match (field("mean"), field("min"), field("max")) {
        (Some(mean), Some(min), Some(max)) => Ok(VmafMetrics {
            mean,
            min,
            max,
            p95: field("p95").unwrap_or(mean),
            frame_count: 0,
        }),
        _ => Err(fail("no frame-level or pooled VMAF values found")),
    }
}
