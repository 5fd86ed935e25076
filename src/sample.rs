//! Measured rate-quality samples.
//!
//! A [`Sample`] is one finished measurement handed over by the encode/score
//! step: a rendition's bitrate, resolution and codec plus a pooled quality
//! summary. Samples are built once and never mutated; the ladder core only
//! reads them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Video codec of a measured rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// H.264 / AVC.
    #[serde(alias = "avc", alias = "x264")]
    H264,
    /// H.265 / HEVC.
    #[serde(alias = "hevc", alias = "x265")]
    H265,
    /// AV1.
    Av1,
}

impl Codec {
    /// All supported codecs, in tag order.
    pub const ALL: [Codec; 3] = [Codec::H264, Codec::H265, Codec::Av1];

    /// Lowercase tag used in configs and reports.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::H265 => "h265",
            Self::Av1 => "av1",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h264" | "avc" | "x264" => Ok(Self::H264),
            "h265" | "hevc" | "x265" => Ok(Self::H265),
            "av1" => Ok(Self::Av1),
            other => Err(format!(
                "unknown codec '{}' (expected one of h264, h265, av1)",
                other
            )),
        }
    }
}

/// Pooled quality scores of one rendition (0-100 scale, e.g. VMAF).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    /// Mean over all frames. This is the value the ladder is built on.
    pub mean: f64,
    /// Worst frame.
    pub min: f64,
    /// Best frame.
    pub max: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl QualitySummary {
    /// Summary where every statistic equals `value`.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        Self {
            mean: value,
            min: value,
            max: value,
            p95: value,
        }
    }
}

/// One measured candidate rendition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(alias = "point_id")]
    id: String,
    bitrate_kbps: f64,
    width: u32,
    height: u32,
    codec: Codec,
    #[serde(alias = "vmaf_mean")]
    quality_mean: f64,
    #[serde(alias = "vmaf_min")]
    quality_min: f64,
    #[serde(alias = "vmaf_max")]
    quality_max: f64,
    #[serde(alias = "vmaf_p95")]
    quality_p95: f64,
}

impl Sample {
    /// Create a sample. Values are checked later by [`Sample::validate`].
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        bitrate_kbps: f64,
        width: u32,
        height: u32,
        codec: Codec,
        quality: QualitySummary,
    ) -> Self {
        Self {
            id: id.into(),
            bitrate_kbps,
            width,
            height,
            codec,
            quality_mean: quality.mean,
            quality_min: quality.min,
            quality_max: quality.max,
            quality_p95: quality.p95,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Measured bitrate in kbps.
    #[must_use]
    pub fn bitrate_kbps(&self) -> f64 {
        self.bitrate_kbps
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Mean quality, the y coordinate on the rate-quality plane.
    #[must_use]
    pub fn quality_mean(&self) -> f64 {
        self.quality_mean
    }

    /// Full quality summary.
    #[must_use]
    pub fn quality(&self) -> QualitySummary {
        QualitySummary {
            mean: self.quality_mean,
            min: self.quality_min,
            max: self.quality_max,
            p95: self.quality_p95,
        }
    }

    /// Resolution formatted as `<width>x<height>`.
    #[must_use]
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Check that bitrate and dimensions are positive and every quality
    /// statistic lies in `[0, 100]`.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::invalid(&self.id, "id", "must not be empty"));
        }
        if !self.bitrate_kbps.is_finite() || self.bitrate_kbps <= 0.0 {
            return Err(Error::invalid(
                &self.id,
                "bitrate_kbps",
                format!("must be a positive number, got {}", self.bitrate_kbps),
            ));
        }
        if self.width == 0 {
            return Err(Error::invalid(&self.id, "width", "must be positive, got 0"));
        }
        if self.height == 0 {
            return Err(Error::invalid(&self.id, "height", "must be positive, got 0"));
        }

        let fields = [
            ("quality_mean", self.quality_mean),
            ("quality_min", self.quality_min),
            ("quality_max", self.quality_max),
            ("quality_p95", self.quality_p95),
        ];
        for (field, value) in fields {
            if !(0.0..=100.0).contains(&value) {
                return Err(Error::invalid(
                    &self.id,
                    field,
                    format!("must be within [0, 100], got {}", value),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, bitrate: f64, quality: f64) -> Sample {
        Sample::new(id, bitrate, 1280, 720, Codec::H264, QualitySummary::uniform(quality))
    }

    #[test]
    fn test_codec_parse_aliases() {
        assert_eq!("H264".parse::<Codec>().unwrap(), Codec::H264);
        assert_eq!("hevc".parse::<Codec>().unwrap(), Codec::H265);
        assert_eq!(" av1 ".parse::<Codec>().unwrap(), Codec::Av1);
        assert!("vp9".parse::<Codec>().is_err());
    }

    #[test]
    fn test_valid_sample() {
        assert!(sample("p001", 500.0, 80.0).validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_bitrate() {
        let err = sample("p001", 0.0, 80.0).validate().unwrap_err();
        match err {
            Error::Validation { id, field, .. } => {
                assert_eq!(id, "p001");
                assert_eq!(field, "bitrate_kbps");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_nan_bitrate() {
        assert!(sample("p001", f64::NAN, 80.0).validate().is_err());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let s = Sample::new("p002", 500.0, 0, 720, Codec::H264, QualitySummary::uniform(80.0));
        assert!(matches!(
            s.validate(),
            Err(Error::Validation { field: "width", .. })
        ));

        let s = Sample::new("p002", 500.0, 1280, 0, Codec::H264, QualitySummary::uniform(80.0));
        assert!(matches!(
            s.validate(),
            Err(Error::Validation { field: "height", .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        let quality = QualitySummary {
            mean: 90.0,
            min: -1.0,
            max: 95.0,
            p95: 94.0,
        };
        let s = Sample::new("p003", 500.0, 1280, 720, Codec::Av1, quality);
        assert!(matches!(
            s.validate(),
            Err(Error::Validation { field: "quality_min", .. })
        ));

        let s = sample("p004", 500.0, 100.5);
        assert!(matches!(
            s.validate(),
            Err(Error::Validation { field: "quality_mean", .. })
        ));
    }

    #[test]
    fn test_deserialize_vmaf_aliases() {
        let json = r#"{
            "id": "p001",
            "bitrate_kbps": 500,
            "width": 640,
            "height": 360,
            "codec": "h264",
            "vmaf_mean": 80.0,
            "vmaf_min": 72.0,
            "vmaf_max": 86.0,
            "vmaf_p95": 84.0
        }"#;
        let s: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(s.id(), "p001");
        assert_eq!(s.bitrate_kbps(), 500.0);
        assert_eq!(s.quality().min, 72.0);
        assert_eq!(s.resolution(), "640x360");
    }
}
