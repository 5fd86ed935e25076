//! Run configuration for the `assemble` workflow.
//!
//! The JSON file is deserialized into loosely typed raw structs and then
//! validated once into [`AppConfig`]. Every validation failure is an
//! [`Error::Config`] naming the offending key path. Relative paths are
//! resolved against the directory holding the config file.
//!
//! ```json
//! {
//!   "input": { "source_path": "clip.mp4" },
//!   "ladder": { "points": [
//!     { "bitrate_kbps": 1500, "width": 1280, "height": 720, "codec": "h264" }
//!   ]},
//!   "encoding": { "preset": "slow", "av1": { "preset": "6" } },
//!   "vmaf": { "evaluation_resolution": "1920x1080" },
//!   "output": { "report_path": "out/report.json", "plots_dir": "out/plots" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sample::Codec;

/// One candidate rendition to encode and measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LadderPoint {
    /// Generated id: `p001`, `p002`, ... in config order.
    pub id: String,
    pub bitrate_kbps: u32,
    pub width: u32,
    pub height: u32,
    pub codec: Codec,
}

/// Encoder settings; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodingSettings {
    pub preset: Option<String>,
    pub profile: Option<String>,
    pub pix_fmt: Option<String>,
    pub keyint: Option<u32>,
}

impl EncodingSettings {
    fn or(&self, fallback: &Self) -> Self {
        Self {
            preset: self.preset.clone().or_else(|| fallback.preset.clone()),
            profile: self.profile.clone().or_else(|| fallback.profile.clone()),
            pix_fmt: self.pix_fmt.clone().or_else(|| fallback.pix_fmt.clone()),
            keyint: self.keyint.or(fallback.keyint),
        }
    }
}

/// Default encoder settings plus per-codec overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncodingConfig {
    pub defaults: EncodingSettings,
    pub per_codec: BTreeMap<Codec, EncodingSettings>,
}

impl EncodingConfig {
    /// Settings for `codec`, with its overrides applied over the defaults.
    #[must_use]
    pub fn resolve(&self, codec: Codec) -> EncodingSettings {
        match self.per_codec.get(&codec) {
            Some(overrides) => overrides.or(&self.defaults),
            None => self.defaults.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmafConfig {
    pub model_path: Option<PathBuf>,
    pub evaluation_resolution: Option<(u32, u32)>,
    pub log_format: String,
    pub extra_filter_options: Vec<String>,
}

impl Default for VmafConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            evaluation_resolution: None,
            log_format: "json".to_string(),
            extra_filter_options: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    pub report_path: PathBuf,
    pub plots_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    pub threads: usize,
    pub work_dir: PathBuf,
    pub keep_temp: bool,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub source_path: PathBuf,
    pub points: Vec<LadderPoint>,
    pub encoding: EncodingConfig,
    pub vmaf: VmafConfig,
    pub output: OutputConfig,
    pub runtime: RuntimeConfig,
}

impl AppConfig {
    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Config(format!(
                "config file does not exist: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::from_json_str(&text, base_dir)
            .map_err(|e| match e {
                Error::Config(msg) => Error::Config(format!("{}: {msg}", path.display())),
                other => other,
            })?;
        log::debug!(
            "Loaded config {} with {} ladder points",
            path.display(),
            config.points.len()
        );
        Ok(config)
    }

    /// Parse and validate a JSON config; relative paths resolve against
    /// `base_dir`.
    pub fn from_json_str(text: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawConfig =
            serde_json::from_str(text).map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;
        raw.validate(base_dir)
    }

    /// Resolution VMAF is computed at: the explicit setting, else the
    /// resolution shared by every ladder point.
    pub fn evaluation_resolution(&self) -> Result<(u32, u32)> {
        if let Some(resolution) = self.vmaf.evaluation_resolution {
            return Ok(resolution);
        }
        let mut resolutions: Vec<(u32, u32)> =
            self.points.iter().map(|p| (p.width, p.height)).collect();
        resolutions.sort_unstable();
        resolutions.dedup();
        match resolutions.as_slice() {
            [single] => Ok(*single),
            _ => Err(Error::Config(
                "vmaf.evaluation_resolution is required when ladder points use multiple resolutions"
                    .to_string(),
            )),
        }
    }
}

/// Parse `"<width>x<height>"`, e.g. `"1920x1080"`.
///
/// ```
/// use bitrate_ladder::config::parse_resolution;
///
/// assert_eq!(parse_resolution("1280X720", "resolution").unwrap(), (1280, 720));
/// assert!(parse_resolution("1280", "resolution").is_err());
/// ```
pub fn parse_resolution(value: &str, field: &str) -> Result<(u32, u32)> {
    let cleaned = value.trim().to_lowercase();
    let Some((w, h)) = cleaned.split_once('x') else {
        return Err(Error::Config(format!(
            "{field} must be in '<width>x<height>' format, got '{value}'"
        )));
    };
    let parse = |s: &str| {
        s.trim().parse::<u32>().map_err(|_| {
            Error::Config(format!("{field} must contain integer width and height, got '{value}'"))
        })
    };
    let (width, height) = (parse(w)?, parse(h)?);
    if width == 0 || height == 0 {
        return Err(Error::Config(format!("{field} width and height must be positive")));
    }
    Ok((width, height))
}

//=============================================================================
// Raw (unvalidated) layout
//=============================================================================

#[derive(Debug, Deserialize)]
struct RawConfig {
    input: Option<RawInput>,
    ladder: Option<RawLadder>,
    #[serde(default)]
    encoding: RawEncoding,
    #[serde(default)]
    vmaf: RawVmaf,
    #[serde(default)]
    output: RawOutput,
    #[serde(default)]
    runtime: RawRuntime,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    source_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawLadder {
    points: Option<Vec<RawPoint>>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    bitrate_kbps: Option<i64>,
    width: Option<i64>,
    height: Option<i64>,
    codec: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEncodingSettings {
    preset: Option<String>,
    profile: Option<String>,
    pix_fmt: Option<String>,
    keyint: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEncoding {
    #[serde(flatten)]
    defaults: RawEncodingSettings,
    h264: Option<RawEncodingSettings>,
    h265: Option<RawEncodingSettings>,
    av1: Option<RawEncodingSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVmaf {
    model_path: Option<String>,
    evaluation_resolution: Option<String>,
    #[serde(alias = "log_fmt")]
    log_format: Option<String>,
    #[serde(alias = "extra_args")]
    extra_filter_options: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    report_path: Option<String>,
    plots_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRuntime {
    threads: Option<i64>,
    work_dir: Option<String>,
    keep_temp: Option<bool>,
}

impl RawConfig {
    fn validate(self, base_dir: &Path) -> Result<AppConfig> {
        let source = self
            .input
            .and_then(|i| i.source_path)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("input.source_path must be a non-empty string".into()))?;
        let source_path = resolve_path(base_dir, &source);
        if !source_path.is_file() {
            return Err(Error::Config(format!(
                "input.source_path does not exist or is not a file: {}",
                source_path.display()
            )));
        }

        let raw_points = self
            .ladder
            .and_then(|l| l.points)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config("ladder.points must be a non-empty list".into()))?;
        let points = raw_points
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.validate(i))
            .collect::<Result<Vec<_>>>()?;

        let vmaf = self.vmaf.validate(base_dir)?;

        let threads = match self.runtime.threads {
            Some(n) => positive(Some(n), "runtime.threads")? as usize,
            None => std::thread::available_parallelism().map_or(1, std::num::NonZero::get),
        };

        Ok(AppConfig {
            source_path,
            points,
            encoding: self.encoding.validate()?,
            vmaf,
            output: OutputConfig {
                report_path: resolve_path(
                    base_dir,
                    self.output.report_path.as_deref().unwrap_or("out/report.json"),
                ),
                plots_dir: self.output.plots_dir.map(|p| resolve_path(base_dir, &p)),
            },
            runtime: RuntimeConfig {
                threads,
                work_dir: resolve_path(
                    base_dir,
                    self.runtime.work_dir.as_deref().unwrap_or("out/work"),
                ),
                keep_temp: self.runtime.keep_temp.unwrap_or(false),
            },
        })
    }
}

impl RawPoint {
    fn validate(self, index: usize) -> Result<LadderPoint> {
        let at = |key: &str| format!("ladder.points[{index}].{key}");
        let codec_raw = self
            .codec
            .ok_or_else(|| Error::Config(format!("{} must be a non-empty string", at("codec"))))?;
        let codec = codec_raw
            .parse::<Codec>()
            .map_err(|e| Error::Config(format!("{}: {e}", at("codec"))))?;

        Ok(LadderPoint {
            id: format!("p{:03}", index + 1),
            bitrate_kbps: positive(self.bitrate_kbps, &at("bitrate_kbps"))?,
            width: positive(self.width, &at("width"))?,
            height: positive(self.height, &at("height"))?,
            codec,
        })
    }
}

impl RawEncodingSettings {
    fn validate(self, path: &str) -> Result<EncodingSettings> {
        let keyint = match self.keyint {
            Some(k) => Some(positive(Some(k), &format!("{path}.keyint"))?),
            None => None,
        };
        Ok(EncodingSettings {
            preset: self.preset,
            profile: self.profile,
            pix_fmt: self.pix_fmt,
            keyint,
        })
    }
}

impl RawEncoding {
    fn validate(self) -> Result<EncodingConfig> {
        let mut per_codec = BTreeMap::new();
        for (codec, raw) in [
            (Codec::H264, self.h264),
            (Codec::H265, self.h265),
            (Codec::Av1, self.av1),
        ] {
            if let Some(raw) = raw {
                per_codec.insert(codec, raw.validate(&format!("encoding.{codec}"))?);
            }
        }
        Ok(EncodingConfig {
            defaults: self.defaults.validate("encoding")?,
            per_codec,
        })
    }
}

impl RawVmaf {
    fn validate(self, base_dir: &Path) -> Result<VmafConfig> {
        let evaluation_resolution = self
            .evaluation_resolution
            .map(|r| parse_resolution(&r, "vmaf.evaluation_resolution"))
            .transpose()?;
        Ok(VmafConfig {
            model_path: self.model_path.map(|p| resolve_path(base_dir, &p)),
            evaluation_resolution,
            log_format: self.log_format.unwrap_or_else(|| "json".to_string()),
            extra_filter_options: self.extra_filter_options.unwrap_or_default(),
        })
    }
}

fn positive(value: Option<i64>, path: &str) -> Result<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::Config(format!("{path} must be a positive integer")))
}

fn resolve_path(base_dir: &Path, value: &str) -> PathBuf {
    let path = Path::new(value);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("clip.mp4"), b"\0").unwrap();
            Self { dir }
        }

        fn parse(&self, value: serde_json::Value) -> Result<AppConfig> {
            AppConfig::from_json_str(&value.to_string(), self.dir.path())
        }
    }

    fn minimal() -> serde_json::Value {
        json!({
            "input": {"source_path": "clip.mp4"},
            "ladder": {"points": [
                {"bitrate_kbps": 1500, "width": 1280, "height": 720, "codec": "h264"},
                {"bitrate_kbps": 4000, "width": 1920, "height": 1080, "codec": "av1"}
            ]}
        })
    }

    #[test]
    fn test_minimal_config_defaults() {
        let fx = Fixture::new();
        let config = fx.parse(minimal()).unwrap();

        assert_eq!(config.source_path, fx.dir.path().join("clip.mp4"));
        assert_eq!(config.points[0].id, "p001");
        assert_eq!(config.points[1].id, "p002");
        assert_eq!(config.points[1].codec, Codec::Av1);
        assert_eq!(config.vmaf.log_format, "json");
        assert_eq!(config.output.report_path, fx.dir.path().join("out/report.json"));
        assert_eq!(config.runtime.work_dir, fx.dir.path().join("out/work"));
        assert!(config.runtime.threads >= 1);
        assert!(!config.runtime.keep_temp);
    }

    #[test]
    fn test_encoding_overrides() {
        let fx = Fixture::new();
        let mut raw = minimal();
        raw["encoding"] = json!({
            "preset": "slow",
            "keyint": 48,
            "av1": {"preset": "6"}
        });
        let config = fx.parse(raw).unwrap();

        let av1 = config.encoding.resolve(Codec::Av1);
        assert_eq!(av1.preset.as_deref(), Some("6"));
        assert_eq!(av1.keyint, Some(48));
        let h264 = config.encoding.resolve(Codec::H264);
        assert_eq!(h264.preset.as_deref(), Some("slow"));
    }

    #[test]
    fn test_vmaf_aliases() {
        let fx = Fixture::new();
        let mut raw = minimal();
        raw["vmaf"] = json!({
            "log_fmt": "xml",
            "extra_args": ["n_threads=4"],
            "evaluation_resolution": "1920x1080"
        });
        let config = fx.parse(raw).unwrap();
        assert_eq!(config.vmaf.log_format, "xml");
        assert_eq!(config.vmaf.extra_filter_options, ["n_threads=4"]);
        assert_eq!(config.evaluation_resolution().unwrap(), (1920, 1080));
    }

    #[test]
    fn test_evaluation_resolution_inference() {
        let fx = Fixture::new();
        let config = fx.parse(minimal()).unwrap();
        assert!(matches!(config.evaluation_resolution(), Err(Error::Config(_))));

        let mut raw = minimal();
        raw["ladder"]["points"][1]["width"] = json!(1280);
        raw["ladder"]["points"][1]["height"] = json!(720);
        let config = fx.parse(raw).unwrap();
        assert_eq!(config.evaluation_resolution().unwrap(), (1280, 720));
    }

    #[test]
    fn test_errors_name_key_path() {
        let fx = Fixture::new();

        let mut raw = minimal();
        raw["ladder"]["points"][1]["codec"] = json!("vp9");
        let err = fx.parse(raw).unwrap_err().to_string();
        assert!(err.contains("ladder.points[1].codec"), "{err}");

        let mut raw = minimal();
        raw["ladder"]["points"][0]["bitrate_kbps"] = json!(0);
        let err = fx.parse(raw).unwrap_err().to_string();
        assert!(err.contains("ladder.points[0].bitrate_kbps"), "{err}");

        let mut raw = minimal();
        raw["encoding"] = json!({"h265": {"keyint": -1}});
        let err = fx.parse(raw).unwrap_err().to_string();
        assert!(err.contains("encoding.h265.keyint"), "{err}");

        let mut raw = minimal();
        raw["ladder"]["points"] = json!([]);
        assert!(fx.parse(raw).is_err());

        let mut raw = minimal();
        raw["input"]["source_path"] = json!("missing.mp4");
        let err = fx.parse(raw).unwrap_err().to_string();
        assert!(err.contains("input.source_path"), "{err}");
    }

    #[test]
    fn test_load_from_file() {
        let fx = Fixture::new();
        let path = fx.dir.path().join("config.json");
        std::fs::write(&path, minimal().to_string()).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.points.len(), 2);

        assert!(AppConfig::load(fx.dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution(" 640x360 ", "r").unwrap(), (640, 360));
        assert!(parse_resolution("0x360", "r").is_err());
        assert!(parse_resolution("axb", "r").is_err());
    }
}
