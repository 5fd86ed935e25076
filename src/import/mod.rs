//! Loading measured samples from JSON or CSV.
//!
//! ## Supported Formats
//!
//! - A JSON array of sample objects (`id`, `bitrate_kbps`, `width`,
//!   `height`, `codec`, `quality_mean`, `quality_min`, `quality_max`,
//!   `quality_p95`; `point_id` and `vmaf_*` are accepted as aliases).
//! - CSV with a header row. Columns are matched case-insensitively against
//!   common names; an explicit [`CsvSchema`] overrides the guesses.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bitrate_ladder::import::{CsvImporter, CsvSchema};
//!
//! let schema = CsvSchema::builder()
//!     .id_column("rendition")
//!     .quality_column("vmaf_harmonic")
//!     .build();
//!
//! let samples = CsvImporter::new(schema).import("measurements.csv")?;
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::sample::{Codec, QualitySummary, Sample};

/// Load samples from `path`, trying JSON first and then CSV.
pub fn load_samples(path: impl AsRef<Path>) -> Result<Vec<Sample>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    match serde_json::from_str::<Vec<Sample>>(&content) {
        Ok(samples) => {
            log::debug!("Read {} samples from JSON {}", samples.len(), path.display());
            Ok(samples)
        }
        Err(json_err) => {
            log::debug!("{} is not a JSON sample list ({json_err}), trying CSV", path.display());
            let samples = CsvImporter::auto_detect().import_reader(content.as_bytes())?;
            log::debug!("Read {} samples from CSV {}", samples.len(), path.display());
            Ok(samples)
        }
    }
}

/// Column names for CSV import. Unset columns are auto-detected.
#[derive(Debug, Clone, Default)]
pub struct CsvSchema {
    pub id_column: Option<String>,
    pub bitrate_column: Option<String>,
    pub width_column: Option<String>,
    pub height_column: Option<String>,
    pub codec_column: Option<String>,
    /// Mean quality, the value the ladder is built on.
    pub quality_column: Option<String>,
    pub quality_min_column: Option<String>,
    pub quality_max_column: Option<String>,
    pub quality_p95_column: Option<String>,
}

impl CsvSchema {
    /// Create a schema builder.
    #[must_use]
    pub fn builder() -> CsvSchemaBuilder {
        CsvSchemaBuilder::default()
    }

    /// Create a schema that auto-detects columns from common names.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::default()
    }

    /// Try to find a column index by name (case-insensitive, with aliases).
    fn find_column(
        &self,
        headers: &[&str],
        primary: Option<&str>,
        aliases: &[&str],
    ) -> Option<usize> {
        primary
            .into_iter()
            .chain(aliases.iter().copied())
            .find_map(|name| find_header_index(headers, name))
    }
}

/// Builder for CSV schema.
#[derive(Debug, Default)]
pub struct CsvSchemaBuilder {
    schema: CsvSchema,
}

impl CsvSchemaBuilder {
    #[must_use]
    pub fn id_column(mut self, name: impl Into<String>) -> Self {
        self.schema.id_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn bitrate_column(mut self, name: impl Into<String>) -> Self {
        self.schema.bitrate_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn width_column(mut self, name: impl Into<String>) -> Self {
        self.schema.width_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn height_column(mut self, name: impl Into<String>) -> Self {
        self.schema.height_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn codec_column(mut self, name: impl Into<String>) -> Self {
        self.schema.codec_column = Some(name.into());
        self
    }

    /// Set the mean quality column name.
    #[must_use]
    pub fn quality_column(mut self, name: impl Into<String>) -> Self {
        self.schema.quality_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn quality_min_column(mut self, name: impl Into<String>) -> Self {
        self.schema.quality_min_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn quality_max_column(mut self, name: impl Into<String>) -> Self {
        self.schema.quality_max_column = Some(name.into());
        self
    }

    #[must_use]
    pub fn quality_p95_column(mut self, name: impl Into<String>) -> Self {
        self.schema.quality_p95_column = Some(name.into());
        self
    }

    /// Build the schema.
    #[must_use]
    pub fn build(self) -> CsvSchema {
        self.schema
    }
}

/// Column indices resolved against one header row.
struct Columns {
    id: usize,
    bitrate: usize,
    width: usize,
    height: usize,
    codec: usize,
    mean: usize,
    min: Option<usize>,
    max: Option<usize>,
    p95: Option<usize>,
}

/// CSV importer for measured samples.
pub struct CsvImporter {
    schema: CsvSchema,
}

impl CsvImporter {
    /// Create a new importer with the given schema.
    #[must_use]
    pub fn new(schema: CsvSchema) -> Self {
        Self { schema }
    }

    /// Create an importer that auto-detects columns.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::new(CsvSchema::auto_detect())
    }

    /// Import samples from a CSV file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<Vec<Sample>> {
        let file = std::fs::File::open(path)?;
        self.import_reader(file)
    }

    /// Import samples from any CSV source.
    pub fn import_reader(&self, source: impl std::io::Read) -> Result<Vec<Sample>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let columns = self.columns(&header_refs)?;

        let mut samples = Vec::new();
        for (line_num, record) in reader.records().enumerate() {
            let line = line_num + 2; // 1-based, after the header
            let record = record.map_err(|e| Error::CsvImport {
                line,
                reason: e.to_string(),
            })?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            samples.push(parse_row(&record, &columns, &headers, line)?);
        }

        Ok(samples)
    }

    fn columns(&self, headers: &[&str]) -> Result<Columns> {
        let s = &self.schema;
        let required = |primary: Option<&str>, aliases: &[&str], what: &str| {
            s.find_column(headers, primary, aliases)
                .ok_or_else(|| Error::CsvImport {
                    line: 1,
                    reason: format!("could not find {what} column"),
                })
        };

        Ok(Columns {
            id: required(s.id_column.as_deref(), &["id", "point_id", "name"], "id")?,
            bitrate: required(
                s.bitrate_column.as_deref(),
                &["bitrate_kbps", "bitrate", "kbps"],
                "bitrate",
            )?,
            width: required(s.width_column.as_deref(), &["width", "w"], "width")?,
            height: required(s.height_column.as_deref(), &["height", "h"], "height")?,
            codec: required(s.codec_column.as_deref(), &["codec", "encoder"], "codec")?,
            mean: required(
                s.quality_column.as_deref(),
                &["quality_mean", "vmaf_mean", "vmaf", "quality"],
                "quality mean",
            )?,
            min: s.find_column(
                headers,
                s.quality_min_column.as_deref(),
                &["quality_min", "vmaf_min"],
            ),
            max: s.find_column(
                headers,
                s.quality_max_column.as_deref(),
                &["quality_max", "vmaf_max"],
            ),
            p95: s.find_column(
                headers,
                s.quality_p95_column.as_deref(),
                &["quality_p95", "vmaf_p95"],
            ),
        })
    }
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    headers: &[String],
    line: usize,
) -> Result<Sample> {
    let cell = |idx: usize| record.get(idx).unwrap_or("");
    let number = |idx: usize| -> Result<f64> {
        cell(idx).parse::<f64>().map_err(|_| Error::CsvImport {
            line,
            reason: format!("column '{}': '{}' is not a number", headers[idx], cell(idx)),
        })
    };
    let dimension = |idx: usize| -> Result<u32> {
        cell(idx).parse::<u32>().map_err(|_| Error::CsvImport {
            line,
            reason: format!(
                "column '{}': '{}' is not a non-negative integer",
                headers[idx],
                cell(idx)
            ),
        })
    };
    let optional = |idx: Option<usize>, fallback: f64| -> Result<f64> {
        match idx {
            Some(i) if !cell(i).is_empty() => number(i),
            _ => Ok(fallback),
        }
    };

    let codec: Codec = cell(columns.codec)
        .parse()
        .map_err(|reason| Error::CsvImport { line, reason })?;
    let mean = number(columns.mean)?;
    let quality = QualitySummary {
        mean,
        min: optional(columns.min, mean)?,
        max: optional(columns.max, mean)?,
        p95: optional(columns.p95, mean)?,
    };

    Ok(Sample::new(
        cell(columns.id),
        number(columns.bitrate)?,
        dimension(columns.width)?,
        dimension(columns.height)?,
        codec,
        quality,
    ))
}

/// Find a header index by name (case-insensitive).
fn find_header_index(headers: &[&str], name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}
