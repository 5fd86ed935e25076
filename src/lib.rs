//! # bitrate-ladder
//!
//! Bitrate ladder selection from measured rate-quality samples.
//!
//! Given renditions encoded at several bitrates, resolutions and codecs and
//! scored for quality (typically VMAF), this library picks the renditions
//! worth streaming: the upper convex hull of the rate-quality Pareto front,
//! with near-identical candidates settled by a local BD-Rate comparison.
//!
//! ## Quick Start
//!
//! ```
//! use bitrate_ladder::{Codec, LadderOptions, QualitySummary, Sample, select_ladder};
//!
//! let samples = vec![
//!     Sample::new("360p", 800.0, 640, 360, Codec::H264, QualitySummary::uniform(68.0)),
//!     Sample::new("720p", 2500.0, 1280, 720, Codec::H264, QualitySummary::uniform(86.0)),
//!     Sample::new("720p-hi", 3500.0, 1280, 720, Codec::H264, QualitySummary::uniform(86.5)),
//!     Sample::new("1080p", 5000.0, 1920, 1080, Codec::H264, QualitySummary::uniform(94.0)),
//! ];
//!
//! let ladder = select_ladder(&samples, &LadderOptions::default())?;
//! assert_eq!(ladder.selected_ids(), ["360p", "720p", "1080p"]);
//! # Ok::<(), bitrate_ladder::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`ladder`]: Pareto filter, upper hull, tie-break and assembly
//! - [`table`]: Validated, ordered rate-quality table
//! - [`sample`]: Measured samples
//! - [`stats`]: Summary statistics, BD-Rate and SVG charts
//! - [`metrics`]: VMAF log pooling
//! - [`import`]: Sample import from JSON or CSV
//! - [`config`]: Run configuration
//! - [`report`]: JSON ladder report
//! - [`plot`]: Rate-quality plots of a report

pub mod config;
pub mod error;
pub mod import;
pub mod ladder;
pub mod metrics;
#[cfg(feature = "chart")]
pub mod plot;
pub mod report;
pub mod sample;
pub mod stats;
pub mod table;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use import::{CsvImporter, CsvSchema, load_samples};
pub use ladder::{Ladder, LadderOptions, UnresolvedTie, select_ladder};
pub use metrics::{VmafMetrics, parse_vmaf_log};
pub use report::{LadderReport, SourceInfo, read_report, write_report};
pub use sample::{Codec, QualitySummary, Sample};
pub use stats::{Summary, bd_rate};
pub use table::{RdTable, TableEntry};
