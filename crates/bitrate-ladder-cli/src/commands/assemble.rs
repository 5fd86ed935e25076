//! Ladder selection from config points and their VMAF logs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitrate_ladder::config::LadderPoint;
use bitrate_ladder::{AppConfig, LadderOptions, Sample, SourceInfo, parse_vmaf_log, select_ladder};

pub fn run(
    config: &Path,
    vmaf_dir: &Path,
    output: Option<PathBuf>,
    plots_dir: Option<PathBuf>,
) -> Result<()> {
    let config = AppConfig::load(config)
        .with_context(|| format!("Invalid config {}", config.display()))?;

    let samples = config
        .points
        .iter()
        .map(|point| sample_for(point, vmaf_dir))
        .collect::<Result<Vec<_>>>()?;
    log::info!("Pooled VMAF for {} ladder points", samples.len());

    let ladder = select_ladder(&samples, &LadderOptions::default())
        .context("Ladder selection failed")?;

    let output = output.unwrap_or_else(|| config.output.report_path.clone());
    let plots_dir = plots_dir.or_else(|| config.output.plots_dir.clone());
    super::finish(ladder, source_info(&config), &output, plots_dir.as_deref())
}

/// Sample for one ladder point, scored from `<vmaf_dir>/<id>.json`.
fn sample_for(point: &LadderPoint, vmaf_dir: &Path) -> Result<Sample> {
    let log_path = vmaf_dir.join(format!("{}.json", point.id));
    let metrics = parse_vmaf_log(&log_path)
        .with_context(|| format!("No usable VMAF log for ladder point {}", point.id))?;
    Ok(Sample::new(
        point.id.clone(),
        f64::from(point.bitrate_kbps),
        point.width,
        point.height,
        point.codec,
        metrics.summary(),
    ))
}

fn source_info(config: &AppConfig) -> SourceInfo {
    let mut info = SourceInfo {
        path: Some(config.source_path.clone()),
        ..SourceInfo::default()
    };
    let meta = &mut info.metadata;
    meta.insert("vmaf.log_format".into(), config.vmaf.log_format.clone());
    if let Some(model) = &config.vmaf.model_path {
        meta.insert("vmaf.model_path".into(), model.display().to_string());
    }
    if let Ok((w, h)) = config.evaluation_resolution() {
        meta.insert("vmaf.evaluation_resolution".into(), format!("{w}x{h}"));
    }
    for point in &config.points {
        let settings = config.encoding.resolve(point.codec);
        if let Some(preset) = settings.preset {
            meta.insert(format!("encoding.{}.preset", point.codec), preset);
        }
    }
    info
}
