//! Rate-quality plots for a ladder report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::ladder::AnnotatedSample;
use crate::report::LadderReport;
use crate::sample::Codec;
use crate::stats::chart::{ChartConfig, ChartPoint, ChartSeries, LineStyle, colors, generate_svg};

type ByResolution<'a> = BTreeMap<(u32, u32), Vec<&'a AnnotatedSample>>;

/// Write one SVG per codec (every resolution overlaid) plus an overlay of
/// all codecs with the selected ladder drawn on top. Returns the written
/// paths, per-codec files first.
pub fn generate_plots(report: &LadderReport, plots_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let plots_dir = plots_dir.as_ref();
    if report.points.is_empty() {
        return Err(Error::Plot("report does not contain any points to plot".into()));
    }
    std::fs::create_dir_all(plots_dir)?;

    let mut grouped: BTreeMap<Codec, ByResolution<'_>> = BTreeMap::new();
    for point in &report.points {
        grouped
            .entry(point.sample.codec())
            .or_default()
            .entry((point.sample.width(), point.sample.height()))
            .or_default()
            .push(point);
    }
    for by_resolution in grouped.values_mut() {
        for points in by_resolution.values_mut() {
            points.sort_by(|a, b| a.sample.bitrate_kbps().total_cmp(&b.sample.bitrate_kbps()));
        }
    }

    let mut outputs = Vec::with_capacity(grouped.len() + 1);

    for (codec, by_resolution) in &grouped {
        let series: Vec<ChartSeries> = by_resolution
            .iter()
            .enumerate()
            .map(|(i, ((w, h), points))| {
                ChartSeries::new(
                    format!("{w}x{h}"),
                    colors::CYCLE[i % colors::CYCLE.len()],
                )
                .with_points(chart_points(points))
            })
            .collect();
        let config = axes(ChartConfig::new(format!(
            "RD Curve Comparison ({})",
            codec.as_str().to_uppercase()
        )))
        .with_legend_title("Resolution");

        let path = plots_dir.join(format!("rd_curve_{codec}_all_resolutions.svg"));
        write_chart(&path, &series, &config)?;
        outputs.push(path);
    }

    let mut overlay: Vec<ChartSeries> = Vec::new();
    for (codec, by_resolution) in &grouped {
        for (i, ((w, h), points)) in by_resolution.iter().enumerate() {
            overlay.push(
                ChartSeries::new(
                    format!("{} {w}x{h}", codec.as_str().to_uppercase()),
                    codec_color(*codec),
                )
                .with_style(LineStyle::CYCLE[i % LineStyle::CYCLE.len()])
                .with_points(chart_points(points)),
            );
        }
    }
    if report.hull.points.len() >= 2 {
        let hull = report
            .hull
            .points
            .iter()
            .map(|v| ChartPoint::new(v.bitrate_kbps, v.quality_mean).with_label(v.id.clone()))
            .collect();
        overlay.push(
            ChartSeries::new("Selected ladder", colors::GRAY)
                .with_style(LineStyle::Dotted)
                .with_points(hull),
        );
    }
    let config = axes(ChartConfig::new("RD Curve Comparison (All Codecs, All Resolutions)"))
        .with_dimensions(1000, 600);
    let path = plots_dir.join("rd_curve_all_codecs_all_resolutions.svg");
    write_chart(&path, &overlay, &config)?;
    outputs.push(path);

    log::info!("Wrote {} plots to {}", outputs.len(), plots_dir.display());
    Ok(outputs)
}

fn axes(config: ChartConfig) -> ChartConfig {
    config.with_x_label("Bitrate (kbps)").with_y_label("VMAF")
}

fn chart_points(points: &[&AnnotatedSample]) -> Vec<ChartPoint> {
    points
        .iter()
        .map(|p| {
            ChartPoint::new(p.sample.bitrate_kbps(), p.sample.quality_mean())
                .with_label(p.sample.id())
                .highlighted(p.is_selected)
        })
        .collect()
}

fn codec_color(codec: Codec) -> &'static str {
    match codec {
        Codec::H264 => colors::BLUE,
        Codec::H265 => colors::GREEN,
        Codec::Av1 => colors::RED,
    }
}

fn write_chart(path: &Path, series: &[ChartSeries], config: &ChartConfig) -> Result<()> {
    let svg = generate_svg(series, config);
    if svg.is_empty() {
        return Err(Error::Plot(format!("nothing to draw for {}", path.display())));
    }
    std::fs::write(path, svg)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ladder::{LadderOptions, select_ladder};
    use crate::report::SourceInfo;
    use crate::sample::{QualitySummary, Sample};

    fn report(samples: &[Sample]) -> LadderReport {
        let ladder = select_ladder(samples, &LadderOptions::default()).unwrap();
        LadderReport::new(ladder, SourceInfo::default())
    }

    #[test]
    fn test_generate_plots_files() {
        let samples = vec![
            Sample::new("a", 800.0, 640, 360, Codec::H264, QualitySummary::uniform(70.0)),
            Sample::new("b", 2000.0, 1280, 720, Codec::H264, QualitySummary::uniform(85.0)),
            Sample::new("c", 1500.0, 1280, 720, Codec::Av1, QualitySummary::uniform(86.0)),
        ];
        let dir = tempfile::tempdir().unwrap();
        let paths = generate_plots(&report(&samples), dir.path()).unwrap();

        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "rd_curve_h264_all_resolutions.svg",
                "rd_curve_av1_all_resolutions.svg",
                "rd_curve_all_codecs_all_resolutions.svg",
            ]
        );

        let overlay = std::fs::read_to_string(&paths[2]).unwrap();
        assert!(overlay.starts_with("<svg"));
        assert!(overlay.contains("Selected ladder"));
        assert!(overlay.contains("AV1 1280x720"));
    }

    #[test]
    fn test_empty_report_is_an_error() {
        let mut empty = report(&[Sample::new(
            "only",
            500.0,
            640,
            360,
            Codec::H265,
            QualitySummary::uniform(60.0),
        )]);
        empty.points.clear();
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(generate_plots(&empty, dir.path()), Err(Error::Plot(_))));
    }
}
