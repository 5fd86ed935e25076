//! Ladder selection from a sample file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bitrate_ladder::{LadderOptions, SourceInfo, load_samples, select_ladder};

pub struct SelectArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plots_dir: Option<PathBuf>,
    pub bitrate_epsilon: f64,
    pub quality_epsilon: f64,
    pub source: Option<PathBuf>,
}

pub fn run(args: SelectArgs) -> Result<()> {
    log::info!("Loading samples from: {}", args.input.display());
    let samples = load_samples(&args.input)
        .with_context(|| format!("Failed to load samples from {}", args.input.display()))?;
    log::info!("Loaded {} samples", samples.len());

    let options = LadderOptions::default()
        .with_bitrate_epsilon(args.bitrate_epsilon)
        .with_quality_epsilon(args.quality_epsilon);
    let ladder = select_ladder(&samples, &options).context("Ladder selection failed")?;

    let mut source = SourceInfo {
        path: args.source,
        ..SourceInfo::default()
    };
    source
        .metadata
        .insert("input".to_string(), args.input.display().to_string());

    super::finish(ladder, source, &args.output, args.plots_dir.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.csv");
        std::fs::write(
            &input,
            "id,bitrate_kbps,width,height,codec,vmaf\n\
             a,1000,640,360,h264,70\n\
             b,2000,1280,720,h264,80\n\
             c,3000,1280,720,h264,88\n\
             d,4000,1920,1080,h264,89\n\
             e,5000,1920,1080,h264,95\n",
        )
        .unwrap();
        let output = dir.path().join("out").join("report.json");

        run(SelectArgs {
            input,
            output: output.clone(),
            plots_dir: Some(dir.path().join("plots")),
            bitrate_epsilon: 1.0,
            quality_epsilon: 0.01,
            source: None,
        })
        .unwrap();

        let report = bitrate_ladder::read_report(&output).unwrap();
        assert_eq!(report.selected_ladder, ["a", "b", "c", "e"]);
        assert!(dir.path().join("plots/rd_curve_h264_all_resolutions.svg").is_file());
    }

    #[test]
    fn test_select_rejects_bad_epsilon() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("samples.json");
        std::fs::write(&input, "[]").unwrap();
        let result = run(SelectArgs {
            input,
            output: dir.path().join("report.json"),
            plots_dir: None,
            bitrate_epsilon: -1.0,
            quality_epsilon: 0.01,
            source: None,
        });
        assert!(result.is_err());
    }
}
