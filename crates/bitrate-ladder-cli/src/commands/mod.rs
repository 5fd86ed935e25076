//! CLI subcommands.

pub mod assemble;
pub mod check_config;
pub mod plot;
pub mod select;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitrate_ladder::{Ladder, LadderReport, SourceInfo, plot::generate_plots, write_report};

/// Most ids shown in the success line.
const PREVIEW_IDS: usize = 8;

/// Write the report (and plots), log unresolved ties and print a summary.
pub(crate) fn finish(
    ladder: Ladder,
    source: SourceInfo,
    output: &Path,
    plots_dir: Option<&Path>,
) -> Result<()> {
    for tie in &ladder.diagnostics {
        log::warn!("{tie}");
    }

    let report = LadderReport::new(ladder, source);
    write_report(&report, output)
        .with_context(|| format!("Failed to write report {}", output.display()))?;

    let plots: Vec<PathBuf> = match plots_dir {
        Some(dir) => generate_plots(&report, dir)
            .with_context(|| format!("Failed to write plots to {}", dir.display()))?,
        None => Vec::new(),
    };

    println!(
        "{} -> {}",
        summary_line(&report.selected_ladder),
        output.display()
    );
    for path in plots {
        println!("  plot: {}", path.display());
    }
    Ok(())
}

/// `Selected N rungs: a, b, ...` with at most [`PREVIEW_IDS`] ids.
pub(crate) fn summary_line(ids: &[String]) -> String {
    let shown: Vec<&str> = ids.iter().take(PREVIEW_IDS).map(String::as_str).collect();
    let more = if ids.len() > PREVIEW_IDS { ", ..." } else { "" };
    let noun = if ids.len() == 1 { "rung" } else { "rungs" };
    format!("Selected {} {noun}: {}{more}", ids.len(), shown.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_line_preview() {
        let ids: Vec<String> = (1..=10).map(|i| format!("p{i:03}")).collect();
        let line = summary_line(&ids);
        assert!(line.starts_with("Selected 10 rungs: p001, p002"));
        assert!(line.contains("p008, ..."));
        assert!(!line.contains("p009"));

        assert_eq!(summary_line(&ids[..1]), "Selected 1 rung: p001");
    }
}
