//! Plots from an existing report.

use std::path::Path;

use anyhow::{Context, Result};
use bitrate_ladder::{plot::generate_plots, read_report};

pub fn run(report: &Path, plots_dir: &Path) -> Result<()> {
    let report = read_report(report)
        .with_context(|| format!("Failed to read report {}", report.display()))?;
    let paths = generate_plots(&report, plots_dir)?;

    println!("Wrote {} plots to {}", paths.len(), plots_dir.display());
    for path in paths {
        println!("  {}", path.display());
    }
    Ok(())
}
