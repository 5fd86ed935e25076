//! Config validation.

use std::path::Path;

use anyhow::{Context, Result};
use bitrate_ladder::AppConfig;

pub fn run(config: &Path) -> Result<()> {
    let config = AppConfig::load(config)
        .with_context(|| format!("Invalid config {}", config.display()))?;

    println!("{}", serde_json::to_string_pretty(&config)?);
    match config.evaluation_resolution() {
        Ok((w, h)) => println!(
            "Config OK: {} ladder points, VMAF at {w}x{h}",
            config.points.len()
        ),
        Err(e) => {
            log::warn!("{e}");
            println!("Config OK: {} ladder points", config.points.len());
        }
    }
    Ok(())
}
