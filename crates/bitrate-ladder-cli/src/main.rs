//! bitrate-ladder CLI - select a streaming ladder from measured renditions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Bitrate ladder selection from rate-quality measurements.
#[derive(Parser)]
#[command(name = "bitrate-ladder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a ladder from a JSON or CSV file of measured samples
    Select {
        /// Input JSON or CSV file with samples
        #[arg(short, long)]
        input: PathBuf,

        /// Output report file (JSON)
        #[arg(short, long, default_value = "out/report.json")]
        output: PathBuf,

        /// Directory for SVG rate-quality plots
        #[arg(long)]
        plots_dir: Option<PathBuf>,

        /// Bitrate difference (kbps) treated as the same position
        #[arg(long, default_value_t = 1.0)]
        bitrate_epsilon: f64,

        /// Quality difference treated as the same position
        #[arg(long, default_value_t = 0.01)]
        quality_epsilon: f64,

        /// Source video recorded in the report
        #[arg(long)]
        source: Option<PathBuf>,
    },

    /// Build samples from a config's ladder points and their VMAF logs
    Assemble {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory holding `<point id>.json` VMAF logs
        #[arg(long)]
        vmaf_dir: PathBuf,

        /// Output report file, overrides `output.report_path`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plot directory, overrides `output.plots_dir`
        #[arg(long)]
        plots_dir: Option<PathBuf>,
    },

    /// Draw plots from an existing report
    Plot {
        /// Report written by `select` or `assemble`
        #[arg(short, long)]
        report: PathBuf,

        /// Output directory for SVG plots
        #[arg(long)]
        plots_dir: PathBuf,
    },

    /// Validate a config and print it fully resolved
    CheckConfig {
        /// Run configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Select {
            input,
            output,
            plots_dir,
            bitrate_epsilon,
            quality_epsilon,
            source,
        } => commands::select::run(commands::select::SelectArgs {
            input,
            output,
            plots_dir,
            bitrate_epsilon,
            quality_epsilon,
            source,
        }),
        Commands::Assemble {
            config,
            vmaf_dir,
            output,
            plots_dir,
        } => commands::assemble::run(&config, &vmaf_dir, output, plots_dir),
        Commands::Plot { report, plots_dir } => commands::plot::run(&report, &plots_dir),
        Commands::CheckConfig { config } => commands::check_config::run(&config),
    }
}
