//! windbarbs command-line entry point.
//!
//! Plots the U/V wind messages of one GRIB file as a grid of wind barb
//! maps and writes `t_0__<date>_<time>.png`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use windbarbs::{run, Config, LayoutPolicy, Overrides, SpeedUnit};

#[derive(Parser, Debug)]
#[command(name = "windbarbs")]
#[command(about = "Plot GRIB wind fields as multi-panel wind barb maps")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "WINDBARBS_CONFIG")]
    config: Option<PathBuf>,

    /// GRIB file to plot
    #[arg(short, long, env = "WINDBARBS_INPUT")]
    input: Option<PathBuf>,

    /// Directory the PNG is written to
    #[arg(short, long, env = "WINDBARBS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Plot every N-th time step
    #[arg(long)]
    stride: Option<usize>,

    /// Panels per row
    #[arg(long)]
    columns: Option<usize>,

    /// Output resolution
    #[arg(long)]
    dpi: Option<u32>,

    /// Barb speed unit
    #[arg(long, value_enum)]
    units: Option<SpeedUnit>,

    /// Handling of a partly filled last row
    #[arg(long, value_enum)]
    layout: Option<LayoutPolicy>,

    /// GeoJSON land polygons replacing the bundled outline
    #[arg(long, env = "WINDBARBS_COASTLINES")]
    coastlines: Option<PathBuf>,

    /// TrueType font for titles and labels
    #[arg(long, env = "WINDBARBS_FONT")]
    font: Option<PathBuf>,

    /// Skip the per-message diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            input: self.input.clone(),
            output_dir: self.output_dir.clone(),
            stride: self.stride,
            columns: self.columns,
            dpi: self.dpi,
            units: self.units,
            layout: self.layout,
            coastlines: self.coastlines.clone(),
            font: self.font.clone(),
            quiet: self.quiet,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!("Starting windbarbs");

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply(args.overrides());

    let summary = run(&config)
        .with_context(|| format!("Failed to plot {}", config.input.display()))?;

    info!(
        output = %summary.output.display(),
        panels = summary.panels,
        reference = %summary.reference,
        "Done"
    );
    Ok(())
}
