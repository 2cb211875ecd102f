use std::path::PathBuf;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;

use isoview::data::loader::load_series;
use isoview::merge::write_table;
use isoview::{PipelineConfig, detect};

/// Score a time series under raw, delta and rolling-window views.
#[derive(Debug, Parser)]
#[command(name = "isoview", version)]
struct Args {
    /// Input series (.csv, .json or .parquet) with `timestamp` and `value` columns.
    input: PathBuf,

    /// Rolling window sizes, e.g. `--windows 2,3`.
    #[arg(short, long, value_delimiter = ',')]
    windows: Vec<usize>,

    /// JSON pipeline configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the result table here (.csv or .parquet).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write per-view anomaly overlays here as JSON.
    #[arg(long)]
    overlays: Option<PathBuf>,

    /// Keep time of day in the emitted timestamps.
    #[arg(long)]
    keep_time: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    config.keep_time_of_day |= args.keep_time;

    let series = load_series(&args.input)?;
    let report = detect(&series, &args.windows, &config)
        .with_context(|| format!("detecting anomalies in {}", args.input.display()))?;

    match &args.output {
        Some(path) => write_table(path, &report.table)?,
        None => {
            let batch = report.table.to_record_batch()?;
            println!("{}", pretty_format_batches(&[batch])?);
        }
    }

    if let Some(path) = &args.overlays {
        let json = serde_json::to_string_pretty(&report.overlays)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    for overlay in &report.overlays {
        log::info!("{}: {} anomalous points", overlay.title, overlay.points.len());
    }
    Ok(())
}
