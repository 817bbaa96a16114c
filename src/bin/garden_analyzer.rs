//! garden-analyzer - score gardens from device logs and print a report
//!
//! Usage:
//!   garden-analyzer --config garden.json --input uart.log [--format json]

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use garden_compliance::ingest::{load_readings_csv, ParsedLog};
use garden_compliance::{AnalysisOptions, Analyzer, GardenConfig, JsonFormatter, RunSummary, TextFormatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "garden-analyzer")]
#[command(version)]
#[command(about = "Garden sensor compliance analysis and recommendations", long_about = None)]
struct Cli {
    /// Garden configuration JSON (vegetables, gardens, sensors, mapping)
    #[arg(short, long)]
    config: PathBuf,

    /// Device log file; may be repeated
    #[arg(short, long = "input")]
    inputs: Vec<PathBuf>,

    /// Pre-tabulated readings CSV (timestamp,sensor_id,value)
    #[arg(long)]
    readings_csv: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Flag sensors silent for this many minutes before the end of the series
    #[arg(long, default_value = "60")]
    maintenance_window_minutes: u32,

    /// Only analyse the most recent N hours of readings
    #[arg(long)]
    window_hours: Option<u32>,

    /// Score gardens on a single thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "garden_compliance=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if cli.inputs.is_empty() && cli.readings_csv.is_none() {
        anyhow::bail!("No readings given: pass --input <log> and/or --readings-csv <csv>");
    }

    let config = GardenConfig::load(&cli.config)?;
    let (catalog, mapping) = config.build_tables()?;

    let mut parsed = ParsedLog::default();
    for input in &cli.inputs {
        parsed.extend(ParsedLog::parse_file(input)?);
    }
    let mut readings = parsed.readings;
    let ingest = (!cli.inputs.is_empty()).then_some(parsed.stats);
    if let Some(csv) = &cli.readings_csv {
        readings.extend(load_readings_csv(csv)?.readings);
    }

    let options = AnalysisOptions {
        maintenance_window: Duration::minutes(i64::from(cli.maintenance_window_minutes)),
        window: cli.window_hours.map(|h| Duration::hours(i64::from(h))),
        parallel: !cli.sequential,
    };
    let run = Analyzer::new(&catalog, &mapping, options).run_with_events(readings, parsed.events, ingest);

    let summary = RunSummary::new(&run).with_garden_names(
        config
            .gardens
            .iter()
            .map(|(id, info)| (id.clone(), info.name.clone())),
    );
    let rendered = match cli.format {
        OutputFormat::Text => TextFormatter::format(&summary),
        OutputFormat::Json => JsonFormatter::format(&summary).context("Failed to serialize report")?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("Failed to write report: {:?}", path))?;
            tracing::info!(path = ?path, "report written");
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
