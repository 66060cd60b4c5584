use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use statedyn_pipeline::io::{
    read_csv_records, read_payload_json, write_report_csv, write_report_json,
};
use statedyn_pipeline::{process_records, FeatureFactory, PipelineConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "statedyn")]
#[command(about = "Fit fixed-A linear state dynamics to time-stamped measurements")]
struct Cli {
    /// JSON payload (`{"data": [...]}`) or CSV file with a header row.
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum)]
    format: Option<InputFormat>,

    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the fixed autoregressive coefficient.
    #[arg(long, allow_negative_numbers = true)]
    a: Option<f64>,

    #[arg(long)]
    state_column: Option<String>,

    /// Write the JSON report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    csv_output: Option<PathBuf>,
}

fn resolve_format(path: &Path, explicit: Option<InputFormat>) -> Result<InputFormat> {
    if let Some(format) = explicit {
        return Ok(format);
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Ok(InputFormat::Json),
        Some("csv") => Ok(InputFormat::Csv),
        _ => bail!(
            "cannot infer input format from {}; pass --format json|csv",
            path.display()
        ),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(a) = cli.a {
        cfg.a_fixed = a;
    }
    if let Some(state_column) = cli.state_column.clone() {
        cfg.state_column = state_column;
    }

    let records = match resolve_format(&cli.input, cli.format)? {
        InputFormat::Json => read_payload_json(&cli.input).map(|p| p.data),
        InputFormat::Csv => read_csv_records(&cli.input),
    }
    .with_context(|| format!("failed to read {}", cli.input.display()))?;
    tracing::info!(records = records.len(), input = %cli.input.display(), "loaded measurements");

    let factory = FeatureFactory::with_builtins();
    let report = process_records(&records, &cfg, &factory).context("fit failed")?;

    match &cli.output {
        Some(path) => write_report_json(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &cli.csv_output {
        write_report_csv(path, &report)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}
