//! CLI entry point for the ecofusion tool.
//!
//! Provides subcommands for the full stress analysis, regional NDVI
//! summaries, driver ranking, and a source availability check.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ecofusion::analyzers::aggregate::aggregate_regions;
use ecofusion::analyzers::analyzer::analyze;
use ecofusion::analyzers::importance::rank_drivers;
use ecofusion::config::FusionConfig;
use ecofusion::error::FusionError;
use ecofusion::loader::{Dataset, DirSource, load_dataset};
use ecofusion::output::{
    log_drivers, log_regions, log_summary, print_json, print_pretty, write_json, write_records_csv,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ecofusion")]
#[command(about = "Fuses vegetation, acoustic and occurrence data into an ecosystem stress index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full stress analysis over a data directory
    Analyze {
        /// Directory holding the input CSV tables
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<String>,

        /// Region to include in the regional NDVI aggregate (repeatable)
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Write the report as JSON to this file
        #[arg(short, long)]
        output: Option<String>,

        /// Write the scored periods as CSV to this file
        #[arg(long)]
        records_csv: Option<String>,

        /// Also log the full report as pretty JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summarize NDVI per region from the point-sampling table
    Regions {
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        #[arg(short, long)]
        config: Option<String>,

        /// Regions to summarize (repeatable); defaults to the configured set
        #[arg(short, long = "region")]
        regions: Vec<String>,
    },
    /// Rank the precomputed driver importances
    Drivers {
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        #[arg(short, long)]
        config: Option<String>,
    },
    /// Report which input tables are available, degraded or missing
    Validate {
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ecofusion.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ecofusion.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            data_dir,
            config,
            regions,
            output,
            records_csv,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if !regions.is_empty() {
                config.regions = regions;
            }
            let dataset = load(&data_dir, &config)?;

            let report = analyze(&dataset, &config)
                .with_context(|| format!("analyzing {data_dir}"))?;

            print_pretty(&report);
            log_summary(&report);
            if json {
                print_json(&report)?;
            }

            if let Some(path) = output {
                write_json(&path, &report)?;
            }
            if let Some(path) = records_csv {
                write_records_csv(&path, &report.stress.records)?;
            }
        }
        Commands::Regions {
            data_dir,
            config,
            regions,
        } => {
            let config = load_config(config.as_deref())?;
            let selection = if regions.is_empty() {
                config.regions.clone()
            } else {
                regions
            };
            let dataset = load(&data_dir, &config)?;
            let samples = dataset
                .region_samples
                .as_ref()
                .ok_or_else(|| FusionError::MissingSource(config.tables.ndvi_points.clone()))?;

            let aggregate = aggregate_regions(samples, &selection, config.region_order)?;
            log_regions(&aggregate);
        }
        Commands::Drivers { data_dir, config } => {
            let config = load_config(config.as_deref())?;
            let dataset = load(&data_dir, &config)?;
            let importance = dataset.importance.as_deref().ok_or_else(|| {
                FusionError::MissingSource(config.tables.feature_importance.clone())
            })?;

            let ranking = rank_drivers(importance)?;
            log_drivers(&ranking);
        }
        Commands::Validate { data_dir, config } => {
            let config = load_config(config.as_deref())?;
            let dataset = load(&data_dir, &config)?;

            for status in &dataset.sources {
                match status.rows {
                    Some(rows) => info!(table = %status.table, rows, "Available"),
                    None => warn!(table = %status.table, "Missing"),
                }
            }
            for note in &dataset.notes {
                warn!(note = ?note, "Degraded input");
            }
            if let Err(e) = config.weights.validate() {
                warn!(error = %e, "Configured weights are invalid");
            }
            info!(
                available = dataset.sources.iter().filter(|s| s.rows.is_some()).count(),
                total = dataset.sources.len(),
                "Validation complete"
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<FusionConfig> {
    match path {
        Some(p) => FusionConfig::load(p),
        None => Ok(FusionConfig::default()),
    }
}

#[tracing::instrument(skip(config))]
fn load(data_dir: &str, config: &FusionConfig) -> Result<Dataset> {
    let source = DirSource::new(data_dir);
    load_dataset(&source, &config.tables).with_context(|| format!("loading tables from {data_dir}"))
}
