//! CLI entry point for the AncientMetagenomeDir map builder.
//!
//! Merges the four sample tables and writes them as a GeoJSON point map.

use amdir_map::jitter::DEFAULT_SIGMA;
use amdir_map::pipeline::{ConvertOptions, Sources, convert};
use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Converts the AncientMetagenomeDir TSV tables to a GeoJSON map
#[derive(Parser)]
#[command(name = "amdir_map")]
#[command(long_about = None)]
struct Cli {
    /// ancientmetagenome-anthropogenic TSV file
    #[arg(long, default_value = "ancientmetagenome-anthropogenic.tsv", value_parser = existing_file)]
    anthropogenic: PathBuf,

    /// ancientmetagenome-environmental TSV file
    #[arg(long, default_value = "ancientmetagenome-environmental.tsv", value_parser = existing_file)]
    environmental: PathBuf,

    /// ancientmetagenome-hostassociated TSV file
    #[arg(long = "meta_host", default_value = "ancientmetagenome-hostassociated.tsv", value_parser = existing_file)]
    meta_host: PathBuf,

    /// ancientsinglegenome-hostassociated TSV file
    #[arg(long = "single_host", default_value = "ancientsinglegenome-hostassociated.tsv", value_parser = existing_file)]
    single_host: PathBuf,

    /// Output geo.json file
    #[arg(long, default_value = "map.geo.json", value_parser = output_file)]
    geojson: PathBuf,

    /// Seed for the coordinate jitter, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print the run summary as JSON on stdout
    #[arg(long, default_value_t = false)]
    summary_json: bool,
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.exists() {
        Ok(path)
    } else {
        Err(format!("path '{value}' does not exist"))
    }
}

fn output_file(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Err(format!("path '{value}' is a directory"))
    } else {
        Ok(path)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    let sources = Sources {
        anthropogenic: cli.anthropogenic,
        environmental: cli.environmental,
        meta_host: cli.meta_host,
        single_host: cli.single_host,
    };
    let options = ConvertOptions {
        sigma: DEFAULT_SIGMA,
        seed: cli.seed,
    };

    let summary = convert(&sources, &cli.geojson, options)?;
    summary.log();

    if cli.summary_json {
        println!("{}", summary.to_json()?);
    }

    Ok(())
}

/// Logging setup: colored stderr, plus a JSON rolling log file when
/// `LOG_FILE_PATH` is set.
fn init_tracing() -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let Ok(log_file_path) = std::env::var("LOG_FILE_PATH") else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("amdir_map.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

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

    Ok(Some(guard))
}
