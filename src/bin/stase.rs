//! STASE - structural metrics for labeled datasets
//!
//! Command-line interface for computing STASE metrics from a CSV of labels.

use clap::{Parser, Subcommand, ValueEnum};
use stase::config::StaseConfig;
use stase::data::LabelMatrix;
use stase::error::Result;
use stase::pipeline::StaseEngine;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for the metric vector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// JSON object keyed by metric name
    Json,
    /// YAML mapping keyed by metric name
    Yaml,
    /// Two-column metric/value table
    Tsv,
}

/// Structural metrics for labeled datasets
#[derive(Parser)]
#[command(name = "stase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the STASE metrics of a label table
    Metrics {
        /// Input file in CSV format (first column: entity IDs, header: labeler IDs)
        infile: PathBuf,

        /// Output file for the metrics
        outfile: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Worker threads (0 = all cores); overrides the configuration
        #[arg(short, long)]
        threads: Option<usize>,

        /// CSV field delimiter; overrides the configuration
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Also write per-labeler statistics to this TSV file
        #[arg(long)]
        columns: Option<PathBuf>,

        /// Also write per-entity statistics to this TSV file
        #[arg(long)]
        rows: Option<PathBuf>,

        /// Also write label occurrence counts to this TSV file
        #[arg(long)]
        labels: Option<PathBuf>,
    },

    /// Describe the shape of a label table
    Profile {
        /// Input file in CSV format
        infile: PathBuf,

        /// Output format: text, json, or yaml
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Path to a YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    ExampleConfig {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "stase.yaml")]
        output: PathBuf,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("STASE_LOG").unwrap_or_else(|_| EnvFilter::new("stase=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Metrics {
            infile,
            outfile,
            format,
            config,
            threads,
            delimiter,
            columns,
            rows,
            labels,
        } => {
            let outputs = DetailOutputs {
                columns,
                rows,
                labels,
            };
            load_config(config.as_deref(), threads, delimiter)
                .and_then(|config| cmd_metrics(&infile, &outfile, format, config, &outputs))
        }

        Commands::Profile {
            infile,
            format,
            config,
        } => load_config(config.as_deref(), None, None)
            .and_then(|config| cmd_profile(&infile, &format, &config)),

        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Optional destinations for the intermediate tables
struct DetailOutputs {
    columns: Option<PathBuf>,
    rows: Option<PathBuf>,
    labels: Option<PathBuf>,
}

fn load_config(
    path: Option<&Path>,
    threads: Option<usize>,
    delimiter: Option<char>,
) -> Result<StaseConfig> {
    let mut config = match path {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            StaseConfig::from_file(path)?
        }
        None => StaseConfig::default(),
    };
    if let Some(threads) = threads {
        config = config.with_threads(threads);
    }
    if let Some(delimiter) = delimiter {
        config = config.with_delimiter(delimiter);
    }
    config.validate()?;
    Ok(config)
}

/// Compute and write the metrics
fn cmd_metrics(
    infile: &Path,
    outfile: &Path,
    format: OutputFormat,
    config: StaseConfig,
    outputs: &DetailOutputs,
) -> Result<()> {
    let report = StaseEngine::new(config).run_csv(infile)?;

    info!(path = %outfile.display(), "Using as output file");
    match format {
        OutputFormat::Json => std::fs::write(outfile, report.metrics.to_json()?)?,
        OutputFormat::Yaml => std::fs::write(outfile, report.metrics.to_yaml()?)?,
        OutputFormat::Tsv => report.metrics.to_tsv(outfile)?,
    }

    if let Some(path) = &outputs.columns {
        report.columns.to_tsv(path)?;
        info!(path = %path.display(), "Wrote labeler statistics");
    }
    if let Some(path) = &outputs.rows {
        report.rows.to_tsv(path)?;
        info!(path = %path.display(), "Wrote entity statistics");
    }
    if let Some(path) = &outputs.labels {
        report.clusters.to_tsv(path)?;
        info!(path = %path.display(), "Wrote label clusters");
    }

    print!("{}", report.metrics);
    info!("Done.");
    Ok(())
}

/// Describe a label table without computing metrics
fn cmd_profile(infile: &Path, format: &str, config: &StaseConfig) -> Result<()> {
    let labels = LabelMatrix::from_csv(infile, config)?;
    let cells = labels.n_rows() * labels.n_columns();
    let density = if cells > 0 {
        labels.nnz() as f64 / cells as f64
    } else {
        0.0
    };
    let used_labels = stase::profile::cluster_labels(&labels)?.n_labels();

    let profile = serde_json::json!({
        "entities": labels.n_rows(),
        "labelers": labels.n_columns(),
        "present_cells": labels.nnz(),
        "density": density,
        "distinct_labels": used_labels,
    });

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&profile)?),
        "yaml" => println!("{}", serde_yaml::to_string(&profile)?),
        _ => {
            println!("Label Table Profile");
            println!("===================");
            println!("  Entities:        {}", labels.n_rows());
            println!("  Labelers:        {}", labels.n_columns());
            println!("  Present cells:   {}", labels.nnz());
            println!("  Density:         {:.1}%", density * 100.0);
            println!("  Distinct labels: {}", used_labels);
        }
    }

    Ok(())
}

/// Write a default configuration
fn cmd_example_config(output_path: &Path) -> Result<()> {
    let yaml = StaseConfig::default().to_yaml()?;
    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    println!("{}", yaml);
    Ok(())
}
