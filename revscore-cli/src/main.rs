//! revscore - revision feature extraction and scorer model training
//!
//! # Usage
//!
//! ```bash
//! # Resolve the standard features for JSON-lines revision records
//! revscore extract default --input edits.jsonl --header > values.tsv
//!
//! # Include Persian language features
//! revscore extract default revision.fa.badword_count --language fa --input edits.jsonl
//!
//! # Train and test a model, writing it to a file
//! revscore train-test default --values-labels values.tsv --label-type bool --model-file model.bin
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` or pass `--verbose` for more detail.

mod extract;
mod features;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "revscore")]
#[command(version)]
#[command(about = "Extract revision features and train scorer models", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve features for revision records and write values/labels rows
    Extract(extract::ExtractArgs),

    /// Train a model on values/labels and report test statistics
    TrainTest(train_test::TrainTestArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract(args) => extract::run(args),
        Commands::TrainTest(args) => train_test::run(args),
    }
}
