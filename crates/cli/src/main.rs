//! releval CLI - ranked retrieval evaluation
//!
//! This binary provides the command-line interface for evaluating a run file
//! against relevance judgments and for correlating runs with each other.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::Result;
use clap::{Parser, Subcommand};
use releval::{correlate, evaluate, EvaluateArgs};
use releval_core::config::Config;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "releval")]
#[command(about = "Evaluate ranked retrieval runs against relevance judgments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report Precision@R, MAP and NDCG for a run
    Evaluate {
        /// Relevance judgments (qrels) file
        judgments: PathBuf,
        /// Run file to evaluate
        run: PathBuf,
        /// Output format: text or json
        #[arg(long)]
        format: Option<String>,
        /// Append per-query scores
        #[arg(long)]
        per_query: bool,
        /// Rank cutoff for NDCG
        #[arg(long, value_name = "K")]
        ndcg_cutoff: Option<usize>,
        /// Minimum grade counted as relevant for Precision@R and MAP
        #[arg(long, value_name = "GRADE", allow_hyphen_values = true)]
        min_relevance: Option<i32>,
        /// NDCG gain function: linear or exponential
        #[arg(long)]
        gain: Option<String>,
        /// Score queries in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Spearman rank correlation of runs against a baseline run
    Correlate {
        /// Baseline run file
        baseline: PathBuf,
        /// Run files to compare with the baseline
        #[arg(required = true)]
        runs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Evaluate {
            judgments,
            run,
            format,
            per_query,
            ndcg_cutoff,
            min_relevance,
            gain,
            parallel,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let args = EvaluateArgs {
                judgments,
                run,
                format,
                per_query,
                ndcg_cutoff,
                min_relevance,
                gain,
                parallel,
            };
            evaluate(&args, config, io::stdout().lock())
        }
        Commands::Correlate { baseline, runs } => {
            correlate(&baseline, &runs, io::stdout().lock())
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr so stdout carries only the report.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(format!("releval={level},releval_core={level}"))
        .with_writer(io::stderr)
        .init();

    Ok(())
}
