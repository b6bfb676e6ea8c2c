//! Core library for evaluating ranked retrieval runs
//!
//! This crate provides:
//!
//! - **Judgments**: loading TREC-style relevance judgments (qrels)
//! - **Runs**: loading ranked retrieval output in TREC run format
//! - **Metrics**: Precision@R, MAP, NDCG@k and Spearman rank correlation
//! - **Reports**: text and JSON rendering of computed metrics
//! - **Configuration**: layered settings from file and environment
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod error;
pub mod judgments;
pub mod metrics;
mod records;
pub mod report;
pub mod run;

// Re-export main types for convenience
pub use config::{Config, MetricsConfig, OutputConfig};
pub use error::{Error, Result};
pub use judgments::{Grade, JudgmentSet, QueryJudgments};
pub use metrics::{
    correlate_runs, spearman, GainFunction, Metric, MetricReport, MetricsEngine, MetricsOptions,
    QueryScores, RelevanceCriterion, RunCorrelation,
};
pub use report::{render_correlation, OutputFormat, ReportFormatter};
pub use run::RankedList;

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
