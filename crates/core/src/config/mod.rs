//! Configuration module for releval
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Every setting has a default, so running without any configuration gives
//! the classic report: Precision@R, MAP and NDCG@20 with linear gain, where
//! any judged document counts as relevant.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::metrics::{GainFunction, MetricsOptions, RelevanceCriterion};
use crate::report::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.releval/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".releval").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Metric computation settings
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Metric computation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Rank cutoff for NDCG
    #[serde(default = "default_ndcg_cutoff")]
    pub ndcg_cutoff: usize,

    /// Minimum grade for a judged document to count as relevant in
    /// Precision@R and MAP. Unset means every judged document is relevant.
    #[serde(default)]
    pub min_relevance: Option<i32>,

    /// NDCG gain function: "linear" (default) or "exponential"
    #[serde(default = "default_gain")]
    pub gain: String,

    /// Score queries in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// "text" (default) or "json"
    #[serde(default = "default_output_format")]
    pub format: String,

    /// Append per-query scores to the report
    #[serde(default = "default_per_query")]
    pub per_query: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            ndcg_cutoff: default_ndcg_cutoff(),
            min_relevance: None,
            gain: default_gain(),
            parallel: default_parallel(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_output_format(),
            per_query: default_per_query(),
        }
    }
}

impl MetricsConfig {
    /// Converts the validated settings into engine options
    pub fn to_options(&self) -> Result<MetricsOptions> {
        let gain: GainFunction = self
            .gain
            .parse()
            .map_err(|e| Error::config(format!("metrics.gain: {e}")))?;
        let relevance = self
            .min_relevance
            .map_or(RelevanceCriterion::Judged, RelevanceCriterion::MinGrade);

        Ok(MetricsOptions {
            relevance,
            ndcg_cutoff: self.ndcg_cutoff,
            gain,
            parallel: self.parallel,
        })
    }
}

impl OutputConfig {
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.format
            .parse()
            .map_err(|e| Error::config(format!("output.format: {e}")))
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.metrics.ndcg_cutoff == 0 {
            return Err(Error::config(
                "metrics.ndcg_cutoff must be greater than 0".to_string(),
            ));
        }

        if !VALID_GAINS.contains(&self.metrics.gain.to_ascii_lowercase().as_str()) {
            return Err(Error::config(format!(
                "Invalid gain function '{}'. Must be one of: {:?}",
                self.metrics.gain, VALID_GAINS
            )));
        }

        if !VALID_OUTPUT_FORMATS.contains(&self.output.format.to_ascii_lowercase().as_str()) {
            return Err(Error::config(format!(
                "Invalid output format '{}'. Must be one of: {:?}",
                self.output.format, VALID_OUTPUT_FORMATS
            )));
        }

        Ok(())
    }
}
