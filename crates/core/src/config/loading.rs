//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{
    Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File, FileFormat,
};
use std::path::Path;
use tracing::info;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// A missing file is not an error; defaults and environment still apply.
    /// Environment variables are prefixed with `RELEVAL_` and use double
    /// underscores for nested values. For example:
    /// - `RELEVAL_METRICS__NDCG_CUTOFF=10`
    /// - `RELEVAL_OUTPUT__FORMAT=json`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // config crate doesn't apply serde defaults for missing sections
        let builder = set_config_default(
            builder,
            "metrics.ndcg_cutoff",
            default_ndcg_cutoff() as i64,
        )?;
        let builder = set_config_default(builder, "metrics.gain", default_gain())?;
        let builder = set_config_default(builder, "metrics.parallel", default_parallel())?;
        let builder = set_config_default(builder, "output.format", default_output_format())?;
        let mut builder = set_config_default(builder, "output.per_query", default_per_query())?;

        if path.exists() {
            info!("Using configuration from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("RELEVAL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.releval/config.toml or custom --config path)
    /// 3. Environment variables (RELEVAL_*)
    ///
    /// An explicitly given config path must exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) if !p.exists() => {
                return Err(Error::config(format!(
                    "Config file not found: {}",
                    p.display()
                )))
            }
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        let config = Self::from_file(&path)?;
        config.validate()?;
        Ok(config)
    }
}
