//! Default values and functions for configuration

use crate::metrics::DEFAULT_NDCG_CUTOFF;

// Default constants
pub(crate) const DEFAULT_GAIN: &str = "linear";
pub(crate) const DEFAULT_OUTPUT_FORMAT: &str = "text";
pub(crate) const VALID_GAINS: [&str; 2] = ["linear", "exponential"];
pub(crate) const VALID_OUTPUT_FORMATS: [&str; 2] = ["text", "json"];

pub(crate) fn default_ndcg_cutoff() -> usize {
    DEFAULT_NDCG_CUTOFF
}

pub(crate) fn default_gain() -> String {
    DEFAULT_GAIN.to_string()
}

pub(crate) fn default_parallel() -> bool {
    false
}

pub(crate) fn default_output_format() -> String {
    DEFAULT_OUTPUT_FORMAT.to_string()
}

pub(crate) fn default_per_query() -> bool {
    false
}
