//! Library interface for the releval CLI
//!
//! The subcommand implementations live here so integration tests can drive
//! them with in-memory writers, while argument parsing stays in main.rs.

pub mod commands;

// Re-export commonly needed types for tests
pub use anyhow::Result;
pub use commands::{correlate, evaluate, EvaluateArgs};
pub use releval_core::config::Config;
