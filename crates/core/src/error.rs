use std::path::PathBuf;
use thiserror::Error;

/// Result type for releval operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for releval operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A judgment or run file does not exist
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// A line in a judgment or run file is malformed
    #[error("Parse error in {file} at line {line}: {message} (line: {content:?})")]
    Parse {
        file: String,
        line: usize,
        content: String,
        message: String,
    },

    /// Invalid input to a metric computation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a file-not-found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a parse error for a specific line of a source file
    pub fn parse(
        file: impl Into<String>,
        line: usize,
        content: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            content: content.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
