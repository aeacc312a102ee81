//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while reading a dataset from disk
#[derive(Error, Debug)]
pub enum LoadError {
    /// File could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file or listing a directory
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The dataset location is not a directory
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// A CSV header lacks a required column
    #[error("Missing column '{column}' in {file}")]
    MissingColumn { file: String, column: String },

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, LoadError>;
