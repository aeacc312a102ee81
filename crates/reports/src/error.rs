use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Output path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
