//! Error types for the benchmark harness.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Errors that can occur while running a benchmark.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The dataset path does not exist.
    #[error("Dataset not found at '{0}'")]
    DatasetNotFound(PathBuf),

    /// The dataset has no sessions to replay.
    #[error("Dataset '{0}' contains no sessions")]
    EmptyDataset(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A system under test or a scorer failed during replay.
    #[error("{stage} failed: {message}")]
    Collaborator { stage: &'static str, message: String },
}

impl BenchError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a collaborator failure with the replay stage it happened in.
    pub fn collaborator(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Collaborator {
            stage,
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        BenchError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::LlmParse(err.to_string())
    }
}
