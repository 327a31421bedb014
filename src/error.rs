//! Collector-specific error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("Search provider request failed: {message}")]
    Search { message: String },

    #[error("Search provider timed out after {seconds}s")]
    SearchTimeout { seconds: u64 },

    #[error("Query generation failed: {message}")]
    QueryGeneration { message: String },

    #[error("Storage operation failed: {operation} on {path}")]
    Storage {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {field}")]
    Configuration { field: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CollectorError {
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    pub fn query_generation(message: impl Into<String>) -> Self {
        Self::QueryGeneration {
            message: message.into(),
        }
    }

    pub fn config(field: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
        }
    }

    pub fn storage(operation: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Storage {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }
}

pub type CollectorResult<T> = Result<T, CollectorError>;
