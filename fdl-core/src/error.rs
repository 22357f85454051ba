//! Error types for traceability operations
//!
//! Per-item findings (a missing test, a broken back-reference, a bad file
//! name) are reported as data inside the validation reports and chain nodes.
//! `TraceError` is reserved for conditions that stop a whole operation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop a traceability operation
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Invalid level: {0}. Must be one of: UT, IT, ST, AT")]
    InvalidLevel(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("Invalid naming pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TraceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TraceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the core library
pub type Result<T> = std::result::Result<T, TraceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_not_found_message() {
        let err = TraceError::DirectoryNotFound(PathBuf::from("tests/unit"));
        assert_eq!(err.to_string(), "Directory not found: tests/unit");
    }

    #[test]
    fn test_invalid_level_lists_valid_levels() {
        let err = TraceError::InvalidLevel("XT".to_string());
        assert!(err.to_string().contains("UT, IT, ST, AT"));
    }
}
