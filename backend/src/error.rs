//! Error types for the ordermart pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`SourceError`] - Reading and parsing one source file
//! - [`ConfigError`] - Invalid pipeline configuration
//! - [`ExportError`] - Writing reports, data marts and the archive
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Field-level parse failures are not errors: they become null cells
//! (see [`crate::models::Cell`]).

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors while reading a single source file.
///
/// These are recovered by the ingestion layer: the file is logged and skipped.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited content could not be parsed.
    #[error("Invalid delimited format: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("Source file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in source file")]
    NoHeaders,

    /// A data row carries more fields than the header names.
    #[error("Line {line}: expected at most {expected} fields, found {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in the pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Delimiter must be a single ASCII character.
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(char),

    /// A setting could not be interpreted.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while writing report tables, data marts or the archive.
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error.
    #[error("Export IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Zip archive error.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The input directory itself could not be listed.
    #[error("Cannot list input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Not a single source file could be parsed.
    #[error("No readable input in {path} ({attempted} candidate file(s) tried)")]
    NoReadableInput { path: PathBuf, attempted: usize },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ConfigError -> PipelineError
        let config_err = ConfigError::InvalidDelimiter('é');
        let pipeline_err: PipelineError = config_err.into();
        assert!(pipeline_err.to_string().contains("Delimiter"));

        // ExportError -> PipelineError
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let pipeline_err: PipelineError = ExportError::from(io).into();
        assert!(pipeline_err.to_string().contains("denied"));
    }

    #[test]
    fn test_ragged_row_format() {
        let err = SourceError::RaggedRow {
            line: 7,
            expected: 3,
            found: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("at most 3"));
        assert!(msg.contains("found 5"));
    }

    #[test]
    fn test_no_readable_input_format() {
        let err = PipelineError::NoReadableInput {
            path: PathBuf::from("data"),
            attempted: 2,
        };
        assert_eq!(
            err.to_string(),
            "No readable input in data (2 candidate file(s) tried)"
        );
    }
}
