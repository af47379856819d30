//! # Ordermart - retail order quality profiling and dimensional modelling
//!
//! Ordermart reads pipe-delimited retail order extracts, reports their data
//! quality issues, cleanses them and decomposes the result into a star schema
//! of seven dimensions and one sales fact table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Extracts   │────▶│   Ingest    │────▶│ Rule Engine │────▶│   Quality   │
//! │  (|-delim)  │     │ (auto-enc)  │     │  (catalog)  │     │   Report    │
//! └─────────────┘     └──────┬──────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//!                     │  Cleansing  │────▶│ Decomposer  │────▶│ Data Marts  │
//!                     │   (steps)   │     │ (star)      │     │ + zip/stats │
//!                     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ordermart::{run, PipelineConfig};
//!
//! let outcome = run(&PipelineConfig::default()).unwrap();
//! println!("{} inconsistency types", outcome.profile.report.summary.len());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Pipeline configuration
//! - [`logs`] - Leveled pipeline logging over `tracing`
//! - [`models`] - Records, typed cells and record sets
//! - [`parser`] - Delimited parsing with encoding detection
//! - [`ingest`] - Directory ingestion
//! - [`validation`] - Data-quality rule catalog
//! - [`report`] - Quality report aggregation
//! - [`transform`] - Cleansing, data marts, statistics and the pipeline
//! - [`export`] - CSV writers and the zip archive

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod ingest;
pub mod parser;

// Profiling
pub mod report;
pub mod validation;

// Transformation
pub mod transform;

// Output
pub mod export;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ExportError, PipelineError, PipelineResult, SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, Field, Record, RecordSet, RowId};

// =============================================================================
// Re-exports - Configuration & Logging
// =============================================================================

pub use config::PipelineConfig;
pub use logs::{init_logging, log_error, log_info, log_success, log_warning, LogEntry, LogLevel};

// =============================================================================
// Re-exports - Parsing & Ingestion
// =============================================================================

pub use ingest::{load_directory, Ingested, SourceFile};
pub use parser::{decode_content, detect_encoding, parse_bytes, parse_str, read_source, ParseResult};

// =============================================================================
// Re-exports - Rules & Report
// =============================================================================

pub use report::{profile_sources, QualityReport, ReportBuilder, SummaryRow};
pub use validation::{profile_set, FileProfile, Remediation, Rule, RuleContext, Violation};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{
    cleanse, compute_stats, decompose, CleanseOutcome, CleansingStep, DataMarts, GeographyRef,
    JoinDiagnostics, MartKind, TableStats,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_marts, profile_ingested, run, run_marts, run_profile, MartsOutcome, ProfileOutcome,
    RunOutcome,
};
