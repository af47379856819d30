//! Transformation module.
//!
//! This module turns the unified record set into data marts:
//! - Cleansing: ordered pure cleansing steps
//! - Keys: surrogate key assignment
//! - Marts: dimension and fact tables
//! - Stats: row and key counts per table
//! - Pipeline: orchestration of ingestion, profiling and mart building

pub mod cleansing;
pub mod keys;
pub mod marts;
pub mod pipeline;
pub mod stats;

pub use cleansing::{cleanse, CleanseOutcome, CleansingStep, StepReport};
pub use keys::SurrogateKeys;
pub use marts::{decompose, DataMarts, GeographyRef, JoinDiagnostics, MartKind};
pub use pipeline::*;
pub use stats::{compute_stats, TableStats};
