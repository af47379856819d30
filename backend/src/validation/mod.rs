//! Rule engine: data-quality profiling of record sets.
//!
//! Every rule of [`Rule::CATALOG`] is evaluated independently, so a record can
//! be flagged by several rules. Findings are advisory; nothing here rejects a
//! record.
//!
//! # Example
//!
//! ```rust,ignore
//! use ordermart::validation::{profile_set, RuleContext};
//!
//! let violations = profile_set(&records, &RuleContext::default());
//! for v in &violations {
//!     println!("{}: {} row(s)", v.rule, v.affected_count());
//! }
//! ```

pub mod rules;

pub use rules::{is_valid_postal_code, Affected, Remediation, Rule, RuleContext, Violation};

use crate::config::PipelineConfig;
use crate::ingest::SourceFile;
use crate::models::RecordSet;

impl From<&PipelineConfig> for RuleContext {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            valid_countries: config.valid_countries.clone(),
            ..Self::default()
        }
    }
}

/// Findings for one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileProfile {
    pub file_name: String,
    pub row_count: usize,
    /// One entry per rule that flagged something, catalog order
    pub violations: Vec<Violation>,
}

impl FileProfile {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violation(&self, rule: Rule) -> Option<&Violation> {
        self.violations.iter().find(|v| v.rule == rule)
    }
}

/// Evaluate the whole catalog against a set.
pub fn profile_set(set: &RecordSet, ctx: &RuleContext) -> Vec<Violation> {
    Rule::CATALOG
        .iter()
        .filter_map(|rule| rule.evaluate(set, ctx))
        .collect()
}

/// Profile one source file.
pub fn profile_source(source: &SourceFile, ctx: &RuleContext) -> FileProfile {
    FileProfile {
        file_name: source.name.clone(),
        row_count: source.records.len(),
        violations: profile_set(&source.records, ctx),
    }
}
