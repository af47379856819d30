//! Quality report aggregation.
//!
//! Folds per-file rule findings into the three report tables:
//!
//! ```text
//! FileProfile (a.csv) ─┐      ┌─▶ Summary   one row per rule, totals across files
//! FileProfile (b.csv) ─┼─────▶├─▶ Examples  first offending records per (file, rule)
//! FileProfile (c.csv) ─┘      └─▶ Log       one line per flagged (rule, file, row)
//! ```
//!
//! Files are added in ingestion order; rules always come out in catalog order.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::PipelineConfig;
use crate::ingest::SourceFile;
use crate::models::{Field, Record, RowId};
use crate::validation::{profile_source, Affected, FileProfile, Remediation, Rule, RuleContext};

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub rule: Rule,
    pub description: String,
    pub remediation: Remediation,
    pub suggestion: String,
    /// Affected row ids summed over files
    pub distinct_rows: usize,
}

/// A representative offending record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleRow {
    pub rule: Rule,
    pub file_name: String,
    pub record: Record,
}

/// One line of the quality log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub rule: Rule,
    pub file_name: String,
    pub row_id: RowId,
    pub description: String,
}

/// The aggregated data-quality report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QualityReport {
    pub summary: Vec<SummaryRow>,
    pub examples: Vec<ExampleRow>,
    pub log: Vec<LogRow>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.summary.is_empty()
    }

    pub fn summary_for(&self, rule: Rule) -> Option<&SummaryRow> {
        self.summary.iter().find(|s| s.rule == rule)
    }
}

/// Running totals for one rule.
#[derive(Default)]
struct RuleTotals {
    distinct_rows: usize,
    /// Union of missing fields, first-seen order
    missing: Vec<Field>,
}

impl RuleTotals {
    fn description(&self, rule: Rule) -> String {
        if self.missing.is_empty() {
            return rule.description().to_string();
        }
        let names: Vec<&str> = self.missing.iter().map(|f| f.name()).collect();
        format!("{}: {}", rule.description(), names.join(", "))
    }
}

/// Accumulates file findings into a [`QualityReport`].
pub struct ReportBuilder {
    example_limit: usize,
    file_log_sample: usize,
    totals: BTreeMap<Rule, RuleTotals>,
    examples: Vec<ExampleRow>,
    /// Log lines without descriptions; those depend on every file
    log: Vec<(Rule, String, RowId)>,
}

impl ReportBuilder {
    pub fn new(example_limit: usize, file_log_sample: usize) -> Self {
        Self {
            example_limit,
            file_log_sample,
            totals: BTreeMap::new(),
            examples: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Fold one file's findings in. `profile` must come from `source`.
    pub fn add_file(&mut self, source: &SourceFile, profile: &FileProfile) {
        for violation in &profile.violations {
            let rule = violation.rule;
            let totals = self.totals.entry(rule).or_default();
            totals.distinct_rows += violation.affected_count();

            match &violation.affected {
                Affected::Rows(rows) => {
                    self.examples.extend(
                        rows.iter()
                            .take(self.example_limit)
                            .filter_map(|id| source.records.get(*id))
                            .map(|record| ExampleRow {
                                rule,
                                file_name: source.name.clone(),
                                record: record.clone(),
                            }),
                    );
                    self.log
                        .extend(rows.iter().map(|id| (rule, source.name.clone(), *id)));
                }
                Affected::File { missing, .. } => {
                    for field in missing {
                        if !totals.missing.contains(field) {
                            totals.missing.push(*field);
                        }
                    }
                    self.examples.extend(
                        source.records.iter().take(self.example_limit).map(|record| ExampleRow {
                            rule,
                            file_name: source.name.clone(),
                            record: record.clone(),
                        }),
                    );
                    self.log.extend(
                        source
                            .records
                            .iter()
                            .take(self.file_log_sample)
                            .map(|r| (rule, source.name.clone(), r.row_id)),
                    );
                }
            }
        }
    }

    pub fn build(self) -> QualityReport {
        let descriptions: BTreeMap<Rule, String> = self
            .totals
            .iter()
            .map(|(rule, totals)| (*rule, totals.description(*rule)))
            .collect();

        let summary = self
            .totals
            .iter()
            // A file-level finding on an empty file carries no rows
            .filter(|(_, totals)| totals.distinct_rows > 0)
            .map(|(rule, totals)| SummaryRow {
                rule: *rule,
                description: descriptions[rule].clone(),
                remediation: rule.remediation(),
                suggestion: rule.suggestion(),
                distinct_rows: totals.distinct_rows,
            })
            .collect();

        let log = self
            .log
            .into_iter()
            .map(|(rule, file_name, row_id)| LogRow {
                rule,
                file_name,
                row_id,
                description: descriptions[&rule].clone(),
            })
            .collect();

        QualityReport {
            summary,
            examples: self.examples,
            log,
        }
    }
}

/// Profile every source and aggregate the findings.
pub fn profile_sources(sources: &[SourceFile], config: &PipelineConfig) -> QualityReport {
    let ctx = RuleContext::from(config);
    let mut builder = ReportBuilder::new(config.example_limit, config.file_log_sample);
    for source in sources {
        builder.add_file(source, &profile_source(source, &ctx));
    }
    builder.build()
}
