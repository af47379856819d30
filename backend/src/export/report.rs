//! Quality report writer.

use std::fs;
use std::path::{Path, PathBuf};

use super::{write_table, Tabular};
use crate::error::ExportResult;
use crate::models::Field;
use crate::report::{ExampleRow, LogRow, QualityReport, SummaryRow};

pub const SUMMARY_FILE: &str = "Inconsistencies_Summary.csv";
pub const EXAMPLES_FILE: &str = "Inconsistencies_Examples.csv";
pub const LOG_FILE: &str = "Quality_Report.csv";

/// Paths of the written report tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub summary: PathBuf,
    pub examples: PathBuf,
    pub log: PathBuf,
}

impl Tabular for SummaryRow {
    const HEADERS: &'static [&'static str] = &[
        "Inconsistency Type",
        "Description",
        "Remediation",
        "Suggestion to handle",
        "Distinct Count of Row ID",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.rule.name().to_string(),
            self.description.clone(),
            self.remediation.label().to_string(),
            self.suggestion.clone(),
            self.distinct_rows.to_string(),
        ]
    }
}

impl Tabular for LogRow {
    const HEADERS: &'static [&'static str] =
        &["Inconsistency Type", "File Name", "Row ID", "Description"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.rule.name().to_string(),
            self.file_name.clone(),
            self.row_id.to_string(),
            self.description.clone(),
        ]
    }
}

/// Extra columns across all examples, first-seen order.
fn extra_columns(examples: &[ExampleRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for example in examples {
        for key in example.record.extras.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// The examples table: its columns depend on the extra columns present.
fn write_examples(path: &Path, examples: &[ExampleRow]) -> ExportResult<()> {
    let extras = extra_columns(examples);
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["Inconsistency Type", "File Name", "Row ID"];
    header.extend(Field::ALL.iter().map(|f| f.name()));
    header.extend(extras.iter().map(String::as_str));
    writer.write_record(&header)?;

    for example in examples {
        let record = &example.record;
        let mut row = vec![
            example.rule.name().to_string(),
            example.file_name.clone(),
            record.row_id.to_string(),
        ];
        row.extend(Field::ALL.iter().map(|f| record.text(*f).unwrap_or_default()));
        row.extend(
            extras
                .iter()
                .map(|c| record.extras.get(c).cloned().unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the three report tables into `dir`.
pub fn write_report(report: &QualityReport, dir: &Path) -> ExportResult<ReportFiles> {
    fs::create_dir_all(dir)?;
    let files = ReportFiles {
        summary: dir.join(SUMMARY_FILE),
        examples: dir.join(EXAMPLES_FILE),
        log: dir.join(LOG_FILE),
    };

    write_table(&files.summary, &report.summary)?;
    write_examples(&files.examples, &report.examples)?;
    write_table(&files.log, &report.log)?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::ingest::SourceFile;
    use crate::parser::parse_str;
    use crate::report::profile_sources;

    #[test]
    fn test_write_report_tables() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceFile {
            name: "orders.csv".into(),
            encoding: "utf-8".into(),
            records: parse_str(
                "Order ID|Order Date|Ship Date|Customer ID|Customer Name|Country|Postal Code|Sales|Quantity|Discount|Profit|Ship Mode\n\
                 O1|2024-03-01|2024-03-04|C1|Ann|United States|94105|10|2|0.1|-3|First Class\n",
                b'|',
            )
            .unwrap(),
        };
        let report = profile_sources(&[source], &PipelineConfig::default());

        let files = write_report(&report, &dir.path().join("quality_report")).unwrap();

        let summary = fs::read_to_string(&files.summary).unwrap();
        assert_eq!(
            summary.lines().nth(1),
            Some("Negative Profit Values,Negative profit values found,requires-business-input,Requires Business input: Investigate reasons for negative profit,1")
        );

        let examples = fs::read_to_string(&files.examples).unwrap();
        let mut lines = examples.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("Inconsistency Type,File Name,Row ID,Order ID,Order Date"));
        assert!(header.ends_with("Profit,Ship Mode"));
        let first = lines.next().unwrap();
        assert!(first.starts_with("Negative Profit Values,orders.csv,0,O1,2024-03-01"));
        assert!(first.ends_with(",First Class"));

        let log = fs::read_to_string(&files.log).unwrap();
        assert_eq!(
            log,
            "Inconsistency Type,File Name,Row ID,Description\nNegative Profit Values,orders.csv,0,Negative profit values found\n"
        );
    }

    #[test]
    fn test_clean_report_writes_headers_only() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_report(&QualityReport::default(), dir.path()).unwrap();
        assert_eq!(
            fs::read_to_string(&files.log).unwrap(),
            "Inconsistency Type,File Name,Row ID,Description\n"
        );
    }
}
