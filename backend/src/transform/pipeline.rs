//! High-level pipeline API.
//!
//! Two independent paths share one ingestion:
//!
//! ```text
//!                      ┌─▶ rules ─▶ report ─▶ quality_report/*.csv
//! input dir ─▶ ingest ─┤
//!                      └─▶ cleanse ─▶ decompose ─▶ Data_Marts/*.csv ─▶ Data_Marts.zip
//!                                                └─▶ Data_Marts_Rows.csv
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use ordermart::{run, PipelineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = run(&PipelineConfig::from_env()?)?;
//!     println!("{} fact rows", outcome.marts.marts.sales.len());
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use super::cleansing::{cleanse, StepReport};
use super::marts::{decompose, DataMarts};
use super::stats::{compute_stats, TableStats};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::export::{write_archive, write_marts, write_report, write_stats, ReportFiles};
use crate::ingest::{load_directory, Ingested};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::RecordSet;
use crate::report::{profile_sources, QualityReport};

/// Result of the profiling path.
#[derive(Debug, Clone)]
pub struct ProfileOutcome {
    pub report: QualityReport,
    pub files: ReportFiles,
}

/// Result of the dimensional path.
#[derive(Debug, Clone)]
pub struct MartsOutcome {
    /// Rows left after cleansing
    pub cleansed_rows: usize,
    pub steps: Vec<StepReport>,
    pub marts: DataMarts,
    pub stats: Vec<TableStats>,
    pub mart_files: Vec<PathBuf>,
    pub archive: PathBuf,
    pub stats_file: PathBuf,
}

/// Result of a full run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub sources: Vec<String>,
    pub skipped: Vec<String>,
    pub profile: ProfileOutcome,
    pub marts: MartsOutcome,
}

/// Profile already ingested sources and write the quality report.
pub fn profile_ingested(ingested: &Ingested, config: &PipelineConfig) -> PipelineResult<ProfileOutcome> {
    log_info("🔎 Profiling data quality...");
    let report = profile_sources(&ingested.sources, config);

    if report.is_clean() {
        log_success("No inconsistencies found");
    } else {
        for row in &report.summary {
            log_info_indent(format!("{}: {} row(s)", row.rule, row.distinct_rows), 1);
        }
        log_warning(format!("{} inconsistency type(s) found", report.summary.len()));
    }

    let files = write_report(&report, &config.report_dir())?;
    log_success(format!("Quality report written to {}", config.report_dir().display()));

    Ok(ProfileOutcome { report, files })
}

/// Cleanse a unified set, build the marts and write every mart artifact.
pub fn build_marts(unified: &RecordSet, config: &PipelineConfig) -> PipelineResult<MartsOutcome> {
    let cleansed = cleanse(unified);

    log_info("📦 Building data marts...");
    let marts = decompose(&cleansed.records);
    let diagnostics = marts.diagnostics;
    if !diagnostics.is_clean() {
        log_warning(format!(
            "Geography lookup: {} unresolved, {} ambiguous fact row(s)",
            diagnostics.unresolved, diagnostics.ambiguous
        ));
    }

    let stats = compute_stats(&marts);
    for s in &stats {
        log_info_indent(format!("{}: {} row(s)", s.table.name(), s.rows), 1);
    }

    let mart_files = write_marts(&marts, &config.marts_dir())?;
    let archive = config.archive_path();
    write_archive(&archive, &mart_files)?;
    let stats_file = config.stats_path();
    write_stats(&stats, &stats_file)?;
    log_success(format!(
        "{} tables written, archived to {}",
        mart_files.len(),
        archive.display()
    ));

    Ok(MartsOutcome {
        cleansed_rows: cleansed.records.len(),
        steps: cleansed.steps,
        marts,
        stats,
        mart_files,
        archive,
        stats_file,
    })
}

/// Ingest, then write the quality report only.
pub fn run_profile(config: &PipelineConfig) -> PipelineResult<ProfileOutcome> {
    let ingested = load_directory(config)?;
    profile_ingested(&ingested, config)
}

/// Ingest, then build and write the data marts only.
pub fn run_marts(config: &PipelineConfig) -> PipelineResult<MartsOutcome> {
    let ingested = load_directory(config)?;
    build_marts(&ingested.unified, config)
}

/// Ingest once and run both paths.
pub fn run(config: &PipelineConfig) -> PipelineResult<RunOutcome> {
    let ingested = load_directory(config)?;
    let profile = profile_ingested(&ingested, config)?;
    let marts = build_marts(&ingested.unified, config)?;

    Ok(RunOutcome {
        sources: ingested.sources.iter().map(|s| s.name.clone()).collect(),
        skipped: ingested.skipped,
        profile,
        marts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::transform::marts::GeographyRef;
    use crate::validation::Rule;
    use std::fs;
    use std::path::Path;

    const HEADER: &str = "Row ID|Order ID|Order Date|Ship Date|Customer ID|Customer Name|Segment|Country|City|State|Postal Code|Region|Product ID|Category|Sub-Category|Product Name|Sales|Quantity|Discount|Profit";

    fn config_for(root: &Path) -> PipelineConfig {
        PipelineConfig {
            input_dir: root.join("input"),
            output_dir: root.join("output"),
            ..PipelineConfig::default()
        }
    }

    fn write_input(root: &Path) {
        let input = root.join("input");
        fs::create_dir_all(&input).unwrap();
        fs::write(
            input.join("east.csv"),
            format!(
                "{HEADER}\n\
                 1|O1|2024-03-01|2024-03-04|C1|Jane Doe|Consumer|United States|New York City|New York|10001|East|P1|Furniture|Chairs|Desk Chair|100|2|0.1|10\n\
                 2|O2|2024-03-01|2024-03-04|C2|Jane Doe|Consumer|United States|New York City|New York|10001|East|P2|Technology|Phones|Phone X|0|0|1.5|0\n"
            ),
        )
        .unwrap();
        fs::write(
            input.join("west.csv"),
            format!(
                "{HEADER}\n\
                 3|O3|2024-03-10|2024-03-05|C3|Max Roe|Corporate|United States|Los Angeles|California|90001|West|P1|Furniture|Chairs|Desk Chair|50|1|0|5\n\
                 4|O4|2024-03-02|2024-03-06|C3|Max Roe|Corporate|United States|LA|California|90001|West|P1|Furniture|Chairs|Desk Chair|60|1|0|6\n\
                 5|O5|2024-03-02|2024-03-06|C3|Max Roe|Corporate|United States|Los Angeles|California|021|West|P1|Furniture|Chairs|Desk Chair|60|1|0|6\n"
            ),
        )
        .unwrap();
        fs::write(input.join("broken.csv"), "").unwrap();
    }

    #[test]
    fn test_full_run() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path());
        let config = config_for(dir.path());

        let outcome = run(&config).unwrap();

        assert_eq!(outcome.sources, vec!["east.csv", "west.csv"]);
        assert_eq!(outcome.skipped, vec!["broken.csv"]);

        let report = &outcome.profile.report;
        assert_eq!(report.summary_for(Rule::InconsistentCustomerId).unwrap().distinct_rows, 2);
        assert_eq!(report.summary_for(Rule::ZeroSalesAndQuantity).unwrap().distinct_rows, 1);
        assert_eq!(report.summary_for(Rule::UnrealisticDiscount).unwrap().distinct_rows, 1);
        assert_eq!(report.summary_for(Rule::MismatchedOrderShipDates).unwrap().distinct_rows, 1);
        assert_eq!(report.summary_for(Rule::InvalidPostalCode).unwrap().distinct_rows, 1);
        assert!(outcome.profile.files.summary.exists());

        let marts = &outcome.marts;
        assert_eq!(marts.cleansed_rows, 2);
        assert_eq!(marts.marts.sales.len(), 2);
        assert_eq!(marts.marts.geographies.len(), 2);
        assert!(marts.marts.sales.iter().all(|f| matches!(f.geography, GeographyRef::Resolved(_))));
        assert!(marts.archive.exists());
        assert!(marts.stats_file.exists());
        assert!(config.marts_dir().join("Sales_Fact.csv").exists());
    }

    #[test]
    fn test_profile_only_writes_no_marts() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path());
        let config = config_for(dir.path());

        let outcome = run_profile(&config).unwrap();

        assert!(!outcome.report.is_clean());
        assert!(outcome.files.log.exists());
        assert!(!config.archive_path().exists());
    }

    #[test]
    fn test_marts_only() {
        let dir = tempfile::tempdir().unwrap();
        write_input(dir.path());
        let config = config_for(dir.path());

        let outcome = run_marts(&config).unwrap();

        assert_eq!(outcome.stats.len(), 8);
        assert!(!config.report_dir().exists());
    }

    #[test]
    fn test_no_readable_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        fs::write(dir.path().join("input/empty.csv"), "").unwrap();
        let config = config_for(dir.path());

        let err = run(&config).unwrap_err();

        assert!(matches!(err, PipelineError::NoReadableInput { .. }));
        assert!(!config.output_dir.exists());
    }
}
