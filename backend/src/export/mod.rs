//! Output writers.
//!
//! Every generated artifact is a delimited table written with the `csv` crate:
//!
//! - [`report`] - the three quality report tables
//! - [`marts`] - the eight data-mart tables and their statistics
//! - [`archive`] - the zip bundle of the mart files
//!
//! Dates are written as `%Y-%m-%d`, nulls as empty fields.

pub mod archive;
pub mod marts;
pub mod report;

pub use archive::write_archive;
pub use marts::{write_marts, write_stats};
pub use report::{write_report, ReportFiles};

use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use crate::error::ExportResult;

/// A row type with a fixed column layout.
pub trait Tabular {
    /// Column names, in output order
    const HEADERS: &'static [&'static str];

    /// Field values, one per header
    fn cells(&self) -> Vec<String>;
}

/// Write `rows` with a header line to `path`, creating parent directories.
pub fn write_table<T: Tabular>(path: &Path, rows: &[T]) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(T::HEADERS)?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;
    Ok(())
}

pub(crate) fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

pub(crate) fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub(crate) fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair(&'static str, Option<f64>);

    impl Tabular for Pair {
        const HEADERS: &'static [&'static str] = &["Name", "Value"];

        fn cells(&self) -> Vec<String> {
            vec![self.0.to_string(), number(self.1)]
        }
    }

    #[test]
    fn test_write_table_creates_dirs_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pairs.csv");

        write_table(&path, &[Pair("plain", Some(1.5)), Pair("a, b", None)]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "Name,Value\nplain,1.5\n\"a, b\",\n");
    }

    #[test]
    fn test_cell_helpers() {
        assert_eq!(date(NaiveDate::from_ymd_opt(2024, 3, 1)), "2024-03-01");
        assert_eq!(date(None), "");
        assert_eq!(number(Some(10.0)), "10");
        assert_eq!(text(&None), "");
    }
}
