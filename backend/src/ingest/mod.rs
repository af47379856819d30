//! Directory ingestion.
//!
//! Lists the input directory, parses every candidate file in name order and
//! concatenates the survivors into one unified [`RecordSet`]. A file that
//! fails to parse is logged and skipped; only a run where nothing parsed is
//! fatal.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_success, log_warning};
use crate::models::RecordSet;
use crate::parser::read_source;

/// One successfully parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File name (no directory)
    pub name: String,
    /// Detected encoding
    pub encoding: String,
    /// Records with per-file row ids
    pub records: RecordSet,
}

/// Everything read from the input directory.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// Parsed files, in name order
    pub sources: Vec<SourceFile>,
    /// Names of files that could not be read
    pub skipped: Vec<String>,
    /// All sources concatenated, row ids reassigned
    pub unified: RecordSet,
}

/// Candidate files in `dir`, sorted by file name.
///
/// Directory listing order is platform dependent; sorting pins it so
/// surrogate keys are reproducible across runs.
pub fn candidate_files(dir: &Path, extension: &str) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| PipelineError::InputDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Read every candidate file of the configured input directory.
pub fn load_directory(config: &PipelineConfig) -> PipelineResult<Ingested> {
    let delimiter = config.delimiter_byte()?;
    let dir = config.input_dir.as_path();

    log_info(format!("📖 Reading sources from {}", dir.display()));
    let files = candidate_files(dir, &config.extension)?;

    let mut sources = Vec::new();
    let mut skipped = Vec::new();

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match read_source(path, delimiter) {
            Ok(parsed) => {
                log_success(format!(
                    "Read {} ({} rows, {})",
                    name,
                    parsed.records.len(),
                    parsed.encoding
                ));
                sources.push(SourceFile {
                    name,
                    encoding: parsed.encoding,
                    records: parsed.records,
                });
            }
            Err(e) => {
                log_warning(format!("Skipping {}: {}", name, e));
                skipped.push(name);
            }
        }
    }

    if sources.is_empty() {
        return Err(PipelineError::NoReadableInput {
            path: dir.to_path_buf(),
            attempted: files.len(),
        });
    }

    let unified = RecordSet::concat(sources.iter().map(|s| &s.records));
    log_success(format!(
        "{} source file(s), {} rows unified",
        sources.len(),
        unified.len()
    ));

    Ok(Ingested {
        sources,
        skipped,
        unified,
    })
}
