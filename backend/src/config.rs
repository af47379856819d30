//! Pipeline configuration.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. [`PipelineConfig::default`]
//! 2. Environment variables (a `.env` file is loaded first, if present)
//! 3. CLI flags (applied by the binary)
//!
//! | Variable | Setting |
//! |---|---|
//! | `ORDERMART_INPUT_DIR` | directory of source files |
//! | `ORDERMART_OUTPUT_DIR` | root of every generated artifact |
//! | `ORDERMART_DELIMITER` | field delimiter (one ASCII char) |
//! | `ORDERMART_EXTENSION` | source file extension |
//! | `ORDERMART_VALID_COUNTRIES` | comma-separated country allow-list |
//! | `ORDERMART_EXAMPLE_LIMIT` | examples kept per rule and file |

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, ConfigResult};

const ENV_INPUT_DIR: &str = "ORDERMART_INPUT_DIR";
const ENV_OUTPUT_DIR: &str = "ORDERMART_OUTPUT_DIR";
const ENV_DELIMITER: &str = "ORDERMART_DELIMITER";
const ENV_EXTENSION: &str = "ORDERMART_EXTENSION";
const ENV_VALID_COUNTRIES: &str = "ORDERMART_VALID_COUNTRIES";
const ENV_EXAMPLE_LIMIT: &str = "ORDERMART_EXAMPLE_LIMIT";

/// Options for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Directory holding the source extracts
    pub input_dir: PathBuf,

    /// Only files with this extension are ingested
    pub extension: String,

    /// Field delimiter of the source files
    pub delimiter: char,

    /// Directory receiving the report, marts, archive and statistics
    pub output_dir: PathBuf,

    /// Country allow-list for the country rule
    pub valid_countries: Vec<String>,

    /// Example records kept per rule occurrence
    pub example_limit: usize,

    /// Rows logged for file-level findings
    pub file_log_sample: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("Case_Study_Data_For_Share"),
            extension: "csv".to_string(),
            delimiter: '|',
            output_dir: PathBuf::from("output"),
            valid_countries: vec!["United States".to_string()],
            example_limit: 2,
            file_log_sample: 2,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by the environment.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        if let Some(dir) = lookup(ENV_INPUT_DIR) {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(ext) = lookup(ENV_EXTENSION) {
            self.extension = ext.trim().trim_start_matches('.').to_string();
        }
        if let Some(raw) = lookup(ENV_DELIMITER) {
            self.delimiter = single_char(ENV_DELIMITER, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VALID_COUNTRIES) {
            self.valid_countries = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(raw) = lookup(ENV_EXAMPLE_LIMIT) {
            self.example_limit = raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: ENV_EXAMPLE_LIMIT.to_string(),
                message: format!("{}", e),
            })?;
        }
        Ok(())
    }

    /// Check the settings before any work starts.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        if self.extension.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "extension".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> ConfigResult<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidDelimiter(self.delimiter))
    }

    pub fn report_dir(&self) -> PathBuf {
        self.output_dir.join("quality_report")
    }

    pub fn marts_dir(&self) -> PathBuf {
        self.output_dir.join("Data_Marts")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join("Data_Marts.zip")
    }

    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join("Data_Marts_Rows.csv")
    }
}

fn single_char(key: &str, raw: &str) -> ConfigResult<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a single character, got '{}'", raw),
        }),
    }
}
