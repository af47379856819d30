//! Pipeline log helpers.
//!
//! Stages report progress through four levels (info, success, warning,
//! error). Every entry is emitted as a `tracing` event under the
//! `ordermart` target, so output format and filtering are decided by the
//! subscriber installed with [`init_logging`].

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "ordermart=info";

/// Log level of a pipeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with its indentation applied.
    pub fn rendered(&self) -> String {
        format!("{}{}", "   ".repeat(self.indent as usize), self.message)
    }

    /// Emit this entry as a tracing event.
    pub fn emit(&self) {
        let message = self.rendered();
        match self.level {
            LogLevel::Info => tracing::info!(target: "ordermart", "{}", message),
            LogLevel::Success => tracing::info!(target: "ordermart", outcome = "success", "{}", message),
            LogLevel::Warning => tracing::warn!(target: "ordermart", "{}", message),
            LogLevel::Error => tracing::error!(target: "ordermart", "{}", message),
        }
    }
}

/// Install the global subscriber: `RUST_LOG` (or [`DEFAULT_FILTER`]) plus a
/// plain or JSON formatter on stderr.
pub fn init_logging(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LogEntry::info(msg).emit();
}

pub fn log_success(msg: impl Into<String>) {
    LogEntry::success(msg).emit();
}

pub fn log_warning(msg: impl Into<String>) {
    LogEntry::warning(msg).emit();
}

pub fn log_error(msg: impl Into<String>) {
    LogEntry::error(msg).emit();
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LogEntry::info(msg).with_indent(indent).emit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_indent() {
        let entry = LogEntry::warning("3 rows dropped").with_indent(2);
        assert_eq!(entry.rendered(), "      3 rows dropped");
        assert_eq!(entry.level, LogLevel::Warning);
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_string(&LogEntry::success("done")).unwrap();
        assert!(json.contains("\"level\":\"success\""));
        assert!(json.contains("\"indent\":0"));
    }

    #[test]
    fn test_emit_without_subscriber_is_noop() {
        log_info("nothing listens");
        log_error("still fine");
    }
}
