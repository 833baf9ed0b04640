//! Logging configuration: level, log strip, rotating file output

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::RollingFileAppender;

/// Level used when the configured one is not a tracing level
const DEFAULT_LEVEL: &str = "info";

/// Log strip rows shown under the transcript
const DEFAULT_STRIP_LINES: u16 = 4;

// ─────────────────────────────────────────────────────────────────────────────
// Log Rotation
// ─────────────────────────────────────────────────────────────────────────────

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// Single file, appended forever
    Never,
}

impl LogRotation {
    /// Unknown values fall back to daily
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "hourly" => Self::Hourly,
            "never" => Self::Never,
            _ => Self::Daily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    /// File appender for `dir/prefix.<period>`
    pub fn appender(&self, dir: &Path, prefix: &str) -> RollingFileAppender {
        match self {
            Self::Hourly => tracing_appender::rolling::hourly(dir, prefix),
            Self::Daily => tracing_appender::rolling::daily(dir, prefix),
            Self::Never => tracing_appender::rolling::never(dir, prefix),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    pub level: String,
    /// Rows of the log strip in the viewer; 0 hides it
    pub strip_lines: u16,
    /// Write JSON logs in addition to the strip or stdout
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL.to_string(),
            strip_lines: DEFAULT_STRIP_LINES,
            file_enabled: false,
            file_dir: default_log_dir(),
            file_rotation: LogRotation::Daily,
            file_prefix: "linecast".to_string(),
        }
    }
}

/// `~/.local/share/linecast/logs` or the platform equivalent
fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("linecast").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Lowercased level if tracing knows it, `None` otherwise
pub(crate) fn normalize_level(level: &str) -> Option<String> {
    level
        .trim()
        .parse::<tracing::Level>()
        .ok()
        .map(|l| l.to_string().to_lowercase())
}

/// `[logging]` as it appears in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub strip_lines: Option<u16>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            level: file
                .level
                .as_deref()
                .and_then(normalize_level)
                .unwrap_or(defaults.level),
            strip_lines: file.strip_lines.unwrap_or(defaults.strip_lines),
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.file_dir),
            file_rotation: file
                .file_rotation
                .map(|s| LogRotation::parse(&s))
                .unwrap_or(defaults.file_rotation),
            file_prefix: file.file_prefix.unwrap_or(defaults.file_prefix),
        }
    }

    /// Default `EnvFilter` directive when RUST_LOG is unset
    pub fn filter_directive(&self) -> String {
        format!("linecast={}", self.level)
    }
}
