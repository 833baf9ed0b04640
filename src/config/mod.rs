//! Configuration for the transcript viewer
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/linecast/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! Line components never read this module directly. The relevant sections are
//! copied into a read-only `LineContext` when the viewer starts.

use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod display;
mod observability;
mod serialization;
mod translation;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use display::{DisplayConfig, FileDisplay};
pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use translation::{FileTranslation, TranslationConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to enable the TUI (disabled for headless translation runs)
    pub enable_tui: bool,

    /// Layout and animation toggles
    pub display: DisplayConfig,

    /// Translation backend and reveal behaviour
    pub translation: TranslationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_tui: true,
            display: DisplayConfig::default(),
            translation: TranslationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [display] section
    pub display: Option<FileDisplay>,

    /// Optional [translation] section
    pub translation: Option<FileTranslation>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/linecast/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("linecast").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be parsed is fatal: silently
    /// falling back to defaults would hide the mistake.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\nCONFIG ERROR - Failed to parse configuration file\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  To reset, run `linecast config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\nCONFIG ERROR - Cannot read configuration file\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        Self::from_file_and_env(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file config with environment lookups
    ///
    /// `env` is injected so tests can exercise precedence without touching
    /// the process environment.
    pub(crate) fn from_file_and_env(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        // TUI toggle: env only (runtime flag)
        let enable_tui = env("LINECAST_NO_TUI")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        let display = DisplayConfig::from_file(file.display);

        let mut translation = TranslationConfig::from_file(file.translation);
        // API key: env > file
        if let Some(key) = env("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            translation.api_key = Some(key);
        }
        if let Some(flag) = env("LINECAST_AUTO_TRANSLATE") {
            translation.auto_translate = flag == "1" || flag.to_lowercase() == "true";
        }

        let mut logging = LoggingConfig::from_file(file.logging);
        let env_level = env("LINECAST_LOG_LEVEL");
        if let Some(level) = env_level.as_deref().and_then(observability::normalize_level) {
            logging.level = level;
        }

        Self {
            enable_tui,
            display,
            translation,
            logging,
        }
    }
}
