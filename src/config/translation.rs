//! Translation configuration
//!
//! Backend location, credentials and the blur/reveal behaviour applied to
//! freshly translated lines.

use serde::Deserialize;

/// Default generative-content endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for translation
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Translation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationConfig {
    /// Translate the newest line automatically when it appears
    pub auto_translate: bool,

    /// Obscure automatic translations until hovered
    pub blur_auto_translation: bool,

    /// Seconds after which an obscured translation is revealed (0 = never)
    pub unblur_after_secs: u64,

    /// Show the per-line translate control
    pub show_button: bool,

    /// API key for the generative-content backend
    pub api_key: Option<String>,

    /// Model name, e.g. "gemini-2.0-flash"
    pub model: String,

    /// Base URL of the backend (no trailing path)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            auto_translate: false,
            blur_auto_translation: true,
            unblur_after_secs: 0,
            show_button: true,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// Translation settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileTranslation {
    pub auto_translate: Option<bool>,
    pub blur_auto_translation: Option<bool>,
    pub unblur_after_secs: Option<u64>,
    pub show_button: Option<bool>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TranslationConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileTranslation>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            auto_translate: file.auto_translate.unwrap_or(defaults.auto_translate),
            blur_auto_translation: file
                .blur_auto_translation
                .unwrap_or(defaults.blur_auto_translation),
            unblur_after_secs: file.unblur_after_secs.unwrap_or(defaults.unblur_after_secs),
            show_button: file.show_button.unwrap_or(defaults.show_button),
            // An empty key in the template means "not set"
            api_key: file.api_key.filter(|k| !k.trim().is_empty()),
            model: file.model.unwrap_or(defaults.model),
            base_url: file.base_url.unwrap_or(defaults.base_url),
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
        }
    }
}
