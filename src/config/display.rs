//! Display configuration
//!
//! Layout toggles shared by every rendered line. Read-only once the viewer
//! has started.

use serde::Deserialize;

/// Layout and animation toggles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Lay lines out as vertical text (affects scroll orientation)
    pub vertical: bool,

    /// Animate scrolling towards the newest line
    pub animate: bool,

    /// Keep runs of whitespace as written instead of collapsing them
    pub preserve_whitespace: bool,

    /// Show the newest line first
    pub reverse_order: bool,

    /// Render as a detached overlay: no editing, selection or translate control
    pub detached: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            vertical: false,
            animate: true,
            preserve_whitespace: true,
            reverse_order: false,
            detached: false,
        }
    }
}

/// Display settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileDisplay {
    pub vertical: Option<bool>,
    pub animate: Option<bool>,
    pub preserve_whitespace: Option<bool>,
    pub reverse_order: Option<bool>,
    pub detached: Option<bool>,
}

impl DisplayConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileDisplay>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            vertical: file.vertical.unwrap_or(defaults.vertical),
            animate: file.animate.unwrap_or(defaults.animate),
            preserve_whitespace: file
                .preserve_whitespace
                .unwrap_or(defaults.preserve_whitespace),
            reverse_order: file.reverse_order.unwrap_or(defaults.reverse_order),
            detached: file.detached.unwrap_or(defaults.detached),
        }
    }
}
