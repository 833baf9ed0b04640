// Scroll coordination - bringing the newest line into view
//
// Line components only ask for the newest line to be shown. How that happens
// (jump or animated steps, which edge counts as "newest") belongs to the
// viewer hosting them, so the request crosses a trait boundary.

use crate::config::DisplayConfig;
use std::sync::Arc;

/// Direction lines flow in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Horizontal text, lines stacked top to bottom
    Horizontal,
    /// Vertical text, lines stacked right to left
    Vertical,
}

/// How the newest line should be brought into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOptions {
    pub orientation: Orientation,
    pub animate: bool,
    /// Newest line is rendered first instead of last
    pub reversed: bool,
}

impl ScrollOptions {
    pub fn from_display(display: &DisplayConfig) -> Self {
        Self {
            orientation: if display.vertical {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            },
            animate: display.animate,
            reversed: display.reverse_order,
        }
    }
}

/// Something that can scroll the newest line into view
pub trait ScrollCoordinator: Send + Sync {
    fn scroll_to_newest(&self, options: ScrollOptions);
}

/// A scroll request captured at the time a translation was started
#[derive(Clone)]
pub struct ScrollRequest {
    pub coordinator: Arc<dyn ScrollCoordinator>,
    pub options: ScrollOptions,
}

impl ScrollRequest {
    pub fn fire(&self) {
        self.coordinator.scroll_to_newest(self.options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_display_flags() {
        let display = DisplayConfig {
            vertical: true,
            animate: false,
            preserve_whitespace: true,
            reverse_order: true,
            detached: false,
        };
        let options = ScrollOptions::from_display(&display);
        assert_eq!(options.orientation, Orientation::Vertical);
        assert!(!options.animate);
        assert!(options.reversed);

        let defaults = ScrollOptions::from_display(&DisplayConfig::default());
        assert_eq!(defaults.orientation, Orientation::Horizontal);
        assert!(defaults.animate);
    }
}
