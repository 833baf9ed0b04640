//! System clipboard access for copying selected lines
//!
//! `arboard` handles Windows, macOS and X11/Wayland. A clipboard handle is
//! opened per copy and dropped straight after.

use anyhow::{Context, Result};
use arboard::Clipboard;

/// Put `text` on the system clipboard
///
/// Fails without a display server (headless Linux, plain SSH sessions).
pub fn copy_text(text: &str) -> Result<()> {
    Clipboard::new()
        .context("Clipboard is not available")?
        .set_text(text)
        .context("Failed to write to clipboard")
}
