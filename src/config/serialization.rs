//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Serialize config to TOML with comments
    ///
    /// Used both for the first-run template and `linecast config --reset`.
    pub fn to_toml(&self) -> String {
        let api_key = self.translation.api_key.as_deref().unwrap_or("");

        format!(
            r#"# linecast configuration
# Precedence: environment variables > this file > built-in defaults

[display]
vertical = {vertical}                 # Lay lines out as vertical text
animate = {animate}                   # Animate scrolling to the newest line
preserve_whitespace = {preserve}      # Keep whitespace runs as written
reverse_order = {reverse}             # Newest line first
detached = {detached}                 # Read-only overlay presentation

[translation]
auto_translate = {auto}               # Translate the newest line automatically
blur_auto_translation = {blur}        # Obscure automatic translations until hovered
unblur_after_secs = {unblur}          # Reveal obscured translations after N seconds (0 = never)
show_button = {button}                # Show the per-line translate control
api_key = {api_key:?}                 # Or set GEMINI_API_KEY
model = {model:?}
base_url = {base_url:?}
timeout_secs = {timeout}

[logging]
level = {level:?}                     # trace, debug, info, warn, error
strip_lines = {strip_lines}                   # Log rows under the transcript (0 = hidden)
file_enabled = {file_enabled}
file_dir = {file_dir:?}
file_rotation = {rotation:?}          # hourly, daily, never
file_prefix = {prefix:?}
"#,
            vertical = self.display.vertical,
            animate = self.display.animate,
            preserve = self.display.preserve_whitespace,
            reverse = self.display.reverse_order,
            detached = self.display.detached,
            auto = self.translation.auto_translate,
            blur = self.translation.blur_auto_translation,
            unblur = self.translation.unblur_after_secs,
            button = self.translation.show_button,
            api_key = api_key,
            model = self.translation.model,
            base_url = self.translation.base_url,
            timeout = self.translation.timeout_secs,
            level = self.logging.level,
            strip_lines = self.logging.strip_lines,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
            rotation = self.logging.file_rotation.as_str(),
            prefix = self.logging.file_prefix,
        )
    }
}
