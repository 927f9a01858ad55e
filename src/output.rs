//! # Output Configuration
//!
//! Controls how the CLI renders: whether colors are used, whether emoji
//! decorations are shown, and how sizes are formatted.
//!
//! ## Respecting User Preferences
//!
//! Color follows the usual conventions:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! Emoji additionally require the hub's `useEmoji` flag. Project icon tags
//! are user data and are always printed as stored.

use std::env;

use crate::settings::FeatureFlags;

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub use_color: bool,
    pub use_emoji: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: "always", "never", or "auto".
    /// In auto mode colors are disabled by `NO_COLOR`, `CLICOLOR=0`,
    /// `TERM=dumb`, or a non-TTY stdout (unless `CLICOLOR_FORCE=1`).
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self {
            use_color,
            use_emoji: use_color,
        }
    }

    /// Applies the hub's presentation flags.
    pub fn with_features(mut self, features: &FeatureFlags) -> Self {
        self.use_emoji = self.use_color && features.use_emoji;
        self
    }

    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self {
            use_color: true,
            use_emoji: true,
        }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self {
            use_color: false,
            use_emoji: false,
        }
    }

    /// Dims `text` when colors are on.
    pub fn dim(&self, text: &str) -> String {
        if self.use_color {
            console::style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    /// Highlights `text` when colors are on.
    pub fn bold(&self, text: &str) -> String {
        if self.use_color {
            console::style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when emoji are enabled, otherwise `plain`.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_emoji {
        emoji_str
    } else {
        plain
    }
}

/// Formats a byte count the way Finder does (powers of 1000).
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];
    if bytes < 1000 {
        return format!("{} {}", bytes, UNITS[0]);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
