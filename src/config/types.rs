//! Basic types and enums for configuration

use serde::Deserialize;

/// When styled (colored) output is produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Colors on interactive terminals unless `NO_COLOR` is set
    #[default]
    Auto,
    /// Always emit styles
    Always,
    /// Never emit styles
    Never,
}

impl ColorMode {
    /// Resolves the mode against the terminal and the environment.
    pub fn enabled(self, is_terminal: bool, no_color: bool) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => is_terminal && !no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_follows_terminal_and_no_color() {
        assert!(ColorMode::Auto.enabled(true, false));
        assert!(!ColorMode::Auto.enabled(true, true));
        assert!(!ColorMode::Auto.enabled(false, false));
    }

    #[test]
    fn explicit_modes_ignore_environment() {
        assert!(ColorMode::Always.enabled(false, true));
        assert!(!ColorMode::Never.enabled(true, false));
    }
}
