//! Configuration loading and management

use crate::config::types::ColorMode;
use crate::constants::{defaults, CONFIG_FILENAMES, NO_COLOR_ENV};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Tunables for the render loop and the widgets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub color: ColorMode,
    pub spinner_interval_ms: u64,
    pub drain_grace_ms: u64,
    pub update_queue_capacity: usize,
    pub list_page_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            spinner_interval_ms: defaults::SPINNER_INTERVAL_MS,
            drain_grace_ms: defaults::DRAIN_GRACE_MS,
            update_queue_capacity: defaults::UPDATE_QUEUE_CAPACITY,
            list_page_size: defaults::LIST_PAGE_SIZE,
        }
    }
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spinner_interval_ms == 0 {
            return Err(Error::Config("spinner_interval_ms must be greater than 0".into()));
        }
        if self.list_page_size == 0 {
            return Err(Error::Config("list_page_size must be greater than 0".into()));
        }
        Ok(())
    }

    /// Loads the first configuration file found in `dir`, or the defaults
    /// when there is none.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        for config_file_name in CONFIG_FILENAMES.iter() {
            let config_file_path = dir.join(config_file_name);
            if config_file_path.exists() {
                return Self::load(config_file_path);
            }
        }
        log::debug!("No configuration file found in '{}', using defaults", dir.display());
        Ok(Self::default())
    }

    /// Loads a configuration file, picking the format from its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: ConsoleConfig =
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => serde_json::from_str(&content)?,
                Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
                _ => {
                    return Err(Error::Config(format!(
                        "unsupported configuration format '{}'",
                        path.display()
                    )))
                }
            };
        config.validate()?;
        log::debug!("Loaded configuration from '{}': {:?}", path.display(), config);
        Ok(config)
    }

    /// Whether styles are emitted for a stream that is (or is not) a terminal.
    pub fn color_enabled(&self, is_terminal: bool) -> bool {
        let no_color = std::env::var_os(NO_COLOR_ENV).is_some_and(|v| !v.is_empty());
        self.color.enabled(is_terminal, no_color)
    }

    pub fn spinner_interval(&self) -> Duration {
        Duration::from_millis(self.spinner_interval_ms)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}
