//! Config file parsing for `~/.config/progression/config.toml`.
//!
//! Use `console_options_from_config`, `log_steps_from_config` and
//! `operation_options_from_config` to build reporter and operation settings
//! from the loaded config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::display::console::{ConsoleOptions, DEFAULT_WIDTH};
use crate::display::log::DEFAULT_STEPS;
use crate::operations::{OperationOptions, DEFAULT_BUFFER_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub operations: OperationsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_width")]
    pub width: u64,
    #[serde(default = "default_show_caption")]
    pub show_caption: bool,
}

fn default_width() -> u64 {
    DEFAULT_WIDTH
}
fn default_show_caption() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            show_caption: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    pub steps: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsConfig {
    pub buffer_size: Option<usize>,
}

/// Load config from the default path (`~/.config/progression/config.toml`).
pub fn load_config() -> AppConfig {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => AppConfig::default(),
    }
}

/// Load config from `path`. A missing or malformed file yields the defaults.
pub fn load_config_from(path: &Path) -> AppConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return AppConfig::default(),
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

/// Return the default config file path (for init and show).
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut p| {
        p.push("progression");
        p.push("config.toml");
        p
    })
}

/// A zero width falls back to the default rather than failing later.
pub fn console_options_from_config(c: &ConsoleConfig) -> ConsoleOptions {
    ConsoleOptions {
        width: if c.width == 0 { DEFAULT_WIDTH } else { c.width },
        show_caption: c.show_caption,
    }
}

pub fn log_steps_from_config(c: &LogConfig) -> u64 {
    c.steps.filter(|&s| s > 0).unwrap_or(DEFAULT_STEPS)
}

pub fn operation_options_from_config(c: &OperationsConfig) -> OperationOptions {
    OperationOptions {
        buffer_size: c
            .buffer_size
            .filter(|&b| b > 0)
            .unwrap_or(DEFAULT_BUFFER_SIZE),
    }
}
