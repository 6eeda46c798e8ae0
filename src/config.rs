//! Configuration for the annotation core.
//!
//! Serializable tunables: an 800x600 surface, a 200 ms delayed look-ahead
//! prefetch, and a one-hour cache staleness window by default.

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Render surface width in pixels; doubles as the requested maximum
    /// frame width
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,

    /// Render surface height in pixels; doubles as the requested maximum
    /// frame height
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,

    /// Delay before the +2 look-ahead prefetch fires after a forward step
    #[serde(default = "default_prefetch_delay_ms")]
    pub prefetch_delay_ms: u64,

    /// Cache staleness window in seconds
    #[serde(default = "default_staleness_secs")]
    pub staleness_secs: u64,

    /// Log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_surface_width() -> u32 {
    800
}

fn default_surface_height() -> u32 {
    600
}

fn default_prefetch_delay_ms() -> u64 {
    200
}

fn default_staleness_secs() -> u64 {
    3600
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            prefetch_delay_ms: default_prefetch_delay_ms(),
            staleness_secs: default_staleness_secs(),
            log_level: LogLevel::default(),
        }
    }
}

impl AppConfig {
    /// The cache staleness window.
    pub fn staleness_window(&self) -> Duration {
        Duration::from_secs(self.staleness_secs)
    }

    /// The delayed look-ahead prefetch interval.
    pub fn prefetch_delay(&self) -> Duration {
        Duration::from_millis(self.prefetch_delay_ms)
    }

    /// Serialize to pretty JSON for export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
