// src/config/model.rs

use serde::Deserialize;

use crate::engine::DEFAULT_WINDOW_DAYS;

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [config]
/// database = "files/timetable.db"
/// window_days = 14
/// clear_before_generate = true
/// exclude_holidays_after_generate = true
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
}

impl ConfigFile {
    /// Wrap an already validated section.
    pub(crate) fn new_unchecked(config: ConfigSection) -> Self {
        Self { config }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default())
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Path of the SQLite database holding rules and the timetable.
    #[serde(default = "default_database")]
    pub database: String,

    /// Length of the rolling window in days, starting today.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Truncate the occurrence table before each generation run.
    #[serde(default = "default_true")]
    pub clear_before_generate: bool,

    /// Run the public holiday pass right after generation.
    #[serde(default = "default_true")]
    pub exclude_holidays_after_generate: bool,
}

fn default_database() -> String {
    "files/timetable.db".to_string()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_true() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            database: default_database(),
            window_days: default_window_days(),
            clear_before_generate: true,
            exclude_holidays_after_generate: true,
        }
    }
}
