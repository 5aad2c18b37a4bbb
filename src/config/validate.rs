// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::engine::MAX_WINDOW_DAYS;
use crate::errors::{OpschedError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = OpschedError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config))
    }
}

/// Check basic sanity of the `[config]` section.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    let window_days = cfg.config.window_days;
    if window_days == 0 || window_days > MAX_WINDOW_DAYS {
        return Err(OpschedError::ConfigError(format!(
            "[config].window_days must be between 1 and {MAX_WINDOW_DAYS} (got {window_days})"
        )));
    }

    if cfg.config.database.trim().is_empty() {
        return Err(OpschedError::ConfigError(
            "[config].database must not be empty".to_string(),
        ));
    }

    Ok(())
}
