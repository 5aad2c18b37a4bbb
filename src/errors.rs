// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpschedError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The rule table was empty, or every row in it was rejected.
    #[error("No usable job rules: {0}")]
    EmptyRuleSet(String),

    /// Dependents that could not be given a start time (cycle, or an upstream
    /// job that never resolved). Fatal for the whole run.
    #[error("Unresolvable dependencies for jobs: {}", stuck.join(", "))]
    Unresolvable { stuck: Vec<String> },

    #[error("Duplicate occurrence ({series_id}, {job_id}, {start_run_datetime})")]
    DuplicateOccurrence {
        series_id: String,
        job_id: String,
        start_run_datetime: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, OpschedError>;
