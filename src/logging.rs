// src/logging.rs

//! Stderr logging through `tracing-subscriber`'s `EnvFilter`.
//!
//! Filters use the usual directive syntax, so `debug`, `opsched::dag=trace`
//! and `warn,opsched::store=debug` all work. The `--log` flag wins over the
//! `OPSCHED_LOG` environment variable; with neither, `info` applies.
//! The timetable and reports go to stdout.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the default filter.
pub const LOG_ENV: &str = "OPSCHED_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_filter: Option<&str>) -> Result<()> {
    let env_filter = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_filter, env_filter.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// Pick and parse the filter: CLI directive, then env directive, then `info`.
///
/// Blank values count as unset. A malformed directive is an error rather
/// than being silently dropped.
pub fn build_filter(cli_filter: Option<&str>, env_filter: Option<&str>) -> Result<EnvFilter> {
    let directives = [cli_filter, env_filter]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|d| !d.is_empty())
        .unwrap_or(DEFAULT_FILTER);

    EnvFilter::try_new(directives).with_context(|| format!("invalid log filter '{directives}'"))
}
