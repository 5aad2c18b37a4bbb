// src/cli.rs

//! CLI argument parsing using `clap`.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::rules::parse::parse_date;

/// Command-line arguments for `opsched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "opsched",
    version,
    about = "Generate planned batch-job timetables from operating schedule rules.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Opsched.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// SQLite database path; overrides `[config].database`.
    #[arg(long, value_name = "PATH")]
    pub database: Option<String>,

    /// Window length in days; overrides `[config].window_days`.
    #[arg(long, value_name = "DAYS")]
    pub window_days: Option<u32>,

    /// Treat this date as today instead of the system date.
    #[arg(long, value_name = "YYYYMMDD", value_parser = parse_date)]
    pub today: Option<NaiveDate>,

    /// Log filter, e.g. `debug` or `info,opsched::dag=trace`.
    ///
    /// Overrides `OPSCHED_LOG`; defaults to `info`.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate the timetable for the window and store it.
    Generate {
        /// Resolve and print the timetable, but don't write anything.
        #[arg(long)]
        dry_run: bool,

        /// Don't run the public holiday pass after generating.
        #[arg(long)]
        skip_holidays: bool,
    },
    /// Remove stored occurrences that fall on public holidays.
    ExcludeHolidays,
    /// Create the database tables if they don't exist.
    InitDb,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
