// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod rules;
pub mod store;
pub mod timetable;
pub mod types;

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::config::load_or_default;
use crate::engine::{Engine, Plan};
use crate::store::{SqliteStore, TimetableStore};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (with CLI overrides)
/// - the SQLite store
/// - the engine (generation and holiday passes)
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;

    let window_days = args.window_days.unwrap_or(cfg.config.window_days);
    let database = args.database.clone().unwrap_or(cfg.config.database.clone());
    let today = args.today.unwrap_or_else(system_today);

    debug!(%database, %today, window_days, "resolved run settings");

    let store = SqliteStore::open(&database)?;

    match args.command {
        Command::InitDb => {
            println!("database ready: {database}");
        }
        Command::Generate { dry_run: true, .. } => {
            let engine = Engine::new(store, today);
            let plan = engine.plan(window_days)?;
            print_dry_run(&plan, today, window_days);
        }
        Command::Generate { skip_holidays, .. } => {
            let mut engine = Engine::new(store, today);

            // Plan first so a resolution fault leaves the previous timetable in place.
            let plan = engine.plan(window_days)?;
            if cfg.config.clear_before_generate {
                engine.store_mut().clear_occurrences()?;
            }
            let report = engine.persist(plan)?;

            println!("{} occurrence(s) written", report.written);
            if !report.skipped.is_empty() {
                println!("{} rule row(s) skipped:", report.skipped.len());
                for fault in &report.skipped {
                    println!("  {fault}");
                }
            }

            if cfg.config.exclude_holidays_after_generate && !skip_holidays {
                // The timetable itself is already stored; a failed holiday
                // pass is reported but does not fail the run.
                match engine.exclude_holidays(window_days) {
                    Ok(holidays) => print!("{holidays}"),
                    Err(e) => error!("public holiday exclusion failed: {e}"),
                }
            }
        }
        Command::ExcludeHolidays => {
            let mut engine = Engine::new(store, today);
            let report = engine.exclude_holidays(window_days)?;
            print!("{report}");
        }
    }

    info!("done");
    Ok(())
}

/// Today's date on the local clock.
pub fn system_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Dry-run output: resolved tracks, the expanded timetable, skipped rows.
fn print_dry_run(plan: &Plan, today: NaiveDate, window_days: u32) {
    println!("opsched dry-run");
    println!("  today = {}", today.format(types::DATE_FORMAT));
    println!("  window_days = {window_days}");
    println!();

    println!("resolved jobs ({}):", plan.resolution.len());
    for track in plan.resolution.tracks() {
        println!(
            "  - {} [{}] {} -> {}",
            track.job_id,
            track.series_id,
            track.start.format(types::DATETIME_FORMAT),
            track.end.format(types::DATETIME_FORMAT)
        );
        if !track.is_root() {
            println!("      after: {}", track.dependent_job_id());
        }
        if !track.recurrence.is_every_day() {
            println!("      days_of_week: {}", track.recurrence);
        }
    }
    println!();

    println!("timetable ({} occurrence(s)):", plan.occurrences.len());
    for occ in &plan.occurrences {
        println!("  {occ}");
    }

    if !plan.skipped.is_empty() {
        println!();
        println!("skipped rows ({}):", plan.skipped.len());
        for fault in &plan.skipped {
            println!("  {fault}");
        }
    }

    debug!("dry-run complete (nothing written)");
}
