// tests/sqlite_store.rs

mod common;
use crate::common::builders::{RuleBuilder, RuleSetBuilder};
use crate::common::{at, date, init_tracing, monday, of_job};

use std::error::Error;

use opsched::engine::{plan_timetable, Engine};
use opsched::errors::OpschedError;
use opsched::store::{SqliteStore, TimetableStore};
use opsched::timetable::PublicHoliday;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn store_with_chain() -> Result<SqliteStore, Box<dyn Error>> {
    let store = SqliteStore::open_in_memory()?;
    let rules = RuleSetBuilder::new()
        .with(RuleBuilder::root("EXTRACT", "0100").run_time(45).skip_holidays())
        .with(RuleBuilder::dependent("LOAD", "EXTRACT", 15).run_time(30))
        .build();
    for rule in &rules {
        store.insert_rule(rule)?;
    }
    Ok(store)
}

#[test]
fn open_creates_parent_directories_and_schema() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let path = dir.path().join("nested").join("timetable.db");

    let store = SqliteStore::open(&path)?;
    assert!(path.exists());
    assert!(store.load_rules()?.is_empty());
    assert!(store.occurrences()?.is_empty());

    // Re-opening an existing database is fine.
    drop(store);
    SqliteStore::open(&path)?;
    Ok(())
}

#[test]
fn rules_round_trip_with_row_numbers() -> TestResult {
    let store = store_with_chain()?;
    let rules = store.load_rules()?;

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].row, 1);
    assert_eq!(rules[0].job_id, "EXTRACT");
    assert_eq!(rules[1].row, 2);
    assert_eq!(rules[1].dependent_job_id, "EXTRACT");
    Ok(())
}

#[test]
fn numeric_and_null_columns_are_read_as_text() -> TestResult {
    let store = SqliteStore::open_in_memory()?;
    store.connection().execute(
        "INSERT INTO OPERATING_SCHEDULE
         (series_id, job_id, start_run_date, end_run_date, est_run_time,
          days_of_week, exclude_public_holidays, start_time,
          dependent_job_id, minutes_dependent_job_id)
         VALUES ('S1', 'NUM', 20260101, NULL, 30, NULL, 0, 900, NULL, NULL)",
        [],
    )?;

    let rules = store.load_rules()?;
    assert_eq!(rules[0].start_run_date, "20260101");
    assert_eq!(rules[0].start_time, "900");
    assert_eq!(rules[0].end_run_date, "");

    let plan = plan_timetable(&rules, monday(), 14)?;
    assert_eq!(plan.occurrences.len(), 14);
    assert_eq!(plan.occurrences[0].start_run_datetime, at("202610190900"));
    Ok(())
}

#[test]
fn generate_then_exclude_against_sqlite() -> TestResult {
    init_tracing();

    let store = store_with_chain()?;
    store.insert_public_holiday(&PublicHoliday::new(date(2026, 10, 23)))?;
    store.insert_public_holiday(&PublicHoliday::new(date(2026, 10, 23)))?;

    let mut engine = Engine::new(store, monday());
    let report = engine.generate_timetable(14)?;
    assert_eq!(report.written, 28);

    let stored = engine.store().occurrences()?;
    let load = of_job(&stored, "LOAD");
    assert_eq!(load[0].start_run_datetime, at("202610190200"));
    assert_eq!(load[0].end_run_datetime, at("202610190230"));
    assert_eq!(load[0].dependent_job_id, "EXTRACT");

    let holidays = engine.exclude_holidays(14)?;
    assert_eq!(holidays.deleted, 1);

    let stored = engine.store().occurrences()?;
    assert_eq!(of_job(&stored, "EXTRACT").len(), 13);
    assert_eq!(of_job(&stored, "LOAD").len(), 14);

    assert_eq!(engine.exclude_holidays(14)?.deleted, 0);
    Ok(())
}

#[test]
fn job_master_flag_is_upserted() -> TestResult {
    let store = store_with_chain()?;
    store.set_job_exclude_ph("LOAD", true)?;
    store.set_job_exclude_ph("LOAD", false)?;
    store.set_job_exclude_ph("OTHER", true)?;

    let jobs = store.holiday_excluded_jobs()?;
    let jobs: Vec<&str> = jobs.iter().map(String::as_str).collect();
    assert_eq!(jobs, vec!["EXTRACT", "OTHER"]);
    Ok(())
}

#[test]
fn failed_insert_rolls_back_the_whole_batch() -> TestResult {
    init_tracing();

    let mut store = store_with_chain()?;
    let rules = store.load_rules()?;
    let plan = plan_timetable(&rules, monday(), 2)?;

    let mut batch = plan.occurrences.clone();
    batch.push(plan.occurrences[0].clone());

    match store.insert_occurrences(&batch) {
        Err(OpschedError::Storage(_)) => {}
        other => panic!("Expected a storage error, got: {other:?}"),
    }
    assert!(store.occurrences()?.is_empty());

    assert_eq!(store.insert_occurrences(&plan.occurrences)?, 4);
    assert_eq!(store.clear_occurrences()?, 4);
    assert!(store.occurrences()?.is_empty());
    Ok(())
}

#[test]
fn malformed_holiday_rows_are_ignored() -> TestResult {
    let store = SqliteStore::open_in_memory()?;
    store.connection().execute(
        "INSERT INTO PUBLIC_HOLIDAY (year, ph_date) VALUES ('2026', 'xmas'), ('2026', '20261225')",
        [],
    )?;

    let holidays = store.public_holidays()?;
    assert_eq!(holidays, vec![PublicHoliday::new(date(2026, 12, 25))]);
    Ok(())
}
