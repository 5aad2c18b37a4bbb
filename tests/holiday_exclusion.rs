// tests/holiday_exclusion.rs

mod common;
use crate::common::builders::{RuleBuilder, RuleSetBuilder};
use crate::common::failing_store::{FailOn, FailingStore};
use crate::common::{date, init_tracing, monday, of_job};

use std::collections::BTreeSet;
use std::error::Error;

use opsched::engine::Engine;
use opsched::errors::OpschedError;
use opsched::store::{MemoryStore, TimetableStore};
use opsched::timetable::{holidays_in_window, HolidayReport, PublicHoliday};

type TestResult = Result<(), Box<dyn Error>>;

fn generated(store: &MemoryStore) -> Result<Engine<MemoryStore>, Box<dyn Error>> {
    let mut engine = Engine::new(store.clone(), monday());
    engine.generate_timetable(14)?;
    Ok(engine)
}

#[test]
fn window_holidays_are_half_open() -> TestResult {
    let holidays: Vec<PublicHoliday> = [
        date(2026, 10, 18),
        date(2026, 10, 19),
        date(2026, 11, 1),
        date(2026, 11, 2),
    ]
    .into_iter()
    .map(PublicHoliday::new)
    .collect();

    let dates = holidays_in_window(&holidays, monday(), 14)?;
    assert_eq!(dates, BTreeSet::from([date(2026, 10, 19), date(2026, 11, 1)]));
    Ok(())
}

#[test]
fn window_past_the_calendar_is_a_config_error() {
    let holidays = vec![PublicHoliday::new(date(2026, 12, 25))];

    match holidays_in_window(&holidays, monday(), u32::MAX) {
        Err(OpschedError::ConfigError(msg)) => assert!(msg.contains("out of range")),
        other => panic!("Expected ConfigError, got: {other:?}"),
    }
}

#[test]
fn flagged_rule_loses_its_holiday_occurrence() -> TestResult {
    init_tracing();

    let store = RuleSetBuilder::new()
        .with(RuleBuilder::root("FLAGGED", "0900").skip_holidays())
        .with(RuleBuilder::root("PLAIN", "0900"))
        .into_store();
    store.add_holiday(date(2026, 10, 21));
    store.add_holiday(date(2026, 12, 25));

    let mut engine = generated(&store)?;
    let report = engine.exclude_holidays(14)?;

    assert_eq!(report.deleted, 1);
    assert_eq!(report.per_date.get(&date(2026, 10, 21)), Some(&1));
    assert_eq!(
        report.jobs_per_date.get(&date(2026, 10, 21)),
        Some(&BTreeSet::from(["FLAGGED".to_string()]))
    );

    let stored = store.occurrences()?;
    assert_eq!(of_job(&stored, "FLAGGED").len(), 13);
    assert_eq!(of_job(&stored, "PLAIN").len(), 14);
    assert!(
        of_job(&stored, "FLAGGED")
            .iter()
            .all(|o| o.start_date() != date(2026, 10, 21))
    );
    Ok(())
}

#[test]
fn job_master_flag_also_excludes() -> TestResult {
    init_tracing();

    let store = RuleSetBuilder::new()
        .with(RuleBuilder::root("A", "0900"))
        .with(RuleBuilder::root("B", "1000"))
        .into_store();
    store.set_job_exclude_ph("B", true);
    store.set_job_exclude_ph("A", false);
    store.add_holiday(date(2026, 10, 26));

    let mut engine = generated(&store)?;
    let report = engine.exclude_holidays(14)?;

    assert_eq!(report.deleted, 1);
    assert_eq!(
        report.jobs_per_date.get(&date(2026, 10, 26)),
        Some(&BTreeSet::from(["B".to_string()]))
    );
    assert_eq!(store.occurrence_count(), 27);
    Ok(())
}

#[test]
fn second_pass_deletes_nothing() -> TestResult {
    init_tracing();

    let store = RuleSetBuilder::new()
        .with(RuleBuilder::root("A", "0900").skip_holidays())
        .with(RuleBuilder::root("A", "2100").skip_holidays())
        .into_store();
    store.add_holiday(date(2026, 10, 20));
    store.add_holiday(date(2026, 10, 30));

    let mut engine = generated(&store)?;

    let first = engine.exclude_holidays(14)?;
    assert_eq!(first.deleted, 4);
    assert_eq!(first.per_date.len(), 2);

    let after_first = store.occurrences()?;
    let second = engine.exclude_holidays(14)?;
    assert_eq!(second, HolidayReport::default());
    assert_eq!(store.occurrences()?, after_first);
    Ok(())
}

#[test]
fn no_flagged_jobs_is_a_no_op() -> TestResult {
    let store = RuleSetBuilder::new()
        .with(RuleBuilder::root("A", "0900"))
        .into_store();
    store.add_holiday(date(2026, 10, 20));

    let mut engine = generated(&store)?;
    assert_eq!(engine.exclude_holidays(14)?.deleted, 0);
    assert_eq!(store.occurrence_count(), 14);
    Ok(())
}

#[test]
fn holidays_outside_the_window_are_ignored() -> TestResult {
    let store = RuleSetBuilder::new()
        .with(RuleBuilder::root("A", "0900").skip_holidays())
        .into_store();
    store.add_holiday(date(2026, 10, 1));
    store.add_holiday(date(2026, 11, 2));

    let mut engine = generated(&store)?;
    assert_eq!(engine.exclude_holidays(14)?.deleted, 0);
    assert_eq!(store.occurrence_count(), 14);
    Ok(())
}

#[test]
fn delete_failure_leaves_the_timetable_intact() -> TestResult {
    init_tracing();

    let inner = RuleSetBuilder::new()
        .with(RuleBuilder::root("A", "0900").skip_holidays())
        .into_store();
    inner.add_holiday(date(2026, 10, 20));
    generated(&inner)?;

    let mut engine = Engine::new(FailingStore::new(inner.clone(), FailOn::Delete), monday());
    assert!(engine.exclude_holidays(14).is_err());
    assert_eq!(inner.occurrence_count(), 14);
    Ok(())
}

#[test]
fn report_lists_dates_and_jobs() {
    let report = HolidayReport {
        deleted: 2,
        per_date: [(date(2026, 12, 25), 2)].into_iter().collect(),
        jobs_per_date: [(
            date(2026, 12, 25),
            BTreeSet::from(["A".to_string(), "B".to_string()]),
        )]
        .into_iter()
        .collect(),
    };

    let text = report.to_string();
    assert!(text.starts_with("deleted 2 occurrence(s)"));
    assert!(text.contains("20261225"));
    assert!(text.contains("Friday"));
    assert!(text.contains("jobs: A, B"));
}
