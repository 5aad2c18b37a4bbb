#![allow(dead_code)]

pub use opsched_test_utils::builders;
pub use opsched_test_utils::failing_store;
pub use opsched_test_utils::{date, init_tracing, monday};

use chrono::{NaiveDate, NaiveDateTime};
use opsched::timetable::ResolvedOccurrence;

/// `YYYYMMDDHHMM` to a datetime.
pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, opsched::types::DATETIME_FORMAT).expect("valid test datetime")
}

/// Occurrences of one job, in timetable order.
pub fn of_job<'a>(occurrences: &'a [ResolvedOccurrence], job: &str) -> Vec<&'a ResolvedOccurrence> {
    occurrences.iter().filter(|o| o.job_id == job).collect()
}

/// Distinct start dates of one job.
pub fn start_dates(occurrences: &[ResolvedOccurrence], job: &str) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = of_job(occurrences, job).iter().map(|o| o.start_date()).collect();
    dates.dedup();
    dates
}
