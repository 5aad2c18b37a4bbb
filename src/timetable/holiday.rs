// src/timetable/holiday.rs

//! Public-holiday pruning of stored occurrences.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use crate::timetable::occurrence::{PublicHoliday, ResolvedOccurrence};
use crate::errors::Result;
use crate::types::{window_end, JobId, DATE_FORMAT};

/// Holiday dates inside `[today, today + window_days)`.
pub fn holidays_in_window(
    holidays: &[PublicHoliday],
    today: NaiveDate,
    window_days: u32,
) -> Result<BTreeSet<NaiveDate>> {
    let horizon = window_end(today, window_days)?;
    Ok(holidays
        .iter()
        .map(|h| h.date)
        .filter(|d| *d >= today && *d < horizon)
        .collect())
}

/// Whether `occurrence` must be removed: its job skips holidays and it
/// starts on one.
pub fn falls_on_excluded_holiday(
    occurrence: &ResolvedOccurrence,
    excluded_jobs: &BTreeSet<JobId>,
    holiday_dates: &BTreeSet<NaiveDate>,
) -> bool {
    excluded_jobs.contains(&occurrence.job_id) && holiday_dates.contains(&occurrence.start_date())
}

/// What a holiday pass removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayReport {
    /// Number of occurrences deleted.
    pub deleted: usize,
    /// Deleted occurrence count per holiday date.
    pub per_date: BTreeMap<NaiveDate, usize>,
    /// Jobs affected per holiday date.
    pub jobs_per_date: BTreeMap<NaiveDate, BTreeSet<JobId>>,
}

impl HolidayReport {
    pub fn from_deleted(deleted: &[ResolvedOccurrence]) -> Self {
        let mut report = HolidayReport {
            deleted: deleted.len(),
            ..Default::default()
        };
        for occ in deleted {
            let date = occ.start_date();
            *report.per_date.entry(date).or_default() += 1;
            report
                .jobs_per_date
                .entry(date)
                .or_default()
                .insert(occ.job_id.clone());
        }
        report
    }
}

impl fmt::Display for HolidayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "deleted {} occurrence(s)", self.deleted)?;
        for (date, count) in &self.per_date {
            let jobs: Vec<&str> = self
                .jobs_per_date
                .get(date)
                .map(|j| j.iter().map(String::as_str).collect())
                .unwrap_or_default();
            writeln!(
                f,
                "  {} ({}): {count} deleted; jobs: {}",
                date.format(DATE_FORMAT),
                date.format("%d %b %Y (%A)"),
                jobs.join(", ")
            )?;
        }
        Ok(())
    }
}
