// src/timetable/occurrence.rs

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{DATE_FORMAT, DATETIME_FORMAT};

/// One planned run of a job, as stored in the occurrence table.
///
/// Primary key: `(series_id, job_id, start_run_datetime)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedOccurrence {
    pub series_id: String,
    pub job_id: String,
    pub start_run_datetime: NaiveDateTime,
    pub end_run_datetime: NaiveDateTime,
    /// Comma-joined, sorted upstream job ids. Empty for roots.
    pub dependent_job_id: String,
}

/// Primary key of a stored occurrence.
pub type OccurrenceKey = (String, String, NaiveDateTime);

impl ResolvedOccurrence {
    pub fn key(&self) -> OccurrenceKey {
        (
            self.series_id.clone(),
            self.job_id.clone(),
            self.start_run_datetime,
        )
    }

    /// Calendar date the occurrence starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start_run_datetime.date()
    }

    /// `start_run_datetime` as `YYYYMMDDHHMM`.
    pub fn start_str(&self) -> String {
        self.start_run_datetime.format(DATETIME_FORMAT).to_string()
    }

    /// `end_run_datetime` as `YYYYMMDDHHMM`.
    pub fn end_str(&self) -> String {
        self.end_run_datetime.format(DATETIME_FORMAT).to_string()
    }
}

impl fmt::Display for ResolvedOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<15} {} -> {}",
            self.series_id,
            self.job_id,
            self.start_str(),
            self.end_str()
        )?;
        if !self.dependent_job_id.is_empty() {
            write!(f, "  after {}", self.dependent_job_id)?;
        }
        Ok(())
    }
}

/// A declared public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicHoliday {
    pub year: i32,
    pub date: NaiveDate,
}

impl PublicHoliday {
    pub fn new(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            date,
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}
