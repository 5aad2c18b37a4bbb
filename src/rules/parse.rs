// src/rules/parse.rs

//! Row-level validation: [`RawJobRule`] -> [`JobRule`].
//!
//! A malformed row never aborts a run. It becomes a [`RuleFault`] and the
//! rest of the table is processed as usual.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::rules::model::{FaultKind, JobRule, RawJobRule, RuleFault, RuleKind};
use crate::types::{split_multi, JobId, WeekdaySet, DATE_FORMAT, OPEN_END_SENTINEL};

impl TryFrom<&RawJobRule> for JobRule {
    type Error = RuleFault;

    fn try_from(raw: &RawJobRule) -> std::result::Result<Self, Self::Error> {
        let fault = |field: &'static str, value: &str, reason: String| RuleFault {
            row: raw.row,
            job_id: raw.job_id.clone(),
            kind: FaultKind::Malformed {
                field,
                value: value.to_string(),
                reason,
            },
        };

        let job_id = raw.job_id.trim();
        if job_id.is_empty() {
            return Err(fault("job_id", &raw.job_id, "must not be empty".into()));
        }

        let est_run_time = parse_minutes(&raw.est_run_time)
            .map_err(|e| fault("est_run_time", &raw.est_run_time, e))?;
        let start_run_date = parse_date(&raw.start_run_date)
            .map_err(|e| fault("start_run_date", &raw.start_run_date, e))?;
        let end_run_date = parse_end_date(&raw.end_run_date)
            .map_err(|e| fault("end_run_date", &raw.end_run_date, e))?;

        if end_run_date.is_some_and(|end| end < start_run_date) {
            return Err(fault(
                "end_run_date",
                &raw.end_run_date,
                format!("ends before start_run_date {}", raw.start_run_date.trim()),
            ));
        }

        let upstream = parse_upstream(&raw.dependent_job_id);

        let kind = if upstream.is_empty() {
            let start_time = parse_packed_time(&raw.start_time)
                .map_err(|e| fault("start_time", &raw.start_time, e))?;
            let days_of_week = raw
                .days_of_week
                .parse::<WeekdaySet>()
                .map_err(|e| fault("days_of_week", &raw.days_of_week, e))?;
            RuleKind::Root {
                start_time,
                days_of_week,
            }
        } else {
            let delay_minutes = if raw.minutes_dependent_job_id.trim().is_empty() {
                0
            } else {
                parse_minutes(&raw.minutes_dependent_job_id)
                    .map_err(|e| fault("minutes_dependent_job_id", &raw.minutes_dependent_job_id, e))?
            };
            if !raw.start_time.trim().is_empty() || !raw.days_of_week.trim().is_empty() {
                debug!(
                    job = %job_id,
                    row = raw.row,
                    "dependent row declares start_time/days_of_week; ignored (inherited from chain root)"
                );
            }
            RuleKind::Dependent {
                upstream,
                delay_minutes,
            }
        };

        Ok(JobRule {
            row: raw.row,
            job_id: job_id.to_string(),
            series_id: raw.series_id.trim().to_string(),
            est_run_time,
            start_run_date,
            end_run_date,
            exclude_public_holidays: parse_flag(&raw.exclude_public_holidays),
            kind,
        })
    }
}

/// Validate every row, splitting the table into usable rules and faults.
pub fn parse_rules(raw: &[RawJobRule]) -> (Vec<JobRule>, Vec<RuleFault>) {
    let mut rules = Vec::with_capacity(raw.len());
    let mut faults = Vec::new();

    for row in raw {
        match JobRule::try_from(row) {
            Ok(rule) => rules.push(rule),
            Err(fault) => {
                debug!(row = fault.row, job = %fault.job_id, "skipping malformed rule row: {fault}");
                faults.push(fault);
            }
        }
    }

    (rules, faults)
}

/// Parse a packed `HHMM` integer such as `900` or `2350`.
pub fn parse_packed_time(s: &str) -> std::result::Result<NaiveTime, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("required for jobs without dependencies".into());
    }
    let packed: u32 = s
        .parse()
        .map_err(|_| "expected packed HHMM digits".to_string())?;
    let (hour, minute) = (packed / 100, packed % 100);
    if hour > 23 || minute > 59 {
        return Err(format!("{hour:02}:{minute:02} is not a time of day"));
    }
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| "out of range".to_string())
}

/// Parse a `YYYYMMDD` date.
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected YYYYMMDD".into());
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| e.to_string())
}

fn parse_end_date(s: &str) -> std::result::Result<Option<NaiveDate>, String> {
    let s = s.trim();
    if s.is_empty() || s == OPEN_END_SENTINEL {
        return Ok(None);
    }
    parse_date(s).map(Some)
}

fn parse_minutes(s: &str) -> std::result::Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| "expected a non-negative number of minutes".to_string())
}

fn parse_upstream(s: &str) -> Vec<JobId> {
    let mut ids: Vec<JobId> = Vec::new();
    for id in split_multi(s) {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Truthy values used by the job tables for boolean columns.
pub fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "t"
    )
}
