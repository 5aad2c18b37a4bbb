// src/rules/model.rs

use std::fmt;

use chrono::{NaiveDate, NaiveTime};

use crate::types::{JobId, WeekdaySet};

/// One row of the rule table exactly as stored: every column is text.
///
/// Empty strings stand for absent values. Row-level validation happens in
/// [`JobRule::try_from`]; see `rules::parse`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawJobRule {
    /// Position of the row in the source table, used in fault reports.
    pub row: usize,
    pub job_id: String,
    pub series_id: String,
    pub start_time: String,
    pub est_run_time: String,
    pub dependent_job_id: String,
    pub minutes_dependent_job_id: String,
    pub start_run_date: String,
    pub end_run_date: String,
    pub days_of_week: String,
    pub exclude_public_holidays: String,
}

/// A validated rule row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRule {
    pub row: usize,
    pub job_id: JobId,
    pub series_id: String,
    /// Estimated run time in minutes.
    pub est_run_time: u32,
    pub start_run_date: NaiveDate,
    /// `None` means open ended.
    pub end_run_date: Option<NaiveDate>,
    pub exclude_public_holidays: bool,
    pub kind: RuleKind,
}

/// Whether the row is schedule driven or dependency driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Root {
        start_time: NaiveTime,
        days_of_week: WeekdaySet,
    },
    Dependent {
        /// Upstream job ids, deduplicated, in declaration order.
        upstream: Vec<JobId>,
        /// Minutes to wait after the upstream completes.
        delay_minutes: u32,
    },
}

impl JobRule {
    pub fn is_root(&self) -> bool {
        matches!(self.kind, RuleKind::Root { .. })
    }

    pub fn upstream(&self) -> &[JobId] {
        match &self.kind {
            RuleKind::Root { .. } => &[],
            RuleKind::Dependent { upstream, .. } => upstream,
        }
    }
}

/// A rule row that was left out of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFault {
    pub row: usize,
    pub job_id: String,
    pub kind: FaultKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultKind {
    /// A column could not be parsed.
    Malformed {
        field: &'static str,
        value: String,
        reason: String,
    },
    /// The row waits on a job id that no surviving row defines.
    DanglingDependency { upstream: JobId },
}

impl fmt::Display for RuleFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FaultKind::Malformed {
                field,
                value,
                reason,
            } => write!(
                f,
                "row {} (job '{}'): invalid {field} '{value}': {reason}",
                self.row, self.job_id
            ),
            FaultKind::DanglingDependency { upstream } => write!(
                f,
                "row {} (job '{}'): depends on unknown job '{upstream}'",
                self.row, self.job_id
            ),
        }
    }
}

impl std::error::Error for RuleFault {}
