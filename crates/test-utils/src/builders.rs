#![allow(dead_code)]

use opsched::rules::RawJobRule;
use opsched::store::MemoryStore;

/// Builder for one `RawJobRule` row.
///
/// Defaults: series `S1`, valid from 2026-01-01 with no end date, 30 minute
/// run time, every day, no holiday exclusion.
pub struct RuleBuilder {
    rule: RawJobRule,
}

impl RuleBuilder {
    /// A schedule-driven job starting at `start_time` (`HHMM`).
    pub fn root(job_id: &str, start_time: &str) -> Self {
        let mut builder = Self::base(job_id);
        builder.rule.start_time = start_time.to_string();
        builder
    }

    /// A job that runs `delay` minutes after `upstream` (delimited list).
    pub fn dependent(job_id: &str, upstream: &str, delay: u32) -> Self {
        let mut builder = Self::base(job_id);
        builder.rule.dependent_job_id = upstream.to_string();
        builder.rule.minutes_dependent_job_id = delay.to_string();
        builder
    }

    fn base(job_id: &str) -> Self {
        Self {
            rule: RawJobRule {
                row: 0,
                job_id: job_id.to_string(),
                series_id: "S1".to_string(),
                est_run_time: "30".to_string(),
                start_run_date: "20260101".to_string(),
                end_run_date: String::new(),
                ..Default::default()
            },
        }
    }

    pub fn series(mut self, series_id: &str) -> Self {
        self.rule.series_id = series_id.to_string();
        self
    }

    pub fn run_time(mut self, minutes: u32) -> Self {
        self.rule.est_run_time = minutes.to_string();
        self
    }

    /// Raw `est_run_time` text, for malformed-row tests.
    pub fn run_time_text(mut self, text: &str) -> Self {
        self.rule.est_run_time = text.to_string();
        self
    }

    pub fn valid_from(mut self, yyyymmdd: &str) -> Self {
        self.rule.start_run_date = yyyymmdd.to_string();
        self
    }

    pub fn valid_until(mut self, yyyymmdd: &str) -> Self {
        self.rule.end_run_date = yyyymmdd.to_string();
        self
    }

    /// ISO weekday digits, e.g. `"1;3"` for Monday and Wednesday.
    pub fn days(mut self, days_of_week: &str) -> Self {
        self.rule.days_of_week = days_of_week.to_string();
        self
    }

    pub fn skip_holidays(mut self) -> Self {
        self.rule.exclude_public_holidays = "1".to_string();
        self
    }

    pub fn build(self) -> RawJobRule {
        self.rule
    }
}

/// Builder for a whole rule table, numbered from row 1.
#[derive(Default)]
pub struct RuleSetBuilder {
    rules: Vec<RawJobRule>,
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: RuleBuilder) -> Self {
        let mut rule = rule.build();
        rule.row = self.rules.len() + 1;
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> Vec<RawJobRule> {
        self.rules
    }

    /// Load the rows into a fresh [`MemoryStore`].
    pub fn into_store(self) -> MemoryStore {
        MemoryStore::with_rules(self.rules)
    }
}
