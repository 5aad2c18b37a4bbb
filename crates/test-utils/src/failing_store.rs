use std::collections::BTreeSet;

use anyhow::anyhow;
use chrono::NaiveDate;

use opsched::errors::{OpschedError, Result};
use opsched::rules::RawJobRule;
use opsched::store::{MemoryStore, TimetableStore};
use opsched::timetable::{PublicHoliday, ResolvedOccurrence};
use opsched::types::JobId;

/// Which store call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    LoadRules,
    Insert,
    Delete,
}

/// A [`MemoryStore`] wrapper that fails one kind of call.
///
/// Failing calls leave the inner store untouched, like a rolled back
/// transaction.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_on: FailOn,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_on: FailOn) -> Self {
        Self { inner, fail_on }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, call: FailOn) -> Result<()> {
        if self.fail_on == call {
            return Err(OpschedError::Other(anyhow!("injected storage failure on {call:?}")));
        }
        Ok(())
    }
}

impl TimetableStore for FailingStore {
    fn load_rules(&self) -> Result<Vec<RawJobRule>> {
        self.check(FailOn::LoadRules)?;
        self.inner.load_rules()
    }

    fn holiday_excluded_jobs(&self) -> Result<BTreeSet<JobId>> {
        self.inner.holiday_excluded_jobs()
    }

    fn public_holidays(&self) -> Result<Vec<PublicHoliday>> {
        self.inner.public_holidays()
    }

    fn occurrences(&self) -> Result<Vec<ResolvedOccurrence>> {
        self.inner.occurrences()
    }

    fn clear_occurrences(&mut self) -> Result<usize> {
        self.inner.clear_occurrences()
    }

    fn insert_occurrences(&mut self, occurrences: &[ResolvedOccurrence]) -> Result<usize> {
        self.check(FailOn::Insert)?;
        self.inner.insert_occurrences(occurrences)
    }

    fn delete_on_holidays(
        &mut self,
        jobs: &BTreeSet<JobId>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<ResolvedOccurrence>> {
        self.check(FailOn::Delete)?;
        self.inner.delete_on_holidays(jobs, dates)
    }
}
