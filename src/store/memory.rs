// src/store/memory.rs

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

use super::TimetableStore;
use crate::errors::{OpschedError, Result};
use crate::rules::parse::parse_flag;
use crate::rules::RawJobRule;
use crate::timetable::{falls_on_excluded_holiday, OccurrenceKey, PublicHoliday, ResolvedOccurrence};
use crate::types::JobId;

#[derive(Debug, Default)]
struct Tables {
    rules: Vec<RawJobRule>,
    /// `JOB.exclude_ph` per job id.
    job_flags: BTreeMap<JobId, bool>,
    holidays: BTreeSet<PublicHoliday>,
    occurrences: BTreeMap<OccurrenceKey, ResolvedOccurrence>,
}

/// In-process [`TimetableStore`].
///
/// Clones share the same tables, so a test can hand one clone to the engine
/// and inspect the other afterwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-loaded with `rules`, numbering rows from 1.
    pub fn with_rules(rules: impl IntoIterator<Item = RawJobRule>) -> Self {
        let store = Self::new();
        for rule in rules {
            store.add_rule(rule);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_rule(&self, mut rule: RawJobRule) {
        let mut tables = self.lock();
        rule.row = tables.rules.len() + 1;
        tables.rules.push(rule);
    }

    pub fn add_holiday(&self, date: NaiveDate) {
        self.lock().holidays.insert(PublicHoliday::new(date));
    }

    pub fn set_job_exclude_ph(&self, job_id: &str, exclude: bool) {
        self.lock().job_flags.insert(job_id.to_string(), exclude);
    }

    pub fn occurrence_count(&self) -> usize {
        self.lock().occurrences.len()
    }
}

impl TimetableStore for MemoryStore {
    fn load_rules(&self) -> Result<Vec<RawJobRule>> {
        Ok(self.lock().rules.clone())
    }

    fn holiday_excluded_jobs(&self) -> Result<BTreeSet<JobId>> {
        let tables = self.lock();
        let from_jobs = tables
            .job_flags
            .iter()
            .filter(|(_, exclude)| **exclude)
            .map(|(job, _)| job.clone());
        let from_rules = tables
            .rules
            .iter()
            .filter(|r| parse_flag(&r.exclude_public_holidays))
            .map(|r| r.job_id.trim().to_string());
        Ok(from_jobs.chain(from_rules).collect())
    }

    fn public_holidays(&self) -> Result<Vec<PublicHoliday>> {
        Ok(self.lock().holidays.iter().copied().collect())
    }

    fn occurrences(&self) -> Result<Vec<ResolvedOccurrence>> {
        let mut out: Vec<ResolvedOccurrence> = self.lock().occurrences.values().cloned().collect();
        out.sort_by(|a, b| {
            (&a.series_id, a.start_run_datetime, &a.job_id).cmp(&(&b.series_id, b.start_run_datetime, &b.job_id))
        });
        Ok(out)
    }

    fn clear_occurrences(&mut self) -> Result<usize> {
        let mut tables = self.lock();
        let n = tables.occurrences.len();
        tables.occurrences.clear();
        Ok(n)
    }

    fn insert_occurrences(&mut self, occurrences: &[ResolvedOccurrence]) -> Result<usize> {
        let mut tables = self.lock();

        // Check every key first so a conflict leaves the table untouched.
        let mut batch = BTreeSet::new();
        for occ in occurrences {
            let key = occ.key();
            if tables.occurrences.contains_key(&key) || !batch.insert(key) {
                return Err(OpschedError::DuplicateOccurrence {
                    series_id: occ.series_id.clone(),
                    job_id: occ.job_id.clone(),
                    start_run_datetime: occ.start_str(),
                });
            }
        }

        for occ in occurrences {
            tables.occurrences.insert(occ.key(), occ.clone());
        }
        Ok(occurrences.len())
    }

    fn delete_on_holidays(
        &mut self,
        jobs: &BTreeSet<JobId>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<ResolvedOccurrence>> {
        let mut tables = self.lock();
        let mut deleted = Vec::new();
        tables.occurrences.retain(|_, occ| {
            if falls_on_excluded_holiday(occ, jobs, dates) {
                deleted.push(occ.clone());
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }
}
