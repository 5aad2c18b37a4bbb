// src/engine/runtime.rs

//! Storage-facing shell around the planning core.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::engine::core::{plan_timetable, Plan};
use crate::errors::Result;
use crate::rules::RuleFault;
use crate::store::TimetableStore;
use crate::timetable::{holidays_in_window, HolidayReport};

/// Outcome of a successful [`Engine::generate_timetable`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Occurrences written.
    pub written: usize,
    /// Rule rows that were left out, by row.
    pub skipped: Vec<RuleFault>,
}

/// Runs generation and holiday passes against a [`TimetableStore`].
///
/// `today` is injected so runs are reproducible. The engine assumes it has
/// the occurrence table to itself for the duration of a call; callers
/// serialize concurrent runs.
#[derive(Debug)]
pub struct Engine<S: TimetableStore> {
    store: S,
    today: NaiveDate,
}

impl<S: TimetableStore> Engine<S> {
    pub fn new(store: S, today: NaiveDate) -> Self {
        Self { store, today }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Compute the timetable without writing it.
    pub fn plan(&self, window_days: u32) -> Result<Plan> {
        let raw = self.store.load_rules()?;
        plan_timetable(&raw, self.today, window_days)
    }

    /// Plan and persist the timetable for `[today, today + window_days)`.
    ///
    /// All occurrences are computed before the single write, so a resolution
    /// fault writes nothing. The occurrence table is expected to have been
    /// cleared by the caller.
    pub fn generate_timetable(&mut self, window_days: u32) -> Result<GenerationReport> {
        let plan = self.plan(window_days)?;
        self.persist(plan)
    }

    /// Write a plan produced by [`Engine::plan`] in one store transaction.
    pub fn persist(&mut self, plan: Plan) -> Result<GenerationReport> {
        let written = self.store.insert_occurrences(&plan.occurrences)?;

        info!(
            written,
            skipped = plan.skipped.len(),
            "timetable generated"
        );

        Ok(GenerationReport {
            written,
            skipped: plan.skipped,
        })
    }

    /// Delete stored occurrences of holiday-excluded jobs that start on a
    /// public holiday inside `[today, today + window_days)`.
    ///
    /// Re-running is a no-op: the second pass finds nothing to delete.
    pub fn exclude_holidays(&mut self, window_days: u32) -> Result<HolidayReport> {
        let jobs = self.store.holiday_excluded_jobs()?;
        if jobs.is_empty() {
            info!("no jobs are flagged to skip public holidays");
            return Ok(HolidayReport::default());
        }

        let dates = holidays_in_window(&self.store.public_holidays()?, self.today, window_days)?;
        if dates.is_empty() {
            info!(today = %self.today, window_days, "no public holidays in window");
            return Ok(HolidayReport::default());
        }

        debug!(jobs = jobs.len(), holidays = dates.len(), "applying holiday exclusions");

        let deleted = self.store.delete_on_holidays(&jobs, &dates)?;
        let report = HolidayReport::from_deleted(&deleted);

        info!(deleted = report.deleted, "public holiday exclusions applied");
        Ok(report)
    }
}
