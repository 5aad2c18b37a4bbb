// src/store/mod.rs

//! Storage abstraction for rule input and occurrence output.
//!
//! The engine only talks to [`TimetableStore`]. [`SqliteStore`] is the
//! production adapter; [`MemoryStore`] keeps everything in process and is
//! used by tests and dry runs.

use std::collections::BTreeSet;
use std::fmt::Debug;

use chrono::NaiveDate;

use crate::errors::Result;
use crate::rules::RawJobRule;
use crate::timetable::{PublicHoliday, ResolvedOccurrence};
use crate::types::JobId;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{init_db, SqliteStore};

/// Relational store the engine reads rules from and writes occurrences to.
///
/// Write methods are all-or-nothing: on error nothing from that call is
/// persisted. Errors are passed through unchanged; the engine never retries.
pub trait TimetableStore: Debug {
    /// Every rule row, in table order.
    fn load_rules(&self) -> Result<Vec<RawJobRule>>;

    /// Job ids flagged to skip public holidays, from the job master data and
    /// from the rule rows.
    fn holiday_excluded_jobs(&self) -> Result<BTreeSet<JobId>>;

    /// Every declared public holiday.
    fn public_holidays(&self) -> Result<Vec<PublicHoliday>>;

    /// Every stored occurrence, ordered by series, start, job.
    fn occurrences(&self) -> Result<Vec<ResolvedOccurrence>>;

    /// Remove all stored occurrences; returns how many were removed.
    fn clear_occurrences(&mut self) -> Result<usize>;

    /// Append occurrences in one transaction; returns how many were written.
    fn insert_occurrences(&mut self, occurrences: &[ResolvedOccurrence]) -> Result<usize>;

    /// Delete occurrences of `jobs` starting on any of `dates`, in one
    /// transaction. Returns the deleted rows.
    fn delete_on_holidays(
        &mut self,
        jobs: &BTreeSet<JobId>,
        dates: &BTreeSet<NaiveDate>,
    ) -> Result<Vec<ResolvedOccurrence>>;
}
