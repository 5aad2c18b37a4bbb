// src/timetable/mod.rs

//! Materialized timetable.
//!
//! - [`occurrence`] defines the stored row types.
//! - [`expander`] replicates resolved tracks across the rolling window.
//! - [`holiday`] decides which stored rows a holiday pass removes.

pub mod expander;
pub mod holiday;
pub mod occurrence;

pub use expander::expand;
pub use holiday::{falls_on_excluded_holiday, holidays_in_window, HolidayReport};
pub use occurrence::{OccurrenceKey, PublicHoliday, ResolvedOccurrence};
