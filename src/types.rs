use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate, Weekday};

use crate::errors::{OpschedError, Result};

/// Canonical job id type used throughout the engine.
pub type JobId = String;

/// `YYYYMMDDHHMM`, the persisted occurrence timestamp format.
pub const DATETIME_FORMAT: &str = "%Y%m%d%H%M";

/// `YYYYMMDD`, used for rule validity windows and holiday dates.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// `end_run_date` value meaning "no end".
pub const OPEN_END_SENTINEL: &str = "99999999";

/// Delimiter used when writing multi-valued fields back out.
pub const CANONICAL_DELIMITER: char = ',';

/// First day after the window `[today, today + window_days)`.
///
/// Fails instead of overflowing the calendar for absurd window lengths.
pub fn window_end(today: NaiveDate, window_days: u32) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(u64::from(window_days)))
        .ok_or_else(|| {
            OpschedError::ConfigError(format!(
                "a window of {window_days} days from {today} is out of range"
            ))
        })
}

/// Split a multi-valued text field into its trimmed, non-empty parts.
///
/// Rule tables have been populated with both `,` and `;` over time, so both
/// are accepted on input. Output always uses [`CANONICAL_DELIMITER`].
pub fn split_multi(s: &str) -> impl Iterator<Item = &str> {
    s.split([',', ';']).map(str::trim).filter(|part| !part.is_empty())
}

/// Set of ISO weekdays a root job runs on.
///
/// Bit `n` is set for ISO weekday `n` (1 = Monday .. 7 = Sunday). An empty
/// `days_of_week` column parses to [`WeekdaySet::EVERY_DAY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EVERY_DAY: WeekdaySet = WeekdaySet(0b1111_1110);

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.number_from_monday()) != 0
    }

    pub fn is_every_day(&self) -> bool {
        *self == Self::EVERY_DAY
    }

    /// Days present in both sets. May be empty (a chain that never runs).
    pub fn intersect(&self, other: WeekdaySet) -> WeekdaySet {
        WeekdaySet(self.0 & other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// ISO numbers of the days in this set, ascending.
    pub fn iso_days(&self) -> Vec<u8> {
        (1..=7u8).filter(|n| self.0 & (1 << *n) != 0).collect()
    }
}

impl Default for WeekdaySet {
    fn default() -> Self {
        WeekdaySet::EVERY_DAY
    }
}

impl FromStr for WeekdaySet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut bits = 0u8;
        for part in split_multi(s) {
            match part.parse::<u8>() {
                Ok(n @ 1..=7) => bits |= 1 << n,
                _ => {
                    return Err(format!(
                        "invalid weekday '{part}' (expected 1=Monday .. 7=Sunday)"
                    ));
                }
            }
        }

        if bits == 0 {
            Ok(WeekdaySet::EVERY_DAY)
        } else {
            Ok(WeekdaySet(bits))
        }
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_every_day() {
            return write!(f, "every day");
        }
        if self.is_empty() {
            return write!(f, "never");
        }
        let days: Vec<String> = self.iso_days().iter().map(|d| d.to_string()).collect();
        write!(f, "{}", days.join(";"))
    }
}
