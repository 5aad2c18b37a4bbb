// src/dag/track.rs

//! Resolved "day zero" timing for one rule row.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{JobId, WeekdaySet, CANONICAL_DELIMITER};

/// Index of a track inside a [`Resolution`].
pub type TrackId = usize;

/// Concrete start/end for one rule row on the first day it can run.
///
/// The window expander replicates a track across the window by shifting it
/// by whole days; every field here is invariant under that shift except the
/// timestamps and `run_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub job_id: JobId,
    pub series_id: String,
    /// Source row of the rule this track was resolved from.
    pub row: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Calendar day of the chain this track belongs to. For a root this is
    /// its anchor date; for a dependent, the latest run date of its
    /// upstream tracks. A dependent may start after midnight of this day.
    pub run_date: NaiveDate,
    /// Validity window of the source rule.
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    /// Upstream job ids this track waited on. Empty for roots.
    pub upstream: BTreeSet<JobId>,
    /// The upstream tracks this one was timed from, one per upstream job.
    pub parents: Vec<TrackId>,
    /// Root tracks at the head of this track's chain. A root lists itself.
    pub heads: BTreeSet<TrackId>,
    /// Weekdays the whole chain runs on (intersection over the heads).
    pub recurrence: WeekdaySet,
}

impl Track {
    pub fn is_root(&self) -> bool {
        self.upstream.is_empty()
    }

    /// Same source row timed the same way for the same chain.
    pub fn same_timing(&self, other: &Track) -> bool {
        self.row == other.row
            && self.start == other.start
            && self.end == other.end
            && self.run_date == other.run_date
            && self.heads == other.heads
    }

    pub fn valid_on(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_until.is_none_or(|end| date <= end)
    }

    /// Upstream ids joined with the canonical delimiter.
    pub fn dependent_job_id(&self) -> String {
        let delim = CANONICAL_DELIMITER.to_string();
        self.upstream
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(&delim)
    }
}

/// Output of the time resolver: every resolved track, indexed by job.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    tracks: Vec<Track>,
    by_job: BTreeMap<JobId, Vec<TrackId>>,
}

impl Resolution {
    pub(crate) fn push(&mut self, track: Track) -> TrackId {
        let id = self.tracks.len();
        self.by_job.entry(track.job_id.clone()).or_default().push(id);
        self.tracks.push(track);
        id
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> &Track {
        &self.tracks[id]
    }

    /// Tracks resolved for `job` (empty if it did not resolve).
    pub fn tracks_of(&self, job: &str) -> &[TrackId] {
        self.by_job.get(job).map(|t| t.as_slice()).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }
}
