// src/timetable/expander.rs

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::dag::{Resolution, Track};
use crate::errors::Result;
use crate::timetable::occurrence::ResolvedOccurrence;
use crate::types::window_end;

/// Replicate every resolved track across the window.
///
/// Each track runs on a set of chain days. A root's chain days are the
/// dates from its anchor up to `today + window_days` that fall inside its
/// validity window and on one of its weekdays. A dependent's chain days are
/// the days on which every one of its upstream tracks runs and its own rule
/// is still valid. On chain day `D` a track is shifted by `D - run_date`
/// whole days; time of day is untouched.
///
/// Output is ordered by series, start, then job id. Occurrences colliding
/// on the primary key are emitted once.
pub fn expand(resolution: &Resolution, today: NaiveDate, window_days: u32) -> Result<Vec<ResolvedOccurrence>> {
    let horizon = window_end(today, window_days)?;

    // Parents are always pushed before their dependents, so one pass in
    // track order sees every parent's days first.
    let mut chain_days: Vec<BTreeSet<NaiveDate>> = Vec::with_capacity(resolution.len());
    for track in resolution.tracks() {
        let days = if track.parents.is_empty() {
            root_days(track, horizon)
        } else {
            dependent_days(track, &chain_days)
        };
        chain_days.push(days);
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for (track, days) in resolution.tracks().iter().zip(&chain_days) {
        for &day in days {
            let shift = day - track.run_date;

            let occurrence = ResolvedOccurrence {
                series_id: track.series_id.clone(),
                job_id: track.job_id.clone(),
                start_run_datetime: track.start + shift,
                end_run_datetime: track.end + shift,
                dependent_job_id: track.dependent_job_id(),
            };

            if seen.insert(occurrence.key()) {
                out.push(occurrence);
            } else {
                debug!(
                    job = %track.job_id,
                    start = %occurrence.start_str(),
                    "duplicate occurrence from another rule variant; skipping"
                );
            }
        }
    }

    out.sort_by(|a, b| {
        (&a.series_id, a.start_run_datetime, &a.job_id).cmp(&(&b.series_id, b.start_run_datetime, &b.job_id))
    });

    info!(
        tracks = resolution.len(),
        occurrences = out.len(),
        window_days,
        "expanded timetable"
    );

    Ok(out)
}

fn root_days(root: &Track, horizon: NaiveDate) -> BTreeSet<NaiveDate> {
    root.run_date
        .iter_days()
        .take_while(|day| *day < horizon)
        .filter(|day| root.valid_on(*day) && root.recurrence.contains(day.weekday()))
        .collect()
}

fn dependent_days(track: &Track, chain_days: &[BTreeSet<NaiveDate>]) -> BTreeSet<NaiveDate> {
    let mut parents = track.parents.iter().map(|&id| &chain_days[id]);
    let Some(first) = parents.next() else {
        return BTreeSet::new();
    };

    let mut days = first.clone();
    for other in parents {
        days.retain(|day| other.contains(day));
    }
    days.retain(|day| track.valid_on(*day));
    days
}
