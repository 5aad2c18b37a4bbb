// tests/property_timetable.rs

mod common;
use crate::common::builders::{RuleBuilder, RuleSetBuilder};
use crate::common::monday;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use opsched::dag::Track;
use opsched::engine::plan_timetable;
use opsched::rules::RawJobRule;
use opsched::timetable::ResolvedOccurrence;
use proptest::prelude::*;

/// Per-job parameters: (upstream picks, delay, run time, start HHMM, weekday mask, valid_from offset).
type JobParams = (Vec<usize>, u32, u32, (u32, u32), u8, u32);

// Strategy to generate an acyclic rule table.
// Job N may only depend on jobs 0..N, so no cycle can form. Roots start
// between 2026-10-15 and 2026-10-28, so chains mix anchors before and
// after today; job_0 may get a second schedule variant.
fn acyclic_rules(max_jobs: usize) -> impl Strategy<Value = Vec<RawJobRule>> {
    let job = (
        proptest::collection::vec(any::<usize>(), 0..3),
        0..120u32,
        1..180u32,
        (0..24u32, 0..60u32),
        1..128u8,
        0..14u32,
    );

    (proptest::collection::vec(job, 1..=max_jobs), any::<bool>()).prop_map(
        |(jobs, second_variant): (Vec<JobParams>, bool)| {
            let mut set = RuleSetBuilder::new();
            for (i, (picks, delay, run, (hh, mm), mask, from)) in jobs.into_iter().enumerate() {
                let name = format!("job_{i}");

                let upstream: BTreeSet<String> = if i == 0 {
                    BTreeSet::new()
                } else {
                    picks.iter().map(|p| format!("job_{}", p % i)).collect()
                };

                if !upstream.is_empty() {
                    let upstream: Vec<String> = upstream.into_iter().collect();
                    set = set.with(RuleBuilder::dependent(&name, &upstream.join(","), delay).run_time(run));
                    continue;
                }

                let days: Vec<String> = (0..7u8)
                    .filter(|bit| mask & (1 << bit) != 0)
                    .map(|bit| (bit + 1).to_string())
                    .collect();
                let valid_from = format!("202610{:02}", 15 + from);
                set = set.with(
                    RuleBuilder::root(&name, &format!("{hh:02}{mm:02}"))
                        .days(&days.join(";"))
                        .valid_from(&valid_from)
                        .run_time(run),
                );
                if i == 0 && second_variant {
                    set = set.with(
                        RuleBuilder::root(&name, &format!("{:02}{mm:02}", (hh + 12) % 24))
                            .valid_from(&valid_from)
                            .run_time(run),
                    );
                }
            }
            set.build()
        },
    )
}

/// Whole days from `from` to `to`, if `to` is `from` shifted by whole days.
fn whole_days(from: NaiveDateTime, to: NaiveDateTime) -> Option<i64> {
    let delta = to - from;
    (delta >= Duration::zero() && delta.num_seconds() % 86_400 == 0).then(|| delta.num_days())
}

/// Does some track of `occ`'s job explain it: on the same chain day every
/// parent track has an occurrence, and `occ` starts at the latest parent
/// end plus the delay?
fn explained_by_parents(
    occ: &ResolvedOccurrence,
    tracks: &[&Track],
    all: &[Track],
    by_key: &HashMap<(String, NaiveDateTime), &ResolvedOccurrence>,
    delay: Duration,
) -> bool {
    tracks.iter().any(|track| {
        let Some(shift) = whole_days(track.start, occ.start_run_datetime) else {
            return false;
        };
        let chain_day = track.run_date + Duration::days(shift);

        let mut latest = None;
        for &parent_id in &track.parents {
            let parent = &all[parent_id];
            let parent_start = parent.start + (chain_day - parent.run_date);
            let Some(up) = by_key.get(&(parent.job_id.clone(), parent_start)) else {
                return false;
            };
            latest = latest.max(Some(up.end_run_datetime + delay));
        }
        latest == Some(occ.start_run_datetime)
    })
}

proptest! {
    #[test]
    fn generated_timetables_respect_dependencies(
        rules in acyclic_rules(8),
        window in 14..21u32,
    ) {
        let plan = plan_timetable(&rules, monday(), window).unwrap();
        let horizon = monday() + Duration::days(i64::from(window));

        let delay_by_job: BTreeMap<&str, Duration> = rules
            .iter()
            .filter(|r| !r.dependent_job_id.is_empty())
            .map(|r| {
                let minutes = r.minutes_dependent_job_id.parse::<i64>().unwrap();
                (r.job_id.as_str(), Duration::minutes(minutes))
            })
            .collect();

        let mut keys = HashSet::new();
        let mut by_key = HashMap::new();
        for occ in &plan.occurrences {
            // End never precedes start.
            prop_assert!(occ.end_run_datetime >= occ.start_run_datetime);
            // Primary key is unique.
            prop_assert!(keys.insert(occ.key()));
            // Roots only start inside the window.
            if occ.dependent_job_id.is_empty() {
                prop_assert!(occ.start_date() >= monday());
                prop_assert!(occ.start_date() < horizon);
            }
            by_key.insert((occ.job_id.clone(), occ.start_run_datetime), occ);
        }

        // Every dependent occurrence is matched by its upstream occurrences
        // on the same chain day: all of them run, and it starts at the
        // latest of their ends plus the delay.
        let all = plan.resolution.tracks();
        for occ in plan.occurrences.iter().filter(|o| !o.dependent_job_id.is_empty()) {
            let tracks: Vec<&Track> = plan
                .resolution
                .tracks_of(&occ.job_id)
                .iter()
                .map(|&id| plan.resolution.track(id))
                .collect();
            let delay = delay_by_job[occ.job_id.as_str()];
            prop_assert!(
                explained_by_parents(occ, &tracks, all, &by_key, delay),
                "{} at {} has no matching upstream runs on its chain day",
                occ.job_id,
                occ.start_str()
            );
        }

        // Output is sorted by series, start, job.
        let sorted = plan.occurrences.windows(2).all(|w| {
            (&w[0].series_id, w[0].start_run_datetime, &w[0].job_id)
                <= (&w[1].series_id, w[1].start_run_datetime, &w[1].job_id)
        });
        prop_assert!(sorted);
    }
}
