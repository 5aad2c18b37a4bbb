// src/dag/resolver.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::dag::graph::DependencyGraph;
use crate::dag::track::{Resolution, Track, TrackId};
use crate::errors::{OpschedError, Result};
use crate::rules::{JobRule, RuleKind};
use crate::types::{window_end, JobId, WeekdaySet};

/// Assign a concrete day-zero start/end to every rule row in the graph.
///
/// Roots whose validity window overlaps `[today, today + window_days)` are
/// anchored at `max(start_run_date, today)`. Dependents are visited in
/// topological order; each one starts at the latest `upstream end + delay`
/// over all of its upstream jobs, with every upstream taken on the same
/// chain day.
///
/// When a root job has several schedule variants, each variant starts its
/// own chain. A dependent gets one track per consistent choice of variants,
/// never one that mixes two variants of the same root job.
///
/// Any dependent that cannot be timed (a cycle, or an upstream job that has
/// no resolved track) fails the whole run with
/// [`OpschedError::Unresolvable`].
pub fn resolve(graph: &DependencyGraph, today: NaiveDate, window_days: u32) -> Result<Resolution> {
    let horizon = window_end(today, window_days)?;
    let topo = graph.topo_order();

    let mut resolution = Resolution::default();
    let mut stuck: BTreeSet<JobId> = topo.blocked.iter().cloned().collect();

    for job in &topo.order {
        for rule in graph.rules_of(job) {
            match &rule.kind {
                RuleKind::Root {
                    start_time,
                    days_of_week,
                } => {
                    if rule.start_run_date >= horizon || rule.end_run_date.is_some_and(|end| end < today) {
                        debug!(
                            job = %rule.job_id,
                            row = rule.row,
                            "root rule not valid inside the window; skipping"
                        );
                        continue;
                    }

                    let anchor = rule.start_run_date.max(today);
                    let start = anchor.and_time(*start_time);
                    let end = start + Duration::minutes(i64::from(rule.est_run_time));
                    let id = resolution.tracks().len();

                    resolution.push(Track {
                        job_id: rule.job_id.clone(),
                        series_id: rule.series_id.clone(),
                        row: rule.row,
                        start,
                        end,
                        run_date: anchor,
                        valid_from: rule.start_run_date,
                        valid_until: rule.end_run_date,
                        upstream: BTreeSet::new(),
                        parents: Vec::new(),
                        heads: BTreeSet::from([id]),
                        recurrence: *days_of_week,
                    });
                }
                RuleKind::Dependent {
                    upstream,
                    delay_minutes,
                } => {
                    let upstream_tracks: Vec<&[TrackId]> =
                        upstream.iter().map(|up| resolution.tracks_of(up)).collect();

                    if upstream_tracks.iter().any(|t| t.is_empty()) {
                        let missing: Vec<&str> = upstream
                            .iter()
                            .filter(|up| resolution.tracks_of(up).is_empty())
                            .map(String::as_str)
                            .collect();
                        warn!(
                            job = %rule.job_id,
                            row = rule.row,
                            ?missing,
                            "upstream job never resolved"
                        );
                        stuck.insert(rule.job_id.clone());
                        continue;
                    }

                    for combo in consistent_combinations(&resolution, &upstream_tracks) {
                        let Some(track) = aggregate(&resolution, rule, &combo, *delay_minutes) else {
                            continue;
                        };
                        let duplicate = resolution
                            .tracks_of(&track.job_id)
                            .iter()
                            .any(|&id| resolution.track(id).same_timing(&track));
                        if !duplicate {
                            resolution.push(track);
                        }
                    }
                }
            }
        }
    }

    if !stuck.is_empty() {
        let stuck: Vec<JobId> = stuck.into_iter().collect();
        warn!(?stuck, "dependency resolution failed");
        return Err(OpschedError::Unresolvable { stuck });
    }

    info!(
        jobs = graph.job_count(),
        tracks = resolution.len(),
        "resolved day-zero timings"
    );

    Ok(resolution)
}

/// Reconcile one dependent row against one track of each upstream job.
///
/// The chain day is the latest run date among the parents; every parent is
/// moved onto that day before its `end + delay` is taken, and the job waits
/// for all of them. Returns `None` for an empty combination.
fn aggregate(resolution: &Resolution, rule: &JobRule, combo: &[TrackId], delay_minutes: u32) -> Option<Track> {
    let delay = Duration::minutes(i64::from(delay_minutes));

    let parents: Vec<&Track> = combo.iter().map(|&id| resolution.track(id)).collect();
    let run_date = parents.iter().map(|p| p.run_date).max()?;
    let start = parents
        .iter()
        .map(|p| p.end + (run_date - p.run_date) + delay)
        .max()?;
    let end = start + Duration::minutes(i64::from(rule.est_run_time));

    let mut heads = BTreeSet::new();
    let mut recurrence = WeekdaySet::EVERY_DAY;
    for parent in &parents {
        heads.extend(parent.heads.iter().copied());
        recurrence = recurrence.intersect(parent.recurrence);
    }

    debug!(
        job = %rule.job_id,
        row = rule.row,
        %start,
        %end,
        "resolved dependent"
    );

    Some(Track {
        job_id: rule.job_id.clone(),
        series_id: rule.series_id.clone(),
        row: rule.row,
        start,
        end,
        run_date,
        valid_from: rule.start_run_date,
        valid_until: rule.end_run_date,
        upstream: rule.upstream().iter().cloned().collect(),
        parents: combo.to_vec(),
        heads,
        recurrence,
    })
}

/// Pick one track per upstream job, keeping only picks whose chains agree
/// on which variant of each root job they descend from.
///
/// Combinations are pruned as they are built, so the result is bounded by
/// the number of root variant choices rather than by the product of all
/// upstream track counts.
fn consistent_combinations(resolution: &Resolution, lists: &[&[TrackId]]) -> Vec<Vec<TrackId>> {
    let mut combos: Vec<(Vec<TrackId>, BTreeMap<&str, TrackId>)> = vec![(Vec::new(), BTreeMap::new())];

    for list in lists {
        let mut next = Vec::new();
        for (picked, roots) in &combos {
            for &id in *list {
                let mut roots = roots.clone();
                let consistent = resolution.track(id).heads.iter().all(|&head| {
                    let root_job = resolution.track(head).job_id.as_str();
                    *roots.entry(root_job).or_insert(head) == head
                });
                if consistent {
                    let mut picked = picked.clone();
                    picked.push(id);
                    next.push((picked, roots));
                }
            }
        }
        combos = next;
    }

    combos.into_iter().map(|(picked, _)| picked).collect()
}
