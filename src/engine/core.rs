// src/engine/core.rs

//! Pure planning core.
//!
//! Turns raw rule rows into a complete, ordered list of occurrences without
//! touching storage. The IO shell ([`crate::engine::runtime::Engine`]) feeds
//! it rows from a store and persists the result; dry runs print it instead.
//!
//! Nothing in here performs IO, so it is tested directly with in-memory rows.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::dag::{resolve, DependencyGraph, Resolution};
use crate::engine::MAX_WINDOW_DAYS;
use crate::errors::{OpschedError, Result};
use crate::rules::{parse_rules, RawJobRule, RuleFault};
use crate::timetable::{expand, ResolvedOccurrence};

/// Everything one generation run computes before it writes.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Occurrences to persist, ordered by series, start, job.
    pub occurrences: Vec<ResolvedOccurrence>,
    /// Rule rows left out of the run (malformed or dangling), by row.
    pub skipped: Vec<RuleFault>,
    /// Day-zero timings the occurrences were expanded from.
    pub resolution: Resolution,
}

/// Parse, build the graph, resolve and expand.
///
/// Fails with [`OpschedError::EmptyRuleSet`] when there is nothing to plan
/// and with [`OpschedError::Unresolvable`] when dependencies cannot all be
/// timed. Bad rows are skipped and reported in [`Plan::skipped`].
pub fn plan_timetable(raw: &[RawJobRule], today: NaiveDate, window_days: u32) -> Result<Plan> {
    if window_days == 0 || window_days > MAX_WINDOW_DAYS {
        return Err(OpschedError::ConfigError(format!(
            "window_days must be between 1 and {MAX_WINDOW_DAYS} (got {window_days})"
        )));
    }

    if raw.is_empty() {
        return Err(OpschedError::EmptyRuleSet(
            "the rule table has no rows".to_string(),
        ));
    }

    let (rules, mut skipped) = parse_rules(raw);
    let (graph, dangling) = DependencyGraph::build(rules);
    skipped.extend(dangling);
    skipped.sort_by_key(|f| f.row);

    if graph.job_count() == 0 {
        return Err(OpschedError::EmptyRuleSet(format!(
            "all {} rule rows were rejected",
            raw.len()
        )));
    }

    if !skipped.is_empty() {
        warn!(
            skipped = skipped.len(),
            total = raw.len(),
            "some rule rows were skipped"
        );
    }

    info!(
        %today,
        window_days,
        roots = graph.root_rules().count(),
        dependents = graph.dependent_rules().count(),
        edges = graph.edge_count(),
        "planning timetable"
    );

    let resolution = resolve(&graph, today, window_days)?;
    let occurrences = expand(&resolution, today, window_days)?;

    Ok(Plan {
        occurrences,
        skipped,
        resolution,
    })
}
