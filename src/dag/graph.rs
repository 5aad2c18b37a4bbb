// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, warn};

use crate::rules::{FaultKind, JobRule, RuleFault};
use crate::types::JobId;

/// Job dependency graph built once from the flat rule rows.
///
/// One node per job id. Edge direction is upstream -> dependent, so for a
/// row of job `B` with `dependent_job_id = "A"` we add edge `A -> B`.
/// A job may own several rule rows (schedule variants); they all hang off
/// the same node.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<JobId, ()>,
    index: BTreeMap<JobId, NodeIndex>,
    rules: BTreeMap<JobId, Vec<JobRule>>,
}

/// Result of a topological pass over the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopoOrder {
    /// Jobs in an order where every upstream precedes its dependents.
    pub order: Vec<JobId>,
    /// Jobs on a cycle, or downstream of one. Sorted.
    pub blocked: Vec<JobId>,
}

impl DependencyGraph {
    /// Build the graph from validated rows.
    ///
    /// Rows that wait on a job id no surviving row defines are dropped and
    /// returned as [`FaultKind::DanglingDependency`] faults. Dropping a row
    /// can orphan rows that depended on it, so the check repeats until
    /// nothing more is dropped.
    pub fn build(rules: Vec<JobRule>) -> (Self, Vec<RuleFault>) {
        let mut kept = rules;
        let mut faults = Vec::new();

        loop {
            let known: BTreeSet<JobId> = kept.iter().map(|r| r.job_id.clone()).collect();
            let (ok, dangling): (Vec<JobRule>, Vec<JobRule>) = kept
                .into_iter()
                .partition(|r| r.upstream().iter().all(|up| known.contains(up)));

            for rule in &dangling {
                for up in rule.upstream().iter().filter(|up| !known.contains(*up)) {
                    debug!(
                        job = %rule.job_id,
                        row = rule.row,
                        upstream = %up,
                        "dangling dependency; dropping rule row"
                    );
                    faults.push(RuleFault {
                        row: rule.row,
                        job_id: rule.job_id.clone(),
                        kind: FaultKind::DanglingDependency {
                            upstream: up.clone(),
                        },
                    });
                }
            }

            kept = ok;
            if dangling.is_empty() {
                break;
            }
        }

        (Self::from_rules(kept), faults)
    }

    fn from_rules(rules: Vec<JobRule>) -> Self {
        let mut graph = DiGraph::new();
        let mut index = BTreeMap::new();
        let mut by_job: BTreeMap<JobId, Vec<JobRule>> = BTreeMap::new();

        // First pass: one node per job id.
        for rule in &rules {
            index
                .entry(rule.job_id.clone())
                .or_insert_with(|| graph.add_node(rule.job_id.clone()));
        }

        // Second pass: edges upstream -> dependent, deduplicated.
        for rule in rules {
            let to = index[&rule.job_id];
            for up in rule.upstream() {
                let from = index[up];
                graph.update_edge(from, to, ());
            }
            by_job.entry(rule.job_id.clone()).or_default().push(rule);
        }

        debug!(
            jobs = graph.node_count(),
            edges = graph.edge_count(),
            "built dependency graph"
        );

        Self {
            graph,
            index,
            rules: by_job,
        }
    }

    pub fn job_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every surviving rule row, grouped by job id.
    pub fn rules(&self) -> impl Iterator<Item = &JobRule> {
        self.rules.values().flatten()
    }

    /// Rule rows declared for `job`.
    pub fn rules_of(&self, job: &str) -> &[JobRule] {
        self.rules.get(job).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rows without dependencies.
    pub fn root_rules(&self) -> impl Iterator<Item = &JobRule> {
        self.rules().filter(|r| r.is_root())
    }

    /// Rows driven by other jobs' completion.
    pub fn dependent_rules(&self) -> impl Iterator<Item = &JobRule> {
        self.rules().filter(|r| !r.is_root())
    }

    /// Immediate upstream jobs of `job`, sorted.
    pub fn dependencies_of(&self, job: &str) -> Vec<&str> {
        self.neighbors(job, Direction::Incoming)
    }

    /// Immediate downstream jobs of `job`, sorted.
    pub fn dependents_of(&self, job: &str) -> Vec<&str> {
        self.neighbors(job, Direction::Outgoing)
    }

    fn neighbors(&self, job: &str, dir: Direction) -> Vec<&str> {
        let Some(&node) = self.index.get(job) else {
            return Vec::new();
        };
        let mut out: Vec<&str> = self
            .graph
            .neighbors_directed(node, dir)
            .map(|n| self.graph[n].as_str())
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Kahn's algorithm over the job graph.
    ///
    /// Ties are broken by job id so the order is deterministic. Nodes that
    /// never reach in-degree zero (cycles, self-dependencies and everything
    /// downstream of them) are returned in [`TopoOrder::blocked`].
    pub fn topo_order(&self) -> TopoOrder {
        let mut in_degree: BTreeMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|n| (n, self.graph.neighbors_directed(n, Direction::Incoming).count()))
            .collect();

        let mut ready: VecDeque<NodeIndex> = self
            .index
            .values()
            .copied()
            .filter(|n| in_degree[n] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());

        while let Some(node) = ready.pop_front() {
            order.push(self.graph[node].clone());

            let mut next: Vec<NodeIndex> = Vec::new();
            for succ in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if let Some(deg) = in_degree.get_mut(&succ) {
                    *deg -= 1;
                    if *deg == 0 {
                        next.push(succ);
                    }
                }
            }
            next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            ready.extend(next);
        }

        let done: BTreeSet<&str> = order.iter().map(|s| s.as_str()).collect();
        let blocked: Vec<JobId> = self
            .index
            .keys()
            .filter(|job| !done.contains(job.as_str()))
            .cloned()
            .collect();

        if !blocked.is_empty() {
            warn!(?blocked, "dependency cycle detected");
        }

        TopoOrder { order, blocked }
    }
}
