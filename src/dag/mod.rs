// src/dag/mod.rs

//! Dependency graph and time resolution.
//!
//! - [`graph`] turns flat rule rows into a job graph, dropping rows with
//!   dangling dependencies.
//! - [`resolver`] walks the graph in topological order and assigns each rule
//!   row a concrete day-zero start/end.
//! - [`track`] holds the resolved timing types.

pub mod graph;
pub mod resolver;
pub mod track;

pub use graph::{DependencyGraph, TopoOrder};
pub use resolver::resolve;
pub use track::{Resolution, Track, TrackId};
