// src/rules/mod.rs

//! Job rule rows.
//!
//! - [`model`] holds the raw (all-text) row and the validated [`JobRule`].
//! - [`parse`] turns one into the other, reporting bad rows as [`RuleFault`]s.

pub mod model;
pub mod parse;

pub use model::{FaultKind, JobRule, RawJobRule, RuleFault, RuleKind};
pub use parse::parse_rules;
