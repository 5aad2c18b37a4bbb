// src/engine/mod.rs

//! Timetable generation engine.
//!
//! The pure planning core lives in [`core`]; the storage-facing shell that
//! loads rules, writes occurrences and runs the holiday pass is
//! [`runtime::Engine`].

/// Window length used when the caller does not configure one.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Longest window a run accepts (ten years).
pub const MAX_WINDOW_DAYS: u32 = 3660;

pub mod core;
pub mod runtime;

pub use self::core::{plan_timetable, Plan};
pub use runtime::{Engine, GenerationReport};
