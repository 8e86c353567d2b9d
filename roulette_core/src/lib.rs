#![forbid(unsafe_code)]

//! Core domain model and session engine for the Roulette workout system.
//!
//! This crate provides:
//! - Domain types (exercises, difficulties, measure types)
//! - Catalog management and persistence
//! - Tag filtering, the difficulty range table and random selection
//! - The spin/present/complete session state machine and its log
//! - Session achievements

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod ranges;
pub mod filter;
pub mod selector;
pub mod session_log;
pub mod achievements;
pub mod session;
pub mod store;
pub mod app;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::Catalog;
pub use config::Config;
pub use filter::{filter_exercises, TagFilter, TagMatch};
pub use ranges::{amount_range, AmountRange};
pub use selector::select;
pub use session_log::{SessionLog, SessionLogEntry, SessionStats};
pub use session::{Phase, Session, SessionEvent, SessionTiming, Snapshot, SpinOutcome};
pub use store::{ExerciseStore, JsonFileStore, MemoryStore};
pub use app::{App, Intent};
