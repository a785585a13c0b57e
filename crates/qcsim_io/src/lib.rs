//! # qcsim IO
//!
//! Persistence layer for qcsim runs.
//!
//! This crate provides:
//! - Structured error handling with [`IoError`] and [`ErrorKind`]
//! - JSON helpers with atomic replace and create-only publishing
//! - The exclusive run lock
//! - The run directory layout, state loading and recovery
//! - [`RunContext`], the single writer of a run
//! - The append-only event log

/// Error types and result aliases for I/O operations
pub mod error;
/// Run event log (`events.jsonl`)
pub mod history;
/// Exclusive run-directory lock
pub mod lock;
/// Panel state, the run's cycle counter
pub mod panel;
/// Run directory layout, loading and the run context
pub mod run;
/// Validated serialization helpers for JSON files
pub mod serialization;

pub use error::{ErrorKind, IoError, Result};
pub use history::{read_events, EventLog, RunEvent};
pub use panel::PanelState;
pub use run::{load_state, read_status, CycleOutcome, LoadedState, RunContext, RunLayout, RunStatus};
pub use serialization::{
    publish_json_file, read_json_file, to_json_pretty, write_json_file, Publish,
};
