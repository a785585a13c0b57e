//! # qcsim
//!
//! Umbrella library for the `qcsim` binary. The command layer in [`app`] wires
//! configuration, the run context and the scanner together; the member crates
//! are re-exported for integration tests.

pub mod app;

pub use qcsim_core;
pub use qcsim_data;
pub use qcsim_io;
