//! # qcsim core
//!
//! Deterministic simulation and scoring logic for qcsim:
//! - Metric primitives over text and numeric samples
//! - Ordered first-match-wins classifiers with recommended moves
//! - The cycle engine with injectable perturbation sources
//! - The Universal Collapse Scanner
//! - Report analysis and markdown rendering
//! - Configuration and logging setup
//!
//! Nothing here touches the filesystem except [`config::AppConfig::load`];
//! run persistence lives in `qcsim_io`.
//!
//! ## Example
//!
//! ```
//! use qcsim_core::classifier::{route, Region};
//! use qcsim_core::metrics::TextMetrics;
//!
//! let metrics = TextMetrics::measure("");
//! assert_eq!(route(&metrics), Region::Rigid);
//! ```

/// Ordered classifiers, category labels and move tables
pub mod classifier;
/// Toy phase-to-eigenvalue collapse
pub mod collapse;
/// Configuration management for simulation parameters
pub mod config;
/// Pure cycle step and perturbation sources
pub mod engine;
/// Text and numeric metric primitives
pub mod metrics;
/// Civilization analysis and report rendering
pub mod report;
/// Crisis indices and geometry routing
pub mod scanner;
/// Logging setup
pub mod telemetry;

pub use classifier::{Ladder, Move, Region};
pub use config::AppConfig;
pub use engine::{NullPerturbation, PerturbationSource, SeededPerturbation, SimState};
pub use metrics::TextMetrics;
pub use telemetry::init_logging;
