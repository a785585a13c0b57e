//! The run's shared cycle counter, stored as `panel_state.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PANEL_FILE: &str = "panel_state.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelState {
    /// Last fully persisted cycle.
    pub cycle: u64,
    /// Seed of the most recent seeded cycle, if any.
    #[serde(default)]
    pub seed: Option<u64>,
    pub last_updated: DateTime<Utc>,
    /// Snapshot file of `cycle`, relative to the run directory.
    pub latest_snapshot: String,
    pub config_fingerprint: String,
}

impl PanelState {
    #[must_use]
    pub fn new(cycle: u64, seed: Option<u64>, config_fingerprint: String) -> Self {
        Self {
            cycle,
            seed,
            last_updated: Utc::now(),
            latest_snapshot: snapshot_name(cycle),
            config_fingerprint,
        }
    }
}

/// Relative path of the snapshot file for `cycle`.
#[must_use]
pub fn snapshot_name(cycle: u64) -> String {
    format!("civilization/cycle_{cycle}.json")
}
