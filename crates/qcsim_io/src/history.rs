//! Append-only run event log (`events.jsonl`), one JSON object per line.

use crate::error::{IoError, Result};
use chrono::{DateTime, Utc};
use qcsim_data::CivilizationType;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const EVENTS_FILE: &str = "events.jsonl";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// No prior state was found; the run started from initial defaults.
    Recovered {
        timestamp: DateTime<Utc>,
        entities: usize,
    },
    CycleCompleted {
        timestamp: DateTime<Utc>,
        cycle: u64,
        classification: CivilizationType,
        seed: Option<u64>,
        classification_changed: bool,
    },
}

pub struct EventLog {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl EventLog {
    /// Opens (or creates) `events.jsonl` inside `run_dir` for appending.
    pub fn open(run_dir: &Path) -> Result<Self> {
        let path = run_dir.join(EVENTS_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| IoError::from(e).with_context(format!("opening {}", path.display())))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn append(&mut self, event: &RunEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|e| {
                IoError::from(e).with_context(format!("appending to {}", self.path.display()))
            })
    }
}

/// Reads every event of a run; a missing log yields an empty list.
pub fn read_events(run_dir: &Path) -> Result<Vec<RunEvent>> {
    let path = run_dir.join(EVENTS_FILE);
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut events = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .map_err(|e| IoError::corrupt(&path, format!("line {}: {e}", n + 1)))?;
        events.push(event);
    }
    Ok(events)
}
