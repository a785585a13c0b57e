//! # Run directories
//!
//! A run directory holds everything one simulation has produced:
//!
//! ```text
//! <run_dir>/
//!   run.lock                  exclusive while a RunContext is open
//!   panel_state.json          last fully persisted cycle
//!   events.jsonl              append-only event log
//!   civilization/cycle_N.json one snapshot per cycle, never overwritten
//!   entities/<id>.json        current state of each entity
//!   reports/cycle_N.md        rendered reports
//! ```
//!
//! [`RunContext`] is the only writer. It takes the lock on open, loads (or
//! recovers) the state, and persists each cycle in commit order: snapshot,
//! entities, panel state, event.

use crate::error::{IoError, Result};
use crate::history::{EventLog, RunEvent};
use crate::lock::RunLock;
use crate::panel::{snapshot_name, PanelState, PANEL_FILE};
use crate::serialization::{publish_json_file, read_json_file, write_json_file, Publish};
use chrono::Utc;
use qcsim_core::config::AppConfig;
use qcsim_core::engine::{PerturbationSource, SimState, StepSummary};
use qcsim_core::report::CycleReport;
use qcsim_data::{CivilizationSnapshot, CivilizationType, Entity};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Paths inside one run directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn panel(&self) -> PathBuf {
        self.root.join(PANEL_FILE)
    }

    #[must_use]
    pub fn civilization_dir(&self) -> PathBuf {
        self.root.join("civilization")
    }

    #[must_use]
    pub fn snapshot(&self, cycle: u64) -> PathBuf {
        self.root.join(snapshot_name(cycle))
    }

    #[must_use]
    pub fn entities_dir(&self) -> PathBuf {
        self.root.join("entities")
    }

    #[must_use]
    pub fn entity(&self, id: &str) -> PathBuf {
        self.entities_dir().join(format!("{id}.json"))
    }

    #[must_use]
    pub fn report(&self, cycle: u64) -> PathBuf {
        self.root.join("reports").join(format!("cycle_{cycle}.md"))
    }

    /// Cycles with a published snapshot, ascending.
    pub fn snapshot_cycles(&self) -> Result<Vec<u64>> {
        let mut cycles: Vec<u64> = json_files(&self.civilization_dir())?
            .iter()
            .filter_map(|(stem, _)| stem.strip_prefix("cycle_")?.parse().ok())
            .collect();
        cycles.sort_unstable();
        Ok(cycles)
    }

    /// `(id, path)` of every entity file.
    pub fn entity_files(&self) -> Result<Vec<(String, PathBuf)>> {
        json_files(&self.entities_dir())
    }
}

/// `(stem, path)` of the `*.json` files in `dir`, skipping hidden temp files.
fn json_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(IoError::from(e).with_context(format!("listing {}", dir.display())))
        }
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if let Some(stem) = name.strip_suffix(".json") {
            files.push((stem.to_string(), path.clone()));
        }
    }
    files.sort();
    Ok(files)
}

/// State read from a run directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedState {
    pub state: SimState,
    pub panel: Option<PanelState>,
    /// True when nothing was persisted and initial defaults were used.
    pub recovered: bool,
}

/// Reads the persisted state of a run, or recovers initial defaults when the
/// directory holds no state at all. Writes nothing.
pub fn load_state(layout: &RunLayout, config: &AppConfig) -> Result<LoadedState> {
    let panel_path = layout.panel();
    if !panel_path.exists() {
        let leftovers = layout.snapshot_cycles()?.len() + layout.entity_files()?.len();
        if leftovers > 0 {
            return Err(IoError::corrupt(
                panel_path,
                format!("panel state missing but {leftovers} snapshot/entity files exist"),
            ));
        }
        tracing::warn!(
            run_dir = %layout.root().display(),
            "no persisted state found, recovering initial defaults"
        );
        return Ok(LoadedState {
            state: SimState::initial(&config.run.roster),
            panel: None,
            recovered: true,
        });
    }

    let panel: PanelState = read_json_file(&panel_path)?;
    if panel.latest_snapshot != snapshot_name(panel.cycle) {
        return Err(IoError::Corrupt {
            path: panel_path,
            entity: None,
            cycle: Some(panel.cycle),
            field: Some("latest_snapshot".into()),
            reason: format!(
                "'{}' does not belong to cycle {}",
                panel.latest_snapshot, panel.cycle
            ),
        });
    }

    let snapshot = read_snapshot(layout, panel.cycle)?;
    let ahead = layout.snapshot(panel.cycle + 1);
    if ahead.exists() {
        return Err(IoError::Corrupt {
            path: ahead,
            entity: None,
            cycle: Some(panel.cycle + 1),
            field: None,
            reason: format!(
                "snapshot ahead of panel state (cycle {}); an earlier advance did not finish",
                panel.cycle
            ),
        });
    }

    let mut entities = BTreeMap::new();
    for (id, path) in layout.entity_files()? {
        let entity: Entity = read_json_file(&path)?;
        entities.insert(id, entity);
    }
    if entities.is_empty() {
        return Err(IoError::corrupt(layout.entities_dir(), "no entity files"));
    }

    let state = SimState { snapshot, entities };
    state.validate().map_err(|fault| IoError::Corrupt {
        path: fault
            .entity
            .as_deref()
            .map_or_else(|| layout.snapshot(panel.cycle), |id| layout.entity(id)),
        entity: fault.entity.clone(),
        cycle: Some(panel.cycle),
        field: fault.field.clone(),
        reason: fault.reason.clone(),
    })?;

    if panel.config_fingerprint != config.fingerprint() {
        tracing::warn!(
            run_dir = %layout.root().display(),
            "configuration changed since the last cycle of this run"
        );
    }

    Ok(LoadedState {
        state,
        panel: Some(panel),
        recovered: false,
    })
}

fn read_snapshot(layout: &RunLayout, cycle: u64) -> Result<CivilizationSnapshot> {
    if cycle == 0 {
        return Ok(CivilizationSnapshot::initial());
    }
    let path = layout.snapshot(cycle);
    if !path.exists() {
        return Err(IoError::Corrupt {
            path,
            entity: None,
            cycle: Some(cycle),
            field: None,
            reason: "panel state points at a missing snapshot".into(),
        });
    }
    let snapshot: CivilizationSnapshot = read_json_file(&path)?;
    if snapshot.cycle != cycle {
        return Err(IoError::Corrupt {
            path,
            entity: None,
            cycle: Some(cycle),
            field: Some("cycle".into()),
            reason: format!("file holds cycle {}", snapshot.cycle),
        });
    }
    Ok(snapshot)
}

/// Latest persisted cycle of a run, read without taking the lock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStatus {
    pub panel: PanelState,
    pub snapshot: CivilizationSnapshot,
}

/// `None` when the run has not completed a cycle yet.
pub fn read_status(run_dir: &Path) -> Result<Option<RunStatus>> {
    let layout = RunLayout::new(run_dir);
    let panel_path = layout.panel();
    if !panel_path.exists() {
        return Ok(None);
    }
    let panel: PanelState = read_json_file(&panel_path)?;
    let snapshot = read_snapshot(&layout, panel.cycle)?;
    Ok(Some(RunStatus { panel, snapshot }))
}

/// Result of one [`RunContext::advance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub classification: CivilizationType,
    /// True on the first cycle of a run recovered from nothing.
    pub recovered: bool,
    pub summary: StepSummary,
}

/// Exclusive handle on a run directory.
pub struct RunContext {
    layout: RunLayout,
    config: AppConfig,
    state: SimState,
    panel: Option<PanelState>,
    recovered: bool,
    events: EventLog,
    lock: RunLock,
}

impl RunContext {
    /// Locks `run_dir` and loads its state, recovering defaults if it is empty.
    pub fn open(run_dir: impl Into<PathBuf>, config: AppConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| IoError::validation(format!("{e:#}")))?;
        let layout = RunLayout::new(run_dir);
        let lock = RunLock::acquire(layout.root())?;
        let loaded = load_state(&layout, &config)?;
        let mut events = EventLog::open(layout.root())?;
        if loaded.recovered {
            events.append(&RunEvent::Recovered {
                timestamp: Utc::now(),
                entities: loaded.state.entities.len(),
            })?;
        }
        tracing::debug!(
            run_dir = %layout.root().display(),
            cycle = loaded.state.cycle(),
            recovered = loaded.recovered,
            "run opened"
        );
        Ok(Self {
            layout,
            config,
            state: loaded.state,
            panel: loaded.panel,
            recovered: loaded.recovered,
            events,
            lock,
        })
    }

    #[must_use]
    pub fn state(&self) -> &SimState {
        &self.state
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.state.cycle()
    }

    #[must_use]
    pub fn recovered(&self) -> bool {
        self.recovered
    }

    #[must_use]
    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Seed this run last advanced with, if any.
    #[must_use]
    pub fn last_seed(&self) -> Option<u64> {
        self.panel.as_ref().and_then(|p| p.seed)
    }

    /// Runs one cycle and persists it. On error the in-memory state is unchanged.
    pub fn advance(&mut self, source: &mut dyn PerturbationSource) -> Result<CycleOutcome> {
        let (next, summary) = self.state.step(&self.config.drift, source);
        let cycle = next.cycle();

        let snapshot_path = self.layout.snapshot(cycle);
        if publish_json_file(&next.snapshot, &snapshot_path, self.lock.token())?
            == Publish::AlreadyExists
        {
            return Err(IoError::ConcurrentWrite {
                path: snapshot_path,
                cycle,
            });
        }
        for entity in next.entities.values() {
            write_json_file(entity, self.layout.entity(&entity.id))?;
        }
        let seed = source.seed().or_else(|| self.last_seed());
        let panel = PanelState::new(cycle, seed, self.config.fingerprint());
        write_json_file(&panel, self.layout.panel())?;

        let classification = next.snapshot.classification;
        self.events.append(&RunEvent::CycleCompleted {
            timestamp: panel.last_updated,
            cycle,
            classification,
            seed,
            classification_changed: summary.classification_changed,
        })?;

        tracing::info!(
            cycle,
            classification = %classification,
            delta_h = next.snapshot.delta_h,
            coherence = next.snapshot.coherence,
            "cycle completed"
        );

        let recovered = std::mem::take(&mut self.recovered);
        self.state = next;
        self.panel = Some(panel);
        Ok(CycleOutcome {
            cycle,
            classification,
            recovered,
            summary,
        })
    }

    /// Renders the current cycle as markdown into `reports/cycle_N.md`.
    pub fn write_report(&self) -> Result<PathBuf> {
        let path = self.layout.report(self.cycle());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, CycleReport::build(&self.state).to_markdown())
            .map_err(|e| IoError::from(e).with_context(format!("writing {}", path.display())))?;
        Ok(path)
    }

    /// Releases the lock.
    pub fn close(self) {}
}
