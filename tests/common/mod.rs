pub mod macros;

use qcsim_lib::qcsim_core::classifier::civilization_ladder;
use qcsim_lib::qcsim_core::config::AppConfig;
use qcsim_lib::qcsim_core::engine::initial_entity;
use qcsim_lib::qcsim_data::{CivilizationSnapshot, Entity, HistoryEntry};
use qcsim_lib::qcsim_io::{write_json_file, PanelState, RunLayout};
use std::path::Path;

/// Writes a consistent persisted run at an arbitrary cycle, as if it had been
/// advanced there.
#[allow(dead_code)]
pub struct RunBuilder {
    config: AppConfig,
    snapshot: CivilizationSnapshot,
    seed: Option<u64>,
}

#[allow(dead_code)]
impl RunBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            snapshot: CivilizationSnapshot::initial(),
            seed: None,
        }
    }

    pub fn at_cycle(mut self, cycle: u64) -> Self {
        self.snapshot.cycle = cycle;
        self
    }

    /// Sets δ_H, coherence and the three resonances; classification follows δ_H.
    pub fn with_values(mut self, delta_h: f64, coherence: f64, pl: f64, il: f64, nl: f64) -> Self {
        self.snapshot.delta_h = delta_h;
        self.snapshot.coherence = coherence;
        self.snapshot.pl_resonance = pl;
        self.snapshot.il_resonance = il;
        self.snapshot.nl_resonance = nl;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn config(&self) -> AppConfig {
        self.config.clone()
    }

    /// Persists the run into `run_dir` and returns the config it was built with.
    pub fn build(mut self, run_dir: &Path) -> AppConfig {
        let layout = RunLayout::new(run_dir);
        let cycle = self.snapshot.cycle;
        self.snapshot.classification = civilization_ladder().classify(&self.snapshot.delta_h);

        if cycle > 0 {
            write_json_file(&self.snapshot, layout.snapshot(cycle))
                .expect("Failed to write snapshot in test builder");
        }
        for entry in &self.config.run.roster {
            let entity = entity_at_cycle(initial_entity(entry), cycle);
            write_json_file(&entity, layout.entity(&entity.id))
                .expect("Failed to write entity in test builder");
        }
        let panel = PanelState::new(cycle, self.seed, self.config.fingerprint());
        write_json_file(&panel, layout.panel()).expect("Failed to write panel in test builder");
        self.config
    }
}

/// Gives `entity` one unchanged history entry per cycle up to `cycle`.
#[allow(dead_code)]
pub fn entity_at_cycle(mut entity: Entity, cycle: u64) -> Entity {
    for n in 1..=cycle {
        let mut entry = HistoryEntry::new(n);
        for (name, value) in [
            ("coherence", entity.data.coherence),
            ("entropy", entity.data.entropy),
            ("signal_strength", entity.data.signal_strength),
        ] {
            if let Some(v) = value {
                entry = entry.with(name, v);
            }
        }
        entity.record(entry);
    }
    entity
}

/// Raw bytes of the snapshot file for `cycle`.
#[allow(dead_code)]
pub fn snapshot_bytes(run_dir: &Path, cycle: u64) -> Vec<u8> {
    std::fs::read(RunLayout::new(run_dir).snapshot(cycle)).expect("snapshot should exist")
}
