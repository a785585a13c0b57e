//! # Cycle engine
//!
//! The pure half of `advance`: given the current [`SimState`], a drift
//! configuration and a [`PerturbationSource`], compute the next state.
//! Persistence, locking and recovery live in `qcsim_io`.
//!
//! ## Draw order
//!
//! Each cycle consumes draws in a fixed order so a seeded source reproduces
//! the same cycle exactly:
//!
//! 1. Entities sorted by id; per entity `coherence`, `entropy`,
//!    `signal_strength`, skipping fields the entity does not carry.
//! 2. Civilization metrics `delta_H`, `coherence`, `PL`, `IL`, `NL`.

use crate::classifier::civilization_ladder;
use crate::config::{DriftConfig, RosterEntry};
use qcsim_data::{
    clamp01, clamp_unit_range, CivilizationSnapshot, Entity, EntityData, HistoryEntry,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Allowed distance of the resonance sum from 1 before it is logged.
pub const RESONANCE_TOLERANCE: f64 = 0.05;

/// Supplies perturbation draws in [-1, 1].
pub trait PerturbationSource {
    /// Called once before the draws of `cycle` (the cycle being produced).
    fn begin_cycle(&mut self, cycle: u64);
    fn next_delta(&mut self) -> f64;

    /// Seed recorded alongside the cycles this source produces.
    fn seed(&self) -> Option<u64> {
        None
    }
}

/// ChaCha8 stream keyed by seed and cycle.
///
/// The draws of cycle `n` depend only on the seed and `n`, never on how
/// many cycles this source produced before.
#[derive(Debug, Clone)]
pub struct SeededPerturbation {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededPerturbation {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PerturbationSource for SeededPerturbation {
    fn begin_cycle(&mut self, cycle: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.rng.set_stream(cycle);
    }

    fn next_delta(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }

    fn seed(&self) -> Option<u64> {
        Some(self.seed)
    }
}

/// Always draws zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPerturbation;

impl PerturbationSource for NullPerturbation {
    fn begin_cycle(&mut self, _cycle: u64) {}

    fn next_delta(&mut self) -> f64 {
        0.0
    }
}

/// Starting data of a freshly seeded entity.
#[must_use]
pub fn initial_entity(entry: &RosterEntry) -> Entity {
    let data = EntityData {
        coherence: Some(0.94),
        entropy: Some(0.06),
        signal_strength: Some(0.5),
        focus: entry.focus.clone(),
        ..Default::default()
    };
    Entity::new(entry.id.clone(), entry.role.clone(), data)
}

/// Why a loaded state cannot be advanced.
#[derive(Debug, Clone, PartialEq)]
pub struct StateFault {
    pub entity: Option<String>,
    pub field: Option<String>,
    pub reason: String,
}

impl fmt::Display for StateFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(entity) = &self.entity {
            write!(f, "entity {entity}: ")?;
        }
        if let Some(field) = &self.field {
            write!(f, "field {field}: ")?;
        }
        f.write_str(&self.reason)
    }
}

impl StateFault {
    fn new(entity: Option<&str>, field: Option<&str>, reason: impl Into<String>) -> Self {
        Self {
            entity: entity.map(str::to_string),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }
}

/// Shifts observed while perturbing entities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityShift {
    pub mean_coherence: f64,
    pub mean_entropy: f64,
}

/// What one step changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub cycle: u64,
    pub classification_changed: bool,
    pub entity_shift: EntityShift,
    pub resonance_sum: f64,
}

/// Civilization snapshot plus every entity, keyed and ordered by id.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub snapshot: CivilizationSnapshot,
    pub entities: BTreeMap<String, Entity>,
}

impl SimState {
    /// Cycle 0 state for `roster`.
    #[must_use]
    pub fn initial(roster: &[RosterEntry]) -> Self {
        Self {
            snapshot: CivilizationSnapshot::initial(),
            entities: roster
                .iter()
                .map(|entry| (entry.id.clone(), initial_entity(entry)))
                .collect(),
        }
    }

    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.snapshot.cycle
    }

    /// Checks that every value is in range and every counter agrees.
    pub fn validate(&self) -> Result<(), StateFault> {
        if let Some(field) = self.snapshot.out_of_range_fields().first() {
            return Err(StateFault::new(None, Some(*field), "value outside [0, 1]"));
        }
        let expected = civilization_ladder().classify(&self.snapshot.delta_h);
        if expected != self.snapshot.classification {
            return Err(StateFault::new(
                None,
                Some("classification"),
                format!(
                    "'{}' does not match delta_H {:.3} (expected '{}')",
                    self.snapshot.classification, self.snapshot.delta_h, expected
                ),
            ));
        }

        for (id, entity) in &self.entities {
            if *id != entity.id {
                return Err(StateFault::new(
                    Some(id),
                    Some("id"),
                    format!("stored under '{id}' but names itself '{}'", entity.id),
                ));
            }
            if entity.cycle != self.snapshot.cycle {
                return Err(StateFault::new(
                    Some(id),
                    Some("cycle"),
                    format!(
                        "entity at cycle {} but civilization at cycle {}",
                        entity.cycle, self.snapshot.cycle
                    ),
                ));
            }
            if entity.history.len() as u64 != entity.cycle {
                return Err(StateFault::new(
                    Some(id),
                    Some("history"),
                    format!(
                        "{} history entries for cycle {}",
                        entity.history.len(),
                        entity.cycle
                    ),
                ));
            }
            if let Some(last) = entity.last_entry() {
                if last.cycle != entity.cycle {
                    return Err(StateFault::new(
                        Some(id),
                        Some("history"),
                        format!(
                            "last entry tagged {} but entity at {}",
                            last.cycle, entity.cycle
                        ),
                    ));
                }
            }
            for name in EntityData::DRIFTING_FIELDS {
                let value = entity.data.get(name).and_then(|s| s.as_f64());
                if let Some(v) = value {
                    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                        return Err(StateFault::new(Some(id), Some(name), "value outside [0, 1]"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Computes the state one cycle later.
    pub fn step(
        &self,
        drift: &DriftConfig,
        source: &mut dyn PerturbationSource,
    ) -> (SimState, StepSummary) {
        let next_cycle = self.snapshot.cycle + 1;
        source.begin_cycle(next_cycle);

        let mut entities = self.entities.clone();
        let mut coherence_shifts = Vec::new();
        let mut entropy_shifts = Vec::new();

        for entity in entities.values_mut() {
            let mut entry = HistoryEntry::new(next_cycle);
            for name in EntityData::DRIFTING_FIELDS {
                let Some(slot) = entity.data.drifting_field_mut(name) else {
                    continue;
                };
                let Some(old) = *slot else {
                    continue;
                };
                let new = clamp01(old + source.next_delta() * drift.entity_jitter);
                *slot = Some(new);
                entry = entry.with(name, new);
                match name {
                    "coherence" => coherence_shifts.push(new - old),
                    "entropy" => entropy_shifts.push(new - old),
                    _ => {}
                }
            }
            entity.record(entry);
        }

        let shift = EntityShift {
            mean_coherence: mean(&coherence_shifts),
            mean_entropy: mean(&entropy_shifts),
        };

        let prior = &self.snapshot;
        let mut drift_metric = |value: f64, coupled: f64| {
            let delta = clamp_unit_range(
                source.next_delta() * drift.civ_jitter + coupled,
                -drift.max_step,
                drift.max_step,
            );
            clamp01(value + delta)
        };
        let delta_h = drift_metric(prior.delta_h, drift.instability_coupling * shift.mean_entropy);
        let coherence =
            drift_metric(prior.coherence, drift.coherence_coupling * shift.mean_coherence);
        let pl_resonance = drift_metric(prior.pl_resonance, 0.0);
        let il_resonance = drift_metric(prior.il_resonance, 0.0);
        let nl_resonance = drift_metric(prior.nl_resonance, 0.0);

        let snapshot = CivilizationSnapshot {
            cycle: next_cycle,
            delta_h,
            coherence,
            pl_resonance,
            il_resonance,
            nl_resonance,
            classification: civilization_ladder().classify(&delta_h),
        };

        let resonance_sum = snapshot.resonance_sum();
        if (resonance_sum - 1.0).abs() > RESONANCE_TOLERANCE {
            tracing::debug!(
                cycle = next_cycle,
                resonance_sum,
                "resonance shares drifted away from unity"
            );
        }

        let summary = StepSummary {
            cycle: next_cycle,
            classification_changed: snapshot.classification != prior.classification,
            entity_shift: shift,
            resonance_sum,
        };
        (
            SimState {
                snapshot,
                entities,
            },
            summary,
        )
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
