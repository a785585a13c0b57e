use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A loosely typed value stored in an entity's extension map or history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Numeric view of the value, if it has one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(_) | Scalar::Text(_) => None,
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

/// Per-entity data mapping.
///
/// The well-known keys are real fields; anything else lands in `extra` and is
/// carried through untouched. On disk it is one flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coherence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Scalar>,
}

impl EntityData {
    /// Fields the cycle engine perturbs, in draw order.
    pub const DRIFTING_FIELDS: [&'static str; 3] = ["coherence", "entropy", "signal_strength"];

    /// Mutable access to a drifting field by name.
    pub fn drifting_field_mut(&mut self, name: &str) -> Option<&mut Option<f64>> {
        match name {
            "coherence" => Some(&mut self.coherence),
            "entropy" => Some(&mut self.entropy),
            "signal_strength" => Some(&mut self.signal_strength),
            _ => None,
        }
    }

    /// Looks a key up across the named fields and the extension map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Scalar> {
        match key {
            "coherence" => self.coherence.map(Scalar::Float),
            "entropy" => self.entropy.map(Scalar::Float),
            "signal_strength" => self.signal_strength.map(Scalar::Float),
            "focus" => self.focus.clone().map(Scalar::Text),
            other => self.extra.get(other).cloned(),
        }
    }
}

/// One history record, written once per completed cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub cycle: u64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Scalar>,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(cycle: u64) -> Self {
        Self {
            cycle,
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Scalar>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

/// A named participant of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub role: String,
    pub cycle: u64,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub data: EntityData,
}

impl Entity {
    /// A fresh entity at cycle 0 with no history.
    #[must_use]
    pub fn new(id: impl Into<String>, role: impl Into<String>, data: EntityData) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            cycle: 0,
            history: Vec::new(),
            data,
        }
    }

    /// Appends `entry` and moves the cycle counter to the entry's cycle.
    ///
    /// Entries must arrive in cycle order; the history never shrinks.
    pub fn record(&mut self, entry: HistoryEntry) {
        debug_assert!(entry.cycle > self.cycle || self.history.is_empty());
        self.cycle = entry.cycle;
        self.history.push(entry);
    }

    #[must_use]
    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}
