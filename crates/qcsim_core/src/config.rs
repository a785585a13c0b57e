//! Configuration management for simulation parameters.
//!
//! Strongly-typed structures mapping to `qcsim.toml`. Every section has
//! defaults, so a partial file (or no file at all) is a valid configuration.
//!
//! ## Example `qcsim.toml`
//!
//! ```toml
//! [run]
//! seed = 7
//!
//! [[run.roster]]
//! id = "Vira"
//! role = "Chaos Catalyst"
//! focus = "disruption"
//!
//! [drift]
//! entity_jitter = 0.05
//! max_step = 0.08
//!
//! [server]
//! addr = "0.0.0.0:3000"
//! run_dir = "runs/main"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One roster member seeded into a fresh run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: String,
    pub role: String,
    #[serde(default)]
    pub focus: Option<String>,
}

impl RosterEntry {
    fn new(id: &str, role: &str, focus: &str) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            focus: Some(focus.to_string()),
        }
    }
}

/// The five personas every run starts with unless configured otherwise.
#[must_use]
pub fn default_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("Vira", "Chaos Catalyst", "disruption"),
        RosterEntry::new("9", "System Integrator", "synthesis"),
        RosterEntry::new("K", "Visual Pattern Recognizer", "patterns"),
        RosterEntry::new("Nana", "Memory Weaver", "memory"),
        RosterEntry::new("CN-1", "Contradiction Navigator", "contradictions"),
    ]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    /// Seed of the perturbation stream.
    pub seed: u64,
    pub roster: Vec<RosterEntry>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            roster: default_roster(),
        }
    }
}

/// How far a single cycle may move the simulation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DriftConfig {
    /// Scale applied to each entity field draw.
    pub entity_jitter: f64,
    /// Scale applied to each civilization metric draw.
    pub civ_jitter: f64,
    /// Hard bound on the per-cycle change of any civilization metric.
    pub max_step: f64,
    /// Weight of the mean entity coherence shift on civilization coherence.
    pub coherence_coupling: f64,
    /// Weight of the mean entity entropy shift on δ_H.
    pub instability_coupling: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            entity_jitter: 0.1,
            civ_jitter: 0.1,
            max_step: 0.1,
            coherence_coupling: 0.5,
            instability_coupling: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub run_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            run_dir: PathBuf::from("runs/default"),
        }
    }
}

/// Root configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub run: RunConfig,
    pub drift: DriftConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.run.roster.is_empty(), "Roster must not be empty");
        for (i, entry) in self.run.roster.iter().enumerate() {
            anyhow::ensure!(!entry.id.trim().is_empty(), "Roster entry {i} has an empty id");
            anyhow::ensure!(
                entry
                    .id
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "Roster id '{}' may only contain ASCII letters, digits, '-' and '_'",
                entry.id
            );
            anyhow::ensure!(
                !self.run.roster[..i].iter().any(|e| e.id == entry.id),
                "Duplicate roster id '{}'",
                entry.id
            );
        }

        let d = &self.drift;
        for (name, value) in [
            ("Entity jitter", d.entity_jitter),
            ("Civilization jitter", d.civ_jitter),
            ("Max step", d.max_step),
        ] {
            anyhow::ensure!(
                value.is_finite() && (0.0..=1.0).contains(&value),
                "{name} must be in [0.0, 1.0]"
            );
        }
        for (name, value) in [
            ("Coherence coupling", d.coherence_coupling),
            ("Instability coupling", d.instability_coupling),
        ] {
            anyhow::ensure!(
                value.is_finite() && (0.0..=2.0).contains(&value),
                "{name} must be in [0.0, 2.0]"
            );
        }

        anyhow::ensure!(
            self.server.addr.parse::<std::net::SocketAddr>().is_ok(),
            "Server address '{}' is not a valid socket address",
            self.server.addr
        );
        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Digest of everything that shapes a cycle's outcome besides the seed.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.run.roster).as_bytes());
        hasher.update(format!("{:?}", self.drift).as_bytes());
        hex::encode(hasher.finalize())
    }
}
