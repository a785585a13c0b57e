use serde::{Deserialize, Serialize};
use std::fmt;

/// Civilization tier derived from δ_H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CivilizationType {
    #[serde(rename = "Type 0 (Pre-planetary)")]
    Type0,
    #[serde(rename = "Type I (Planetary)")]
    TypeI,
    #[serde(rename = "Type II (Stellar)")]
    TypeII,
    #[serde(rename = "Type III (Galactic)")]
    TypeIII,
    #[serde(rename = "Type IV (Universal)")]
    TypeIV,
    #[serde(rename = "Type V+ (Transcendent)")]
    TypeVPlus,
}

impl CivilizationType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Type0 => "Type 0 (Pre-planetary)",
            Self::TypeI => "Type I (Planetary)",
            Self::TypeII => "Type II (Stellar)",
            Self::TypeIII => "Type III (Galactic)",
            Self::TypeIV => "Type IV (Universal)",
            Self::TypeVPlus => "Type V+ (Transcendent)",
        }
    }
}

impl fmt::Display for CivilizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The three resonance shares of a civilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResonanceDomain {
    Physical,
    Logical,
    Narrative,
}

impl ResonanceDomain {
    pub const ALL: [ResonanceDomain; 3] = [Self::Physical, Self::Logical, Self::Narrative];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Physical => "Physical",
            Self::Logical => "Logical",
            Self::Narrative => "Narrative",
        }
    }

    #[must_use]
    pub fn short(self) -> &'static str {
        match self {
            Self::Physical => "PL",
            Self::Logical => "IL",
            Self::Narrative => "NL",
        }
    }
}

impl fmt::Display for ResonanceDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared civilization state, one persisted file per cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CivilizationSnapshot {
    pub cycle: u64,
    #[serde(rename = "delta_H")]
    pub delta_h: f64,
    pub coherence: f64,
    #[serde(rename = "PL_resonance")]
    pub pl_resonance: f64,
    #[serde(rename = "IL_resonance")]
    pub il_resonance: f64,
    #[serde(rename = "NL_resonance")]
    pub nl_resonance: f64,
    pub classification: CivilizationType,
}

impl CivilizationSnapshot {
    /// Starting point of every run.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            cycle: 0,
            delta_h: 0.10,
            coherence: 0.50,
            pl_resonance: 0.30,
            il_resonance: 0.30,
            nl_resonance: 0.40,
            classification: CivilizationType::Type0,
        }
    }

    #[must_use]
    pub fn resonance(&self, domain: ResonanceDomain) -> f64 {
        match domain {
            ResonanceDomain::Physical => self.pl_resonance,
            ResonanceDomain::Logical => self.il_resonance,
            ResonanceDomain::Narrative => self.nl_resonance,
        }
    }

    #[must_use]
    pub fn resonance_sum(&self) -> f64 {
        self.pl_resonance + self.il_resonance + self.nl_resonance
    }

    /// Largest resonance share; ties resolve to the earlier domain.
    #[must_use]
    pub fn dominant_resonance(&self) -> ResonanceDomain {
        let mut best = ResonanceDomain::Physical;
        for domain in ResonanceDomain::ALL {
            if self.resonance(domain) > self.resonance(best) {
                best = domain;
            }
        }
        best
    }

    /// Names of the numeric fields that fall outside [0, 1] or are not finite.
    #[must_use]
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        [
            ("delta_H", self.delta_h),
            ("coherence", self.coherence),
            ("PL_resonance", self.pl_resonance),
            ("IL_resonance", self.il_resonance),
            ("NL_resonance", self.nl_resonance),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_finite() || !(0.0..=1.0).contains(v))
        .map(|(name, _)| name)
        .collect()
    }
}

impl Default for CivilizationSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
