//! Maps crisis patterns onto ten constraint geometries.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Geometry {
    YangMills,
    NavierStokes,
    Riemann,
    PVsNp,
    Hodge,
    Poincare,
    Bsd,
    BsdExtended,
    ExistenceSmoothness,
    QuantumTunneling,
}

const PATTERNS: &[(&str, Geometry)] = &[
    ("confinement", Geometry::YangMills),
    ("blockade", Geometry::YangMills),
    ("siege", Geometry::YangMills),
    ("flow_breakdown", Geometry::NavierStokes),
    ("logistics_collapse", Geometry::NavierStokes),
    ("displacement", Geometry::NavierStokes),
    ("inequality", Geometry::Riemann),
    ("fragmentation", Geometry::Riemann),
    ("gap_widening", Geometry::Riemann),
    ("complexity_asymmetry", Geometry::PVsNp),
    ("information_warfare", Geometry::PVsNp),
    ("tipping_point", Geometry::Hodge),
    ("phase_shift", Geometry::Hodge),
    ("network_collapse", Geometry::Poincare),
    ("infrastructure_breakdown", Geometry::Poincare),
    ("valuation_failure", Geometry::Bsd),
    ("market_disconnect", Geometry::Bsd),
    ("hidden_actors", Geometry::BsdExtended),
    ("covert_operations", Geometry::BsdExtended),
    ("chaos", Geometry::ExistenceSmoothness),
    ("unpredictability", Geometry::ExistenceSmoothness),
    ("sudden_shift", Geometry::QuantumTunneling),
    ("impossible_event", Geometry::QuantumTunneling),
];

impl Geometry {
    pub const ALL: [Geometry; 10] = [
        Self::YangMills,
        Self::NavierStokes,
        Self::Riemann,
        Self::PVsNp,
        Self::Hodge,
        Self::Poincare,
        Self::Bsd,
        Self::BsdExtended,
        Self::ExistenceSmoothness,
        Self::QuantumTunneling,
    ];

    /// Geometry a pattern name belongs to, if it is a known pattern.
    #[must_use]
    pub fn for_pattern(pattern: &str) -> Option<Self> {
        PATTERNS
            .iter()
            .find(|(name, _)| *name == pattern)
            .map(|(_, g)| *g)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::YangMills => "YANG_MILLS",
            Self::NavierStokes => "NAVIER_STOKES",
            Self::Riemann => "RIEMANN",
            Self::PVsNp => "P_VS_NP",
            Self::Hodge => "HODGE",
            Self::Poincare => "POINCARE",
            Self::Bsd => "BSD",
            Self::BsdExtended => "BSD_EXTENDED",
            Self::ExistenceSmoothness => "EXISTENCE_SMOOTHNESS",
            Self::QuantumTunneling => "QUANTUM_TUNNELING",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::YangMills => "Confinement - Resources/people trapped",
            Self::NavierStokes => "Flow - Distribution/logistics breakdown",
            Self::Riemann => "Gap - Inequality widening, fragmentation",
            Self::PVsNp => "Asymmetry - Complexity overwhelms one party",
            Self::Hodge => "Phase Transition - Discrete tipping point",
            Self::Poincare => "Topology - Network structure collapse",
            Self::Bsd => "Value Assignment - Resource valuation failure",
            Self::BsdExtended => "Hidden Variables - Unseen forces driving crisis",
            Self::ExistenceSmoothness => "Chaos - Unpredictable turbulence",
            Self::QuantumTunneling => "Barrier Crossing - Impossible events occur",
        }
    }

    /// The question an analyst asks to confirm this geometry.
    #[must_use]
    pub fn routing_question(self) -> &'static str {
        match self {
            Self::YangMills => "Are people/resources trapped in closed system?",
            Self::NavierStokes => "Is distribution/logistics failing?",
            Self::Riemann => "Are gaps widening (wealth, ethnic, access)?",
            Self::PVsNp => "Is one party overwhelmed by complexity?",
            Self::Hodge => "Is system crossing discrete threshold?",
            Self::Poincare => "Is network structure breaking?",
            Self::Bsd => "Is value/pricing disconnected from reality?",
            Self::BsdExtended => "Are hidden actors driving visible crisis?",
            Self::ExistenceSmoothness => "Is collapse unpredictable/chaotic?",
            Self::QuantumTunneling => "Did impossible event suddenly occur?",
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometries for the observed patterns, deduplicated in order of first appearance.
///
/// Unknown pattern names are ignored.
pub fn route<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Vec<Geometry> {
    let mut matches = Vec::new();
    for pattern in patterns {
        if let Some(g) = Geometry::for_pattern(pattern) {
            if !matches.contains(&g) {
                matches.push(g);
            }
        }
    }
    matches
}
