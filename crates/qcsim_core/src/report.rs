//! # Reporting
//!
//! Turns a [`SimState`] into a [`CycleReport`] (civilization analysis plus an
//! entity table) and renders it as markdown. Also bundles the text metrics,
//! region and moves of a sample into a [`TextAssessment`].

use crate::classifier::{
    coherence_ladder, orric_risk_ladder, region_ladder, region_moves, CoherenceState, Move,
    Region, RiskLevel,
};
use crate::engine::SimState;
use crate::metrics::{OrricReading, TextMetrics};
use qcsim_data::{CivilizationSnapshot, CivilizationType, ResonanceDomain};
use serde::Serialize;
use std::fmt;

/// Share above which one resonance is considered over-dominant.
pub const IMBALANCE_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResonanceBalance {
    pub physical_pct: f64,
    pub logical_pct: f64,
    pub narrative_pct: f64,
}

impl ResonanceBalance {
    /// Percentages of the resonance total; `None` when the total is zero.
    #[must_use]
    pub fn of(snapshot: &CivilizationSnapshot) -> Option<Self> {
        let total = snapshot.resonance_sum();
        if total <= 0.0 {
            return None;
        }
        Some(Self {
            physical_pct: snapshot.pl_resonance / total * 100.0,
            logical_pct: snapshot.il_resonance / total * 100.0,
            narrative_pct: snapshot.nl_resonance / total * 100.0,
        })
    }

    #[must_use]
    pub fn max_pct(&self) -> f64 {
        self.physical_pct.max(self.logical_pct).max(self.narrative_pct)
    }

    /// Share of `domain` in percent.
    #[must_use]
    pub fn pct(&self, domain: ResonanceDomain) -> f64 {
        match domain {
            ResonanceDomain::Physical => self.physical_pct,
            ResonanceDomain::Logical => self.logical_pct,
            ResonanceDomain::Narrative => self.narrative_pct,
        }
    }

    #[must_use]
    pub fn is_imbalanced(&self) -> bool {
        self.max_pct() > IMBALANCE_PERCENT
    }
}

/// Shape of the three resonance shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Motif {
    /// All three within 0.05 of each other.
    TriadicSymmetry,
    /// Largest share more than twice the smallest.
    MonopolarDominance,
    DynamicAsymmetry,
}

impl Motif {
    #[must_use]
    pub fn of(snapshot: &CivilizationSnapshot) -> Self {
        let (pl, il, nl) = (
            snapshot.pl_resonance,
            snapshot.il_resonance,
            snapshot.nl_resonance,
        );
        if (pl - il).abs() < 0.05 && (il - nl).abs() < 0.05 {
            Self::TriadicSymmetry
        } else if pl.max(il).max(nl) > 2.0 * pl.min(il).min(nl) {
            Self::MonopolarDominance
        } else {
            Self::DynamicAsymmetry
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TriadicSymmetry => "Triadic Symmetry",
            Self::MonopolarDominance => "Monopolar Dominance",
            Self::DynamicAsymmetry => "Dynamic Asymmetry",
        }
    }
}

/// A logical inconsistency between civilization metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contradiction {
    pub kind: &'static str,
    pub detail: String,
}

/// Derived view of one civilization snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CivilizationAnalysis {
    pub civ_type: CivilizationType,
    pub delta_h: f64,
    pub coherence_state: CoherenceState,
    pub dominant_resonance: ResonanceDomain,
    pub balance: Option<ResonanceBalance>,
    pub motif: Motif,
    pub contradictions: Vec<Contradiction>,
}

impl CivilizationAnalysis {
    #[must_use]
    pub fn of(snapshot: &CivilizationSnapshot) -> Self {
        let coherence_state = coherence_ladder().classify(&snapshot.coherence);
        let mut contradictions = Vec::new();

        if snapshot.delta_h < 0.3
            && ResonanceDomain::ALL
                .iter()
                .any(|d| snapshot.resonance(*d) > 0.5)
        {
            contradictions.push(Contradiction {
                kind: "Type-Resonance Mismatch",
                detail: format!(
                    "{} resonance exceeds 0.5 while δ_H is only {:.3}",
                    snapshot.dominant_resonance(),
                    snapshot.delta_h
                ),
            });
        }
        if coherence_state == CoherenceState::Unstable && snapshot.delta_h > 0.7 {
            contradictions.push(Contradiction {
                kind: "Coherence-Type Paradox",
                detail: format!(
                    "{} civilization reported with unstable coherence {:.3}",
                    snapshot.classification, snapshot.coherence
                ),
            });
        }

        Self {
            civ_type: snapshot.classification,
            delta_h: snapshot.delta_h,
            coherence_state,
            dominant_resonance: snapshot.dominant_resonance(),
            balance: ResonanceBalance::of(snapshot),
            motif: Motif::of(snapshot),
            contradictions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityLine {
    pub id: String,
    pub role: String,
    pub coherence: Option<f64>,
    pub entropy: Option<f64>,
    pub signal_strength: Option<f64>,
}

/// Everything rendered for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub snapshot: CivilizationSnapshot,
    pub analysis: CivilizationAnalysis,
    pub entities: Vec<EntityLine>,
}

fn bar(value: f64) -> String {
    let filled = (value.clamp(0.0, 1.0) * 20.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"))
}

impl CycleReport {
    #[must_use]
    pub fn build(state: &SimState) -> Self {
        Self {
            cycle: state.cycle(),
            snapshot: state.snapshot.clone(),
            analysis: CivilizationAnalysis::of(&state.snapshot),
            entities: state
                .entities
                .values()
                .map(|e| EntityLine {
                    id: e.id.clone(),
                    role: e.role.clone(),
                    coherence: e.data.coherence,
                    entropy: e.data.entropy,
                    signal_strength: e.data.signal_strength,
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.snapshot;
        let a = &self.analysis;

        writeln!(f, "# Cycle {} Report\n", self.cycle)?;
        writeln!(f, "## Civilization\n")?;
        writeln!(f, "- **Classification**: {}", a.civ_type)?;
        writeln!(f, "- **δ_H**: {:.3}", s.delta_h)?;
        writeln!(f, "- **Coherence**: {:.3} ({})", s.coherence, a.coherence_state)?;
        writeln!(f, "- **Dominant resonance**: {}", a.dominant_resonance)?;
        writeln!(f, "- **Motif**: {}\n", a.motif.label())?;

        writeln!(f, "## Resonance\n")?;
        writeln!(f, "```")?;
        for domain in ResonanceDomain::ALL {
            let v = s.resonance(domain);
            writeln!(f, "{:<9} [{}] {:.3}", domain.label(), bar(v), v)?;
        }
        writeln!(f, "```\n")?;
        match &a.balance {
            Some(b) => {
                let shares: Vec<String> = ResonanceDomain::ALL
                    .iter()
                    .map(|d| format!("{} {:.1}%", d.short(), b.pct(*d)))
                    .collect();
                writeln!(f, "Balance: {}\n", shares.join(" / "))?;
                if b.is_imbalanced() {
                    writeln!(
                        f,
                        "**Warning**: resonance imbalance detected; one domain is over-dominant.\n"
                    )?;
                } else {
                    writeln!(f, "Resonances are balanced across domains.\n")?;
                }
            }
            None => writeln!(f, "Balance: no resonance present.\n")?,
        }

        writeln!(f, "## Logic Audit\n")?;
        if a.contradictions.is_empty() {
            writeln!(f, "No contradictions detected.\n")?;
        } else {
            for c in &a.contradictions {
                writeln!(f, "- **{}**: {}", c.kind, c.detail)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Entities\n")?;
        writeln!(f, "| id | role | coherence | entropy | signal |")?;
        writeln!(f, "|----|------|-----------|---------|--------|")?;
        for e in &self.entities {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                e.id,
                e.role,
                opt(e.coherence),
                opt(e.entropy),
                opt(e.signal_strength)
            )?;
        }
        Ok(())
    }
}

/// Metrics, region and recommended moves for one text sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAssessment {
    pub metrics: TextMetrics,
    pub region: Region,
    /// Name of the router rule that fired.
    pub rule: &'static str,
    pub moves: &'static [Move],
    pub orric: OrricReading,
    pub risk: RiskLevel,
}

impl TextAssessment {
    #[must_use]
    pub fn assess(text: &str) -> Self {
        let metrics = TextMetrics::measure(text);
        let (rule, region) = region_ladder().first_match(&metrics);
        let orric = OrricReading::scan(text);
        Self {
            metrics,
            region,
            rule,
            moves: region_moves(region),
            orric,
            risk: orric_risk_ladder().classify(&orric),
        }
    }
}
