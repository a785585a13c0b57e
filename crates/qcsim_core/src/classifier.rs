//! # Ordered classifiers
//!
//! Every categorical judgement in qcsim is a [`Ladder`]: an ordered list of
//! named predicate rules plus a default label. The first rule whose predicate
//! holds decides the label, so rule order is part of the data.
//!
//! Ladders defined here:
//! - [`region_ladder`] over [`TextMetrics`]
//! - [`collapse_ladder`] over δ
//! - [`coverage_ladder`] over the coverage ratio
//! - [`resilience_ladder`] over Γ
//! - [`civilization_ladder`] over δ_H
//! - [`coherence_ladder`] over civilization coherence
//! - [`priority_ladder`] over δ
//! - [`orric_risk_ladder`] over an [`OrricReading`]

use crate::metrics::{OrricReading, TextMetrics};
use qcsim_data::CivilizationType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// One rung of a [`Ladder`].
pub struct Rule<I: ?Sized, L> {
    pub name: &'static str,
    pub predicate: fn(&I) -> bool,
    pub label: L,
}

impl<I: ?Sized, L: fmt::Debug> fmt::Debug for Rule<I, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

/// First-match-wins classifier from `I` to `L`.
pub struct Ladder<I: ?Sized, L> {
    rules: Vec<Rule<I, L>>,
    default: L,
}

impl<I: ?Sized, L: fmt::Debug> fmt::Debug for Ladder<I, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ladder")
            .field("rules", &self.rules)
            .field("default", &self.default)
            .finish()
    }
}

/// Name reported by [`Ladder::first_match`] when no rule fires.
pub const DEFAULT_RULE: &str = "default";

impl<I: ?Sized, L: Copy> Ladder<I, L> {
    #[must_use]
    pub fn new(default: L) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    /// Appends a rule below all existing ones.
    #[must_use]
    pub fn rule(mut self, name: &'static str, predicate: fn(&I) -> bool, label: L) -> Self {
        self.rules.push(Rule {
            name,
            predicate,
            label,
        });
        self
    }

    #[must_use]
    pub fn classify(&self, input: &I) -> L {
        self.first_match(input).1
    }

    /// Label together with the name of the rule that produced it.
    #[must_use]
    pub fn first_match(&self, input: &I) -> (&'static str, L) {
        self.rules
            .iter()
            .find(|r| (r.predicate)(input))
            .map_or((DEFAULT_RULE, self.default), |r| (r.name, r.label))
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule<I, L>] {
        &self.rules
    }

    #[must_use]
    pub fn default_label(&self) -> L {
        self.default
    }
}

/// A recommended action attached to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Move {
    pub label: &'static str,
    pub description: &'static str,
}

const fn mv(label: &'static str, description: &'static str) -> Move {
    Move { label, description }
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(
    /// Region of a text sample in metric space.
    Region {
        Turbulent => "turbulent",
        Suppressed => "suppressed",
        Threshold => "threshold",
        Flowing => "flowing",
        Rigid => "rigid",
        Drifting => "drifting",
    }
);

labelled_enum!(
    /// Status of the collapse coefficient δ.
    CollapseStatus {
        Stable => "STABLE",
        ModerateRisk => "MODERATE_RISK",
        Critical => "CRITICAL",
        Catastrophic => "CATASTROPHIC",
    }
);

labelled_enum!(
    /// Status of the media coverage ratio.
    CoverageStatus {
        ExtremeSuppression => "EXTREME_SUPPRESSION",
        HighSuppression => "HIGH_SUPPRESSION",
        ModerateSuppression => "MODERATE_SUPPRESSION",
        AdequateCoverage => "ADEQUATE_COVERAGE",
    }
);

labelled_enum!(
    /// Status of the resilience index Γ.
    ResilienceStatus {
        Low => "LOW_RESILIENCE",
        Moderate => "MODERATE_RESILIENCE",
        High => "HIGH_RESILIENCE",
        VeryHigh => "VERY_HIGH_RESILIENCE",
    }
);

labelled_enum!(
    CoherenceState {
        HighlyStable => "highly stable",
        ModeratelyStable => "moderately stable",
        Unstable => "unstable",
        CriticalInstability => "critical instability",
    }
);

labelled_enum!(
    /// How urgently a crisis calls for intervention.
    InterventionPriority {
        Urgent => "URGENT",
        High => "HIGH",
        Moderate => "MODERATE",
    }
);

labelled_enum!(
    RiskLevel {
        Low => "low",
        Moderate => "moderate",
        High => "high",
    }
);

/// Region router over text metrics.
#[must_use]
pub fn region_ladder() -> &'static Ladder<TextMetrics, Region> {
    static LADDER: OnceLock<Ladder<TextMetrics, Region>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<TextMetrics, Region>::new(Region::Drifting)
            .rule("turbulent", |m| m.instability >= 0.85, Region::Turbulent)
            .rule("suppressed", |m| m.suppression >= 0.6, Region::Suppressed)
            .rule(
                "threshold",
                |m| (0.45..0.60).contains(&m.instability) && m.gain >= 0.4,
                Region::Threshold,
            )
            .rule(
                "flowing",
                |m| m.smoothness >= 0.6 && m.gain >= 0.3,
                Region::Flowing,
            )
            .rule("rigid", |m| m.instability < 0.3, Region::Rigid)
    })
}

#[must_use]
pub fn collapse_ladder() -> &'static Ladder<f64, CollapseStatus> {
    static LADDER: OnceLock<Ladder<f64, CollapseStatus>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, CollapseStatus>::new(CollapseStatus::Stable)
            .rule("catastrophic", |d| *d >= 0.85, CollapseStatus::Catastrophic)
            .rule("critical", |d| *d >= 0.65, CollapseStatus::Critical)
            .rule("moderate_risk", |d| *d >= 0.35, CollapseStatus::ModerateRisk)
    })
}

#[must_use]
pub fn coverage_ladder() -> &'static Ladder<f64, CoverageStatus> {
    static LADDER: OnceLock<Ladder<f64, CoverageStatus>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, CoverageStatus>::new(CoverageStatus::AdequateCoverage)
            .rule("extreme", |r| *r < 0.15, CoverageStatus::ExtremeSuppression)
            .rule("high", |r| *r < 0.30, CoverageStatus::HighSuppression)
            .rule("moderate", |r| *r < 0.50, CoverageStatus::ModerateSuppression)
    })
}

#[must_use]
pub fn resilience_ladder() -> &'static Ladder<f64, ResilienceStatus> {
    static LADDER: OnceLock<Ladder<f64, ResilienceStatus>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, ResilienceStatus>::new(ResilienceStatus::VeryHigh)
            .rule("low", |g| *g < 0.30, ResilienceStatus::Low)
            .rule("moderate", |g| *g < 0.50, ResilienceStatus::Moderate)
            .rule("high", |g| *g < 0.70, ResilienceStatus::High)
    })
}

/// Civilization tier over δ_H.
#[must_use]
pub fn civilization_ladder() -> &'static Ladder<f64, CivilizationType> {
    static LADDER: OnceLock<Ladder<f64, CivilizationType>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, CivilizationType>::new(CivilizationType::Type0)
            .rule("type_v_plus", |h| *h >= 0.95, CivilizationType::TypeVPlus)
            .rule("type_iv", |h| *h >= 0.85, CivilizationType::TypeIV)
            .rule("type_iii", |h| *h >= 0.70, CivilizationType::TypeIII)
            .rule("type_ii", |h| *h >= 0.50, CivilizationType::TypeII)
            .rule("type_i", |h| *h >= 0.30, CivilizationType::TypeI)
    })
}

#[must_use]
pub fn coherence_ladder() -> &'static Ladder<f64, CoherenceState> {
    static LADDER: OnceLock<Ladder<f64, CoherenceState>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, CoherenceState>::new(CoherenceState::CriticalInstability)
            .rule("highly_stable", |c| *c > 0.9, CoherenceState::HighlyStable)
            .rule("moderately_stable", |c| *c > 0.6, CoherenceState::ModeratelyStable)
            .rule("unstable", |c| *c > 0.3, CoherenceState::Unstable)
    })
}

#[must_use]
pub fn priority_ladder() -> &'static Ladder<f64, InterventionPriority> {
    static LADDER: OnceLock<Ladder<f64, InterventionPriority>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<f64, InterventionPriority>::new(InterventionPriority::Moderate)
            .rule("urgent", |d| *d > 0.85, InterventionPriority::Urgent)
            .rule("high", |d| *d > 0.65, InterventionPriority::High)
    })
}

#[must_use]
pub fn orric_risk_ladder() -> &'static Ladder<OrricReading, RiskLevel> {
    static LADDER: OnceLock<Ladder<OrricReading, RiskLevel>> = OnceLock::new();
    LADDER.get_or_init(|| {
        Ladder::<OrricReading, RiskLevel>::new(RiskLevel::Low)
            .rule("high", |r| r.collapse_mentions > 5, RiskLevel::High)
            .rule("moderate", |r| r.collapse_mentions > 2, RiskLevel::Moderate)
    })
}

/// Shorthand for `region_ladder().classify(metrics)`.
#[must_use]
pub fn route(metrics: &TextMetrics) -> Region {
    region_ladder().classify(metrics)
}

/// Recommended moves for a region, in order of preference.
#[must_use]
pub fn region_moves(region: Region) -> &'static [Move] {
    const TURBULENT: &[Move] = &[
        mv(
            "stabilize",
            "Slow the exchange and restate the shared ground before adding anything new.",
        ),
        mv("narrow", "Pick one thread and park the rest."),
        mv("anchor", "Tie the next statement to a concrete, checkable fact."),
    ];
    const SUPPRESSED: &[Move] = &[
        mv("surface", "Name what is being withheld or left unsaid."),
        mv("corroborate", "Seek an independent source for the missing signal."),
        mv("protect", "Lower the cost of speaking before asking for more."),
    ];
    const THRESHOLD: &[Move] = &[
        mv("commit", "The sample sits at a tipping point; choose a direction now."),
        mv("amplify", "Reinforce the strongest new idea while the gain is high."),
    ];
    const FLOWING: &[Move] = &[
        mv("sustain", "Keep the current rhythm; intervene lightly."),
        mv("extend", "Carry the momentum into an adjacent question."),
    ];
    const RIGID: &[Move] = &[
        mv("perturb", "Introduce a contrasting example to break repetition."),
        mv("diversify", "Invite an unfamiliar vocabulary or viewpoint."),
        mv("question", "Challenge one assumption the sample takes for granted."),
    ];
    const DRIFTING: &[Move] = &[
        mv("observe", "No strong signal yet; gather another sample."),
        mv("orient", "Restate the goal to give the drift a heading."),
    ];
    match region {
        Region::Turbulent => TURBULENT,
        Region::Suppressed => SUPPRESSED,
        Region::Threshold => THRESHOLD,
        Region::Flowing => FLOWING,
        Region::Rigid => RIGID,
        Region::Drifting => DRIFTING,
    }
}

/// Recommended moves for a collapse status, in order of preference.
#[must_use]
pub fn collapse_moves(status: CollapseStatus) -> &'static [Move] {
    const STABLE: &[Move] = &[
        mv("monitor", "Keep routine observation; re-score when inputs change."),
        mv("invest", "Build reserves while pressure is low."),
    ];
    const MODERATE: &[Move] = &[
        mv("prepare", "Pre-position response capacity near the stress points."),
        mv("watch_thresholds", "Track the components closest to tipping."),
    ];
    const CRITICAL: &[Move] = &[
        mv("mobilize", "Raise response capacity before irreversibility grows."),
        mv("open_channels", "Restore flow of aid and information."),
        mv("coordinate", "Align responders on a single picture of the crisis."),
    ];
    const CATASTROPHIC: &[Move] = &[
        mv("intervene", "Immediate large-scale intervention is required."),
        mv("protect_life", "Prioritize measures that reduce deaths and displacement."),
        mv("break_silence", "Counter coverage suppression so the crisis is seen."),
    ];
    match status {
        CollapseStatus::Stable => STABLE,
        CollapseStatus::ModerateRisk => MODERATE,
        CollapseStatus::Critical => CRITICAL,
        CollapseStatus::Catastrophic => CATASTROPHIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(instability: f64, suppression: f64, smoothness: f64, gain: f64) -> TextMetrics {
        TextMetrics {
            instability,
            suppression,
            smoothness,
            gain,
        }
    }

    #[test]
    fn test_first_match_wins() {
        // Satisfies both turbulent and suppressed; turbulent is listed first.
        let m = metrics(0.9, 0.9, 0.9, 0.9);
        assert_eq!(region_ladder().first_match(&m), ("turbulent", Region::Turbulent));
    }

    #[test]
    fn test_region_default() {
        let m = metrics(0.7, 0.0, 0.1, 0.0);
        assert_eq!(region_ladder().first_match(&m), (DEFAULT_RULE, Region::Drifting));
    }

    #[test]
    fn test_threshold_band() {
        assert_eq!(route(&metrics(0.5, 0.0, 0.9, 0.45)), Region::Threshold);
        // Above the band falls through to flowing.
        assert_eq!(route(&metrics(0.6, 0.0, 0.9, 0.45)), Region::Flowing);
        assert_eq!(route(&metrics(0.2, 0.0, 0.1, 0.0)), Region::Rigid);
    }

    #[test]
    fn test_collapse_boundaries() {
        let l = collapse_ladder();
        assert_eq!(l.classify(&0.34), CollapseStatus::Stable);
        assert_eq!(l.classify(&0.35), CollapseStatus::ModerateRisk);
        assert_eq!(l.classify(&0.65), CollapseStatus::Critical);
        assert_eq!(l.classify(&0.85), CollapseStatus::Catastrophic);
        assert_eq!(l.classify(&1.4), CollapseStatus::Catastrophic);
    }

    #[test]
    fn test_coverage_boundaries() {
        let l = coverage_ladder();
        assert_eq!(l.classify(&0.1167), CoverageStatus::ExtremeSuppression);
        assert_eq!(l.classify(&0.15), CoverageStatus::HighSuppression);
        assert_eq!(l.classify(&0.49), CoverageStatus::ModerateSuppression);
        assert_eq!(l.classify(&0.5), CoverageStatus::AdequateCoverage);
    }

    #[test]
    fn test_civilization_ladder() {
        let l = civilization_ladder();
        assert_eq!(l.classify(&0.1), CivilizationType::Type0);
        assert_eq!(l.classify(&0.3), CivilizationType::TypeI);
        assert_eq!(l.classify(&0.72), CivilizationType::TypeIII);
        assert_eq!(l.classify(&0.95), CivilizationType::TypeVPlus);
    }

    #[test]
    fn test_coherence_is_strict() {
        let l = coherence_ladder();
        assert_eq!(l.classify(&0.9), CoherenceState::ModeratelyStable);
        assert_eq!(l.classify(&0.5), CoherenceState::Unstable);
        assert_eq!(l.classify(&0.3), CoherenceState::CriticalInstability);
    }

    #[test]
    fn test_priority_and_risk() {
        assert_eq!(priority_ladder().classify(&0.86), InterventionPriority::Urgent);
        assert_eq!(priority_ladder().classify(&0.85), InterventionPriority::High);
        let reading = OrricReading {
            tension_mentions: 0,
            collapse_mentions: 3,
        };
        assert_eq!(orric_risk_ladder().classify(&reading), RiskLevel::Moderate);
    }

    #[test]
    fn test_every_category_has_moves() {
        for r in [
            Region::Turbulent,
            Region::Suppressed,
            Region::Threshold,
            Region::Flowing,
            Region::Rigid,
            Region::Drifting,
        ] {
            assert!(!region_moves(r).is_empty(), "{r} has no moves");
        }
        assert_eq!(collapse_moves(CollapseStatus::Catastrophic)[0].label, "intervene");
    }

    #[test]
    fn test_labels_serialize() {
        let json = serde_json::to_string(&CollapseStatus::ModerateRisk).unwrap();
        assert_eq!(json, "\"MODERATE_RISK\"");
        assert_eq!(Region::Flowing.to_string(), "flowing");
    }

    #[test]
    fn test_custom_ladder() {
        let parity: Ladder<i32, &str> = Ladder::new("odd").rule("even", |n| n % 2 == 0, "even");
        assert_eq!(parity.classify(&4), "even");
        assert_eq!(parity.classify(&7), "odd");
        assert_eq!(parity.rules().len(), 1);
    }
}
