//! # Universal Collapse Scanner
//!
//! Heuristic crisis calculator built from four indices:
//!
//! | Index | Formula | Range |
//! |-------|---------|-------|
//! | δ, collapse coefficient | `S·I·T / max(R·P, 0.01)` | `[0, 100]` |
//! | coverage ratio | `actual / max(expected, 1)` | `[0, ∞)` |
//! | Γ, resilience | `(A + R + C) / 3` | `[0, 1]` |
//! | Ψ, amplification | `1 + V·E·F` | `[1, 2]` |
//!
//! All components are clamped to [0, 1] before use. [`scan`] combines them
//! with the geometry router into a single [`CrisisAnalysis`].

pub mod geometry;
pub mod scoring;

pub use geometry::{route, Geometry};

use crate::classifier::{
    collapse_ladder, collapse_moves, coverage_ladder, priority_ladder, resilience_ladder,
    CollapseStatus, CoverageStatus, InterventionPriority, Move, ResilienceStatus,
};
use qcsim_data::{AmplificationComponents, CollapseComponents, MediaCoverage, ResilienceComponents};
use serde::{Deserialize, Serialize};

/// Smallest denominator allowed in δ.
pub const MIN_MITIGATION: f64 = 0.01;

/// Rounds half away from zero to `places` decimal places.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Raw collapse coefficient δ.
#[must_use]
pub fn collapse_coefficient(components: &CollapseComponents) -> f64 {
    let c = components.clamped();
    let stress = c.severity * c.irreversibility * c.time_pressure;
    let mitigation = (c.response_capacity * c.recovery_potential).max(MIN_MITIGATION);
    stress / mitigation
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollapseBreakdown {
    pub stress_factors: f64,
    pub mitigation_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollapseAnalysis {
    /// δ rounded to three places.
    pub delta: f64,
    pub status: CollapseStatus,
    pub priority: InterventionPriority,
    pub components: CollapseComponents,
    pub breakdown: CollapseBreakdown,
    pub moves: &'static [Move],
}

#[must_use]
pub fn analyze_collapse(components: &CollapseComponents) -> CollapseAnalysis {
    let c = components.clamped();
    let delta = collapse_coefficient(&c);
    let status = collapse_ladder().classify(&delta);
    CollapseAnalysis {
        delta: round_to(delta, 3),
        status,
        priority: priority_ladder().classify(&delta),
        components: c,
        breakdown: CollapseBreakdown {
            stress_factors: round_to(c.severity * c.irreversibility * c.time_pressure, 3),
            mitigation_capacity: round_to(c.response_capacity * c.recovery_potential, 3),
        },
        moves: collapse_moves(status),
    }
}

/// Coverage ratio (LSSE) rounded to three places. Zero expected coverage
/// is treated as one article.
#[must_use]
pub fn coverage_ratio(coverage: &MediaCoverage) -> f64 {
    let expected = coverage.expected_articles.max(1);
    round_to(coverage.actual_articles as f64 / expected as f64, 3)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageAnalysis {
    pub lsse: f64,
    pub status: CoverageStatus,
    /// Expected minus actual articles; negative when over-covered.
    pub coverage_gap: i64,
    pub gap_percentage: f64,
    pub timeframe_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_lsse: Option<f64>,
}

#[must_use]
pub fn analyze_coverage(coverage: &MediaCoverage) -> CoverageAnalysis {
    let lsse = coverage_ratio(coverage);
    let social_lsse = match (
        coverage.actual_social_mentions,
        coverage.expected_social_mentions,
    ) {
        (Some(actual), Some(expected)) if actual > 0 && expected > 0 => {
            Some(round_to(actual as f64 / expected as f64, 3))
        }
        _ => None,
    };
    CoverageAnalysis {
        lsse,
        status: coverage_ladder().classify(&lsse),
        coverage_gap: coverage.expected_articles as i64 - coverage.actual_articles as i64,
        gap_percentage: round_to((1.0 - lsse) * 100.0, 1),
        timeframe_days: coverage.timeframe_days,
        social_lsse,
    }
}

/// Reference crisis used to scale expected coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Baseline {
    #[default]
    Ukraine,
    Gaza,
}

impl Baseline {
    /// Unknown names fall back to [`Baseline::Ukraine`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "gaza" => Self::Gaza,
            _ => Self::Ukraine,
        }
    }

    /// (monthly articles, deaths, displaced) at the reference peak.
    fn figures(self) -> (f64, f64, f64) {
        match self {
            Self::Ukraine => (15_000.0, 100_000.0, 10_000_000.0),
            Self::Gaza => (12_000.0, 50_000.0, 2_000_000.0),
        }
    }
}

/// Monthly article count a crisis of this size would normally attract.
/// Never below 100.
#[must_use]
pub fn estimate_expected_coverage(deaths: u64, displaced: u64, baseline: Baseline) -> u64 {
    let (articles, base_deaths, base_displaced) = baseline.figures();
    let ratio = (deaths as f64 / base_deaths) * 0.6 + (displaced as f64 / base_displaced) * 0.4;
    ((articles * ratio) as u64).max(100)
}

/// Resilience index Γ rounded to three places.
#[must_use]
pub fn resilience_index(components: &ResilienceComponents) -> f64 {
    let c = ResilienceComponents::new(
        components.adaptive_capacity,
        components.reserves,
        components.social_cohesion,
    );
    round_to((c.adaptive_capacity + c.reserves + c.social_cohesion) / 3.0, 3)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResilienceAnalysis {
    pub gamma: f64,
    pub status: ResilienceStatus,
    pub components: ResilienceComponents,
}

#[must_use]
pub fn analyze_resilience(components: &ResilienceComponents) -> ResilienceAnalysis {
    let gamma = resilience_index(components);
    ResilienceAnalysis {
        gamma,
        status: resilience_ladder().classify(&gamma),
        components: *components,
    }
}

/// Amplification factor Ψ rounded to three places.
#[must_use]
pub fn amplification_factor(components: &AmplificationComponents) -> f64 {
    let c = AmplificationComponents::new(
        components.vulnerability,
        components.exposure,
        components.fragility,
    );
    round_to(1.0 + c.vulnerability * c.exposure * c.fragility, 3)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmplificationAnalysis {
    pub psi: f64,
    pub amplification: f64,
    pub components: AmplificationComponents,
}

#[must_use]
pub fn analyze_amplification(components: &AmplificationComponents) -> AmplificationAnalysis {
    let psi = amplification_factor(components);
    AmplificationAnalysis {
        psi,
        amplification: round_to(psi - 1.0, 3),
        components: *components,
    }
}

/// Everything known about one crisis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisRecord {
    #[serde(default)]
    pub name: String,
    pub components: CollapseComponents,
    #[serde(default)]
    pub coverage: Option<MediaCoverage>,
    #[serde(default)]
    pub resilience: Option<ResilienceComponents>,
    #[serde(default)]
    pub amplification: Option<AmplificationComponents>,
    /// Observed pattern names, fed to the geometry router.
    #[serde(default)]
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometryMatch {
    pub geometry: Geometry,
    pub description: &'static str,
    pub question: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrisisAnalysis {
    pub name: String,
    pub collapse: CollapseAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<CoverageAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resilience: Option<ResilienceAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amplification: Option<AmplificationAnalysis>,
    pub geometries: Vec<GeometryMatch>,
}

impl CrisisAnalysis {
    #[must_use]
    pub fn primary_geometry(&self) -> Option<Geometry> {
        self.geometries.first().map(|g| g.geometry)
    }
}

/// Full analysis of one crisis record.
#[must_use]
pub fn scan(record: &CrisisRecord) -> CrisisAnalysis {
    let analysis = CrisisAnalysis {
        name: record.name.clone(),
        collapse: analyze_collapse(&record.components),
        coverage: record.coverage.as_ref().map(analyze_coverage),
        resilience: record.resilience.as_ref().map(analyze_resilience),
        amplification: record.amplification.as_ref().map(analyze_amplification),
        geometries: route(record.patterns.iter().map(String::as_str))
            .into_iter()
            .map(|geometry| GeometryMatch {
                geometry,
                description: geometry.description(),
                question: geometry.routing_question(),
            })
            .collect(),
    };
    tracing::debug!(
        crisis = %analysis.name,
        delta = analysis.collapse.delta,
        status = %analysis.collapse.status,
        "crisis scanned"
    );
    analysis
}
