//! Input records for the collapse scanner.
//!
//! Every component constructor clamps into [0, 1] so that downstream
//! formulas never see out-of-range or non-finite values.

use super::clamp01;
use serde::{Deserialize, Serialize};

/// The five factors of the collapse coefficient δ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollapseComponents {
    pub severity: f64,
    pub irreversibility: f64,
    pub time_pressure: f64,
    pub response_capacity: f64,
    pub recovery_potential: f64,
}

impl CollapseComponents {
    #[must_use]
    pub fn new(
        severity: f64,
        irreversibility: f64,
        time_pressure: f64,
        response_capacity: f64,
        recovery_potential: f64,
    ) -> Self {
        Self {
            severity,
            irreversibility,
            time_pressure,
            response_capacity,
            recovery_potential,
        }
        .clamped()
    }

    /// Copy with every component forced into [0, 1].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            severity: clamp01(self.severity),
            irreversibility: clamp01(self.irreversibility),
            time_pressure: clamp01(self.time_pressure),
            response_capacity: clamp01(self.response_capacity),
            recovery_potential: clamp01(self.recovery_potential),
        }
    }
}

/// Observed versus expected media attention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaCoverage {
    pub actual_articles: u64,
    pub expected_articles: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_social_mentions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_social_mentions: Option<u64>,
    #[serde(default = "default_timeframe")]
    pub timeframe_days: u32,
}

fn default_timeframe() -> u32 {
    30
}

impl MediaCoverage {
    #[must_use]
    pub fn new(actual_articles: u64, expected_articles: u64) -> Self {
        Self {
            actual_articles,
            expected_articles,
            actual_social_mentions: None,
            expected_social_mentions: None,
            timeframe_days: default_timeframe(),
        }
    }

    #[must_use]
    pub fn with_social(mut self, actual: u64, expected: u64) -> Self {
        self.actual_social_mentions = Some(actual);
        self.expected_social_mentions = Some(expected);
        self
    }
}

/// Inputs of the resilience index Γ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResilienceComponents {
    pub adaptive_capacity: f64,
    pub reserves: f64,
    pub social_cohesion: f64,
}

impl ResilienceComponents {
    #[must_use]
    pub fn new(adaptive_capacity: f64, reserves: f64, social_cohesion: f64) -> Self {
        Self {
            adaptive_capacity: clamp01(adaptive_capacity),
            reserves: clamp01(reserves),
            social_cohesion: clamp01(social_cohesion),
        }
    }
}

/// Inputs of the amplification factor Ψ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmplificationComponents {
    pub vulnerability: f64,
    pub exposure: f64,
    pub fragility: f64,
}

impl AmplificationComponents {
    #[must_use]
    pub fn new(vulnerability: f64, exposure: f64, fragility: f64) -> Self {
        Self {
            vulnerability: clamp01(vulnerability),
            exposure: clamp01(exposure),
            fragility: clamp01(fragility),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_components_are_clamped() {
        let c = CollapseComponents::new(1.4, -0.2, f64::NAN, 0.5, f64::INFINITY);
        assert_eq!(c.severity, 1.0);
        assert_eq!(c.irreversibility, 0.0);
        assert_eq!(c.time_pressure, 0.0);
        assert_eq!(c.response_capacity, 0.5);
        assert_eq!(c.recovery_potential, 1.0);
    }

    #[test]
    fn test_coverage_defaults_timeframe() {
        let c: MediaCoverage =
            serde_json::from_str(r#"{"actual_articles":1400,"expected_articles":12000}"#).unwrap();
        assert_eq!(c.timeframe_days, 30);
        assert!(c.actual_social_mentions.is_none());
    }
}
