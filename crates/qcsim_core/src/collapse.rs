//! Toy collapse: maps an intent phase φ to eigen-like values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseRequest {
    pub intent_phase: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollapseResult {
    pub alpha_eigenvalues: Vec<f64>,
    pub beta_eigenvalues: Vec<f64>,
    pub intent_phase: f64,
    pub message: String,
}

/// `alpha = [cos φ]`, `beta = [sin φ]`. A non-finite phase is treated as 0.
#[must_use]
pub fn simulate_collapse(intent_phase: f64) -> CollapseResult {
    let phase = if intent_phase.is_finite() {
        intent_phase
    } else {
        0.0
    };
    CollapseResult {
        alpha_eigenvalues: vec![phase.cos()],
        beta_eigenvalues: vec![phase.sin()],
        intent_phase: phase,
        message: format!("Quantum simulation executed with intent phase {phase:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_zero_phase() {
        let r = simulate_collapse(0.0);
        assert_eq!(r.alpha_eigenvalues, vec![1.0]);
        assert_eq!(r.beta_eigenvalues, vec![0.0]);
        assert_eq!(r.message, "Quantum simulation executed with intent phase 0.0");
    }

    #[test]
    fn test_quarter_turn() {
        let r = simulate_collapse(FRAC_PI_2);
        assert!(r.alpha_eigenvalues[0].abs() < 1e-12);
        assert!((r.beta_eigenvalues[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_phase() {
        let r = simulate_collapse(f64::NAN);
        assert_eq!(r.intent_phase, 0.0);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(simulate_collapse(1.5)).unwrap();
        assert!(json.get("alphaEigenvalues").is_some());
        assert!(json.get("betaEigenvalues").is_some());
        assert_eq!(json["intentPhase"], 1.5);
        let req: CollapseRequest = serde_json::from_str(r#"{"intentPhase":0.25}"#).unwrap();
        assert_eq!(req.intent_phase, 0.25);
    }
}
