//! Turning model confidences into labels a user can act on.

use std::fmt;

use serde::{Deserialize, Serialize};

use medai_contracts::flow::PotentialCondition;

pub const URGENT_ADVICE: &str = "Doctor Visit Recommended";
pub const ROUTINE_ADVICE: &str = "Self-Care or Doctor Visit Optional";

/// Overall risk of a symptom analysis, driven by its most likely condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// No conditions to judge by.
    Unknown,
    Mild,
    Moderate,
    Severe,
}

impl RiskLevel {
    /// Bucket a single confidence: `> 0.75` severe, `> 0.5` moderate.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.75 {
            RiskLevel::Severe
        } else if confidence > 0.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Mild
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Unknown => "Unknown",
            RiskLevel::Mild => "Mild",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Severe => "Severe",
        }
    }

    /// What the user should do about it.
    pub fn urgency(self) -> &'static str {
        match self {
            RiskLevel::Severe => URGENT_ADVICE,
            _ => ROUTINE_ADVICE,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk of the whole analysis: the bucket of the highest confidence.
pub fn derive_risk_label(conditions: &[PotentialCondition]) -> RiskLevel {
    if conditions.is_empty() {
        return RiskLevel::Unknown;
    }
    let max = conditions
        .iter()
        .map(|c| c.confidence)
        .fold(f64::NEG_INFINITY, f64::max);
    RiskLevel::from_confidence(max)
}

/// How sure the treatment advisor is of its prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.75 {
            ConfidenceBand::High
        } else if confidence > 0.5 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBand::Low => "Low",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::High => "High",
        }
    }
}

/// `confidence` as a whole percentage, clamped to `0..=100`.
pub fn confidence_percent(confidence: f64) -> u32 {
    if confidence.is_nan() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u32
}
