//! Inputs and outputs of the three model-backed flows.
//!
//! Field names serialize in camelCase because the same documents are
//! rendered into prompts and requested back from the model as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Symptom analysis ─────────────────────────────────────────────────────────

/// What the user typed on the symptom form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeSymptomsInput {
    pub symptoms: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub allergies: String,
}

/// One candidate condition proposed by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialCondition {
    pub condition: String,
    /// Likelihood in `[0, 1]`.
    pub confidence: f64,
    pub recommendations: String,
}

/// The symptom analyzer's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub conditions: Vec<PotentialCondition>,
}

// ── Treatment advice ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentAdvisorInput {
    pub symptoms: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub allergies: String,
    pub age: u32,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
}

/// A prescription-style free-text answer plus its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPrescription {
    pub prescription: String,
    pub confidence_level: f64,
    pub disclaimer: String,
}

// ── Medical Q&A ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalQaInput {
    pub question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

// ── Model exchange ───────────────────────────────────────────────────────────

/// One prompt sent to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Name of the flow issuing the request (e.g. "analyzeSymptomsFlow").
    pub flow: String,
    /// The fully rendered prompt text.
    pub prompt: String,
    /// JSON Schema the answer is expected to satisfy. Sent to the model as
    /// a structured-output hint.
    pub output_schema: Value,
}

/// What a flow run hands back to a front end.
///
/// Every failure inside a flow ends in `Fallback`, carrying the flow's
/// placeholder output and the reason it was used.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome<T> {
    /// The model answered and the answer passed verification.
    Completed(T),
    /// Something failed; `output` is the flow's placeholder.
    Fallback { output: T, reason: String },
}

impl<T> FlowOutcome<T> {
    pub fn output(&self) -> &T {
        match self {
            FlowOutcome::Completed(output) => output,
            FlowOutcome::Fallback { output, .. } => output,
        }
    }

    pub fn into_output(self) -> T {
        match self {
            FlowOutcome::Completed(output) => output,
            FlowOutcome::Fallback { output, .. } => output,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FlowOutcome::Fallback { .. })
    }

    /// The failure reason, if this outcome is a fallback.
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            FlowOutcome::Completed(_) => None,
            FlowOutcome::Fallback { reason, .. } => Some(reason),
        }
    }
}
