//! treatmentAdvisorFlow: a personalised prescription-style answer.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    flow::{TreatmentAdvisorInput, TreatmentPrescription},
    verify::{FlowSchema, VerificationRule, VerificationRuleType},
};
use medai_core::{traits::Flow, FlowRunner};

use crate::{
    handoff::HandoffParams,
    pharmacy::{extract_medication_links, MedicationLink},
    prescription::{format_prescription, PrescriptionLine},
    risk::{confidence_percent, ConfidenceBand},
};

pub const FLOW_NAME: &str = "treatmentAdvisorFlow";

const TEMPLATE: &str = "You are an AI treatment advisor. Based on the user's symptoms, medical history, allergies, age, height and weight, provide a detailed and personalized treatment prescription including medication names, dosages, timing (before or after food), and any dietary considerations.

Symptoms: {{{symptoms}}}
Medical History: {{{medicalHistory}}}
Allergies: {{{allergies}}}
Age: {{{age}}}
Height: {{{height}}}
Weight: {{{weight}}}

Provide a detailed treatment prescription, a confidence level (0-1), and a disclaimer that AI advice is not a substitute for professional medical care. The prescription should resemble a real-world doctor's prescription.";

pub const FALLBACK_PRESCRIPTION: &str = "Failed to get treatment recommendations. Please try again.";
pub const FALLBACK_DISCLAIMER: &str = "An error occurred while processing your request.";

pub struct TreatmentAdvisorFlow;

impl Flow for TreatmentAdvisorFlow {
    type Input = TreatmentAdvisorInput;
    type Output = TreatmentPrescription;

    fn name(&self) -> &'static str {
        FLOW_NAME
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    fn input_schema(&self) -> FlowSchema {
        FlowSchema::new(
            "treatment-advisor-input-v1",
            json!({
                "type": "object",
                "properties": {
                    "symptoms": { "type": "string" },
                    "medicalHistory": { "type": "string" },
                    "allergies": { "type": "string" },
                    "age": { "type": "integer", "minimum": 0 },
                    "height": { "type": "string" },
                    "weight": { "type": "string" }
                },
                "required": ["symptoms", "medicalHistory", "allergies", "age", "height", "weight"]
            }),
        )
        .with_rule(VerificationRule::new(
            "symptoms-present",
            "at least one symptom must be described",
            VerificationRuleType::NonEmpty {
                field_path: "symptoms".to_string(),
            },
        ))
    }

    fn output_schema(&self) -> FlowSchema {
        FlowSchema::new(
            "treatment-advisor-output-v1",
            json!({
                "type": "object",
                "properties": {
                    "prescription": { "type": "string" },
                    "confidenceLevel": { "type": "number" },
                    "disclaimer": { "type": "string" }
                },
                "required": ["prescription", "confidenceLevel", "disclaimer"]
            }),
        )
        .with_rule(VerificationRule::new(
            "confidence-in-unit-range",
            "confidenceLevel lies in [0, 1]",
            VerificationRuleType::NumberRange {
                field_path: "confidenceLevel".to_string(),
                min: 0.0,
                max: 1.0,
            },
        ))
        .with_rule(VerificationRule::new(
            "prescription-present",
            "the prescription text is not blank",
            VerificationRuleType::NonEmpty {
                field_path: "prescription".to_string(),
            },
        ))
    }

    fn fallback(&self) -> TreatmentPrescription {
        TreatmentPrescription {
            prescription: FALLBACK_PRESCRIPTION.to_string(),
            confidence_level: 0.0,
            disclaimer: FALLBACK_DISCLAIMER.to_string(),
        }
    }
}

// ── Form ─────────────────────────────────────────────────────────────────────

/// The treatment form as typed. Age stays text until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreatmentForm {
    pub symptoms: String,
    pub medical_history: String,
    pub allergies: String,
    pub age: String,
    pub height: String,
    pub weight: String,
    /// Shown on the form and logged. Changes nothing about what is sent.
    pub anonymous: bool,
}

impl TreatmentForm {
    /// A form pre-filled from a symptom hand-off.
    pub fn from_handoff(params: HandoffParams) -> Self {
        Self {
            symptoms: params.symptoms,
            medical_history: params.medical_history,
            allergies: params.allergies,
            ..Self::default()
        }
    }

    /// Validate the typed fields into a flow input.
    ///
    /// # Errors
    ///
    /// `InvalidInput { field: "age" }` unless age is a whole number.
    pub fn to_input(&self) -> MedaiResult<TreatmentAdvisorInput> {
        let age_text = self.age.trim();
        let age = age_text.parse::<u32>().map_err(|_| {
            MedaiError::invalid(
                "age",
                if age_text.is_empty() {
                    "age is required".to_string()
                } else {
                    format!("'{age_text}' is not a whole number of years")
                },
            )
        })?;

        if self.anonymous {
            info!("treatment request submitted in anonymous mode");
        }

        Ok(TreatmentAdvisorInput {
            symptoms: self.symptoms.clone(),
            medical_history: self.medical_history.clone(),
            allergies: self.allergies.clone(),
            age,
            height: self.height.clone(),
            weight: self.weight.clone(),
        })
    }
}

// ── Report ───────────────────────────────────────────────────────────────────

/// Everything the treatment screen shows after one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentReport {
    pub prescription: TreatmentPrescription,
    pub band: ConfidenceBand,
    pub percent: u32,
    pub medication_links: Vec<MedicationLink>,
    pub lines: Vec<PrescriptionLine>,
    pub fallback_reason: Option<String>,
}

impl TreatmentReport {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

pub fn request_treatment(runner: &FlowRunner, input: &TreatmentAdvisorInput) -> TreatmentReport {
    let outcome = runner.run_or_fallback(&TreatmentAdvisorFlow, input);
    let fallback_reason = outcome.fallback_reason().map(str::to_string);
    let prescription = outcome.into_output();

    let medication_links = if fallback_reason.is_some() {
        Vec::new()
    } else {
        extract_medication_links(&prescription.prescription)
    };

    info!(
        confidence = prescription.confidence_level,
        medications = medication_links.len(),
        fallback = fallback_reason.is_some(),
        "treatment advice finished"
    );

    TreatmentReport {
        band: ConfidenceBand::from_confidence(prescription.confidence_level),
        percent: confidence_percent(prescription.confidence_level),
        lines: format_prescription(&prescription.prescription),
        medication_links,
        prescription,
        fallback_reason,
    }
}

#[cfg(test)]
mod tests {
    use medai_model::MockModelClient;

    use crate::flows::build_runner;
    use crate::handoff::parse_handoff;

    use super::*;

    fn make_form(age: &str) -> TreatmentForm {
        TreatmentForm {
            symptoms: "sore throat".to_string(),
            medical_history: String::new(),
            allergies: "penicillin".to_string(),
            age: age.to_string(),
            height: "170 cm".to_string(),
            weight: "68 kg".to_string(),
            anonymous: false,
        }
    }

    const PRESCRIPTION_JSON: &str = r#"{
        "prescription": "Pain Relievers (for throat pain):\n1. **Paracetamol** 500mg every 6 hours after food\n- Avoid if you have severe liver disease",
        "confidenceLevel": 0.82,
        "disclaimer": "AI advice is not a substitute for professional medical care."
    }"#;

    // ── Form ─────────────────────────────────────────────────────────────────

    #[test]
    fn form_parses_age() {
        let input = make_form(" 34 ").to_input().unwrap();
        assert_eq!(input.age, 34);
        assert_eq!(input.allergies, "penicillin");
    }

    #[test]
    fn bad_age_is_invalid_input() {
        for age in ["", "thirty", "-4", "34.5"] {
            let err = make_form(age).to_input().unwrap_err();
            match err {
                MedaiError::InvalidInput { field, .. } => assert_eq!(field, "age"),
                other => panic!("expected InvalidInput for {age:?}, got {other:?}"),
            }
        }
    }

    /// A hand-off link fills the three shared fields and nothing else.
    #[test]
    fn form_rehydrates_from_handoff() {
        let params =
            parse_handoff("/treatment-recommendations?symptoms=dry+cough&allergies=dust").unwrap();
        let form = TreatmentForm::from_handoff(params);
        assert_eq!(form.symptoms, "dry cough");
        assert_eq!(form.medical_history, "");
        assert_eq!(form.allergies, "dust");
        assert_eq!(form.age, "");
    }

    // ── Flow ─────────────────────────────────────────────────────────────────

    #[test]
    fn report_includes_band_links_and_lines() {
        let runner = build_runner(Box::new(MockModelClient::new(PRESCRIPTION_JSON)));
        let report = request_treatment(&runner, &make_form("34").to_input().unwrap());

        assert!(!report.is_fallback());
        assert_eq!(report.band, ConfidenceBand::High);
        assert_eq!(report.percent, 82);
        assert_eq!(report.medication_links.len(), 1);
        assert_eq!(report.medication_links[0].name, "Paracetamol");
        assert!(matches!(report.lines[0], PrescriptionLine::SectionHeading { .. }));
        assert!(matches!(report.lines[1], PrescriptionLine::Numbered { number: 1, .. }));
    }

    #[test]
    fn report_serializes_with_links_and_band() {
        let runner = build_runner(Box::new(MockModelClient::new(PRESCRIPTION_JSON)));
        let report = request_treatment(&runner, &make_form("34").to_input().unwrap());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["percent"], 82);
        assert_eq!(json["band"], serde_json::to_value(ConfidenceBand::High).unwrap());
        assert_eq!(json["medicationLinks"][0]["name"], "Paracetamol");
        assert_eq!(json["lines"].as_array().unwrap().len(), report.lines.len());
        assert!(json["fallbackReason"].is_null());
        assert_eq!(json["prescription"]["confidenceLevel"], 0.82);
    }

    #[test]
    fn prompt_renders_age_as_number() {
        let model = MockModelClient::new(PRESCRIPTION_JSON);
        let seen = model.requests();
        let runner = build_runner(Box::new(model));
        request_treatment(&runner, &make_form("61").to_input().unwrap());

        let requests = seen.lock().unwrap();
        assert!(requests[0].prompt.contains("Age: 61\n"));
        assert!(requests[0].prompt.contains("Weight: 68 kg\n"));
    }

    #[test]
    fn failure_yields_documented_placeholder() {
        let runner = build_runner(Box::new(MockModelClient::unreachable()));
        let report = request_treatment(&runner, &make_form("34").to_input().unwrap());

        assert!(report.is_fallback());
        assert_eq!(
            report.prescription,
            TreatmentPrescription {
                prescription: "Failed to get treatment recommendations. Please try again."
                    .to_string(),
                confidence_level: 0.0,
                disclaimer: "An error occurred while processing your request.".to_string(),
            }
        );
        assert_eq!(report.band, ConfidenceBand::Low);
        assert!(report.medication_links.is_empty());
    }

    #[test]
    fn missing_disclaimer_is_rejected() {
        let runner = build_runner(Box::new(MockModelClient::new(
            r#"{"prescription":"Rest","confidenceLevel":0.5}"#,
        )));
        let report = request_treatment(&runner, &make_form("20").to_input().unwrap());
        assert!(report.is_fallback());
        assert!(report.fallback_reason.unwrap().contains("disclaimer"));
    }
}
