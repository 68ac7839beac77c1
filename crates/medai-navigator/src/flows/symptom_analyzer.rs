//! analyzeSymptomsFlow: symptoms in, ranked candidate conditions out.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use medai_contracts::{
    flow::{AnalyzeSymptomsInput, PotentialCondition, SymptomAnalysis},
    verify::{FlowSchema, VerificationRule, VerificationRuleType},
};
use medai_core::{traits::Flow, FlowRunner};

use crate::risk::{derive_risk_label, RiskLevel};

pub const FLOW_NAME: &str = "analyzeSymptomsFlow";

const TEMPLATE: &str = "You are an AI-powered symptom analyzer. Given a list of symptoms, medical history and allergies, you will provide a prioritized list of potential medical conditions with confidence levels and recommendations.

Symptoms: {{{symptoms}}}
Medical History: {{{medicalHistory}}}
Allergies: {{{allergies}}}

Analyze the symptoms and provide a prioritized list of potential conditions. For each condition, provide a confidence level (0-1) indicating the likelihood that the symptoms match the condition. Also, provide recommendations for each condition, such as seeking medical advice or self-care.

Output the response in JSON format.";

/// Offered after a successful analysis; picking one re-submits with it appended.
pub const FOLLOW_UP_QUESTIONS: [&str; 3] = [
    "Have you experienced any recent changes in your diet?",
    "Are you currently taking any medications?",
    "How would you rate your pain on a scale of 1 to 10?",
];

pub const FALLBACK_CONDITION: &str = "Error";
pub const FALLBACK_RECOMMENDATION: &str = "Failed to analyze symptoms. Please try again.";

pub struct SymptomAnalyzerFlow;

impl Flow for SymptomAnalyzerFlow {
    type Input = AnalyzeSymptomsInput;
    type Output = SymptomAnalysis;

    fn name(&self) -> &'static str {
        FLOW_NAME
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    fn input_schema(&self) -> FlowSchema {
        FlowSchema::new(
            "analyze-symptoms-input-v1",
            json!({
                "type": "object",
                "properties": {
                    "symptoms": { "type": "string" },
                    "medicalHistory": { "type": "string" },
                    "allergies": { "type": "string" }
                },
                "required": ["symptoms"]
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
            "analyze-symptoms-output-v1",
            json!({
                "type": "object",
                "properties": {
                    "conditions": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "condition": { "type": "string" },
                                "confidence": { "type": "number" },
                                "recommendations": { "type": "string" }
                            },
                            "required": ["condition", "confidence", "recommendations"]
                        }
                    }
                },
                "required": ["conditions"]
            }),
        )
        .with_rule(VerificationRule::new(
            "confidence-in-unit-range",
            "every condition confidence lies in [0, 1]",
            VerificationRuleType::NumberRange {
                field_path: "conditions[].confidence".to_string(),
                min: 0.0,
                max: 1.0,
            },
        ))
        .with_rule(VerificationRule::new(
            "condition-named",
            "every condition has a name",
            VerificationRuleType::NonEmpty {
                field_path: "conditions[].condition".to_string(),
            },
        ))
    }

    fn fallback(&self) -> SymptomAnalysis {
        SymptomAnalysis {
            conditions: vec![PotentialCondition {
                condition: FALLBACK_CONDITION.to_string(),
                confidence: 1.0,
                recommendations: FALLBACK_RECOMMENDATION.to_string(),
            }],
        }
    }

    /// Most likely condition first; ties keep the model's order.
    fn finish(&self, mut output: SymptomAnalysis) -> SymptomAnalysis {
        output.conditions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        output
    }
}

/// Everything the symptom screen shows after one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomReport {
    pub analysis: SymptomAnalysis,
    pub risk: RiskLevel,
    /// Advice text for `risk`.
    pub urgency: &'static str,
    /// Empty after a failed analysis.
    pub follow_ups: Vec<&'static str>,
    /// Set when `analysis` is the fallback placeholder.
    pub fallback_reason: Option<String>,
}

impl SymptomReport {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

/// Run the analysis and derive everything the screen needs from it.
pub fn submit_symptoms(runner: &FlowRunner, input: &AnalyzeSymptomsInput) -> SymptomReport {
    let outcome = runner.run_or_fallback(&SymptomAnalyzerFlow, input);
    let fallback_reason = outcome.fallback_reason().map(str::to_string);
    let analysis = outcome.into_output();
    let risk = derive_risk_label(&analysis.conditions);

    info!(
        conditions = analysis.conditions.len(),
        risk = %risk,
        fallback = fallback_reason.is_some(),
        "symptom analysis finished"
    );

    let follow_ups = if fallback_reason.is_some() {
        Vec::new()
    } else {
        FOLLOW_UP_QUESTIONS.to_vec()
    };

    SymptomReport {
        analysis,
        risk,
        urgency: risk.urgency(),
        follow_ups,
        fallback_reason,
    }
}

/// Symptom text with a follow-up question appended, ready to re-submit.
pub fn with_follow_up(symptoms: &str, question: &str) -> String {
    format!("{symptoms}. {question}")
}

#[cfg(test)]
mod tests {
    use medai_contracts::flow::AnalyzeSymptomsInput;
    use medai_model::MockModelClient;

    use crate::flows::build_runner;
    use crate::risk::RiskLevel;

    use super::*;

    fn make_input(symptoms: &str) -> AnalyzeSymptomsInput {
        AnalyzeSymptomsInput {
            symptoms: symptoms.to_string(),
            medical_history: "asthma".to_string(),
            allergies: String::new(),
        }
    }

    const THREE_CONDITIONS: &str = r#"{"conditions":[
        {"condition":"Common cold","confidence":0.4,"recommendations":"Rest and fluids."},
        {"condition":"Influenza","confidence":0.8,"recommendations":"See a doctor if fever persists."},
        {"condition":"Allergic rhinitis","confidence":0.4,"recommendations":"Try an antihistamine."}
    ]}"#;

    /// Conditions come back ranked by confidence, ties in model order.
    #[test]
    fn analysis_is_ranked_and_risk_derived() {
        let runner = build_runner(Box::new(MockModelClient::new(THREE_CONDITIONS)));
        let report = submit_symptoms(&runner, &make_input("fever, cough"));

        let names: Vec<&str> = report
            .analysis
            .conditions
            .iter()
            .map(|c| c.condition.as_str())
            .collect();
        assert_eq!(names, vec!["Influenza", "Common cold", "Allergic rhinitis"]);
        assert_eq!(report.risk, RiskLevel::Severe);
        assert_eq!(report.urgency, "Doctor Visit Recommended");
        assert_eq!(report.follow_ups.len(), 3);
        assert!(!report.is_fallback());
    }

    /// The rendered prompt carries all three form fields.
    #[test]
    fn prompt_includes_form_fields() {
        let model = MockModelClient::new(THREE_CONDITIONS);
        let seen = model.requests();
        let runner = build_runner(Box::new(model));
        submit_symptoms(&runner, &make_input("itchy eyes"));

        let requests = seen.lock().unwrap();
        assert_eq!(requests[0].flow, FLOW_NAME);
        assert!(requests[0].prompt.contains("Symptoms: itchy eyes\n"));
        assert!(requests[0].prompt.contains("Medical History: asthma\n"));
        assert!(requests[0].prompt.contains("Allergies: \n"));
    }

    /// A failed call yields exactly the documented placeholder and no follow-ups.
    #[test]
    fn model_failure_yields_error_condition() {
        let runner = build_runner(Box::new(MockModelClient::failing("HTTP 503")));
        let report = submit_symptoms(&runner, &make_input("headache"));

        assert_eq!(
            report.analysis.conditions,
            vec![PotentialCondition {
                condition: "Error".to_string(),
                confidence: 1.0,
                recommendations: "Failed to analyze symptoms. Please try again.".to_string(),
            }]
        );
        assert!(report.follow_ups.is_empty());
        assert!(report.fallback_reason.unwrap().contains("HTTP 503"));
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let runner = build_runner(Box::new(MockModelClient::new(
            r#"{"conditions":[{"condition":"Flu","confidence":85,"recommendations":"Rest"}]}"#,
        )));
        let report = submit_symptoms(&runner, &make_input("fever"));
        assert!(report.is_fallback());
        assert_eq!(report.analysis.conditions[0].condition, FALLBACK_CONDITION);
    }

    /// Blank symptoms never reach the model.
    #[test]
    fn blank_symptoms_fall_back_without_a_call() {
        let model = MockModelClient::new(THREE_CONDITIONS);
        let seen = model.requests();
        let runner = build_runner(Box::new(model));
        let report = submit_symptoms(&runner, &make_input("   "));

        assert!(report.is_fallback());
        assert!(seen.lock().unwrap().is_empty());
    }

    /// The JSON form keeps everything the screen shows, fallback reason included.
    #[test]
    fn failed_report_serializes_in_full() {
        let runner = build_runner(Box::new(MockModelClient::failing("HTTP 503")));
        let report = submit_symptoms(&runner, &make_input("headache"));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["risk"], "Severe");
        assert_eq!(json["urgency"], "Doctor Visit Recommended");
        assert_eq!(json["followUps"], serde_json::json!([]));
        assert!(json["fallbackReason"].as_str().unwrap().contains("HTTP 503"));
        assert_eq!(json["analysis"]["conditions"][0]["condition"], FALLBACK_CONDITION);
    }

    #[test]
    fn empty_condition_list_is_unknown_risk() {
        let runner = build_runner(Box::new(MockModelClient::new(r#"{"conditions":[]}"#)));
        let report = submit_symptoms(&runner, &make_input("tired"));
        assert_eq!(report.risk, RiskLevel::Unknown);
        assert_eq!(report.follow_ups.len(), 3);
    }

    #[test]
    fn follow_up_is_appended_with_separator() {
        assert_eq!(
            with_follow_up("sharp knee pain", FOLLOW_UP_QUESTIONS[2]),
            "sharp knee pain. How would you rate your pain on a scale of 1 to 10?"
        );
    }
}
