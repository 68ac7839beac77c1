//! # medai-navigator
//!
//! The MedAi Navigator feature set, independent of any front end:
//!
//! - [`flows`]: symptom analysis, treatment advice and medical Q&A run through
//!   a [`FlowRunner`](medai_core::FlowRunner), always ending in an answer or
//!   the flow's placeholder.
//! - [`risk`], [`prescription`], [`pharmacy`]: turning model output into
//!   labels, styled lines and pharmacy links.
//! - [`handoff`]: carrying a symptom report over to the treatment form.
//! - [`planner`]: appointments, medication courses, online consultations.
//! - [`mock_data`]: placeholder health services and an offline model.
//! - [`gate`]: one request in flight per form.

pub mod flows;
pub mod gate;
pub mod handoff;
pub mod mock_data;
pub mod pharmacy;
pub mod planner;
pub mod prescription;
pub mod risk;

pub use flows::build_runner;
pub use gate::{RequestGate, RequestGuard};
pub use handoff::{hand_off_to_treatment, parse_handoff, HandoffParams};
pub use risk::{derive_risk_label, RiskLevel};

#[cfg(test)]
mod tests {
    use medai_contracts::flow::AnalyzeSymptomsInput;

    use crate::flows::{symptom_analyzer, treatment_advisor::{self, TreatmentForm}};
    use crate::mock_data::offline_model;

    use super::*;

    /// A symptom report handed off to the treatment form produces a
    /// prescription with pharmacy links for the named medicines.
    #[test]
    fn symptoms_to_treatment_end_to_end() {
        let runner = build_runner(Box::new(offline_model()));
        let input = AnalyzeSymptomsInput {
            symptoms: "sore throat & fever".to_string(),
            medical_history: "asthma".to_string(),
            allergies: "penicillin".to_string(),
        };
        let report = symptom_analyzer::submit_symptoms(&runner, &input);
        assert!(!report.is_fallback());

        let link = hand_off_to_treatment(&input.symptoms, &input.medical_history, &input.allergies);
        let mut form = TreatmentForm::from_handoff(parse_handoff(&link).unwrap());
        assert_eq!(form.symptoms, "sore throat & fever");
        form.age = "34".to_string();

        let treatment = treatment_advisor::request_treatment(&runner, &form.to_input().unwrap());
        assert!(!treatment.is_fallback());
        let names: Vec<&str> = treatment
            .medication_links
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert!(names.contains(&"Paracetamol"));
        assert!(names.contains(&"Cetirizine"));
    }

    /// The gate is free again once a request finishes.
    #[test]
    fn gate_clears_after_flow_run() {
        let gate = RequestGate::new();
        let runner = build_runner(Box::new(medai_model::MockModelClient::unreachable()));
        {
            let _guard = gate.try_begin().unwrap();
            assert!(gate.try_begin().is_none());
            let outcome = flows::medical_qa::ask(&runner, "anything");
            assert!(outcome.is_fallback());
        }
        assert!(!gate.is_loading());
    }
}
