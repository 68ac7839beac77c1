//! medicalQAFlow: a free-form question answered with sources.

use serde_json::json;
use tracing::info;

use medai_contracts::{
    flow::{FlowOutcome, MedicalAnswer, MedicalQaInput},
    verify::{FlowSchema, VerificationRule, VerificationRuleType},
};
use medai_core::{traits::Flow, FlowRunner};

pub const FLOW_NAME: &str = "medicalQAFlow";

const TEMPLATE: &str = "You are a helpful and informative doctor chatbot. A user will ask you a medical question, and you should provide a clear and concise answer. Include a list of sources that you used to formulate your answer.

Question: {{{question}}}

Answer:";

pub const FALLBACK_ANSWER: &str = "Failed to get an answer. Please try again.";

pub struct MedicalQaFlow;

impl Flow for MedicalQaFlow {
    type Input = MedicalQaInput;
    type Output = MedicalAnswer;

    fn name(&self) -> &'static str {
        FLOW_NAME
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    fn input_schema(&self) -> FlowSchema {
        FlowSchema::new(
            "medical-qa-input-v1",
            json!({
                "type": "object",
                "properties": { "question": { "type": "string" } },
                "required": ["question"]
            }),
        )
        .with_rule(VerificationRule::new(
            "question-present",
            "a question must be asked",
            VerificationRuleType::NonEmpty {
                field_path: "question".to_string(),
            },
        ))
    }

    fn output_schema(&self) -> FlowSchema {
        FlowSchema::new(
            "medical-qa-output-v1",
            json!({
                "type": "object",
                "properties": {
                    "answer": { "type": "string" },
                    "sources": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["answer", "sources"]
            }),
        )
        .with_rule(VerificationRule::new(
            "answer-present",
            "the answer is not blank",
            VerificationRuleType::NonEmpty {
                field_path: "answer".to_string(),
            },
        ))
    }

    fn fallback(&self) -> MedicalAnswer {
        MedicalAnswer {
            answer: FALLBACK_ANSWER.to_string(),
            sources: Vec::new(),
        }
    }
}

pub fn ask(runner: &FlowRunner, question: &str) -> FlowOutcome<MedicalAnswer> {
    let input = MedicalQaInput {
        question: question.to_string(),
    };
    let outcome = runner.run_or_fallback(&MedicalQaFlow, &input);
    info!(
        sources = outcome.output().sources.len(),
        fallback = outcome.is_fallback(),
        "medical question answered"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use medai_model::MockModelClient;

    use crate::flows::build_runner;

    use super::*;

    #[test]
    fn answer_and_sources_are_returned() {
        let runner = build_runner(Box::new(MockModelClient::new(
            r#"{"answer":"Adults need 7-9 hours of sleep.","sources":["https://www.cdc.gov/sleep"]}"#,
        )));
        let outcome = ask(&runner, "How much sleep do adults need?");
        assert_eq!(
            outcome,
            FlowOutcome::Completed(MedicalAnswer {
                answer: "Adults need 7-9 hours of sleep.".to_string(),
                sources: vec!["https://www.cdc.gov/sleep".to_string()],
            })
        );
    }

    #[test]
    fn question_lands_in_prompt() {
        let model = MockModelClient::new(r#"{"answer":"Yes.","sources":[]}"#);
        let seen = model.requests();
        let runner = build_runner(Box::new(model));
        ask(&runner, "Is walking good exercise?");

        let prompt = seen.lock().unwrap()[0].prompt.clone();
        assert!(prompt.ends_with("Question: Is walking good exercise?\n\nAnswer:"));
    }

    #[test]
    fn failure_has_no_sources() {
        let runner = build_runner(Box::new(MockModelClient::failing("timeout")));
        let outcome = ask(&runner, "What is a normal heart rate?");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.output().answer, FALLBACK_ANSWER);
        assert!(outcome.output().sources.is_empty());
    }

    /// Prose instead of JSON is a failure, not an answer.
    #[test]
    fn prose_reply_falls_back() {
        let runner = build_runner(Box::new(MockModelClient::new("Walking is great!")));
        assert!(ask(&runner, "Is walking good?").is_fallback());
    }

    #[test]
    fn blank_question_falls_back() {
        let runner = build_runner(Box::new(MockModelClient::new(r#"{"answer":"x","sources":[]}"#)));
        assert!(ask(&runner, "").is_fallback());
    }
}
