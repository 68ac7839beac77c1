//! The flow runner: one prompt in, one verified typed answer out.
//!
//! Every run follows the same order:
//!
//!   Input → Verify input → Render → Model → Extract JSON → Verify output → Decode → Finish
//!
//! The model is only called once the input has passed its schema, and
//! nothing the model says reaches a caller without passing the output
//! schema first.

use serde_json::Value;
use tracing::{debug, info, warn};

use medai_contracts::{
    error::{MedaiError, MedaiResult},
    flow::{CompletionRequest, FlowOutcome},
};

use crate::{
    extract::extract_json,
    prompt::render_template,
    traits::{Flow, ModelClient, Verifier},
};

/// Drives flows against one model and one verifier.
///
/// A runner is cheap to share behind an `Arc`; it holds no per-request
/// state, so several front-end requests may use it at once.
pub struct FlowRunner {
    model: Box<dyn ModelClient>,
    verifier: Box<dyn Verifier>,
}

impl FlowRunner {
    pub fn new(model: Box<dyn ModelClient>, verifier: Box<dyn Verifier>) -> Self {
        Self { model, verifier }
    }

    pub fn model_name(&self) -> String {
        self.model.model_name()
    }

    /// Run `flow` once and return its verified output.
    ///
    /// # Errors
    ///
    /// - `SchemaValidation` if `input` breaks the flow's input schema
    ///   (the model is not called)
    /// - whatever the model client returns if the call fails
    /// - `MalformedResponse` if the answer holds no JSON or does not decode
    /// - `VerificationFailed` if the JSON breaks the output schema
    pub fn run<F: Flow>(&self, flow: &F, input: &F::Input) -> MedaiResult<F::Output> {
        let flow_name = flow.name();
        debug!(flow = flow_name, "flow run starting");

        // ── Step 1: Input check ──────────────────────────────────────────────
        let input_json = serde_json::to_value(input).map_err(|e| MedaiError::SchemaValidation {
            reason: format!("input for '{flow_name}' could not be serialized: {e}"),
        })?;

        let input_schema = flow.input_schema();
        let report = self.verifier.verify(&input_json, &input_schema)?;
        if !report.passed {
            let summary = report.summary();
            warn!(flow = flow_name, failures = %summary, "flow input rejected");
            return Err(MedaiError::SchemaValidation { reason: summary });
        }

        // ── Step 2: Render and send ──────────────────────────────────────────
        let output_schema = flow.output_schema();
        let request = CompletionRequest {
            flow: flow_name.to_string(),
            prompt: render_template(flow.template(), &input_json),
            output_schema: output_schema.json_schema.clone(),
        };

        debug!(flow = flow_name, prompt_len = request.prompt.len(), "calling model");
        let text = self.model.complete(&request)?;

        // ── Step 3: Parse and verify the answer ──────────────────────────────
        let document = extract_json(&text)?;

        let report = self.verifier.verify(&document, &output_schema)?;
        if !report.passed {
            let summary = report.summary();
            warn!(flow = flow_name, failures = %summary, "model output rejected");
            return Err(MedaiError::VerificationFailed { reason: summary });
        }

        let output = decode::<F>(flow_name, document)?;

        info!(flow = flow_name, "flow completed");
        Ok(flow.finish(output))
    }

    /// Run `flow`, substituting its fallback output for any failure.
    ///
    /// This is what the front ends call: a flow never surfaces an error to
    /// the user, only its placeholder plus the reason, which goes to the log.
    pub fn run_or_fallback<F: Flow>(&self, flow: &F, input: &F::Input) -> FlowOutcome<F::Output> {
        match self.run(flow, input) {
            Ok(output) => FlowOutcome::Completed(output),
            Err(e) => {
                warn!(flow = flow.name(), error = %e, "flow failed, using fallback");
                FlowOutcome::Fallback {
                    output: flow.fallback(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn decode<F: Flow>(flow_name: &str, document: Value) -> MedaiResult<F::Output> {
    serde_json::from_value(document).map_err(|e| MedaiError::MalformedResponse {
        reason: format!("'{flow_name}' output does not match its type: {e}"),
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
