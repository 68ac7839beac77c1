//! Core trait definitions for running a model-backed flow.
//!
//! - `Flow`:        a prompt template with typed input and output
//! - `ModelClient`: the untrusted text generator behind every flow
//! - `Verifier`:    the checker every input and output passes through
//!
//! `FlowRunner` wires them together; see `runner.rs` for the ordering.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use medai_contracts::{
    error::MedaiResult,
    flow::CompletionRequest,
    verify::{FlowSchema, VerificationReport},
};

/// A single prompt-driven operation, such as symptom analysis.
///
/// A flow is pure description: its template, its two schemas, and the
/// placeholder it answers with when anything goes wrong. It never talks to
/// the model itself.
pub trait Flow: Send + Sync {
    type Input: Serialize;
    type Output: DeserializeOwned;

    /// Stable name, used in logs and sent with every completion request.
    fn name(&self) -> &'static str;

    /// Prompt text with `{{{field}}}` placeholders for input fields.
    fn template(&self) -> &'static str;

    /// What the input must look like before a prompt is rendered.
    fn input_schema(&self) -> FlowSchema;

    /// What the model's JSON answer must look like.
    fn output_schema(&self) -> FlowSchema;

    /// The placeholder output shown when the flow fails.
    fn fallback(&self) -> Self::Output;

    /// Post-process a verified output before it is returned.
    fn finish(&self, output: Self::Output) -> Self::Output {
        output
    }
}

/// A language model that turns a prompt into text.
///
/// Implementations are **untrusted**: whatever they return is parsed and
/// verified before anything downstream sees it.
pub trait ModelClient: Send + Sync {
    /// Generate a completion for `request`. The returned text is expected
    /// to contain one JSON document.
    fn complete(&self, request: &CompletionRequest) -> MedaiResult<String>;

    /// Human-readable identifier of the backing model.
    fn model_name(&self) -> String;
}

/// Checks a JSON document against a `FlowSchema`.
pub trait Verifier: Send + Sync {
    /// Return a report with `passed = true` if every check passes, or
    /// `passed = false` with all failures collected.
    fn verify(&self, document: &Value, schema: &FlowSchema) -> MedaiResult<VerificationReport>;
}
