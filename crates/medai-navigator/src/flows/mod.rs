//! The three model-backed flows.
//!
//! Each module defines a [`Flow`](medai_core::traits::Flow) plus the entry
//! point a front end calls (`submit_symptoms`, `request_treatment`, `ask`).
//! Those entry points never fail: a broken call comes back as the flow's
//! placeholder with the reason attached.

pub mod medical_qa;
pub mod symptom_analyzer;
pub mod treatment_advisor;

use medai_core::{traits::ModelClient, FlowRunner};
use medai_verify::SchemaVerifier;

/// A runner over `model` with the standard verifier.
pub fn build_runner(model: Box<dyn ModelClient>) -> FlowRunner {
    FlowRunner::new(model, Box::new(SchemaVerifier::new()))
}
