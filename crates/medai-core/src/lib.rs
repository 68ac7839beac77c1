//! # medai-core
//!
//! The flow runtime for MedAi Navigator.
//!
//! This crate provides:
//! - The three core traits (`Flow`, `ModelClient`, `Verifier`)
//! - `FlowRunner`, which renders a flow's prompt, calls the model, and
//!   verifies the answer before decoding it
//! - Template rendering and JSON extraction helpers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medai_core::{FlowRunner, traits::{Flow, ModelClient, Verifier}};
//!
//! let runner = FlowRunner::new(Box::new(model), Box::new(verifier));
//! let outcome = runner.run_or_fallback(&flow, &input);
//! ```

pub mod extract;
pub mod prompt;
pub mod runner;
pub mod traits;

pub use runner::FlowRunner;
