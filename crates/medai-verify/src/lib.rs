//! # medai-verify
//!
//! Verification of flow inputs and model outputs.
//!
//! [`engine::SchemaVerifier`] implements [`medai_core::traits::Verifier`] in
//! two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic**: `RequiredField`, `NonEmpty`, `NumberRange` and `Custom`
//!    rules, with `[]` path segments fanning out over arrays.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use medai_verify::engine::SchemaVerifier;
//!
//! let mut verifier = SchemaVerifier::new();
//! verifier.register_rule("has-sources", Box::new(|doc| {
//!     match doc.get("sources").and_then(|v| v.as_array()) {
//!         Some(list) if !list.is_empty() => None,
//!         _ => Some("answer cites no sources".to_string()),
//!     }
//! }));
//! ```

pub mod engine;

pub use engine::SchemaVerifier;
