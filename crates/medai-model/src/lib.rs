//! # medai-model
//!
//! Implementations of [`medai_core::traits::ModelClient`].
//!
//! - [`HttpModelClient`] talks to an Ollama-compatible endpoint
//!   (`POST /api/generate`, `GET /api/tags`) over blocking `reqwest`.
//! - [`MockModelClient`] answers from a script. Tests use it, and so does
//!   the CLI's `--offline` mode.

pub mod http;
pub mod mock;

pub use http::HttpModelClient;
pub use mock::MockModelClient;
