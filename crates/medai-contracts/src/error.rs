//! Error types shared by every MedAi crate.
//!
//! Library code returns `MedaiResult<T>`. The front ends decide which errors
//! are swapped for a flow's fallback output and which are shown to the user.

use thiserror::Error;

/// The unified error type for MedAi Navigator.
#[derive(Debug, Error)]
pub enum MedaiError {
    /// The model endpoint could not be reached at all.
    #[error("model endpoint '{endpoint}' is unreachable")]
    ModelUnavailable { endpoint: String },

    /// The model endpoint answered, but not with a usable completion.
    #[error("model request failed: {reason}")]
    ModelRequest { reason: String },

    /// The completion text did not contain a decodable JSON document.
    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },

    /// The model output was well-formed JSON but broke a schema or rule.
    #[error("output verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// A flow input did not satisfy the flow's input schema.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// A form field was missing or could not be parsed.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// A planner entry was addressed by an id the store does not hold.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: String, id: String },

    /// A hand-off URL could not be built or read.
    #[error("hand-off error: {reason}")]
    Handoff { reason: String },

    /// A result could not be written out in the requested format.
    #[error("could not encode output: {reason}")]
    OutputEncoding { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

impl MedaiError {
    /// Shorthand for [`MedaiError::InvalidInput`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MedaiError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the MedAi crates.
pub type MedaiResult<T> = Result<T, MedaiError>;
