//! Schema and report types for checking flow inputs and model outputs.
//!
//! Every flow carries two `FlowSchema`s: one its input must satisfy before a
//! prompt is sent, and one the model's answer must satisfy before it is
//! decoded into a typed value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON Schema document plus rules JSON Schema cannot express.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSchema {
    /// Unique identifier, e.g. "analyze-symptoms-output-v1".
    pub schema_id: String,
    /// Structural validation document.
    pub json_schema: Value,
    /// Rules evaluated after structural validation.
    pub rules: Vec<VerificationRule>,
}

impl FlowSchema {
    pub fn new(schema_id: impl Into<String>, json_schema: Value) -> Self {
        Self {
            schema_id: schema_id.into(),
            json_schema,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: VerificationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    /// Referenced in failure reports.
    pub rule_id: String,
    pub description: String,
    pub rule_type: VerificationRuleType,
}

impl VerificationRule {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        rule_type: VerificationRuleType,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            rule_type,
        }
    }
}

/// The checks the verifier knows how to run.
///
/// Field paths are dotted (`"answer"`, `"patient.id"`). A segment ending in
/// `[]` fans out over every element of an array, so
/// `"conditions[].confidence"` addresses the confidence of each condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    /// Every addressed value must be present and non-null.
    RequiredField { field_path: String },

    /// Every addressed value must be a string or array with at least one
    /// non-whitespace character or element.
    NonEmpty { field_path: String },

    /// Every addressed value that is present must be a number in `[min, max]`.
    NumberRange {
        field_path: String,
        min: f64,
        max: f64,
    },

    /// Delegate to a function registered on the verifier by name.
    Custom { function_name: String },
}

/// The result of running a `FlowSchema` against one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if every check passed.
    pub passed: bool,
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// All failure messages joined into one line, for error values.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    /// The rule that failed, or "json-schema" for structural failures.
    pub rule_id: String,
    pub message: String,
}
