//! Schema-based verifier for flow documents.
//!
//! `SchemaVerifier` implements the `Verifier` trait from `medai-core`.
//! Verification runs in two phases:
//!
//! 1. **Structural**: the document is validated against
//!    `FlowSchema::json_schema` using the `jsonschema` crate.
//! 2. **Semantic**: each `VerificationRule` in `FlowSchema::rules` is
//!    evaluated in order.
//!
//! Both phases always run and every failure is collected, so a log line
//! shows everything that was wrong with a model answer at once.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use medai_contracts::{
    error::MedaiResult,
    verify::{FlowSchema, VerificationFailure, VerificationReport, VerificationRuleType},
};
use medai_core::traits::Verifier;

/// A caller-supplied check. Returns `Some(message)` on failure.
pub type CustomVerifierFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomVerifierFn>,
}

/// One leaf reached while walking a field path.
#[derive(Debug)]
enum Lookup<'v> {
    Found { path: String, value: &'v Value },
    Missing { path: String },
}

impl SchemaVerifier {
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register `f` under `name`, replacing any earlier function of that name.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomVerifierFn) {
        self.custom_rules.insert(name.into(), f);
    }

    // ── Path resolution ──────────────────────────────────────────────────────

    /// Walk a dotted path, fanning out at every `name[]` segment.
    ///
    /// Each returned leaf carries its concrete path (`conditions[2].confidence`)
    /// so failures point at the exact element. JSON `null` counts as missing.
    /// An empty array under a `[]` segment yields no leaves at all.
    fn resolve_all<'v>(document: &'v Value, path: &str) -> Vec<Lookup<'v>> {
        let mut frontier: Vec<(String, &'v Value)> = vec![(String::new(), document)];
        let mut missing: Vec<String> = Vec::new();

        for segment in path.split('.') {
            let (key, fan_out) = match segment.strip_suffix("[]") {
                Some(key) => (key, true),
                None => (segment, false),
            };

            let mut next = Vec::new();
            for (prefix, value) in frontier {
                let here = if prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{prefix}.{key}")
                };

                match value.get(key) {
                    Some(child) if !child.is_null() => {
                        if !fan_out {
                            next.push((here, child));
                            continue;
                        }
                        match child.as_array() {
                            Some(items) => {
                                for (i, item) in items.iter().enumerate() {
                                    let item_path = format!("{here}[{i}]");
                                    if item.is_null() {
                                        missing.push(item_path);
                                    } else {
                                        next.push((item_path, item));
                                    }
                                }
                            }
                            None => missing.push(format!("{here}[]")),
                        }
                    }
                    _ => missing.push(here),
                }
            }
            frontier = next;
        }

        frontier
            .into_iter()
            .map(|(path, value)| Lookup::Found { path, value })
            .chain(missing.into_iter().map(|path| Lookup::Missing { path }))
            .collect()
    }

    fn check_required(document: &Value, field_path: &str) -> Option<String> {
        let missing: Vec<String> = Self::resolve_all(document, field_path)
            .into_iter()
            .filter_map(|l| match l {
                Lookup::Missing { path } => Some(path),
                Lookup::Found { .. } => None,
            })
            .collect();

        if missing.is_empty() {
            None
        } else {
            Some(format!("required field '{}' is missing or null", missing.join("', '")))
        }
    }

    fn check_non_empty(document: &Value, field_path: &str) -> Option<String> {
        let mut problems = Vec::new();
        for lookup in Self::resolve_all(document, field_path) {
            match lookup {
                Lookup::Missing { path } => problems.push(format!("'{path}' is missing")),
                Lookup::Found { path, value } => match value {
                    Value::String(s) if s.trim().is_empty() => {
                        problems.push(format!("'{path}' is blank"))
                    }
                    Value::Array(items) if items.is_empty() => {
                        problems.push(format!("'{path}' is an empty list"))
                    }
                    Value::String(_) | Value::Array(_) => {}
                    other => problems.push(format!("'{path}' is not text or a list ({other})")),
                },
            }
        }

        if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        }
    }

    /// Absent values pass; presence is `RequiredField`'s job.
    fn check_range(document: &Value, field_path: &str, min: f64, max: f64) -> Option<String> {
        let mut problems = Vec::new();
        for lookup in Self::resolve_all(document, field_path) {
            let Lookup::Found { path, value } = lookup else {
                continue;
            };
            match value.as_f64() {
                Some(n) if n >= min && n <= max => {}
                Some(n) => problems.push(format!("'{path}' = {n} is outside [{min}, {max}]")),
                None => problems.push(format!("'{path}' is not a number")),
            }
        }

        if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Verifier for SchemaVerifier {
    fn verify(&self, document: &Value, schema: &FlowSchema) -> MedaiResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema structural validation ───────────────────────
        //
        // A null json_schema means no structural constraint.
        if !schema.json_schema.is_null() {
            match jsonschema::validator_for(&schema.json_schema) {
                Ok(validator) => {
                    for error in validator.iter_errors(document) {
                        let message =
                            format!("JSON Schema violation at {}: {}", error.instance_path, error);
                        warn!(schema_id = %schema.schema_id, %message, "document fails its JSON Schema");
                        failures.push(VerificationFailure {
                            rule_id: "json-schema".to_string(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    let message = format!("invalid JSON Schema document: {e}");
                    warn!(schema_id = %schema.schema_id, %message, "flow schema does not compile");
                    failures.push(VerificationFailure {
                        rule_id: "json-schema".to_string(),
                        message,
                    });
                }
            }
        }

        // ── Phase 2: Semantic rule evaluation ────────────────────────────────
        for rule in &schema.rules {
            debug!(
                rule_id = %rule.rule_id,
                description = %rule.description,
                "checking rule"
            );

            let failure_msg = match &rule.rule_type {
                VerificationRuleType::RequiredField { field_path } => {
                    Self::check_required(document, field_path)
                }
                VerificationRuleType::NonEmpty { field_path } => {
                    Self::check_non_empty(document, field_path)
                }
                VerificationRuleType::NumberRange {
                    field_path,
                    min,
                    max,
                } => Self::check_range(document, field_path, *min, *max),
                // An unregistered name is itself a failure.
                VerificationRuleType::Custom { function_name } => {
                    match self.custom_rules.get(function_name.as_str()) {
                        Some(f) => f(document),
                        None => Some(format!(
                            "no custom rule registered for function name '{function_name}'"
                        )),
                    }
                }
            };

            if let Some(message) = failure_msg {
                warn!(rule_id = %rule.rule_id, %message, "semantic rule failed");
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "verification complete"
        );

        Ok(VerificationReport { passed, failures })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
