//! Pulling one JSON document out of free-form model text.
//!
//! Models asked for JSON usually return exactly that, but some wrap it in a
//! markdown fence or add a sentence of preamble. Candidates are tried in
//! order: the whole text, the first fenced block, then the span from the
//! first `{` to the last `}`.

use serde_json::Value;

use medai_contracts::error::{MedaiError, MedaiResult};

/// Parse the JSON document contained in `text`.
///
/// # Errors
///
/// `MalformedResponse` if no candidate parses as JSON.
pub fn extract_json(text: &str) -> MedaiResult<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MedaiError::MalformedResponse {
            reason: "model returned an empty response".to_string(),
        });
    }

    let candidates = [Some(trimmed), fenced_block(trimmed), brace_span(trimmed)];
    let mut last_error = None;
    for candidate in candidates.into_iter().flatten() {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    Err(MedaiError::MalformedResponse {
        reason: match last_error {
            Some(e) => format!("no JSON document found in model response ({e})"),
            None => "no JSON document found in model response".to_string(),
        },
    })
}

/// Contents of the first ```` ``` ```` fence, with an optional language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let end = after.find("```")?;
    Some(after[..end].trim())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use medai_contracts::error::MedaiError;

    use super::extract_json;

    #[test]
    fn bare_json_parses_directly() {
        let value = extract_json(r#"  {"answer": "rest", "sources": []} "#).unwrap();
        assert_eq!(value, json!({ "answer": "rest", "sources": [] }));
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let text = "Here you go:\n```json\n{\"confidenceLevel\": 0.8}\n```\nStay well.";
        assert_eq!(extract_json(text).unwrap(), json!({ "confidenceLevel": 0.8 }));
    }

    #[test]
    fn untagged_fence_is_unwrapped() {
        let text = "```\n{\"conditions\": []}\n```";
        assert_eq!(extract_json(text).unwrap(), json!({ "conditions": [] }));
    }

    #[test]
    fn preamble_before_braces_is_skipped() {
        let text = "Sure! {\"answer\": \"Drink water.\"} Hope that helps.";
        assert_eq!(extract_json(text).unwrap(), json!({ "answer": "Drink water." }));
    }

    #[test]
    fn prose_without_json_is_malformed() {
        let err = extract_json("I cannot help with that.").unwrap_err();
        assert!(matches!(err, MedaiError::MalformedResponse { .. }));
    }

    #[test]
    fn empty_response_is_malformed() {
        let err = extract_json("   \n").unwrap_err();
        assert!(err.to_string().contains("empty response"));
    }
}
