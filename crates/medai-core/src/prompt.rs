//! Placeholder substitution for flow templates.
//!
//! Placeholders use triple braces, `{{{fieldName}}}`, and are looked up as
//! top-level keys of the serialized flow input. Strings are inserted as-is;
//! numbers and booleans use their JSON text. A missing or null field renders
//! as nothing.

use serde_json::Value;

const OPEN: &str = "{{{";
const CLOSE: &str = "}}}";

/// Substitute every `{{{name}}}` in `template` with the value of `name` in
/// `vars`. Unterminated placeholders are left in the output untouched.
pub fn render_template(template: &str, vars: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        match after_open.find(CLOSE) {
            Some(end) => {
                let name = after_open[..end].trim();
                out.push_str(&lookup(vars, name));
                rest = &after_open[end + CLOSE.len()..];
            }
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

fn lookup(vars: &Value, name: &str) -> String {
    match vars.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
