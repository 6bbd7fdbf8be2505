//! Content templates - `{keypath}` placeholders resolved against the state.

use serde_json::Value;

use crate::state::State;

/// Replace every `{keypath}` in `content` with the value at that keypath.
///
/// Placeholders that do not resolve, and unmatched braces, are left verbatim.
pub fn interpolate(content: &str, state: &State) -> String {
    let mut output = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let keypath = &after_open[..close];
        if keypath.contains('{') {
            // `{a {b}`: the first brace is literal, retry from the inner one.
            output.push('{');
            rest = after_open;
            continue;
        }

        match state.get(keypath) {
            Some(value) if !keypath.is_empty() => output.push_str(&render(value)),
            _ => output.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }

    output.push_str(rest);
    output
}

/// String form of a state value inside content.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
