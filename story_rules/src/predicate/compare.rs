//! Value comparison rules shared by the predicate operators.

use serde_json::Value;
use std::cmp::Ordering;

/// Order a resolved value against an operand.
///
/// Numbers compare numerically, strings lexicographically. Booleans count as
/// 0/1 next to numbers or booleans, and a numeric string next to a number is
/// compared as a number. Absent values and any other pairing are unordered.
pub fn compare(value: Option<&Value>, operand: &Value) -> Option<Ordering> {
    let value = value?;
    match (value, operand) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            let a = as_number(value)?;
            let b = as_number(operand)?;
            a.partial_cmp(&b)
        }
    }
}

/// Equality used by `eq`: numbers by value (so `1 == 1.0`), everything else
/// structurally.
pub fn loosely_equal(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => value == operand,
    }
}

/// Truthiness of an operand: `false`, `null`, `0`, and `""` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
