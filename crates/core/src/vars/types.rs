//! Variable map and value rendering rules.

use std::collections::HashMap;

use serde_json::Value;

/// Flat map of variable names to values, as seen by every render stage.
pub type VariableMap = HashMap<String, Value>;

/// Render a value the way a placeholder shows it when no type formatting applies.
///
/// - strings verbatim
/// - integers without a fraction, other numbers in their shortest form
/// - booleans as `true` / `false`
/// - arrays as their items joined by `,`
/// - objects as compact JSON
/// - null as the empty string
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format_number(f),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Format a float without a trailing `.0` for whole numbers.
pub fn format_number(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if f.fract() == 0.0 && f.abs() < 1e21 {
        // -0 prints as 0
        return format!("{}", f as i128);
    }
    format!("{f}")
}

/// Truthiness used by conditions, loops and the `if` macro.
///
/// Empty strings, zero, NaN, `false` and null are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a value counts as "not provided" for required-variable checks.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
