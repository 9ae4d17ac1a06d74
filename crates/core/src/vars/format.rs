//! Per-type formatting for declared variables.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use super::types::{display_value, is_truthy};
use crate::config::types::LocaleConfig;
use crate::templates::types::VariableType;

/// Format a declared variable's final value according to its type.
pub fn format_declared(value: &Value, var_type: VariableType, locale: &LocaleConfig) -> String {
    match var_type {
        VariableType::Date => format_date(value),
        VariableType::Number => format_grouped(value, locale),
        VariableType::Boolean => {
            if bool_value(value) {
                locale.yes.clone()
            } else {
                locale.no.clone()
            }
        }
        VariableType::Text
        | VariableType::Textarea
        | VariableType::Email
        | VariableType::Url => display_value(value),
    }
}

fn bool_value(value: &Value) -> bool {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("false") => false,
        other => is_truthy(other),
    }
}

fn format_date(value: &Value) -> String {
    let parsed = match value {
        Value::String(s) => parse_date(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    };
    match parsed {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => display_value(value),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

fn format_grouped(value: &Value, locale: &LocaleConfig) -> String {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(f) if f.is_finite() => group_number(f, locale),
        _ => display_value(value),
    }
}

/// Group the integer part with the locale separator, keeping at most three
/// fraction digits.
pub fn group_number(f: f64, locale: &LocaleConfig) -> String {
    let fixed = format!("{:.3}", f.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&locale.thousands_separator);
        }
        grouped.push(*c);
    }

    let negative = f < 0.0 && (int_part.chars().any(|c| c != '0') || !frac.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac.is_empty() {
        out.push_str(&locale.decimal_separator);
        out.push_str(frac);
    }
    out
}
