//! Macro argument list parsing.

use super::types::MacroArg;

/// Split a raw argument list on commas and classify each token.
///
/// An empty (or all-whitespace) list means zero arguments. Commas inside
/// quotes are not special: `"a,b"` splits into two tokens.
pub fn parse_macro_args(raw: &str) -> Vec<MacroArg> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|t| parse_token(t.trim())).collect()
}

fn parse_token(token: &str) -> MacroArg {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return MacroArg::Str(token[1..token.len() - 1].to_string());
    }
    match token {
        "true" => return MacroArg::Bool(true),
        "false" => return MacroArg::Bool(false),
        _ => {}
    }
    if looks_numeric(token)
        && let Ok(n) = token.parse::<f64>()
    {
        return MacroArg::Number(n);
    }
    MacroArg::Raw(token.to_string())
}

/// Rejects words `f64::from_str` would accept, such as `inf` or `NaN`.
fn looks_numeric(token: &str) -> bool {
    !token.is_empty()
        && token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}
