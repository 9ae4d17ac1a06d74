//! Declared-variable validation against the merged variable map.

use regex::Regex;
use serde_json::Value;

use super::types::{VariableMap, display_value, is_blank};
use crate::engine::errors::TemplateError;
use crate::templates::types::{RuleKind, TemplateVariable, ValidationRule};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Check every declared variable and return the problems found.
///
/// A required variable with no value yields one `missing` error and nothing
/// else. Otherwise every rule is evaluated independently, so one variable can
/// produce several `validation` errors. Rules see the rendered value, which
/// is empty for an absent or blank optional variable.
pub fn validate_variables(declared: &[TemplateVariable], values: &VariableMap) -> Vec<TemplateError> {
    let mut errors = Vec::new();
    let email = Regex::new(EMAIL_PATTERN).ok();

    for variable in declared {
        let value = values.get(&variable.name);
        let blank = is_blank(value);

        if variable.is_required && blank {
            errors.push(TemplateError::missing(
                &variable.name,
                format!("{} is required", variable.name),
            ));
            continue;
        }

        let text = value.map(display_value).unwrap_or_default();
        for rule in &variable.validation_rules {
            if let Some(message) = check_rule(&variable.name, rule, &text, blank, email.as_ref()) {
                errors.push(TemplateError::validation(&variable.name, message));
            }
        }
    }

    errors
}

/// Evaluate one rule. Returns the failure message, if any.
fn check_rule(
    name: &str,
    rule: &ValidationRule,
    text: &str,
    blank: bool,
    email: Option<&Regex>,
) -> Option<String> {
    let failed = |default: String| Some(rule.message.clone().unwrap_or(default));
    let len = text.chars().count();

    match rule.kind {
        RuleKind::Required if blank => failed(format!("{name} is required")),
        RuleKind::Required => None,
        RuleKind::MinLength => match rule_length(rule) {
            Some(min) if len < min => failed(format!("{name} must be at least {min} characters")),
            Some(_) => None,
            None => Some(format!("{name}: minLength rule needs a numeric value")),
        },
        RuleKind::MaxLength => match rule_length(rule) {
            Some(max) if len > max => failed(format!("{name} must be at most {max} characters")),
            Some(_) => None,
            None => Some(format!("{name}: maxLength rule needs a numeric value")),
        },
        RuleKind::Pattern => {
            let pattern = rule.value.as_ref().map(display_value).unwrap_or_default();
            match Regex::new(&pattern) {
                Ok(re) if re.is_match(text) => None,
                Ok(_) => failed(format!("{name} does not match the required format")),
                Err(_) => Some(format!("{name}: invalid pattern '{pattern}'")),
            }
        }
        RuleKind::Email => match email {
            Some(re) if re.is_match(text) => None,
            _ => failed(format!("{name} must be a valid email address")),
        },
    }
}

fn rule_length(rule: &ValidationRule) -> Option<usize> {
    match rule.value.as_ref()? {
        Value::Number(n) => n.as_u64().map(|n| n as usize).or_else(|| {
            n.as_f64().filter(|f| *f >= 0.0).map(|f| f as usize)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::errors::ErrorKind;
    use crate::templates::types::VariableType;
    use serde_json::json;

    fn values(pairs: &[(&str, Value)]) -> VariableMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn required_missing_reports_once_and_skips_rules() {
        let var = TemplateVariable::new("order_id", VariableType::Text)
            .required()
            .with_rule(ValidationRule::min_length(3))
            .with_rule(ValidationRule::pattern("^ORD"));
        let errors = validate_variables(&[var], &VariableMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].variable, "order_id");
        assert_eq!(errors[0].kind, ErrorKind::Missing);
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let var = TemplateVariable::new("name", VariableType::Text).required();
        let errors = validate_variables(&[var], &values(&[("name", json!(""))]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Missing);
    }

    #[test]
    fn default_value_does_not_satisfy_required() {
        let var = TemplateVariable::new("name", VariableType::Text).required().with_default("x");
        let errors = validate_variables(&[var], &VariableMap::new());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn every_failing_rule_is_reported() {
        let var = TemplateVariable::new("code", VariableType::Text)
            .with_rule(ValidationRule::min_length(5))
            .with_rule(ValidationRule::pattern("^[0-9]+$"))
            .with_rule(ValidationRule::max_length(10));
        let errors = validate_variables(&[var], &values(&[("code", json!("ab"))]));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Validation));
        assert_eq!(errors[0].message, "code must be at least 5 characters");
        assert_eq!(errors[1].message, "code does not match the required format");
    }

    #[test]
    fn custom_message_wins() {
        let var = TemplateVariable::new("code", VariableType::Text)
            .with_rule(ValidationRule::max_length(2).with_message("keep it short"));
        let errors = validate_variables(&[var], &values(&[("code", json!("abc"))]));
        assert_eq!(errors[0].message, "keep it short");
    }

    #[test]
    fn lengths_apply_to_rendered_value() {
        let var = TemplateVariable::new("qty", VariableType::Number)
            .with_rule(ValidationRule::max_length(3));
        let ok = validate_variables(std::slice::from_ref(&var), &values(&[("qty", json!(123))]));
        assert!(ok.is_empty());
        let bad = validate_variables(&[var], &values(&[("qty", json!(12345))]));
        assert_eq!(bad.len(), 1);
    }

    #[test]
    fn email_rule() {
        let var = TemplateVariable::new("contact", VariableType::Email)
            .with_rule(ValidationRule::email());
        let ok = validate_variables(
            std::slice::from_ref(&var),
            &values(&[("contact", json!("a@b.co"))]),
        );
        assert!(ok.is_empty());
        let bad = validate_variables(&[var], &values(&[("contact", json!("not-an-email"))]));
        assert_eq!(bad[0].message, "contact must be a valid email address");
    }

    #[test]
    fn blank_optional_variable_runs_every_rule() {
        let var = TemplateVariable::new("code", VariableType::Text)
            .with_rule(ValidationRule::min_length(3));
        let errors = validate_variables(&[var], &values(&[("code", json!(""))]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Validation);
        assert_eq!(errors[0].message, "code must be at least 3 characters");
    }

    #[test]
    fn absent_optional_variable_is_checked_as_empty_text() {
        let var = TemplateVariable::new("note", VariableType::Text)
            .with_rule(ValidationRule::min_length(3))
            .with_rule(ValidationRule::max_length(10))
            .with_rule(ValidationRule::new(RuleKind::Required, None));
        let errors = validate_variables(&[var], &VariableMap::new());
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["note must be at least 3 characters", "note is required"]);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Validation));
    }

    #[test]
    fn null_optional_variable_fails_email_rule() {
        let var = TemplateVariable::new("contact", VariableType::Email)
            .with_rule(ValidationRule::email());
        let errors = validate_variables(&[var], &values(&[("contact", Value::Null)]));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "contact must be a valid email address");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let var = TemplateVariable::new("x", VariableType::Text)
            .with_rule(ValidationRule::pattern("("));
        let errors = validate_variables(&[var], &values(&[("x", json!("abc"))]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("invalid pattern"));
    }
}
