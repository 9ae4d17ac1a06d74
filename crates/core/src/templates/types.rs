//! Template and variable declaration types.
//!
//! These mirror the records kept by the template store. Field names are
//! camelCase on the wire so templates exported from the admin backend load
//! without translation:
//!
//! ```yaml
//! id: order-delay
//! name: Order delay
//! content: |
//!   Hello {{ customer_name }}, order {{ order_id }} is delayed.
//! variables:
//!   - name: order_id
//!     type: text
//!     isRequired: true
//!     validationRules:
//!       - type: minLength
//!         value: 6
//! ```

use serde::{Deserialize, Serialize};

/// A stored template: content with embedded syntax plus its variable schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable identifier. Defaults to the logical name when loaded from disk.
    #[serde(default)]
    pub id: String,

    /// Human-readable name.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Raw template markup.
    pub content: String,

    /// Declared variables, in declaration order.
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

impl Template {
    /// Build an ad-hoc template with no declared variables.
    pub fn from_content(id: impl Into<String>, content: impl Into<String>) -> Self {
        let id = id.into();
        Self { name: id.clone(), id, content: content.into(), ..Self::default() }
    }

    /// Append a declared variable.
    pub fn with_variable(mut self, variable: TemplateVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Look up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<&TemplateVariable> {
        self.variables.iter().find(|v| v.name == name)
    }
}

/// A declared variable slot on a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,

    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    #[serde(default)]
    pub is_required: bool,

    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
}

impl TemplateVariable {
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            name: name.into(),
            var_type,
            default_value: None,
            is_required: false,
            validation_rules: Vec::new(),
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }
}

/// Declared type of a template variable. Drives output formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Boolean,
    Email,
    Url,
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VariableType::Text => "text",
            VariableType::Textarea => "textarea",
            VariableType::Number => "number",
            VariableType::Date => "date",
            VariableType::Boolean => "boolean",
            VariableType::Email => "email",
            VariableType::Url => "url",
        };
        f.write_str(s)
    }
}

/// A declarative constraint attached to a template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,

    /// Rule argument: a length for `minLength`/`maxLength`, a regex for `pattern`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Custom message used instead of the default one when the rule fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, value: Option<serde_json::Value>) -> Self {
        Self { kind, value, message: None }
    }

    pub fn min_length(n: usize) -> Self {
        Self::new(RuleKind::MinLength, Some(n.into()))
    }

    pub fn max_length(n: usize) -> Self {
        Self::new(RuleKind::MaxLength, Some(n.into()))
    }

    pub fn pattern(re: &str) -> Self {
        Self::new(RuleKind::Pattern, Some(re.into()))
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email, None)
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Email,
}
