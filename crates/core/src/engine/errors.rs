//! Render diagnostics and the render result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vars::VariableMap;

/// Category of a collected render diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A required variable had no value.
    Missing,
    /// A declared validation rule failed.
    Validation,
    /// Macro, placeholder, condition, loop or structure problem.
    Processing,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Missing => write!(f, "missing"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Processing => write!(f, "processing"),
        }
    }
}

/// A non-fatal problem found while rendering.
///
/// These are collected, never thrown: rendering continues and the caller
/// gets best-effort output plus the full list.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{kind}] {variable}: {message}")]
pub struct TemplateError {
    /// Variable, macro, loop target or expression the problem is about.
    pub variable: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl TemplateError {
    pub fn missing(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self { variable: variable.into(), message: message.into(), kind: ErrorKind::Missing }
    }

    pub fn validation(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            message: message.into(),
            kind: ErrorKind::Validation,
        }
    }

    pub fn processing(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            message: message.into(),
            kind: ErrorKind::Processing,
        }
    }
}

/// Output of one render call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateProcessingResult {
    pub content: String,
    /// The merged variable map the render used.
    pub variables: VariableMap,
    /// `None` when the render produced no diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<TemplateError>>,
}

impl TemplateProcessingResult {
    /// Diagnostics as a slice, empty when there were none.
    pub fn errors(&self) -> &[TemplateError] {
        self.errors.as_deref().unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

/// The only fatal render outcome: an unexpected internal failure.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("template processing failed: {0}")]
    Failed(String),
}

pub(crate) fn compile_regex(pattern: &str) -> Result<regex::Regex, ProcessError> {
    regex::Regex::new(pattern)
        .map_err(|e| ProcessError::Failed(format!("invalid internal pattern: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_serializes_kind_as_type() {
        let err = TemplateError::missing("order_id", "order_id is required");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains(r#""type":"missing""#));
        assert!(json.contains(r#""variable":"order_id""#));
    }

    #[test]
    fn display_includes_kind_and_subject() {
        let err = TemplateError::processing("foo", "macro not found");
        assert_eq!(err.to_string(), "[processing] foo: macro not found");
    }

    #[test]
    fn result_omits_errors_when_none() {
        let result = TemplateProcessingResult {
            content: "hi".into(),
            variables: VariableMap::new(),
            errors: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("errors"));
        assert!(!result.has_errors());
    }
}
