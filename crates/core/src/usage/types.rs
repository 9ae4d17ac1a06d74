//! Usage record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::errors::TemplateProcessingResult;
use crate::templates::Template;
use crate::vars::VariableMap;

/// One rendered template, as persisted by a usage recorder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// ISO8601 timestamp
    pub ts: DateTime<Utc>,

    pub template_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template_name: String,

    /// Rendered output
    pub content: String,

    /// Merged variables the render used
    #[serde(default)]
    pub variables: VariableMap,

    /// Macro names invoked by the template
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub macros: Vec<String>,

    /// Number of diagnostics the render produced
    #[serde(default)]
    pub error_count: usize,
}

impl UsageRecord {
    /// Build a record for a finished render with the current timestamp.
    pub fn from_render(
        template: &Template,
        result: &TemplateProcessingResult,
        macros: Vec<String>,
    ) -> Self {
        Self {
            ts: Utc::now(),
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            content: result.content.clone(),
            variables: result.variables.clone(),
            macros,
            error_count: result.errors().len(),
        }
    }
}
