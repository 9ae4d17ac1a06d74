//! Template definitions and the file-backed template store.

pub mod discovery;
pub mod repository;
pub mod types;

pub use discovery::{TemplateDiscoveryError, TemplateInfo, discover_templates};
pub use repository::{LoadedTemplate, TemplateRepoError, TemplateRepository};
pub use types::{RuleKind, Template, TemplateVariable, ValidationRule, VariableType};
