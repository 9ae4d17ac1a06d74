//! Macro function and argument types.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::engine::context::MacroContext;
use crate::vars::format_number;

/// A literal argument token from a macro call.
///
/// Arguments are never resolved against the variable map: `upper(name)`
/// receives the raw text `name`.
#[derive(Debug, Clone, PartialEq)]
pub enum MacroArg {
    /// `"quoted"` text with the quotes stripped.
    Str(String),
    Number(f64),
    Bool(bool),
    /// Anything else, passed through as written.
    Raw(String),
}

impl MacroArg {
    /// Text form of the argument.
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Numeric value, converting numeric-looking text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            MacroArg::Number(n) => Some(*n),
            MacroArg::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            MacroArg::Str(s) | MacroArg::Raw(s) => {
                let t = s.trim();
                if t.is_empty() {
                    return None;
                }
                t.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            MacroArg::Number(n) => *n != 0.0 && !n.is_nan(),
            MacroArg::Bool(b) => *b,
            MacroArg::Str(s) | MacroArg::Raw(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for MacroArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacroArg::Str(s) | MacroArg::Raw(s) => f.write_str(s),
            MacroArg::Number(n) => f.write_str(&format_number(*n)),
            MacroArg::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Failure raised by a macro handler.
#[derive(Debug, Error, PartialEq)]
pub enum MacroError {
    #[error("argument {index} must be {expected}, got '{got}'")]
    InvalidArgument { index: usize, expected: &'static str, got: String },

    #[error("{0}")]
    Failed(String),
}

/// Handler signature. Handlers must be shareable across threads because a
/// registry is shared by every engine using it.
pub type MacroHandler =
    Arc<dyn Fn(&[MacroArg], &MacroContext) -> Result<String, MacroError> + Send + Sync>;

/// A named function callable from template text as `{{name(args)}}`.
#[derive(Clone)]
pub struct MacroFunction {
    pub name: String,
    /// Parameter names. Only the count matters: calls must match it exactly.
    pub parameters: Vec<String>,
    pub description: String,
    handler: MacroHandler,
}

impl MacroFunction {
    pub fn new<F>(name: impl Into<String>, parameters: &[&str], handler: F) -> Self
    where
        F: Fn(&[MacroArg], &MacroContext) -> Result<String, MacroError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            description: String::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Signature as shown to users, e.g. `truncate(text, length)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }

    pub(crate) fn call(&self, params: &[MacroArg], ctx: &MacroContext) -> Result<String, MacroError> {
        (self.handler)(params, ctx)
    }
}

impl fmt::Debug for MacroFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroFunction")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}
