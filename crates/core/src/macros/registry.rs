//! Immutable macro registry.
//!
//! A registry is assembled once through [`MacroRegistryBuilder`] and is
//! read-only afterwards, so one `Arc<MacroRegistry>` can back any number of
//! engines and concurrent renders. Separate registries (for example one per
//! tenant) never see each other's macros.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use tracing::trace;

use super::builtins::builtin_macros;
use super::types::{MacroArg, MacroFunction};
use crate::engine::context::MacroContext;
use crate::engine::errors::TemplateError;

/// Text produced for one macro call, plus the problem that produced it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub text: String,
    pub error: Option<TemplateError>,
}

impl Expansion {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    fn failed(text: String, error: TemplateError) -> Self {
        Self { text, error: Some(error) }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    macros: HashMap<String, MacroFunction>,
}

impl MacroRegistry {
    pub fn builder() -> MacroRegistryBuilder {
        MacroRegistryBuilder::default()
    }

    /// Registry holding only the built-in macros.
    pub fn builtin() -> Self {
        Self::builder().with_builtins().build()
    }

    pub fn get(&self, name: &str) -> Option<&MacroFunction> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Registered macros sorted by name.
    pub fn functions(&self) -> Vec<&MacroFunction> {
        let mut all: Vec<_> = self.macros.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Invoke a macro by name. Never fails: every problem becomes a bracketed
    /// marker in the text plus a `processing` error.
    pub fn expand_macro(&self, name: &str, params: &[MacroArg], ctx: &MacroContext) -> Expansion {
        let Some(function) = self.macros.get(name) else {
            return Expansion::failed(
                format!("[MACRO_NOT_FOUND: {name}]"),
                TemplateError::processing(name, format!("macro '{name}' not found")),
            );
        };

        if params.len() != function.arity() {
            return Expansion::failed(
                format!("[MACRO_PARAM_ERROR: {name}]"),
                TemplateError::processing(
                    name,
                    format!(
                        "macro '{name}' expects {} parameter(s), got {}",
                        function.arity(),
                        params.len()
                    ),
                ),
            );
        }

        trace!(macro_name = name, args = params.len(), "expanding macro");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| function.call(params, ctx)));
        match outcome {
            Ok(Ok(text)) => Expansion::ok(text),
            Ok(Err(e)) => Expansion::failed(
                format!("[MACRO_ERROR: {name}]"),
                TemplateError::processing(name, format!("macro '{name}' failed: {e}")),
            ),
            Err(payload) => Expansion::failed(
                format!("[MACRO_ERROR: {name}]"),
                TemplateError::processing(
                    name,
                    format!("macro '{name}' panicked: {}", panic_message(payload.as_ref())),
                ),
            ),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Collects macros before freezing them into a [`MacroRegistry`].
#[derive(Debug, Default)]
pub struct MacroRegistryBuilder {
    macros: HashMap<String, MacroFunction>,
}

impl MacroRegistryBuilder {
    /// Add every built-in macro.
    #[must_use]
    pub fn with_builtins(mut self) -> Self {
        for function in builtin_macros() {
            self.macros.insert(function.name.clone(), function);
        }
        self
    }

    /// Add or replace a macro.
    #[must_use]
    pub fn register(mut self, function: MacroFunction) -> Self {
        self.macros.insert(function.name.clone(), function);
        self
    }

    pub fn build(self) -> MacroRegistry {
        MacroRegistry { macros: self.macros }
    }
}
