//! Render orchestration.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use super::ast::render_nodes;
use super::blocks::{process_conditionals, process_loops};
use super::context::MacroContext;
use super::errors::{ProcessError, TemplateError, TemplateProcessingResult};
use super::expand::expand_macros;
use super::lexer::tokenize;
use super::parser::parse;
use super::postprocess::post_process;
use super::substitute::substitute;
use crate::config::types::LocaleConfig;
use crate::macros::MacroRegistry;
use crate::templates::Template;
use crate::usage::{UsageRecord, UsageRecorder};
use crate::vars::{VariableMap, build_system_variables, merge_variables, validate_variables};

/// Renders templates against a shared macro registry.
///
/// The engine holds no per-render state, so one instance can serve
/// concurrent renders.
#[derive(Clone)]
pub struct TemplateEngine {
    registry: Arc<MacroRegistry>,
    locale: LocaleConfig,
    recorder: Option<Arc<dyn UsageRecorder>>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("macros", &self.registry.len())
            .field("locale", &self.locale)
            .field("recorder", &self.recorder.is_some())
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new(Arc::new(MacroRegistry::builtin()))
    }
}

impl TemplateEngine {
    pub fn new(registry: Arc<MacroRegistry>) -> Self {
        Self { registry, locale: LocaleConfig::default(), recorder: None }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: LocaleConfig) -> Self {
        self.locale = locale;
        self
    }

    /// Record every non-fatal render through `recorder`.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn UsageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn registry(&self) -> &MacroRegistry {
        &self.registry
    }

    /// Render `template` with caller-supplied `variables` and `ctx`.
    ///
    /// Stages run in a fixed order: system variables, merge (supplied values
    /// win), macro expansion, validation, substitution, conditionals, loops
    /// and whitespace cleanup. Problems along the way are collected in the
    /// result. The only `Err` is an unexpected internal failure.
    pub fn process_template(
        &self,
        template: &Template,
        variables: &VariableMap,
        ctx: &MacroContext,
    ) -> Result<TemplateProcessingResult, ProcessError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(template, variables, ctx)));
        let (result, macros) = match outcome {
            Ok(rendered) => rendered?,
            Err(_) => {
                return Err(ProcessError::Failed(format!(
                    "internal error while rendering '{}'",
                    template.id
                )));
            }
        };

        self.record_usage(template, &result, macros);
        Ok(result)
    }

    fn run(
        &self,
        template: &Template,
        variables: &VariableMap,
        ctx: &MacroContext,
    ) -> Result<(TemplateProcessingResult, Vec<String>), ProcessError> {
        let mut errors: Vec<TemplateError> = Vec::new();

        let merged = merge_variables(build_system_variables(ctx), variables);
        debug!(template = %template.id, variables = merged.len(), "variables merged");

        let expanded = expand_macros(&template.content, &self.registry, ctx, &mut errors)?;
        debug!(template = %template.id, macros = ?expanded.macros, "macros expanded");

        errors.extend(validate_variables(&template.variables, &merged));
        debug!(template = %template.id, errors = errors.len(), "variables validated");

        let tokens = tokenize(&expanded.content)?;
        let (nodes, structure_errors) = parse(&tokens);
        errors.extend(structure_errors);

        let nodes = substitute(nodes, &template.variables, &merged, &self.locale, &mut errors);
        let nodes = process_conditionals(nodes, &merged, &mut errors);
        let nodes = process_loops(nodes, &merged, &mut errors);
        let content = post_process(&render_nodes(&nodes))?;
        debug!(template = %template.id, errors = errors.len(), "template rendered");

        let result = TemplateProcessingResult {
            content,
            variables: merged,
            errors: (!errors.is_empty()).then_some(errors),
        };
        Ok((result, expanded.macros))
    }

    fn record_usage(&self, template: &Template, result: &TemplateProcessingResult, macros: Vec<String>) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        let record = UsageRecord::from_render(template, result, macros);
        if let Err(e) = recorder.record(&record) {
            warn!(template = %template.id, error = %e, "failed to record template usage");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{MemoryUsageRecorder, UsageError};
    use serde_json::json;

    struct BrokenRecorder;

    impl UsageRecorder for BrokenRecorder {
        fn record(&self, _: &UsageRecord) -> Result<(), UsageError> {
            Err(UsageError::Unavailable)
        }
    }

    #[test]
    fn records_usage_after_render() {
        let recorder = Arc::new(MemoryUsageRecorder::new());
        let engine = TemplateEngine::default().with_recorder(recorder.clone());
        let template = Template::from_content("t1", "{{upper(\"hi\")}} {{name}}");
        let vars: VariableMap = [("name".to_string(), json!("Ada"))].into_iter().collect();

        let result = engine.process_template(&template, &vars, &MacroContext::new()).unwrap();
        assert_eq!(result.content, "HI Ada");

        let records = recorder.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].template_id, "t1");
        assert_eq!(records[0].content, "HI Ada");
        assert_eq!(records[0].macros, vec!["upper"]);
        assert_eq!(records[0].error_count, 0);
    }

    #[test]
    fn recorder_failures_do_not_affect_rendering() {
        let engine = TemplateEngine::default().with_recorder(Arc::new(BrokenRecorder));
        let template = Template::from_content("t", "Hello world");
        let result =
            engine.process_template(&template, &VariableMap::new(), &MacroContext::new()).unwrap();
        assert_eq!(result.content, "Hello world");
        assert!(result.errors.is_none());
    }

    #[test]
    fn engines_share_one_registry() {
        let registry = Arc::new(MacroRegistry::builtin());
        let a = TemplateEngine::new(Arc::clone(&registry));
        let b = TemplateEngine::new(Arc::clone(&registry));
        assert_eq!(Arc::strong_count(&registry), 3);
        assert_eq!(a.registry().len(), b.registry().len());
    }
}
