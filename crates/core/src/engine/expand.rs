//! Macro expansion over raw template text.

use super::context::MacroContext;
use super::errors::{ProcessError, TemplateError};
use super::lexer::{Token, tokenize};
use crate::macros::{MacroRegistry, parse_macro_args};

/// Content after macro expansion plus the macro names it invoked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expanded {
    pub content: String,
    /// Distinct macro names in first-call order.
    pub macros: Vec<String>,
}

/// Replace every `{{name(args)}}` call with its expansion, left to right.
///
/// Each call replaces exactly its own span; expansions are not rescanned.
/// Problems become bracketed markers in the text and are appended to
/// `errors`.
pub fn expand_macros(
    content: &str,
    registry: &MacroRegistry,
    ctx: &MacroContext,
    errors: &mut Vec<TemplateError>,
) -> Result<Expanded, ProcessError> {
    let mut out = Expanded { content: String::with_capacity(content.len()), macros: Vec::new() };

    for token in tokenize(content)? {
        let Token::Macro { name, args, .. } = token else {
            out.content.push_str(token.raw());
            continue;
        };

        let params = parse_macro_args(args);
        let expansion = registry.expand_macro(name, &params, ctx);
        out.content.push_str(&expansion.text);
        errors.extend(expansion.error);

        if !out.macros.iter().any(|m| m == name) {
            out.macros.push(name.to_string());
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::context::UserRef;
    use crate::engine::errors::ErrorKind;

    fn run(content: &str) -> (Expanded, Vec<TemplateError>) {
        let ctx = MacroContext::new().with_user(UserRef {
            id: "u-1".into(),
            name: "Dana".into(),
            ..UserRef::default()
        });
        let mut errors = Vec::new();
        let out = expand_macros(content, &MacroRegistry::builtin(), &ctx, &mut errors).unwrap();
        (out, errors)
    }

    #[test]
    fn replaces_each_call_in_place() {
        let (out, errors) = run("Hi {{user_name()}}, {{upper(\"ok\")}} {{ name }}");
        assert!(errors.is_empty());
        assert_eq!(out.content, "Hi Dana, OK {{ name }}");
        assert_eq!(out.macros, vec!["user_name", "upper"]);
    }

    #[test]
    fn identical_calls_are_expanded_independently() {
        let (out, _) = run("{{add(1, 2)}}+{{add(1, 2)}}");
        assert_eq!(out.content, "3+3");
        assert_eq!(out.macros, vec!["add"]);
    }

    #[test]
    fn failures_leave_markers_and_errors() {
        let (out, errors) = run("{{foo()}} {{upper()}}");
        assert_eq!(out.content, "[MACRO_NOT_FOUND: foo] [MACRO_PARAM_ERROR: upper]");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Processing));
    }

    #[test]
    fn arguments_are_literals_not_variables() {
        let (out, _) = run("{{upper(customer_name)}}");
        assert_eq!(out.content, "CUSTOMER_NAME");
    }
}
