//! Placeholder substitution.

use serde_json::Value;

use super::ast::Node;
use super::errors::TemplateError;
use crate::config::types::LocaleConfig;
use crate::templates::TemplateVariable;
use crate::vars::{VariableMap, display_value, format_declared};

/// Replace every `{{ name }}` placeholder in the tree.
///
/// Declared variables use their merged value, then their default, then the
/// empty string, formatted by type. Any other key of the merged map is
/// rendered as-is. Untaken branches are substituted too. `this` and
/// `@index` inside loop bodies are left for loop expansion.
///
/// Unresolved placeholders stay in the output as written and are reported
/// once per distinct name.
pub fn substitute(
    nodes: Vec<Node>,
    declared: &[TemplateVariable],
    vars: &VariableMap,
    locale: &LocaleConfig,
    errors: &mut Vec<TemplateError>,
) -> Vec<Node> {
    let mut undefined = Vec::new();
    let pass = Substitution { declared, vars, locale };
    let nodes = pass.rewrite(nodes, false, &mut undefined);

    errors.extend(
        undefined
            .into_iter()
            .map(|name| TemplateError::processing(&name, format!("undefined variable '{name}'"))),
    );
    nodes
}

struct Substitution<'a> {
    declared: &'a [TemplateVariable],
    vars: &'a VariableMap,
    locale: &'a LocaleConfig,
}

impl Substitution<'_> {
    fn rewrite(&self, nodes: Vec<Node>, in_loop: bool, undefined: &mut Vec<String>) -> Vec<Node> {
        nodes
            .into_iter()
            .map(|node| match node {
                Node::Var { name, raw } => {
                    if in_loop && (name == "this" || name == "@index") {
                        return Node::Var { name, raw };
                    }
                    match self.resolve(&name) {
                        Some(text) => Node::Text(text),
                        None => {
                            if !undefined.contains(&name) {
                                undefined.push(name.clone());
                            }
                            Node::Var { name, raw }
                        }
                    }
                }
                Node::If { expr, body } => {
                    Node::If { expr, body: self.rewrite(body, in_loop, undefined) }
                }
                Node::Each { target, body } => {
                    Node::Each { target, body: self.rewrite(body, true, undefined) }
                }
                text @ Node::Text(_) => text,
            })
            .collect()
    }

    fn resolve(&self, name: &str) -> Option<String> {
        if let Some(var) = self.declared.iter().find(|v| v.name == name) {
            let empty = Value::String(String::new());
            let value = self
                .vars
                .get(name)
                .filter(|v| !v.is_null())
                .or(var.default_value.as_ref())
                .unwrap_or(&empty);
            return Some(format_declared(value, var.var_type, self.locale));
        }
        self.vars.get(name).map(display_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::render_nodes;
    use crate::engine::lexer::tokenize;
    use crate::engine::parser::parse;
    use crate::templates::VariableType;
    use serde_json::json;

    fn run(src: &str, declared: &[TemplateVariable], vars: VariableMap) -> (String, Vec<TemplateError>) {
        let (nodes, mut errors) = parse(&tokenize(src).unwrap());
        let nodes = substitute(nodes, declared, &vars, &LocaleConfig::default(), &mut errors);
        (render_nodes(&nodes), errors)
    }

    fn map(pairs: &[(&str, Value)]) -> VariableMap {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn declared_variables_are_formatted() {
        let declared = [
            TemplateVariable::new("vip", VariableType::Boolean),
            TemplateVariable::new("total", VariableType::Number),
        ];
        let vars = map(&[("vip", json!(true)), ("total", json!(1234.5))]);
        let (out, errors) = run("{{vip}} / {{ total }}", &declared, vars);
        assert!(errors.is_empty());
        assert_eq!(out, "Yes / 1,234.5");
    }

    #[test]
    fn declared_default_then_empty() {
        let declared = [
            TemplateVariable::new("greeting", VariableType::Text).with_default("Hello"),
            TemplateVariable::new("note", VariableType::Text),
        ];
        let (out, errors) = run("{{greeting}}[{{note}}]", &declared, VariableMap::new());
        assert!(errors.is_empty());
        assert_eq!(out, "Hello[]");
    }

    #[test]
    fn undeclared_keys_render_raw() {
        let vars = map(&[("total", json!(1234.5)), ("tags", json!(["a", "b"]))]);
        let (out, _) = run("{{total}} {{tags}}", &[], vars);
        assert_eq!(out, "1234.5 a,b");
    }

    #[test]
    fn unknown_placeholders_stay_and_are_reported_once() {
        let (out, errors) = run("{{unknown_var}} and {{ unknown_var }}", &[], VariableMap::new());
        assert_eq!(out, "{{unknown_var}} and {{ unknown_var }}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].variable, "unknown_var");
    }

    #[test]
    fn untaken_branches_are_still_checked() {
        let (_, errors) = run("{{#if false}}{{ghost}}{{/if}}", &[], VariableMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].variable, "ghost");
    }

    #[test]
    fn loop_bindings_are_deferred() {
        let (nodes, mut errors) = parse(&tokenize("{{#each xs}}{{this}}{{@index}}{{/each}}").unwrap());
        let nodes = substitute(nodes, &[], &VariableMap::new(), &LocaleConfig::default(), &mut errors);
        assert!(errors.is_empty());
        let Node::Each { body, .. } = &nodes[0] else { panic!("expected loop") };
        assert!(matches!(&body[0], Node::Var { name, .. } if name == "this"));
    }

    #[test]
    fn this_outside_a_loop_is_undefined() {
        let (_, errors) = run("{{this}}", &[], VariableMap::new());
        assert_eq!(errors[0].variable, "this");
    }
}
