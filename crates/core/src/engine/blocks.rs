//! `{{#if}}` and `{{#each}}` evaluation.

use serde_json::Value;

use super::ast::Node;
use super::errors::TemplateError;
use super::expr::evaluate_condition;
use super::scope::Scope;
use crate::vars::{VariableMap, display_value};

/// Resolve `{{#if}}` blocks outside of loop bodies.
///
/// A true condition splices in its body, a false one drops it. A condition
/// that cannot be evaluated counts as false and is reported. Blocks inside
/// `{{#each}}` bodies are left for [`process_loops`], which evaluates them
/// per item.
pub fn process_conditionals(
    nodes: Vec<Node>,
    vars: &VariableMap,
    errors: &mut Vec<TemplateError>,
) -> Vec<Node> {
    let scope = Scope::root(vars);
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::If { expr, body } => {
                if condition_holds(&expr, &scope, errors) {
                    out.extend(process_conditionals(body, vars, errors));
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Expand `{{#each}}` blocks.
///
/// Every item gets a copy of the body with `{{this}}` and `{{@index}}`
/// bound. Conditions inside the body see the item as `this`, and nested
/// loops may iterate it with `{{#each this}}`. A target that is not an array
/// removes the block and is reported.
pub fn process_loops(
    nodes: Vec<Node>,
    vars: &VariableMap,
    errors: &mut Vec<TemplateError>,
) -> Vec<Node> {
    instantiate(&nodes, &Scope::root(vars), errors)
}

fn instantiate(nodes: &[Node], scope: &Scope<'_>, errors: &mut Vec<TemplateError>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Var { name, .. } if scope.in_loop() && (name == "this" || name == "@index") => {
                let value = scope.lookup(name).unwrap_or(Value::Null);
                out.push(Node::Text(display_value(&value)));
            }
            Node::If { expr, body } => {
                if condition_holds(expr, scope, errors) {
                    out.extend(instantiate(body, scope, errors));
                }
            }
            Node::Each { target, body } => {
                let Some(Value::Array(items)) = scope.lookup(target) else {
                    errors.push(TemplateError::processing(
                        target,
                        format!("loop target '{target}' is not an array"),
                    ));
                    continue;
                };
                for (index, item) in items.iter().enumerate() {
                    out.extend(instantiate(body, &scope.with_item(item, index), errors));
                }
            }
            other => out.push(other.clone()),
        }
    }
    out
}

fn condition_holds(expr: &str, scope: &Scope<'_>, errors: &mut Vec<TemplateError>) -> bool {
    match evaluate_condition(expr, scope) {
        Ok(holds) => holds,
        Err(e) => {
            errors.push(TemplateError::processing(expr, format!("invalid condition: {e}")));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::render_nodes;
    use crate::engine::lexer::tokenize;
    use crate::engine::parser::parse;
    use serde_json::json;

    fn render(src: &str, vars: &VariableMap) -> (String, Vec<TemplateError>) {
        let (nodes, mut errors) = parse(&tokenize(src).unwrap());
        let nodes = process_conditionals(nodes, vars, &mut errors);
        let nodes = process_loops(nodes, vars, &mut errors);
        (render_nodes(&nodes), errors)
    }

    fn vars() -> VariableMap {
        [
            ("items", json!([1, 2, 3])),
            ("orders", json!([{"id": "A", "qty": 1}, {"id": "B", "qty": 5}])),
            ("matrix", json!([["a", "b"], ["c"]])),
            ("vip", json!(true)),
            ("name", json!("Ada")),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn simple_conditionals() {
        let vars = vars();
        assert_eq!(render("{{#if 1 > 0}}yes{{/if}}", &vars).0, "yes");
        assert_eq!(render("{{#if 1 > 2}}yes{{/if}}", &vars).0, "");
    }

    #[test]
    fn nested_conditionals() {
        let vars = vars();
        let (out, errors) =
            render("{{#if vip}}A{{#if name == 'Ada'}}B{{/if}}{{#if !vip}}C{{/if}}{{/if}}", &vars);
        assert!(errors.is_empty());
        assert_eq!(out, "AB");
    }

    #[test]
    fn bad_condition_is_false_and_reported() {
        let (out, errors) = render("x{{#if nope > 1}}y{{/if}}z", &vars());
        assert_eq!(out, "xz");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].variable, "nope > 1");
    }

    #[test]
    fn loop_binds_item_and_index() {
        let vars = vars();
        assert_eq!(render("{{#each items}}{{this}},{{/each}}", &vars).0, "1,2,3,");
        assert_eq!(render("{{#each items}}{{@index}}:{{this}} {{/each}}", &vars).0, "0:1 1:2 2:3 ");
    }

    #[test]
    fn conditions_inside_loops_see_the_item() {
        let vars = vars();
        let (out, errors) =
            render("{{#each orders}}{{#if this.qty > 2}}big{{/if}}{{#if this.qty < 2}}small{{/if}};{{/each}}", &vars);
        assert!(errors.is_empty());
        assert_eq!(out, "small;big;");
    }

    #[test]
    fn nested_loops_iterate_the_current_item() {
        let (out, _) = render("{{#each matrix}}[{{#each this}}{{this}}{{/each}}]{{/each}}", &vars());
        assert_eq!(out, "[ab][c]");
    }

    #[test]
    fn loop_inside_conditional() {
        let (out, _) = render("{{#if vip}}{{#each items}}{{this}}{{/each}}{{/if}}", &vars());
        assert_eq!(out, "123");
    }

    #[test]
    fn non_array_target_removes_the_block() {
        let (out, errors) = render("a{{#each name}}x{{/each}}b{{#each missing}}y{{/each}}", &vars());
        assert_eq!(out, "ab");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].variable, "name");
        assert_eq!(errors[1].variable, "missing");
    }
}
