//! Template AST.

/// A node in a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, output as-is.
    Text(String),

    /// Placeholder `{{ name }}`. `raw` is the source tag, kept so an
    /// unresolved placeholder can be left in the output untouched.
    Var { name: String, raw: String },

    /// `{{#if expr}}...{{/if}}`
    If { expr: String, body: Vec<Node> },

    /// `{{#each target}}...{{/each}}`
    Each { target: String, body: Vec<Node> },
}

impl Node {
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }
}

/// Concatenate nodes into output text.
///
/// Only `Text` is expected once every stage has run. A `Var` that is still
/// present prints its source tag, and a block prints its body.
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(nodes, &mut out);
    out
}

fn write_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Var { raw, .. } => out.push_str(raw),
            Node::If { body, .. } | Node::Each { body, .. } => write_nodes(body, out),
        }
    }
}
