//! Recursive-descent parser from tokens to [`Node`] trees.
//!
//! Blocks nest up to [`MAX_BLOCK_DEPTH`] levels. Structural mistakes never
//! abort parsing: an unclosed opener or a stray closer records a `processing`
//! error and the offending tag is kept as literal text. Openers past the depth
//! limit, and their closers, are kept as text too, with a single error.

use super::ast::Node;
use super::errors::TemplateError;
use super::lexer::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    If,
    Each,
}

impl Block {
    fn closer(self) -> &'static str {
        match self {
            Block::If => "{{/if}}",
            Block::Each => "{{/each}}",
        }
    }
}

/// Deepest block nesting the parser builds.
pub const MAX_BLOCK_DEPTH: usize = 64;

struct Parser<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
    errors: Vec<TemplateError>,
    /// Openers kept as text because they were past the depth limit.
    too_deep: Vec<Block>,
    depth_reported: bool,
}

/// Parse tokens into a node list, returning structural errors alongside.
pub fn parse(tokens: &[Token<'_>]) -> (Vec<Node>, Vec<TemplateError>) {
    let mut parser = Parser {
        tokens,
        pos: 0,
        errors: Vec::new(),
        too_deep: Vec::new(),
        depth_reported: false,
    };
    let nodes = parser.parse_nodes(&[]);
    (nodes, parser.errors)
}

impl<'a> Parser<'_, 'a> {
    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse until the closer of the innermost open block (`open.last()`) or
    /// the end of input. The closer itself is consumed by the caller.
    fn parse_nodes(&mut self, open: &[Block]) -> Vec<Node> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.get(self.pos).cloned() {
            match token {
                Token::IfClose { raw } | Token::EachClose { raw } => {
                    let closes = if matches!(token, Token::IfClose { .. }) {
                        Block::If
                    } else {
                        Block::Each
                    };
                    if self.too_deep.last() == Some(&closes) {
                        self.pos += 1;
                        self.too_deep.pop();
                        push_text(&mut nodes, raw);
                        continue;
                    }
                    if open.last() == Some(&closes) {
                        // anything still in `too_deep` was opened inside this block
                        self.too_deep.clear();
                        return nodes;
                    }
                    self.pos += 1;
                    let subject = if closes == Block::If { "if" } else { "each" };
                    self.errors.push(TemplateError::processing(
                        subject,
                        format!("unexpected {raw} without a matching opening tag"),
                    ));
                    push_text(&mut nodes, raw);
                }
                Token::IfOpen { expr: subject, raw } | Token::EachOpen { target: subject, raw }
                    if open.len() >= MAX_BLOCK_DEPTH =>
                {
                    self.pos += 1;
                    let block = if matches!(token, Token::IfOpen { .. }) {
                        Block::If
                    } else {
                        Block::Each
                    };
                    if !self.depth_reported {
                        self.depth_reported = true;
                        self.errors.push(TemplateError::processing(
                            subject.trim(),
                            format!(
                                "blocks nest deeper than {MAX_BLOCK_DEPTH} levels; {raw} is kept as text"
                            ),
                        ));
                    }
                    self.too_deep.push(block);
                    push_text(&mut nodes, raw);
                }
                Token::IfOpen { expr, raw } => {
                    self.pos += 1;
                    let body = self.parse_block(open, Block::If, expr, raw, &mut nodes);
                    if let Some(body) = body {
                        nodes.push(Node::If { expr: expr.trim().to_string(), body });
                    }
                }
                Token::EachOpen { target, raw } => {
                    self.pos += 1;
                    let body = self.parse_block(open, Block::Each, target, raw, &mut nodes);
                    if let Some(body) = body {
                        nodes.push(Node::Each { target: target.to_string(), body });
                    }
                }
                Token::Var { name, raw } => {
                    self.pos += 1;
                    nodes.push(Node::Var { name: name.to_string(), raw: raw.to_string() });
                }
                Token::Text(raw) | Token::Macro { raw, .. } => {
                    self.pos += 1;
                    push_text(&mut nodes, raw);
                }
            }
        }

        nodes
    }

    /// Parse a block body after its opener. Returns `None` when the block is
    /// never closed; the opener and the body are then flushed into `into`
    /// as-is.
    fn parse_block(
        &mut self,
        open: &[Block],
        block: Block,
        subject: &str,
        raw: &str,
        into: &mut Vec<Node>,
    ) -> Option<Vec<Node>> {
        let mut inner = open.to_vec();
        inner.push(block);
        let body = self.parse_nodes(&inner);

        match self.next() {
            Some(Token::IfClose { .. }) if block == Block::If => Some(body),
            Some(Token::EachClose { .. }) if block == Block::Each => Some(body),
            other => {
                // parse_nodes only stops at our closer or at end of input
                debug_assert!(other.is_none());
                self.errors.push(TemplateError::processing(
                    subject.trim(),
                    format!("{raw} is never closed with {}", block.closer()),
                ));
                push_text(into, raw);
                for node in body {
                    match node {
                        Node::Text(t) => push_text(into, &t),
                        other => into.push(other),
                    }
                }
                None
            }
        }
    }
}

/// Append text, merging with a preceding text node.
fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}
