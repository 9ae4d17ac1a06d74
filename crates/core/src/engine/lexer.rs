//! Template tokenizer.
//!
//! Splits content into literal text and `{{...}}` tags. A tag's inner text
//! never contains braces, so `{{a {{b}}` yields the text `{{a ` followed by
//! the placeholder `b`.

use super::errors::{ProcessError, compile_regex};

const TAG: &str = r"\{\{([^{}]*)\}\}";
const MACRO: &str = r"^(\w+)\((.*)\)$";
const VAR: &str = r"^\s*(@?[A-Za-z0-9_]+)\s*$";
const IF_OPEN: &str = r"^#if\s+(.+?)\s*$";
const EACH_OPEN: &str = r"^#each\s+([A-Za-z0-9_]+)\s*$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Macro { name: &'a str, args: &'a str, raw: &'a str },
    Var { name: &'a str, raw: &'a str },
    IfOpen { expr: &'a str, raw: &'a str },
    IfClose { raw: &'a str },
    EachOpen { target: &'a str, raw: &'a str },
    EachClose { raw: &'a str },
}

impl<'a> Token<'a> {
    /// Source text of the token.
    pub fn raw(&self) -> &'a str {
        match self {
            Token::Text(raw)
            | Token::Macro { raw, .. }
            | Token::Var { raw, .. }
            | Token::IfOpen { raw, .. }
            | Token::IfClose { raw }
            | Token::EachOpen { raw, .. }
            | Token::EachClose { raw } => *raw,
        }
    }
}

pub fn tokenize(content: &str) -> Result<Vec<Token<'_>>, ProcessError> {
    let tag = compile_regex(TAG)?;
    let macro_call = compile_regex(MACRO)?;
    let var = compile_regex(VAR)?;
    let if_open = compile_regex(IF_OPEN)?;
    let each_open = compile_regex(EACH_OPEN)?;

    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in tag.captures_iter(content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Token::Text(&content[last..whole.start()]));
        }
        last = whole.end();

        let raw = whole.as_str();
        let inner = inner.as_str();
        let trimmed = inner.trim();

        let token = if let Some(m) = macro_call.captures(inner) {
            Token::Macro {
                name: m.get(1).map_or("", |g| g.as_str()),
                args: m.get(2).map_or("", |g| g.as_str()),
                raw,
            }
        } else if trimmed == "/if" {
            Token::IfClose { raw }
        } else if trimmed == "/each" {
            Token::EachClose { raw }
        } else if let Some(m) = if_open.captures(inner) {
            Token::IfOpen { expr: m.get(1).map_or("", |g| g.as_str()), raw }
        } else if let Some(m) = each_open.captures(inner) {
            Token::EachOpen { target: m.get(1).map_or("", |g| g.as_str()), raw }
        } else if let Some(m) = var.captures(inner) {
            Token::Var { name: m.get(1).map_or("", |g| g.as_str()), raw }
        } else {
            Token::Text(raw)
        };
        tokens.push(token);
    }

    if last < content.len() {
        tokens.push(Token::Text(&content[last..]));
    }
    Ok(tokens)
}
