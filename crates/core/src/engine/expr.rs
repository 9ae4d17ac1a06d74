//! Condition expressions used by `{{#if ...}}`.
//!
//! Expressions are checked against a character allow-list, parsed into a
//! small tree and evaluated over typed values. Identifiers resolve through
//! the render [`Scope`]. Nothing is ever handed to a general-purpose
//! evaluator.
//!
//! ```text
//! or         := and ("||" and)*
//! and        := equality ("&&" equality)*
//! equality   := comparison (("==" | "!=" | "===" | "!==") comparison)*
//! comparison := additive (("<" | ">" | "<=" | ">=") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := ("!" | "-") unary | postfix
//! postfix    := primary ("." ident)*
//! primary    := number | string | true | false | null | ident | "(" or ")"
//! ```

use serde_json::Value as Json;
use thiserror::Error;

use super::scope::Scope;
use crate::vars::{display_value, format_number};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("condition is empty")]
    Empty,

    #[error("character '{0}' is not allowed in conditions")]
    Forbidden(char),

    #[error("unexpected {0}")]
    Unexpected(String),

    #[error("unexpected end of condition")]
    UnexpectedEnd,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("condition nests deeper than {MAX_EXPR_DEPTH} levels")]
    TooDeep,

    #[error("condition has more than {MAX_EXPR_TOKENS} tokens")]
    TooLong,
}

/// Nesting allowed for parentheses and prefix operators combined.
pub const MAX_EXPR_DEPTH: usize = 32;

pub const MAX_EXPR_TOKENS: usize = 256;

/// Longest operators first so `===` is not read as `==` followed by `=`.
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "!",
];

/// Binary operators by precedence, loosest first.
const LEVELS: &[&[&str]] = &[
    &["||"],
    &["&&"],
    &["==", "!=", "===", "!=="],
    &["<", ">", "<=", ">="],
    &["+", "-"],
    &["*", "/"],
];

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(c, '\'' | '"' | '.' | '-' | '+' | '*' | '/' | '<' | '>' | '=' | '!' | '&' | '|' | '(' | ')')
}

/// A typed value produced while evaluating a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    /// Array or object from the variable map.
    Json(Json),
}

impl ExprValue {
    fn from_json(value: Json) -> Self {
        match value {
            Json::Null => ExprValue::Null,
            Json::Bool(b) => ExprValue::Bool(b),
            Json::Number(n) => ExprValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => ExprValue::Str(s),
            other => ExprValue::Json(other),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            ExprValue::Null => false,
            ExprValue::Bool(b) => *b,
            ExprValue::Number(n) => *n != 0.0 && !n.is_nan(),
            ExprValue::Str(s) => !s.is_empty(),
            ExprValue::Json(_) => true,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            ExprValue::Null => 0.0,
            ExprValue::Bool(b) => f64::from(u8::from(*b)),
            ExprValue::Number(n) => *n,
            ExprValue::Str(s) => {
                let s = s.trim();
                if s.is_empty() { 0.0 } else { s.parse().unwrap_or(f64::NAN) }
            }
            ExprValue::Json(Json::Array(items)) => match items.as_slice() {
                [] => 0.0,
                [only] => ExprValue::from_json(only.clone()).to_number(),
                _ => f64::NAN,
            },
            ExprValue::Json(_) => f64::NAN,
        }
    }

    fn to_text(&self) -> String {
        match self {
            ExprValue::Null => "null".to_string(),
            ExprValue::Bool(b) => b.to_string(),
            ExprValue::Number(n) => format_number(*n),
            ExprValue::Str(s) => s.clone(),
            ExprValue::Json(v) => display_value(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
    LParen,
    RParen,
    Dot,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Num(n) => format!("number {}", format_number(*n)),
            Tok::Str(s) => format!("string '{s}'"),
            Tok::Ident(s) => format!("'{s}'"),
            Tok::Op(op) => format!("'{op}'"),
            Tok::LParen => "'('".to_string(),
            Tok::RParen => "')'".to_string(),
            Tok::Dot => "'.'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Lit(ExprValue),
    Ident(String),
    Unary(&'static str, Box<Expr>),
    Binary(&'static str, Box<Expr>, Box<Expr>),
    Member(Box<Expr>, String),
}

fn lex(src: &str) -> Result<Vec<Tok>, ExprError> {
    let chars: Vec<char> = src.chars().collect();
    let mut toks = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let n = text.parse().map_err(|_| ExprError::Unexpected(text.clone()))?;
            toks.push(Tok::Num(n));
        } else if c == '_' || c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && (chars[i] == '_' || chars[i].is_ascii_alphanumeric()) {
                i += 1;
            }
            toks.push(Tok::Ident(chars[start..i].iter().collect()));
        } else if c == '\'' || c == '"' {
            let start = i + 1;
            let end = chars[start..]
                .iter()
                .position(|&d| d == c)
                .map(|p| start + p)
                .ok_or(ExprError::UnterminatedString)?;
            toks.push(Tok::Str(chars[start..end].iter().collect()));
            i = end + 1;
        } else if c == '(' {
            toks.push(Tok::LParen);
            i += 1;
        } else if c == ')' {
            toks.push(Tok::RParen);
            i += 1;
        } else if c == '.' {
            toks.push(Tok::Dot);
            i += 1;
        } else {
            let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
            let op = OPERATORS
                .iter()
                .find(|op| rest.starts_with(**op))
                .ok_or_else(|| ExprError::Unexpected(format!("'{c}'")))?;
            toks.push(Tok::Op(*op));
            i += op.len();
        }
    }

    Ok(toks)
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.toks.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn descend(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_level(&mut self, level: usize) -> Result<Expr, ExprError> {
        let Some(ops) = LEVELS.get(level) else {
            return self.parse_unary();
        };
        let mut lhs = self.parse_level(level + 1)?;
        while let Some(Tok::Op(op)) = self.peek().cloned() {
            if !ops.contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_level(level + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek() {
            Some(Tok::Op(op @ ("!" | "-"))) => {
                let op = *op;
                self.pos += 1;
                self.descend()?;
                let inner = self.parse_unary()?;
                self.depth -= 1;
                Ok(Expr::Unary(op, Box::new(inner)))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        while self.peek() == Some(&Tok::Dot) {
            self.pos += 1;
            match self.advance() {
                Some(Tok::Ident(prop)) => expr = Expr::Member(Box::new(expr), prop),
                Some(other) => return Err(ExprError::Unexpected(other.describe())),
                None => return Err(ExprError::UnexpectedEnd),
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        match self.advance() {
            Some(Tok::Num(n)) => Ok(Expr::Lit(ExprValue::Number(n))),
            Some(Tok::Str(s)) => Ok(Expr::Lit(ExprValue::Str(s))),
            Some(Tok::Ident(name)) => Ok(match name.as_str() {
                "true" => Expr::Lit(ExprValue::Bool(true)),
                "false" => Expr::Lit(ExprValue::Bool(false)),
                "null" => Expr::Lit(ExprValue::Null),
                _ => Expr::Ident(name),
            }),
            Some(Tok::LParen) => {
                self.descend()?;
                let inner = self.parse_level(0)?;
                self.depth -= 1;
                match self.advance() {
                    Some(Tok::RParen) => Ok(inner),
                    Some(other) => Err(ExprError::Unexpected(other.describe())),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            Some(other) => Err(ExprError::Unexpected(other.describe())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn parse_expr(src: &str) -> Result<Expr, ExprError> {
    if src.trim().is_empty() {
        return Err(ExprError::Empty);
    }
    if let Some(c) = src.chars().find(|c| !is_allowed(*c)) {
        return Err(ExprError::Forbidden(c));
    }

    let toks = lex(src)?;
    if toks.len() > MAX_EXPR_TOKENS {
        return Err(ExprError::TooLong);
    }
    let mut parser = Parser { toks, pos: 0, depth: 0 };
    let expr = parser.parse_level(0)?;
    match parser.peek() {
        None => Ok(expr),
        Some(extra) => Err(ExprError::Unexpected(extra.describe())),
    }
}

fn loose_eq(a: &ExprValue, b: &ExprValue) -> bool {
    use ExprValue::{Json, Null, Str};
    match (a, b) {
        (Null, Null) => true,
        (Null, _) | (_, Null) => false,
        (Str(x), Str(y)) => x == y,
        (Json(x), Json(y)) => x == y,
        (Json(_), Str(_)) | (Str(_), Json(_)) => a.to_text() == b.to_text(),
        _ => a.to_number() == b.to_number(),
    }
}

fn strict_eq(a: &ExprValue, b: &ExprValue) -> bool {
    use ExprValue::{Bool, Json, Null, Number, Str};
    match (a, b) {
        (Null, Null) => true,
        (Bool(x), Bool(y)) => x == y,
        (Number(x), Number(y)) => x == y,
        (Str(x), Str(y)) => x == y,
        (Json(x), Json(y)) => x == y,
        _ => false,
    }
}

fn compare(op: &str, a: &ExprValue, b: &ExprValue) -> bool {
    if let (ExprValue::Str(x), ExprValue::Str(y)) = (a, b) {
        return match op {
            "<" => x < y,
            ">" => x > y,
            "<=" => x <= y,
            _ => x >= y,
        };
    }
    let (x, y) = (a.to_number(), b.to_number());
    match op {
        "<" => x < y,
        ">" => x > y,
        "<=" => x <= y,
        _ => x >= y,
    }
}

fn eval(expr: &Expr, scope: &Scope<'_>) -> Result<ExprValue, ExprError> {
    match expr {
        Expr::Lit(v) => Ok(v.clone()),
        Expr::Ident(name) => scope
            .lookup(name)
            .map(ExprValue::from_json)
            .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
        Expr::Unary(op, inner) => {
            let v = eval(inner, scope)?;
            Ok(if *op == "!" {
                ExprValue::Bool(!v.is_truthy())
            } else {
                ExprValue::Number(-v.to_number())
            })
        }
        Expr::Member(target, prop) => {
            let v = eval(target, scope)?;
            Ok(match (&v, prop.as_str()) {
                (ExprValue::Str(s), "length") => ExprValue::Number(s.chars().count() as f64),
                (ExprValue::Json(Json::Array(items)), "length") => {
                    ExprValue::Number(items.len() as f64)
                }
                (ExprValue::Json(Json::Object(map)), key) => {
                    map.get(key).cloned().map_or(ExprValue::Null, ExprValue::from_json)
                }
                _ => ExprValue::Null,
            })
        }
        Expr::Binary("&&", lhs, rhs) => {
            let l = eval(lhs, scope)?;
            if l.is_truthy() { eval(rhs, scope) } else { Ok(l) }
        }
        Expr::Binary("||", lhs, rhs) => {
            let l = eval(lhs, scope)?;
            if l.is_truthy() { Ok(l) } else { eval(rhs, scope) }
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval(lhs, scope)?;
            let r = eval(rhs, scope)?;
            apply(op, &l, &r)
        }
    }
}

fn apply(op: &str, l: &ExprValue, r: &ExprValue) -> Result<ExprValue, ExprError> {
    let concat = |v: &ExprValue| matches!(v, ExprValue::Str(_) | ExprValue::Json(_));
    Ok(match op {
        "+" if concat(l) || concat(r) => ExprValue::Str(l.to_text() + &r.to_text()),
        "+" => ExprValue::Number(l.to_number() + r.to_number()),
        "-" => ExprValue::Number(l.to_number() - r.to_number()),
        "*" => ExprValue::Number(l.to_number() * r.to_number()),
        "/" => {
            let divisor = r.to_number();
            if divisor == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            ExprValue::Number(l.to_number() / divisor)
        }
        "==" => ExprValue::Bool(loose_eq(l, r)),
        "!=" => ExprValue::Bool(!loose_eq(l, r)),
        "===" => ExprValue::Bool(strict_eq(l, r)),
        "!==" => ExprValue::Bool(!strict_eq(l, r)),
        "<" | ">" | "<=" | ">=" => ExprValue::Bool(compare(op, l, r)),
        other => return Err(ExprError::Unexpected(format!("'{other}'"))),
    })
}

/// Evaluate an expression to its value.
pub fn evaluate(expr: &str, scope: &Scope<'_>) -> Result<ExprValue, ExprError> {
    eval(&parse_expr(expr)?, scope)
}

/// Evaluate a condition to a boolean by truthiness.
pub fn evaluate_condition(expr: &str, scope: &Scope<'_>) -> Result<bool, ExprError> {
    Ok(evaluate(expr, scope)?.is_truthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vars::VariableMap;
    use rstest::rstest;
    use serde_json::json;

    fn vars() -> VariableMap {
        [
            ("count", json!(3)),
            ("name", json!("Ada")),
            ("empty", json!("")),
            ("items", json!([1, 2, 3])),
            ("customer", json!({"tier": "gold"})),
            ("vip", json!(true)),
            ("nothing", json!(null)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    fn check(expr: &str) -> Result<bool, ExprError> {
        let vars = vars();
        evaluate_condition(expr, &Scope::root(&vars))
    }

    #[rstest]
    #[case("1 > 0", true)]
    #[case("1 > 2", false)]
    #[case("count >= 3 && vip", true)]
    #[case("count > 5 || name == 'Ada'", true)]
    #[case("!vip", false)]
    #[case("!(count - 3)", true)]
    #[case("2 + 3 * 4 === 14", true)]
    #[case("(2 + 3) * 4 === 20", true)]
    #[case("-count < 0", true)]
    #[case("count == '3'", true)]
    #[case("count === '3'", false)]
    #[case("count !== 3", false)]
    #[case("name + '!' == \"Ada!\"", true)]
    #[case("name.length == 3", true)]
    #[case("items.length > 2", true)]
    #[case("customer.tier == 'gold'", true)]
    #[case("customer.missing == null", true)]
    #[case("empty", false)]
    #[case("nothing", false)]
    #[case("items", true)]
    #[case("'apple' < 'banana'", true)]
    #[case("10 / 4 == 2.5", true)]
    #[case("vip == 1", true)]
    fn evaluates(#[case] expr: &str, #[case] expected: bool) {
        assert_eq!(check(expr), Ok(expected), "{expr}");
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(check("false && missing_var"), Ok(false));
        assert_eq!(check("true || missing_var"), Ok(true));
    }

    #[test]
    fn operands_are_returned_by_logical_operators() {
        let vars = vars();
        let v = evaluate("empty || name", &Scope::root(&vars)).unwrap();
        assert_eq!(v, ExprValue::Str("Ada".into()));
    }

    #[rstest]
    #[case("", ExprError::Empty)]
    #[case("count; drop", ExprError::Forbidden(';'))]
    #[case("process.exit(1)", ExprError::Unexpected("'('".into()))]
    #[case("missing_var > 1", ExprError::UnknownIdentifier("missing_var".into()))]
    #[case("count > ", ExprError::UnexpectedEnd)]
    #[case("(count", ExprError::UnexpectedEnd)]
    #[case("1 / 0", ExprError::DivisionByZero)]
    #[case("'open", ExprError::UnterminatedString)]
    #[case("count = 3", ExprError::Unexpected("'='".into()))]
    #[case("count 3", ExprError::Unexpected("number 3".into()))]
    fn rejects(#[case] expr: &str, #[case] expected: ExprError) {
        assert_eq!(check(expr), Err(expected), "{expr}");
    }

    #[test]
    fn loop_item_is_in_scope() {
        let vars = VariableMap::new();
        let item = json!({"qty": 4});
        let scope = Scope::root(&vars).with_item(&item, 1);
        assert_eq!(
            evaluate_condition("this.qty > 3 && @index", &scope),
            Err(ExprError::Forbidden('@'))
        );
        assert_eq!(evaluate_condition("this.qty > 3", &scope), Ok(true));
    }

    #[test]
    fn nesting_is_limited() {
        let parens = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(check(&parens), Err(ExprError::TooDeep));
        assert_eq!(check(&format!("{}1", "!".repeat(100))), Err(ExprError::TooDeep));
        let negations = format!("{}vip", "- ".repeat(MAX_EXPR_DEPTH + 1));
        assert_eq!(check(&negations), Err(ExprError::TooDeep));

        let half = MAX_EXPR_DEPTH / 2;
        let within = format!("{}vip{}", "(".repeat(half), ")".repeat(half));
        assert_eq!(check(&format!("{}{within}", "!!".repeat(MAX_EXPR_DEPTH / 4))), Ok(true));
    }

    #[test]
    fn long_conditions_are_rejected_before_parsing() {
        assert_eq!(check(&format!("{}1", "!".repeat(200_000))), Err(ExprError::TooLong));
        let chain = vec!["count"; MAX_EXPR_TOKENS].join(" + ");
        assert_eq!(check(&chain), Err(ExprError::TooLong));
    }
}
