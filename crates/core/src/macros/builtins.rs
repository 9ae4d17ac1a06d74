//! Built-in macro functions.

use regex::{Captures, Regex};

use super::types::{MacroArg, MacroError, MacroFunction};
use crate::engine::context::MacroContext;
use crate::vars::format_number;

/// Every built-in macro, in a stable order.
pub fn builtin_macros() -> Vec<MacroFunction> {
    vec![
        MacroFunction::new("now", &[], |_, ctx| {
            Ok(ctx.now.format("%Y-%m-%d %H:%M:%S").to_string())
        })
        .with_description("Current date and time"),
        MacroFunction::new("date", &["format"], |params, ctx| format_date(ctx, &params[0]))
            .with_description("Current date using YYYY, MM, DD, HH, mm, ss tokens"),
        MacroFunction::new("user_name", &[], |_, ctx| {
            Ok(ctx.user.as_ref().map(|u| u.name.clone()).unwrap_or_default())
        })
        .with_description("Name of the current user"),
        MacroFunction::new("user_email", &[], |_, ctx| {
            Ok(ctx.user.as_ref().map(|u| u.email.clone()).unwrap_or_default())
        })
        .with_description("Email of the current user"),
        MacroFunction::new("inquiry_id", &[], |_, ctx| {
            Ok(ctx.inquiry.as_ref().map(|i| i.id.clone()).unwrap_or_default())
        })
        .with_description("Identifier of the current inquiry"),
        MacroFunction::new("inquiry_title", &[], |_, ctx| {
            Ok(ctx.inquiry.as_ref().map(|i| i.title.clone()).unwrap_or_default())
        })
        .with_description("Title of the current inquiry"),
        MacroFunction::new("upper", &["text"], |params, _| Ok(params[0].as_text().to_uppercase()))
            .with_description("Uppercase text"),
        MacroFunction::new("lower", &["text"], |params, _| Ok(params[0].as_text().to_lowercase()))
            .with_description("Lowercase text"),
        MacroFunction::new("truncate", &["text", "length"], |params, _| truncate(params))
            .with_description("Shorten text to a length, appending ..."),
        MacroFunction::new("if", &["condition", "whenTrue", "whenFalse"], |params, _| {
            let chosen = if params[0].is_truthy() { &params[1] } else { &params[2] };
            Ok(chosen.as_text())
        })
        .with_description("Pick a value by truthiness of the condition"),
        MacroFunction::new("add", &["a", "b"], |params, _| {
            Ok(format_number(number(params, 0)? + number(params, 1)?))
        })
        .with_description("Sum of two numbers"),
        MacroFunction::new("multiply", &["a", "b"], |params, _| {
            Ok(format_number(number(params, 0)? * number(params, 1)?))
        })
        .with_description("Product of two numbers"),
    ]
}

fn number(params: &[MacroArg], index: usize) -> Result<f64, MacroError> {
    params[index].as_number().ok_or_else(|| MacroError::InvalidArgument {
        index,
        expected: "a number",
        got: params[index].as_text(),
    })
}

fn truncate(params: &[MacroArg]) -> Result<String, MacroError> {
    let text = params[0].as_text();
    let length = number(params, 1)?;
    if length < 0.0 {
        return Err(MacroError::InvalidArgument {
            index: 1,
            expected: "a non-negative number",
            got: params[1].as_text(),
        });
    }
    let length = length as usize;
    if text.chars().count() <= length {
        return Ok(text);
    }
    let mut out: String = text.chars().take(length).collect();
    out.push_str("...");
    Ok(out)
}

fn format_date(ctx: &MacroContext, format: &MacroArg) -> Result<String, MacroError> {
    let tokens = Regex::new("YYYY|YY|MM|DD|HH|mm|ss")
        .map_err(|e| MacroError::Failed(e.to_string()))?;
    let escaped = format.as_text().replace('%', "%%");
    let strftime = tokens.replace_all(&escaped, |caps: &Captures<'_>| {
        match &caps[0] {
            "YYYY" => "%Y",
            "YY" => "%y",
            "MM" => "%m",
            "DD" => "%d",
            "HH" => "%H",
            "mm" => "%M",
            _ => "%S",
        }
        .to_string()
    });
    Ok(ctx.now.format(&strftime).to_string())
}
