//! System variables computed from the render context.

use serde_json::Value;

use super::types::VariableMap;
use crate::engine::context::MacroContext;

/// Clock-derived variables and the `strftime` format each one renders with.
pub const CLOCK_VARIABLES: &[(&str, &str)] = &[
    ("current_date", "%Y-%m-%d"),
    ("current_time", "%H:%M:%S"),
    ("current_datetime", "%Y-%m-%d %H:%M:%S"),
    ("current_year", "%Y"),
    ("current_month", "%m"),
    ("current_day", "%d"),
];

/// Assemble the system variable map for one render.
///
/// Layers are applied in order, later keys winning: clock fields, user fields,
/// inquiry fields, response fields, `custom_variables`, `system_variables`.
/// Entity fields are always present and empty when the entity is absent.
pub fn build_system_variables(ctx: &MacroContext) -> VariableMap {
    let mut vars = VariableMap::new();
    let mut put = |key: &str, value: String| {
        vars.insert(key.to_string(), Value::String(value));
    };

    for (name, format) in CLOCK_VARIABLES {
        put(name, ctx.now.format(format).to_string());
    }

    let user = ctx.user.clone().unwrap_or_default();
    put("user_name", user.name);
    put("user_email", user.email);
    put("user_id", user.id);

    let inquiry = ctx.inquiry.clone().unwrap_or_default();
    put("inquiry_id", inquiry.id);
    put("inquiry_title", inquiry.title);
    put("inquiry_content", inquiry.content);
    put("inquiry_category", inquiry.category);
    put("inquiry_status", inquiry.status);

    let response = ctx.response.clone().unwrap_or_default();
    put("response_id", response.id);
    put("response_content", response.content);

    for (k, v) in &ctx.custom_variables {
        vars.insert(k.clone(), v.clone());
    }
    for (k, v) in &ctx.system_variables {
        vars.insert(k.clone(), v.clone());
    }

    vars
}

/// Merge caller-supplied variables over the system map. Supplied values win.
pub fn merge_variables(system: VariableMap, supplied: &VariableMap) -> VariableMap {
    let mut merged = system;
    for (k, v) in supplied {
        merged.insert(k.clone(), v.clone());
    }
    merged
}
