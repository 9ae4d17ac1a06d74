//! Render command implementation.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use color_eyre::eyre::{eyre, Result, WrapErr};
use replykit_core::config::loader::{default_config_path, ConfigLoader};
use replykit_core::templates::TemplateRepository;
use replykit_core::usage::UsageLogService;
use replykit_core::{MacroContext, MacroRegistry, TemplateEngine, VariableMap};
use serde_json::Value;
use tracing::debug;

use crate::RenderArgs;

fn fail(e: impl std::fmt::Display) -> ! {
    println!("FAIL rk render");
    println!("{e}");
    std::process::exit(1);
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: &RenderArgs) {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL rk render");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };

    let repo = TemplateRepository::new(&rc.templates_dir).unwrap_or_else(|e| fail(e));
    debug!(root = %repo.root().display(), template = %args.template, "loading template");
    let loaded = repo.get_by_name(&args.template).unwrap_or_else(|e| fail(e));

    let variables = load_variables(args).unwrap_or_else(|e| fail(format!("{e:#}")));
    let ctx = load_context(args.context.as_deref()).unwrap_or_else(|e| fail(format!("{e:#}")));

    let mut engine = TemplateEngine::new(Arc::new(MacroRegistry::builtin()))
        .with_locale(rc.locale.clone());
    if let Some(service) = UsageLogService::try_from_config(&rc) {
        debug!(path = %service.log_path().display(), "recording usage");
        engine = engine.with_recorder(Arc::new(service));
    }

    let result = engine
        .process_template(&loaded.template, &variables, &ctx)
        .unwrap_or_else(|e| fail(e));

    if args.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        println!("{}", result.content);
        for error in result.errors() {
            eprintln!("warning: {error}");
        }
    }

    if args.strict && result.has_errors() {
        std::process::exit(2);
    }
}

/// Variables from `--vars-file`, overridden by `--var` entries.
fn load_variables(args: &RenderArgs) -> Result<VariableMap> {
    let mut vars = match &args.vars_file {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<VariableMap>(&raw)
                .wrap_err_with(|| format!("{} must contain a JSON object", path.display()))?
        }
        None => VariableMap::new(),
    };

    for entry in &args.vars {
        let (key, value) = parse_var(entry)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Parse `key=value`. The value is JSON when it parses, a string otherwise.
fn parse_var(entry: &str) -> Result<(String, Value)> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| eyre!("invalid --var '{entry}': expected KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(eyre!("invalid --var '{entry}': empty key"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn load_context(path: Option<&Path>) -> Result<MacroContext> {
    let Some(path) = path else {
        return Ok(MacroContext::new());
    };
    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).wrap_err_with(|| format!("invalid context in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn var_values_are_json_when_possible() {
        assert_eq!(parse_var("count=3").unwrap(), ("count".to_string(), json!(3)));
        assert_eq!(parse_var("vip=true").unwrap().1, json!(true));
        assert_eq!(parse_var("items=[1,2]").unwrap().1, json!([1, 2]));
        assert_eq!(parse_var("name=Ada Lovelace").unwrap().1, json!("Ada Lovelace"));
        assert_eq!(parse_var("expr=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_var("empty=").unwrap().1, json!(""));
    }

    #[test]
    fn malformed_vars_are_rejected() {
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn context_file_is_optional() {
        let ctx = load_context(None).unwrap();
        assert!(ctx.user.is_none());
    }
}
