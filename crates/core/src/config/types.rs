use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub templates_dir: String,
    /// Optional override for the usage log (defaults to `<templates_dir>/.replykit/usage.jsonl`).
    /// May reference `{{templates_dir}}`.
    pub usage_log: Option<String>,
}

/// Tokens used when formatting declared `number` and `boolean` variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LocaleConfig {
    #[serde(default = "default_yes")]
    pub yes: String,
    #[serde(default = "default_no")]
    pub no: String,
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: String,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            yes: default_yes(),
            no: default_no(),
            thousands_separator: default_thousands_separator(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

fn default_yes() -> String {
    "Yes".to_string()
}

fn default_no() -> String {
    "No".to_string()
}

fn default_thousands_separator() -> String {
    ",".to_string()
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration for template usage recording.
#[derive(Debug, Deserialize, Clone)]
pub struct UsageConfig {
    /// Whether rendered templates are recorded (default: true)
    #[serde(default = "default_usage_enabled")]
    pub enabled: bool,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self { enabled: default_usage_enabled() }
    }
}

fn default_usage_enabled() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub templates_dir: PathBuf,
    pub usage_log: PathBuf,
    pub locale: LocaleConfig,
    pub logging: LoggingConfig,
    pub usage: UsageConfig,
}
