use crate::config::types::{ConfigFile, LoggingConfig, Profile, ResolvedConfig};
use shellexpand::full;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("no profiles defined in config")]
    NoProfiles,

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("home directory not available to expand '~'")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        Self::from_toml_str(&s, &path.display().to_string(), profile_override)
    }

    /// Parse and resolve configuration already read into memory.
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml_str(
        s: &str,
        origin: &str,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let cf: ConfigFile = toml::from_str(s)
            .map_err(|e| ConfigError::ParseError(origin.to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }
        if cf.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        let active = profile_override
            .map(ToOwned::to_owned)
            .or(cf.profile.clone())
            .unwrap_or_else(|| "default".to_string());

        let prof = cf
            .profiles
            .get(&active)
            .ok_or_else(|| ConfigError::ProfileNotFound(active.clone()))?;

        Self::resolve_profile(&active, prof, &cf)
    }

    fn resolve_profile(
        active: &str,
        prof: &Profile,
        cf: &ConfigFile,
    ) -> Result<ResolvedConfig, ConfigError> {
        let templates_dir = expand_path(&prof.templates_dir)?;
        let sub =
            |s: &str| s.replace("{{templates_dir}}", &templates_dir.to_string_lossy());

        let usage_log = match &prof.usage_log {
            Some(p) => expand_path(&sub(p))?,
            None => templates_dir.join(".replykit").join("usage.jsonl"),
        };

        // Resolve log file path if present
        let log_cfg = &cf.logging;
        let logging = if let Some(ref file) = log_cfg.file {
            let expanded_file = expand_path(&sub(&file.to_string_lossy()))?;
            LoggingConfig {
                level: log_cfg.level.clone(),
                file_level: log_cfg.file_level.clone(),
                file: Some(expanded_file),
            }
        } else {
            log_cfg.clone()
        };

        Ok(ResolvedConfig {
            active_profile: active.to_string(),
            templates_dir,
            usage_log,
            locale: cf.locale.clone(),
            logging,
            usage: cf.usage.clone(),
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("replykit").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("replykit").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = r#"
version = 1
[profiles.default]
templates_dir = "/srv/replykit/templates"
"#;

    #[test]
    fn usage_log_defaults_under_templates_dir() {
        let rc = ConfigLoader::from_toml_str(BASIC, "inline", None).unwrap();
        assert_eq!(rc.active_profile, "default");
        assert_eq!(
            rc.usage_log,
            PathBuf::from("/srv/replykit/templates/.replykit/usage.jsonl")
        );
        assert!(rc.usage.enabled);
    }

    #[test]
    fn usage_log_can_reference_templates_dir() {
        let toml = r#"
version = 1
[profiles.default]
templates_dir = "/srv/tpl"
usage_log = "{{templates_dir}}/../usage.jsonl"
"#;
        let rc = ConfigLoader::from_toml_str(toml, "inline", None).unwrap();
        assert_eq!(rc.usage_log, PathBuf::from("/srv/tpl/../usage.jsonl"));
    }

    #[test]
    fn locale_defaults_apply_when_section_missing() {
        let rc = ConfigLoader::from_toml_str(BASIC, "inline", None).unwrap();
        assert_eq!(rc.locale.yes, "Yes");
        assert_eq!(rc.locale.no, "No");
        assert_eq!(rc.locale.thousands_separator, ",");
        assert_eq!(rc.locale.decimal_separator, ".");
    }

    #[test]
    fn partial_locale_keeps_other_defaults() {
        let toml = r#"
version = 1
[profiles.default]
templates_dir = "/srv/tpl"

[locale]
yes = "예"
no = "아니오"
"#;
        let rc = ConfigLoader::from_toml_str(toml, "inline", None).unwrap();
        assert_eq!(rc.locale.yes, "예");
        assert_eq!(rc.locale.no, "아니오");
        assert_eq!(rc.locale.thousands_separator, ",");
    }
}
