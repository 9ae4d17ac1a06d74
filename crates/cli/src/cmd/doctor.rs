use replykit_core::config::loader::{default_config_path, ConfigLoader};
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            println!("OK   rk doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("templates_dir: {}", rc.templates_dir.display());
            println!("usage_log: {}", rc.usage_log.display());
            println!("usage.enabled: {}", rc.usage.enabled);
            println!("locale.yes: {}", rc.locale.yes);
            println!("locale.no: {}", rc.locale.no);
            println!("locale.thousands_separator: {:?}", rc.locale.thousands_separator);
            println!("locale.decimal_separator: {:?}", rc.locale.decimal_separator);
            println!("logging.level: {}", rc.logging.level);
            if let Some(file) = &rc.logging.file {
                println!("logging.file: {}", file.display());
            }
            println!("core: {}", replykit_core::doctor_stub());
        }
        Err(e) => {
            println!("FAIL rk doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
