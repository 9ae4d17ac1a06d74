use replykit_core::config::loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_default_profile_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
templates_dir = "/tmp/replykit/templates"

[locale]
yes = "Ja"
no = "Nein"
thousands_separator = "."
decimal_separator = ","

[usage]
enabled = false
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.templates_dir.display().to_string(), "/tmp/replykit/templates");
    assert!(rc.usage_log.ends_with(".replykit/usage.jsonl"));
    assert_eq!(rc.locale.yes, "Ja");
    assert_eq!(rc.locale.thousands_separator, ".");
    assert_eq!(rc.locale.decimal_separator, ",");
    assert!(!rc.usage.enabled);
    assert_eq!(rc.logging.level, "info");
}

#[test]
fn load_with_profile_override_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("replykit/config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
templates_dir = "/tmp/def/tpl"

[profiles.work]
templates_dir = "/tmp/work/tpl"
usage_log = "{{templates_dir}}/../usage.jsonl"
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), Some("work")).expect("should load");
    assert_eq!(rc.active_profile, "work");
    assert_eq!(rc.templates_dir, PathBuf::from("/tmp/work/tpl"));
    assert_eq!(rc.usage_log, PathBuf::from("/tmp/work/tpl/../usage.jsonl"));
    assert!(rc.usage.enabled);
}

#[test]
fn logging_file_is_expanded() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[profiles.default]
templates_dir = "/tmp/tpl"

[logging]
level = "debug"
file_level = "trace"
file = "{{templates_dir}}/.replykit/rk.log"
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file_level.as_deref(), Some("trace"));
    assert_eq!(rc.logging.file, Some(PathBuf::from("/tmp/tpl/.replykit/rk.log")));
}
