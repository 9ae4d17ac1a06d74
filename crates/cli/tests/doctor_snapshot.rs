use assert_cmd::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn normalize(s: &str) -> String {
    let path = Regex::new(r"(?m)^path: .*$").unwrap();
    let core = Regex::new(r"(?m)^core: .*$").unwrap();
    let s = path.replace(s, "path: <CFG>");
    core.replace(&s, "core: <CORE>").to_string()
}

#[test]
fn doctor_snapshot_default_profile() {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    fs::write(
        &cfg,
        r#"
version = 1
profile = "default"

[profiles.default]
templates_dir = "/tmp/rk/templates"
"#,
    )
    .unwrap();

    let assert = Command::new(assert_cmd::cargo::cargo_bin!("rk"))
        .args(["doctor", "--config", cfg.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK   rk doctor"));

    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    insta::assert_snapshot!(normalize(&out), @r#"
    OK   rk doctor
    path: <CFG>
    profile: default
    templates_dir: /tmp/rk/templates
    usage_log: /tmp/rk/templates/.replykit/usage.jsonl
    usage.enabled: true
    locale.yes: Yes
    locale.no: No
    locale.thousands_separator: ","
    locale.decimal_separator: "."
    logging.level: info
    core: <CORE>
    "#);
}
