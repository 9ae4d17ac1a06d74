//! Usage log listing.

use chrono::Local;
use replykit_core::config::loader::{default_config_path, ConfigLoader};
use replykit_core::usage::UsageLogService;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Template")]
    template: String,
    #[tabled(rename = "Macros")]
    macros: String,
    #[tabled(rename = "Errors")]
    errors: usize,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, limit: usize) {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL rk usage");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };

    let service = UsageLogService::new(&rc.usage_log);
    let entries = match service.read_entries(Some(limit)) {
        Ok(entries) => entries,
        Err(e) => {
            println!("FAIL rk usage");
            println!("{e}");
            std::process::exit(1);
        }
    };

    if entries.is_empty() {
        println!("(no usage recorded)");
        return;
    }

    let rows: Vec<UsageRow> = entries
        .iter()
        .map(|e| UsageRow {
            when: e.ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
            template: e.template_id.clone(),
            macros: e.macros.join(", "),
            errors: e.error_count,
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("\nTotal: {} renders", rows.len());
}
