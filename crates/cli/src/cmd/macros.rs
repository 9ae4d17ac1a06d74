//! Built-in macro listing.

use replykit_core::MacroRegistry;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct MacroRow {
    #[tabled(rename = "Macro")]
    signature: String,
    #[tabled(rename = "Params")]
    arity: usize,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn run() {
    let registry = MacroRegistry::builtin();
    let rows: Vec<MacroRow> = registry
        .functions()
        .into_iter()
        .map(|f| MacroRow {
            signature: f.signature(),
            arity: f.arity(),
            description: f.description.clone(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!("\nTotal: {} macros", rows.len());
}
