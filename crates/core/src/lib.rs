#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod macros;
pub mod templates;
pub mod usage;
pub mod vars;

pub use engine::{
    ErrorKind, MacroContext, ProcessError, TemplateEngine, TemplateError,
    TemplateProcessingResult,
};
pub use macros::{MacroFunction, MacroRegistry};
pub use templates::{Template, TemplateVariable, VariableType};
pub use vars::VariableMap;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn rustc_version() -> String {
    std::env::var("RUSTC_VERSION").unwrap_or_else(|_| "unknown".into())
}

pub fn doctor_stub() -> String {
    format!(
        "replykit-core v{} | rustc {} on {}",
        version(),
        rustc_version(),
        std::env::consts::OS
    )
}
