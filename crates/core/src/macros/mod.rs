//! Macros: named functions invoked from template text as `{{name(args)}}`.
//!
//! Arguments are literal tokens (quoted text, numbers, booleans or raw words)
//! and are never looked up in the variable map.

pub mod args;
pub mod builtins;
pub mod registry;
pub mod types;

pub use args::parse_macro_args;
pub use builtins::builtin_macros;
pub use registry::{Expansion, MacroRegistry, MacroRegistryBuilder};
pub use types::{MacroArg, MacroError, MacroFunction, MacroHandler};
