//! Template rendering engine.
//!
//! Content is tokenized into `{{...}}` tags, parsed into a [`Node`] tree and
//! rewritten stage by stage. Blocks nest freely. Conditions use a small
//! expression grammar evaluated over typed values.

pub mod ast;
pub mod blocks;
pub mod context;
pub mod errors;
pub mod expand;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod postprocess;
pub mod processor;
pub mod scope;
pub mod substitute;

pub use ast::{Node, render_nodes};
pub use blocks::{process_conditionals, process_loops};
pub use context::{InquiryRef, MacroContext, ResponseRef, UserRef};
pub use errors::{ErrorKind, ProcessError, TemplateError, TemplateProcessingResult};
pub use expand::{Expanded, expand_macros};
pub use expr::{ExprError, ExprValue, evaluate, evaluate_condition};
pub use lexer::{Token, tokenize};
pub use parser::parse;
pub use postprocess::post_process;
pub use processor::TemplateEngine;
pub use scope::Scope;
pub use substitute::substitute;
