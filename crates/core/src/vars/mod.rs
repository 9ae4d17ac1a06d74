//! Variables available to a render.
//!
//! This module covers:
//! - the flat variable map and how values print (`types`)
//! - system variables built from the render context (`system`)
//! - validation of declared variables (`validate`)
//! - per-type formatting of declared variables (`format`)

pub mod format;
pub mod system;
pub mod types;
pub mod validate;

pub use format::{format_declared, group_number};
pub use system::{CLOCK_VARIABLES, build_system_variables, merge_variables};
pub use types::{VariableMap, display_value, format_number, is_blank, is_truthy};
pub use validate::validate_variables;
