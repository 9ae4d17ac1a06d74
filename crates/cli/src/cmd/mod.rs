pub mod doctor;
pub mod list_templates;
pub mod macros;
pub mod render;
pub mod usage;
