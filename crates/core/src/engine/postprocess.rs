//! Whitespace normalization of rendered output.

use super::errors::{ProcessError, compile_regex};

const BLANK_LINES: &str = r"\n\s*\n";

/// Collapse runs of blank lines into a single newline and trim both ends.
///
/// Applying it to its own output changes nothing.
pub fn post_process(content: &str) -> Result<String, ProcessError> {
    let blank_lines = compile_regex(BLANK_LINES)?;
    Ok(blank_lines.replace_all(content, "\n").trim().to_string())
}
