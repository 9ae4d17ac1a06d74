use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub logical_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum TemplateDiscoveryError {
    #[error("templates directory does not exist: {0}")]
    MissingDir(String),

    #[error("failed to read templates directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// Find every template definition under `root`.
///
/// Templates are YAML files (`.yaml` or `.yml`). Hidden directories such as
/// `.replykit/` are skipped. Results are sorted by logical name.
pub fn discover_templates(root: &Path) -> Result<Vec<TemplateInfo>, TemplateDiscoveryError> {
    if !root.exists() {
        return Err(TemplateDiscoveryError::MissingDir(root.display().to_string()));
    }

    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

    for entry in walker {
        let entry = entry
            .map_err(|e| TemplateDiscoveryError::WalkError(root.display().to_string(), e))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_template_file(path) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        out.push(TemplateInfo {
            logical_name: logical_name_from_relative(rel),
            path: path.to_path_buf(),
        });
    }

    out.sort_by(|a, b| a.logical_name.cmp(&b.logical_name));
    Ok(out)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.'))
}

fn is_template_file(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

fn logical_name_from_relative(rel: &Path) -> String {
    let without_ext = rel.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_name_uses_forward_slashes() {
        let rel = Path::new("shipping").join("delay.yaml");
        assert_eq!(logical_name_from_relative(&rel), "shipping/delay");
    }

    #[test]
    fn only_yaml_files_are_templates() {
        assert!(is_template_file(Path::new("a.yaml")));
        assert!(is_template_file(Path::new("a.yml")));
        assert!(!is_template_file(Path::new("a.md")));
        assert!(!is_template_file(Path::new("yaml")));
    }
}
