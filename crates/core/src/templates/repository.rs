use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::templates::discovery::{TemplateDiscoveryError, TemplateInfo, discover_templates};
use crate::templates::types::Template;

#[derive(Debug, Error)]
pub enum TemplateRepoError {
    #[error(transparent)]
    Discovery(#[from] TemplateDiscoveryError),

    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read template file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse template {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub logical_name: String,
    pub path: PathBuf,
    pub template: Template,
}

/// File-backed template store.
///
/// The directory is scanned once on construction. Template files are read
/// and parsed on every [`get_by_name`](Self::get_by_name) call, so edits show
/// up without rebuilding the repository.
#[derive(Debug)]
pub struct TemplateRepository {
    root: PathBuf,
    index: Vec<TemplateInfo>,
}

impl TemplateRepository {
    pub fn new(root: &Path) -> Result<Self, TemplateDiscoveryError> {
        let index = discover_templates(root)?;
        Ok(Self { root: root.to_path_buf(), index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list_all(&self) -> &[TemplateInfo] {
        &self.index
    }

    /// Load a template by logical name (`shipping/delay`). A missing `id`
    /// defaults to the logical name and a missing `name` to the id.
    pub fn get_by_name(&self, name: &str) -> Result<LoadedTemplate, TemplateRepoError> {
        let Some(info) = self.index.iter().find(|t| t.logical_name == name) else {
            return Err(TemplateRepoError::NotFound(name.to_string()));
        };

        let content = fs::read_to_string(&info.path)
            .map_err(|e| TemplateRepoError::Io { path: info.path.clone(), source: e })?;

        let mut template: Template = serde_yaml::from_str(&content)
            .map_err(|e| TemplateRepoError::Parse { path: info.path.clone(), source: e })?;

        if template.id.is_empty() {
            template.id = info.logical_name.clone();
        }
        if template.name.is_empty() {
            template.name = template.id.clone();
        }

        Ok(LoadedTemplate {
            logical_name: info.logical_name.clone(),
            path: info.path.clone(),
            template,
        })
    }
}
