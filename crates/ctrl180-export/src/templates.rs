//! Template file lookup.
//!
//! Templates are read from a fixed, ordered list of directories. Only bare
//! `.pdf` filenames are accepted, so a request can never reach outside
//! those directories.

use std::path::{Path, PathBuf};

use ctrl180_core::naming::sanitize_template_name;

use crate::error::ExportError;

#[derive(Debug, Clone)]
pub struct TemplateStore {
    dirs: Vec<PathBuf>,
}

impl TemplateStore {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Read a template's bytes from the first directory that has it.
    pub fn load(&self, filename: &str) -> Result<Vec<u8>, ExportError> {
        let name = validate_name(filename)?;

        let mut last_err = None;
        for dir in &self.dirs {
            let path = dir.join(name);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    tracing::debug!(path = %path.display(), bytes = bytes.len(), "template loaded");
                    return Ok(bytes);
                }
                Err(e) => last_err = Some(e),
            }
        }

        Err(ExportError::TemplateNotFound {
            name: name.to_string(),
            detail: last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no template directories configured".to_string()),
        })
    }

    /// Whether any directory holds `filename`.
    pub fn contains(&self, filename: &str) -> bool {
        validate_name(filename)
            .map(|name| self.dirs.iter().any(|dir| Path::new(dir).join(name).is_file()))
            .unwrap_or(false)
    }
}

fn validate_name(filename: &str) -> Result<&str, ExportError> {
    let name = filename.trim();
    if name.is_empty()
        || !name.ends_with(".pdf")
        || name.starts_with('.')
        || sanitize_template_name(name) != name
    {
        return Err(ExportError::InvalidTemplateName(name.to_string()));
    }
    Ok(name)
}
