//! Locating template files.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::config::TemplatesConfig;

/// Finds the first existing template for an ordered candidate list.
pub trait TemplateLoader {
    /// Return the first candidate that exists, or `None`.
    fn locate(&self, candidates: &[String]) -> Option<PathBuf>;
}

/// File-system loader over an ordered list of template roots.
///
/// Roots are searched for every candidate before moving to the next
/// candidate, so a more specific candidate in the bundled root beats a
/// less specific one in an override root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsTemplateLoader {
    roots: Vec<PathBuf>,
    extension: String,
}

impl FsTemplateLoader {
    /// Create a loader over `roots`, highest priority first.
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            roots,
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Build a loader from configuration, resolving relative roots against `cwd`.
    pub fn from_config(config: &TemplatesConfig, cwd: &Path) -> Self {
        let roots = config
            .search_paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
            .collect();
        Self::new(roots, config.extension.clone())
    }

    /// Template roots, highest priority first.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// File name for a candidate.
    pub fn file_name(&self, candidate: &str) -> String {
        if self.extension.is_empty() {
            candidate.to_string()
        } else {
            format!("{}.{}", candidate, self.extension)
        }
    }

    /// Path of a candidate relative to a root.
    ///
    /// Leading slashes are trimmed. Returns `None` when the name still has a
    /// component that would leave the root (`..`, a drive prefix).
    pub fn relative_path(&self, candidate: &str) -> Option<PathBuf> {
        let file_name = self.file_name(candidate.trim_start_matches(['/', '\\']));
        let path = PathBuf::from(file_name);
        let contained = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        contained.then_some(path)
    }
}

impl TemplateLoader for FsTemplateLoader {
    fn locate(&self, candidates: &[String]) -> Option<PathBuf> {
        for candidate in candidates {
            let Some(relative) = self.relative_path(candidate) else {
                debug!(candidate = %candidate, "skipping template name outside the roots");
                continue;
            };
            for root in &self.roots {
                let path = root.join(&relative);
                if path.is_file() {
                    debug!(path = %path.display(), "located template");
                    return Some(path);
                }
            }
        }
        debug!(?candidates, "no template located");
        None
    }
}
