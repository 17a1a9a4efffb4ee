//! File-based role registry.
//!
//! Roles are stored in a single JSON file:
//!
//! ```json
//! { "roles": { "editor": ["edit_posts", "gravityview_edit_entries"] } }
//! ```
//!
//! Every mutation rewrites the file atomically via temp file + rename.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::caps::Capability;
use crate::config::roles_file;
use crate::error::{Result, ViewkitError};
use crate::roles::RoleRegistry;
use crate::util::{read_to_string_limited, write_json_atomic};

/// On-disk shape of the role file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFile {
    /// Role name to granted capabilities.
    #[serde(default)]
    pub roles: BTreeMap<String, BTreeSet<Capability>>,
}

/// File-based role registry.
#[derive(Debug)]
pub struct FileRoleRegistry {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileRoleRegistry {
    /// Create a registry at the default location.
    ///
    /// Uses `$VIEWKIT_HOME/roles.json` or `~/.viewkit/roles.json`.
    pub fn new() -> Result<Self> {
        let path = roles_file().ok_or_else(|| {
            ViewkitError::config("Could not determine roles file (no home directory)")
        })?;
        Ok(Self::with_path(path))
    }

    /// Create a registry backed by `path`. The file need not exist yet.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the file; a missing file is an empty registry.
    pub fn load(&self) -> Result<RoleFile> {
        if !self.path.exists() {
            return Ok(RoleFile::default());
        }
        let content = read_to_string_limited(&self.path)?;
        if content.trim().is_empty() {
            return Ok(RoleFile::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, file: &RoleFile) -> Result<()> {
        write_json_atomic(&self.path, file)
    }

    /// Load, apply `change`, and save only if it reports a modification.
    fn update<T>(&self, change: impl FnOnce(&mut RoleFile) -> (T, bool)) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.load()?;
        let (result, modified) = change(&mut file);
        if modified {
            self.save(&file)?;
        }
        Ok(result)
    }
}

impl RoleRegistry for FileRoleRegistry {
    fn role_names(&self) -> Result<Vec<String>> {
        Ok(self.load()?.roles.into_keys().collect())
    }

    fn capabilities(&self, role: &str) -> Result<Option<BTreeSet<Capability>>> {
        Ok(self.load()?.roles.remove(role))
    }

    fn add_role(&self, role: &str) -> Result<()> {
        self.update(|file| {
            if file.roles.contains_key(role) {
                ((), false)
            } else {
                file.roles.insert(role.to_string(), BTreeSet::new());
                ((), true)
            }
        })
    }

    fn add_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        self.update(|file| {
            let Some(granted) = file.roles.get_mut(role) else {
                return (0, false);
            };
            let added = caps.iter().filter(|cap| granted.insert((*cap).clone())).count();
            (added, added > 0)
        })
    }

    fn remove_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        self.update(|file| {
            let Some(granted) = file.roles.get_mut(role) else {
                return (0, false);
            };
            let removed = caps.iter().filter(|cap| granted.remove(*cap)).count();
            (removed, removed > 0)
        })
    }
}
