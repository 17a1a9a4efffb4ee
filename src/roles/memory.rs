//! In-memory role registry.
//!
//! Thread-safe implementation of the RoleRegistry trait, used by tests and
//! by callers that load roles from elsewhere.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use crate::caps::Capability;
use crate::error::Result;
use crate::roles::RoleRegistry;

/// In-memory role registry.
///
/// Roles are lost when the registry is dropped.
#[derive(Debug, Default)]
pub struct MemoryRoleRegistry {
    roles: RwLock<BTreeMap<String, BTreeSet<Capability>>>,
}

impl MemoryRoleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the given roles and no capabilities.
    pub fn with_roles<S: AsRef<str>>(roles: &[S]) -> Self {
        let registry = Self::new();
        {
            let mut map = registry.roles.write().unwrap();
            for role in roles {
                map.entry(role.as_ref().to_string()).or_default();
            }
        }
        registry
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.read().unwrap().len()
    }

    /// Whether there are no roles.
    pub fn is_empty(&self) -> bool {
        self.roles.read().unwrap().is_empty()
    }

    /// Snapshot of every role and its capabilities.
    pub fn snapshot(&self) -> BTreeMap<String, BTreeSet<Capability>> {
        self.roles.read().unwrap().clone()
    }
}

impl RoleRegistry for MemoryRoleRegistry {
    fn role_names(&self) -> Result<Vec<String>> {
        Ok(self.roles.read().unwrap().keys().cloned().collect())
    }

    fn capabilities(&self, role: &str) -> Result<Option<BTreeSet<Capability>>> {
        Ok(self.roles.read().unwrap().get(role).cloned())
    }

    fn add_role(&self, role: &str) -> Result<()> {
        self.roles
            .write()
            .unwrap()
            .entry(role.to_string())
            .or_default();
        Ok(())
    }

    fn add_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        let mut roles = self.roles.write().unwrap();
        let Some(granted) = roles.get_mut(role) else {
            return Ok(0);
        };
        Ok(caps.iter().filter(|cap| granted.insert((*cap).clone())).count())
    }

    fn remove_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        let mut roles = self.roles.write().unwrap();
        let Some(granted) = roles.get_mut(role) else {
            return Ok(0);
        };
        Ok(caps.iter().filter(|cap| granted.remove(*cap)).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::traits::tests::test_role_registry_crud;

    #[test]
    fn test_memory_registry_crud() {
        let registry = MemoryRoleRegistry::new();
        test_role_registry_crud(&registry);
    }

    #[test]
    fn test_with_roles() {
        let registry = MemoryRoleRegistry::with_roles(&["editor", "subscriber", "editor"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.snapshot().values().all(|caps| caps.is_empty()));
    }

    #[test]
    fn test_shared_through_arc() {
        use std::sync::Arc;

        let registry = Arc::new(MemoryRoleRegistry::with_roles(&["author"]));
        let shared = Arc::clone(&registry);
        shared
            .add_cap("author", &Capability::host("upload_files"))
            .unwrap();
        assert_eq!(registry.capabilities("author").unwrap().unwrap().len(), 1);
    }
}
