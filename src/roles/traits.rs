//! Role registry trait.
//!
//! This module defines the `RoleRegistry` trait over persistent role storage.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::caps::Capability;
use crate::error::Result;

/// Trait for role storage backends.
///
/// Maps each role name to the set of capabilities it grants. Adding a
/// capability the role already has is a no-op, and capability operations on
/// a role that does not exist do nothing.
pub trait RoleRegistry: Send + Sync {
    /// Names of all registered roles, sorted.
    fn role_names(&self) -> Result<Vec<String>>;

    /// Capabilities granted by `role`.
    ///
    /// Returns `Ok(None)` if the role doesn't exist.
    fn capabilities(&self, role: &str) -> Result<Option<BTreeSet<Capability>>>;

    /// Register a role with no capabilities. Existing roles are left alone.
    fn add_role(&self, role: &str) -> Result<()>;

    /// Grant capabilities to a role. Returns how many were newly added.
    fn add_caps(&self, role: &str, caps: &[Capability]) -> Result<usize>;

    /// Revoke capabilities from a role. Returns how many were removed.
    fn remove_caps(&self, role: &str, caps: &[Capability]) -> Result<usize>;

    /// Grant a single capability.
    fn add_cap(&self, role: &str, cap: &Capability) -> Result<bool> {
        Ok(self.add_caps(role, std::slice::from_ref(cap))? > 0)
    }

    /// Revoke a single capability.
    fn remove_cap(&self, role: &str, cap: &Capability) -> Result<bool> {
        Ok(self.remove_caps(role, std::slice::from_ref(cap))? > 0)
    }

    /// Check if a role exists.
    fn has_role(&self, role: &str) -> Result<bool> {
        Ok(self.capabilities(role)?.is_some())
    }
}

/// Blanket implementation of RoleRegistry for Arc-wrapped registries.
impl<T: RoleRegistry + ?Sized> RoleRegistry for Arc<T> {
    fn role_names(&self) -> Result<Vec<String>> {
        (**self).role_names()
    }

    fn capabilities(&self, role: &str) -> Result<Option<BTreeSet<Capability>>> {
        (**self).capabilities(role)
    }

    fn add_role(&self, role: &str) -> Result<()> {
        (**self).add_role(role)
    }

    fn add_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        (**self).add_caps(role, caps)
    }

    fn remove_caps(&self, role: &str, caps: &[Capability]) -> Result<usize> {
        (**self).remove_caps(role, caps)
    }
}

/// Test utilities for RoleRegistry implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::caps::ViewCapability;

    /// Test helper to verify RoleRegistry implementations.
    pub fn test_role_registry_crud<R: RoleRegistry>(registry: &R) {
        let edit: Capability = ViewCapability::EditEntries.into();
        let read = Capability::host("read");

        // Unknown role
        assert!(!registry.has_role("editor").unwrap());
        assert!(registry.capabilities("editor").unwrap().is_none());
        assert_eq!(registry.add_caps("editor", &[edit.clone()]).unwrap(), 0);
        assert!(!registry.has_role("editor").unwrap());

        // Register and grant
        registry.add_role("editor").unwrap();
        assert!(registry.has_role("editor").unwrap());
        assert!(registry.capabilities("editor").unwrap().unwrap().is_empty());

        assert_eq!(
            registry.add_caps("editor", &[edit.clone(), read.clone()]).unwrap(),
            2
        );
        // Idempotent
        assert_eq!(registry.add_caps("editor", &[edit.clone()]).unwrap(), 0);
        assert!(!registry.add_cap("editor", &read).unwrap());

        let caps = registry.capabilities("editor").unwrap().unwrap();
        assert!(caps.contains(&edit));
        assert!(caps.contains(&read));

        // Re-adding the role keeps its capabilities
        registry.add_role("editor").unwrap();
        assert_eq!(registry.capabilities("editor").unwrap().unwrap().len(), 2);

        // Revoke
        assert!(registry.remove_cap("editor", &edit).unwrap());
        assert!(!registry.remove_cap("editor", &edit).unwrap());
        let caps = registry.capabilities("editor").unwrap().unwrap();
        assert!(!caps.contains(&edit));
        assert!(caps.contains(&read));

        // Names
        registry.add_role("author").unwrap();
        assert_eq!(registry.role_names().unwrap(), vec!["author", "editor"]);
    }
}
