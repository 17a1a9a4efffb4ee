//! Granted capability mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::caps::Capability;

/// An actor's resolved capabilities: name to granted/denied.
///
/// Presence matters. A capability explicitly mapped to `false` is
/// different from one that is absent, because equivalence backfill only
/// fills absent entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrantedCapabilities {
    caps: BTreeMap<Capability, bool>,
}

impl GrantedCapabilities {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit value for `capability`, if present.
    pub fn get(&self, capability: &Capability) -> Option<bool> {
        self.caps.get(capability).copied()
    }

    /// Whether `capability` is present and true. Absent reads as false.
    pub fn is_granted(&self, capability: &Capability) -> bool {
        self.get(capability).unwrap_or(false)
    }

    /// Whether `capability` has an explicit entry (true or false).
    pub fn contains(&self, capability: &Capability) -> bool {
        self.caps.contains_key(capability)
    }

    /// Set an explicit value.
    pub fn set(&mut self, capability: Capability, granted: bool) {
        self.caps.insert(capability, granted);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, capability: impl Into<Capability>, granted: bool) -> Self {
        self.set(capability.into(), granted);
        self
    }

    /// Set `capability` to true.
    pub fn grant(&mut self, capability: Capability) {
        self.set(capability, true);
    }

    /// Set `capability` to false (explicit denial, not removal).
    pub fn revoke(&mut self, capability: Capability) {
        self.set(capability, false);
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.caps.len()
    }

    /// Whether there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }

    /// Iterate entries in capability order.
    pub fn iter(&self) -> impl Iterator<Item = (&Capability, bool)> {
        self.caps.iter().map(|(cap, granted)| (cap, *granted))
    }

    /// Capabilities mapped to true.
    pub fn granted(&self) -> impl Iterator<Item = &Capability> {
        self.caps
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(cap, _)| cap)
    }
}

impl FromIterator<(Capability, bool)> for GrantedCapabilities {
    fn from_iter<I: IntoIterator<Item = (Capability, bool)>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}

impl Extend<(Capability, bool)> for GrantedCapabilities {
    fn extend<I: IntoIterator<Item = (Capability, bool)>>(&mut self, iter: I) {
        self.caps.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::ViewCapability;

    #[test]
    fn test_absent_reads_false() {
        let granted = GrantedCapabilities::new();
        let cap = Capability::View(ViewCapability::EditEntries);
        assert!(!granted.is_granted(&cap));
        assert!(!granted.contains(&cap));
        assert_eq!(granted.get(&cap), None);
    }

    #[test]
    fn test_explicit_false_is_present() {
        let cap = Capability::View(ViewCapability::EditEntries);
        let mut granted = GrantedCapabilities::new();
        granted.revoke(cap.clone());

        assert!(granted.contains(&cap));
        assert!(!granted.is_granted(&cap));
        assert_eq!(granted.get(&cap), Some(false));
    }

    #[test]
    fn test_granted_iterator_skips_denials() {
        let granted = GrantedCapabilities::new()
            .with(ViewCapability::ViewEntries, true)
            .with(ViewCapability::DeleteEntries, false)
            .with(Capability::host("read"), true);

        let names: Vec<&str> = granted.granted().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"read"));
        assert!(names.contains(&"gravityview_view_entries"));
    }

    #[test]
    fn test_json_object_shape() {
        let json = r#"{"gravityview_edit_entries": true, "read": false}"#;
        let granted: GrantedCapabilities = serde_json::from_str(json).unwrap();
        assert_eq!(granted.len(), 2);
        assert!(granted.is_granted(&Capability::View(ViewCapability::EditEntries)));
        assert_eq!(granted.get(&Capability::host("read")), Some(false));

        let out = serde_json::to_value(&granted).unwrap();
        assert_eq!(out["gravityview_edit_entries"], serde_json::json!(true));
    }
}
