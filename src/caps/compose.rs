//! Capability composition.
//!
//! Expands an actor's granted mapping in two steps:
//!
//! 1. **Full access.** When the sentinel is granted, every capability of its
//!    closed set becomes true, even ones explicitly denied.
//! 2. **Equivalence backfill.** A forms-plugin grant that has a view-plugin
//!    counterpart fills that counterpart when it is absent. Present entries,
//!    including explicit `false`, are never overwritten.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::caps::{Capability, FormsCapability, GrantedCapabilities, System, ViewCapability};
use crate::config::CapabilitiesConfig;
use crate::error::Result;
use crate::hooks::{Filters, USER_CAPABILITIES};

/// A full-access sentinel and the closed set it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullAccessRule {
    /// The capability that unlocks the set.
    pub sentinel: Capability,
    /// Capabilities implied by the sentinel.
    pub closed_set: Vec<Capability>,
}

impl FullAccessRule {
    /// Create a rule from a sentinel and its closed set.
    pub fn new(sentinel: Capability, closed_set: Vec<Capability>) -> Self {
        Self {
            sentinel,
            closed_set,
        }
    }

    /// The rule for one of the two plugin systems.
    pub fn for_system(system: System) -> Self {
        Self::new(system.full_access(), system.closed_set())
    }
}

/// Ordered one-directional `source -> target` bridge between systems.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Equivalences {
    pairs: Vec<(Capability, Capability)>,
}

impl Equivalences {
    /// An empty bridge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forms-plugin entry permissions mapped onto their view-plugin
    /// counterparts, so an actor configured only for the forms plugin keeps
    /// working until view permissions are assigned.
    pub fn forms_to_view() -> Self {
        Self::new()
            .with(
                FormsCapability::EditEntries,
                ViewCapability::EditOthersEntries,
            )
            .with(
                FormsCapability::DeleteEntries,
                ViewCapability::DeleteOthersEntries,
            )
            .with(
                FormsCapability::EditEntryNotes,
                ViewCapability::EditOthersEntryNotes,
            )
    }

    /// Append a pair.
    pub fn with(mut self, source: impl Into<Capability>, target: impl Into<Capability>) -> Self {
        self.push(source.into(), target.into());
        self
    }

    /// Append a pair.
    pub fn push(&mut self, source: Capability, target: Capability) {
        self.pairs.push((source, target));
    }

    /// Iterate pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Capability, Capability)> {
        self.pairs.iter()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Compose an actor's capabilities.
///
/// Never fails; unknown or missing names are simply absent.
pub fn compose_capabilities(
    mut granted: GrantedCapabilities,
    full_access: Option<&FullAccessRule>,
    equivalences: &Equivalences,
) -> GrantedCapabilities {
    if granted.is_empty() {
        return granted;
    }

    if let Some(rule) = full_access {
        if granted.is_granted(&rule.sentinel) {
            for cap in &rule.closed_set {
                granted.grant(cap.clone());
            }
        }
    }

    for (source, target) in equivalences.iter() {
        if let Some(value) = granted.get(source) {
            if !granted.contains(target) {
                granted.set(target.clone(), value);
            }
        }
    }

    granted
}

/// The composition policy, built once from configuration and passed around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    full_access: Option<FullAccessRule>,
    equivalences: Equivalences,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            full_access: Some(FullAccessRule::for_system(System::GravityView)),
            equivalences: Equivalences::forms_to_view(),
        }
    }
}

impl Capabilities {
    /// Create a policy from explicit parts.
    pub fn new(full_access: Option<FullAccessRule>, equivalences: Equivalences) -> Self {
        Self {
            full_access,
            equivalences,
        }
    }

    /// Build the policy from configuration.
    ///
    /// Extra equivalences are appended after the defaults. A name inside an
    /// owned namespace that is not a known capability fails the load.
    pub fn from_config(config: &CapabilitiesConfig) -> Result<Self> {
        let mut policy = Self::default();
        if !config.full_access {
            policy.full_access = None;
        }
        for pair in &config.equivalences {
            policy
                .equivalences
                .push(pair.source.parse()?, pair.target.parse()?);
        }
        Ok(policy)
    }

    /// The full-access rule, if enabled.
    pub fn full_access(&self) -> Option<&FullAccessRule> {
        self.full_access.as_ref()
    }

    /// The equivalence bridge.
    pub fn equivalences(&self) -> &Equivalences {
        &self.equivalences
    }

    /// Compose `granted` under this policy.
    pub fn compose(&self, granted: GrantedCapabilities) -> GrantedCapabilities {
        let before = granted.len();
        let composed = compose_capabilities(granted, self.full_access(), &self.equivalences);
        debug!(
            before,
            after = composed.len(),
            "composed user capabilities"
        );
        composed
    }

    /// Register composition on the `user_capabilities` extension point.
    pub fn register(&self, filters: &mut Filters<GrantedCapabilities>) {
        let policy = self.clone();
        filters.add_filter(USER_CAPABILITIES, "compose_capabilities", move |granted| {
            policy.compose(granted)
        });
    }
}
