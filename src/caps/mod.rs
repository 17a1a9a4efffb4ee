//! Capability names, composition and checks.
//!
//! This module contains the enumerated capability sets of the two
//! permission systems, the composer that expands an actor's granted mapping,
//! and the short-circuit "holds any of" check.

pub mod capability;
pub mod check;
pub mod compose;
pub mod granted;

pub use capability::{parse_capabilities, Capability, FormsCapability, System, ViewCapability};
pub use check::{expand_with_full_access, has_any_capability, CapabilityOracle, CheckScope};
pub use compose::{compose_capabilities, Capabilities, Equivalences, FullAccessRule};
pub use granted::GrantedCapabilities;

/// Merge the view plugin's closed set into an externally supplied list.
///
/// Used by role-management tools that enumerate every known capability.
/// Existing entries keep their position; duplicates are dropped.
pub fn merge_with_all_caps(existing: Vec<Capability>) -> Vec<Capability> {
    let mut merged: Vec<Capability> = Vec::with_capacity(existing.len() + ViewCapability::ALL.len());
    for cap in existing
        .into_iter()
        .chain(System::GravityView.closed_set())
    {
        if !merged.contains(&cap) {
            merged.push(cap);
        }
    }
    merged
}
