//! Short-circuit capability checks.

use tracing::debug;

use crate::caps::{Capability, GrantedCapabilities, System};

/// Who is asking, and about which object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckScope {
    /// Actor to check; `None` means the current actor.
    pub actor: Option<u64>,
    /// Object the capability is scoped to (an entry, view or form id).
    pub object: Option<u64>,
}

impl CheckScope {
    /// Scope for the current actor with no object.
    pub fn current() -> Self {
        Self::default()
    }

    /// Check a specific actor.
    pub fn for_actor(mut self, actor: u64) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Scope the check to an object.
    pub fn on_object(mut self, object: u64) -> Self {
        self.object = Some(object);
        self
    }
}

/// Answers "does the actor hold capability X, optionally against object Y".
pub trait CapabilityOracle {
    /// Whether the capability is held. Unknown capabilities are not held.
    fn has_capability(&self, capability: &Capability, scope: &CheckScope) -> bool;
}

impl<F> CapabilityOracle for F
where
    F: Fn(&Capability, &CheckScope) -> bool,
{
    fn has_capability(&self, capability: &Capability, scope: &CheckScope) -> bool {
        self(capability, scope)
    }
}

/// A plain granted mapping answers lookups directly and ignores scope.
impl CapabilityOracle for GrantedCapabilities {
    fn has_capability(&self, capability: &Capability, _scope: &CheckScope) -> bool {
        self.is_granted(capability)
    }
}

/// Append each system's full-access sentinel when the request touches that
/// system's closed set.
///
/// Caller order is preserved; duplicates are dropped keeping the first
/// occurrence.
pub fn expand_with_full_access(requested: &[Capability]) -> Vec<Capability> {
    let mut expanded: Vec<Capability> = Vec::with_capacity(requested.len() + 2);

    for cap in requested {
        if !expanded.contains(cap) {
            expanded.push(cap.clone());
        }
    }

    for system in System::all() {
        if requested.iter().any(|cap| system.contains(cap)) {
            let sentinel = system.full_access();
            if !expanded.contains(&sentinel) {
                expanded.push(sentinel);
            }
        }
    }

    expanded
}

/// Whether the actor holds at least one requested capability.
///
/// Capabilities are tried in caller order, then the applicable full-access
/// sentinels. The first affirmative answer wins and later entries are not
/// consulted. An empty request is `false`.
pub fn has_any_capability<O>(requested: &[Capability], oracle: &O, scope: &CheckScope) -> bool
where
    O: CapabilityOracle + ?Sized,
{
    if requested.is_empty() {
        return false;
    }

    let candidates = expand_with_full_access(requested);
    let held = candidates
        .iter()
        .find(|cap| oracle.has_capability(cap, scope));

    debug!(
        requested = requested.len(),
        checked = candidates.len(),
        held = held.map(|cap| cap.as_str()),
        "capability check"
    );

    held.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::{FormsCapability, ViewCapability};
    use std::cell::RefCell;

    fn cap(name: &str) -> Capability {
        name.parse().unwrap()
    }

    #[test]
    fn test_empty_request_is_false() {
        let oracle = |_: &Capability, _: &CheckScope| true;
        assert!(!has_any_capability(&[], &oracle, &CheckScope::current()));
    }

    #[test]
    fn test_first_true_wins() {
        let consulted = RefCell::new(Vec::new());
        let oracle = |c: &Capability, _: &CheckScope| {
            consulted.borrow_mut().push(c.as_str().to_string());
            c.as_str() == "y"
        };

        let requested = [cap("x"), cap("y"), cap("z")];
        assert!(has_any_capability(&requested, &oracle, &CheckScope::current()));
        assert_eq!(*consulted.borrow(), vec!["x", "y"]);
    }

    #[test]
    fn test_nothing_held_is_false() {
        let oracle = |_: &Capability, _: &CheckScope| false;
        let requested = [cap("x"), ViewCapability::EditEntries.into()];
        assert!(!has_any_capability(&requested, &oracle, &CheckScope::current()));
    }

    #[test]
    fn test_view_request_appends_view_sentinel() {
        let expanded = expand_with_full_access(&[ViewCapability::EditEntries.into()]);
        assert_eq!(
            expanded,
            vec![
                ViewCapability::EditEntries.into(),
                System::GravityView.full_access(),
            ]
        );
    }

    #[test]
    fn test_mixed_request_appends_both_sentinels_in_system_order() {
        let expanded = expand_with_full_access(&[
            FormsCapability::EditEntries.into(),
            ViewCapability::EditEntries.into(),
        ]);
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[2], System::GravityView.full_access());
        assert_eq!(expanded[3], System::GravityForms.full_access());
    }

    #[test]
    fn test_host_request_gets_no_sentinel() {
        let expanded = expand_with_full_access(&[cap("edit_posts")]);
        assert_eq!(expanded, vec![cap("edit_posts")]);
    }

    #[test]
    fn test_duplicates_dropped_keeping_first() {
        let expanded = expand_with_full_access(&[
            ViewCapability::FullAccess.into(),
            cap("read"),
            ViewCapability::FullAccess.into(),
        ]);
        assert_eq!(
            expanded,
            vec![ViewCapability::FullAccess.into(), cap("read")]
        );
    }

    #[test]
    fn test_sentinel_grants_access() {
        let granted = GrantedCapabilities::new().with(FormsCapability::FullAccess, true);
        let requested = [FormsCapability::ExportEntries.into()];
        assert!(has_any_capability(&requested, &granted, &CheckScope::current()));
    }

    #[test]
    fn test_scope_reaches_oracle() {
        let oracle = |_: &Capability, scope: &CheckScope| scope.object == Some(42);
        let requested = [ViewCapability::EditFormEntries.into()];

        let scoped = CheckScope::current().for_actor(7).on_object(42);
        assert!(has_any_capability(&requested, &oracle, &scoped));
        assert!(!has_any_capability(&requested, &oracle, &CheckScope::current()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_cap() -> impl Strategy<Value = Capability> {
            prop_oneof![
                proptest::sample::select(ViewCapability::ALL).prop_map(Capability::View),
                proptest::sample::select(FormsCapability::ALL).prop_map(Capability::Forms),
                "[a-z]{1,8}".prop_map(Capability::Host),
            ]
        }

        proptest! {
            // Property: expansion keeps the caller's entries as an ordered prefix
            #[test]
            fn prop_expansion_preserves_caller_order(
                requested in proptest::collection::vec(arb_cap(), 0..8),
            ) {
                let expanded = expand_with_full_access(&requested);
                let mut deduped: Vec<Capability> = Vec::new();
                for cap in &requested {
                    if !deduped.contains(cap) {
                        deduped.push(cap.clone());
                    }
                }
                prop_assert_eq!(&expanded[..deduped.len()], &deduped[..]);
            }

            // Property: the check agrees with "any expanded entry is granted"
            #[test]
            fn prop_check_matches_any(
                requested in proptest::collection::vec(arb_cap(), 0..6),
                held in proptest::collection::vec(arb_cap(), 0..6),
            ) {
                let granted: GrantedCapabilities =
                    held.into_iter().map(|cap| (cap, true)).collect();
                let expected = !requested.is_empty()
                    && expand_with_full_access(&requested)
                        .iter()
                        .any(|cap| granted.is_granted(cap));
                prop_assert_eq!(
                    has_any_capability(&requested, &granted, &CheckScope::current()),
                    expected
                );
            }
        }
    }
}
