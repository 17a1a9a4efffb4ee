//! Capability oracle backed by a role registry.

use tracing::debug;

use crate::caps::{Capabilities, Capability, CapabilityOracle, CheckScope, GrantedCapabilities};
use crate::error::Result;
use crate::hooks::{Filters, USER_CAPABILITIES};
use crate::roles::RoleRegistry;

/// Answers capability checks for an actor holding a set of roles.
///
/// The actor's granted mapping is the union of its roles' capabilities,
/// run once through the `user_capabilities` filters at construction.
#[derive(Debug, Clone, Default)]
pub struct RoleOracle {
    roles: Vec<String>,
    granted: GrantedCapabilities,
}

impl RoleOracle {
    /// Resolve `roles` against `registry` and run the result through `filters`.
    ///
    /// Unknown roles contribute nothing.
    pub fn resolve<R, S>(
        registry: &R,
        roles: &[S],
        filters: &Filters<GrantedCapabilities>,
    ) -> Result<Self>
    where
        R: RoleRegistry + ?Sized,
        S: AsRef<str>,
    {
        let mut granted = GrantedCapabilities::new();
        for role in roles {
            match registry.capabilities(role.as_ref())? {
                Some(caps) => granted.extend(caps.into_iter().map(|cap| (cap, true))),
                None => debug!(role = role.as_ref(), "unknown role ignored"),
            }
        }

        Ok(Self {
            roles: roles.iter().map(|r| r.as_ref().to_string()).collect(),
            granted: filters.apply_filters(USER_CAPABILITIES, granted),
        })
    }

    /// Resolve with only the composition policy registered as a filter.
    pub fn with_policy<R, S>(registry: &R, roles: &[S], policy: &Capabilities) -> Result<Self>
    where
        R: RoleRegistry + ?Sized,
        S: AsRef<str>,
    {
        let mut filters = Filters::new();
        policy.register(&mut filters);
        Self::resolve(registry, roles, &filters)
    }

    /// The roles this oracle was resolved from.
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// The composed granted mapping.
    pub fn granted(&self) -> &GrantedCapabilities {
        &self.granted
    }
}

impl CapabilityOracle for RoleOracle {
    fn has_capability(&self, capability: &Capability, _scope: &CheckScope) -> bool {
        self.granted.is_granted(capability)
    }
}
