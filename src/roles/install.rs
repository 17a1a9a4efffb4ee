//! Installing and removing default capabilities.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::caps::System;
use crate::error::Result;
use crate::roles::{default_capabilities, RoleRegistry, RoleTier};

/// What an install or removal did to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChange {
    /// Role name.
    pub role: String,
    /// Capabilities newly added or removed.
    pub changed: usize,
}

/// Outcome of [`install_default_capabilities`] or [`remove_capabilities`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    /// One entry per registered role.
    pub roles: Vec<RoleChange>,
}

impl InstallReport {
    /// Total capabilities changed across roles.
    pub fn total(&self) -> usize {
        self.roles.iter().map(|r| r.changed).sum()
    }
}

/// Make sure the default tier roles exist in `registry`.
pub fn ensure_default_roles<R: RoleRegistry + ?Sized>(registry: &R) -> Result<()> {
    for tier in RoleTier::all() {
        registry.add_role(tier.role_name())?;
    }
    Ok(())
}

/// Grant every registered role its tier's default capabilities.
///
/// Roles outside the tiers are reported with zero changes. Running this
/// again adds nothing.
pub fn install_default_capabilities<R: RoleRegistry + ?Sized>(registry: &R) -> Result<InstallReport> {
    let mut report = InstallReport::default();

    for role in registry.role_names()? {
        let caps = default_capabilities(&role);
        let changed = if caps.is_empty() {
            0
        } else {
            registry.add_caps(&role, &caps)?
        };
        debug!(role = %role, changed, "installed default capabilities");
        report.roles.push(RoleChange { role, changed });
    }

    info!(total = report.total(), "default capabilities installed");
    Ok(report)
}

/// Revoke every view-plugin capability from every registered role.
pub fn remove_capabilities<R: RoleRegistry + ?Sized>(registry: &R) -> Result<InstallReport> {
    let closed_set = System::GravityView.closed_set();
    let mut report = InstallReport::default();

    for role in registry.role_names()? {
        let changed = registry.remove_caps(&role, &closed_set)?;
        report.roles.push(RoleChange { role, changed });
    }

    info!(total = report.total(), "view capabilities removed");
    Ok(report)
}
