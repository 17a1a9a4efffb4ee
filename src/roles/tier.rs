//! Role tiers and their default capabilities.
//!
//! Each tier holds its own additions plus everything of the tiers below it.

use serde::{Deserialize, Serialize};

use crate::caps::{Capability, ViewCapability};

/// A default role tier, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    /// Read only.
    Subscriber,
    /// Edit and delete drafts, but not publish.
    Contributor,
    /// Edit, publish and delete own entries.
    Author,
    /// Edit, publish and delete everyone's views and entries.
    Editor,
    /// Settings and full access.
    Administrator,
}

impl RoleTier {
    /// Get all tiers, lowest first.
    pub fn all() -> &'static [RoleTier] {
        &[
            RoleTier::Subscriber,
            RoleTier::Contributor,
            RoleTier::Author,
            RoleTier::Editor,
            RoleTier::Administrator,
        ]
    }

    /// The role name this tier applies to.
    pub fn role_name(self) -> &'static str {
        match self {
            RoleTier::Subscriber => "subscriber",
            RoleTier::Contributor => "contributor",
            RoleTier::Author => "author",
            RoleTier::Editor => "editor",
            RoleTier::Administrator => "administrator",
        }
    }

    /// The tier for a role name. Other roles get no defaults.
    pub fn from_role_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.role_name() == name)
    }

    /// Capabilities this tier adds over the one below.
    pub fn own_capabilities(self) -> &'static [ViewCapability] {
        use ViewCapability::*;
        match self {
            RoleTier::Subscriber => &[ViewEntries, ViewOthersEntries],
            RoleTier::Contributor => &[EditViews, DeleteViews, SupportPort],
            RoleTier::Author => &[
                EditEntries,
                EditFormEntries,
                ViewEntryNotes,
                DeleteEntries,
                DeleteEntry,
            ],
            RoleTier::Editor => &[
                EditOthersViews,
                ReadPrivateViews,
                DeletePrivateViews,
                DeleteOthersViews,
                EditPrivateViews,
                PublishViews,
                DeletePublishedViews,
                EditPublishedViews,
                ContactSupport,
                CopyViews,
                EditOthersEntries,
                ViewOthersEntryNotes,
                EditOthersEntryNotes,
                ModerateEntries,
                DeleteOthersEntries,
            ],
            RoleTier::Administrator => &[FullAccess, ViewSettings, EditSettings, Uninstall],
        }
    }

    /// Every capability of this tier, own additions first, then each lower tier.
    pub fn capabilities(self) -> Vec<Capability> {
        Self::all()
            .iter()
            .rev()
            .filter(|tier| **tier <= self)
            .flat_map(|tier| tier.own_capabilities().iter().copied())
            .map(Capability::View)
            .collect()
    }
}

/// Default capabilities for a role name; empty for roles outside the tiers.
pub fn default_capabilities(role: &str) -> Vec<Capability> {
    RoleTier::from_role_name(role)
        .map(RoleTier::capabilities)
        .unwrap_or_default()
}
