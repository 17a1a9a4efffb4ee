//! Capability names.
//!
//! Two permission systems coexist: the view plugin's own capabilities and
//! the forms plugin's capabilities. Each owns a closed, enumerated set plus a
//! full-access sentinel. Anything else the host defines (`edit_posts`,
//! `manage_options`, ...) is carried opaquely as [`Capability::Host`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewkitError};

macro_rules! capability_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// The canonical capability name.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }

            /// Look up a variant by its canonical name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $text => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

capability_enum! {
    /// Capabilities owned by the view plugin.
    pub enum ViewCapability {
        /// Implies every other view capability.
        FullAccess => "gravityview_full_access",
        ViewSettings => "gravityview_view_settings",
        EditSettings => "gravityview_edit_settings",
        Uninstall => "gravityview_uninstall",

        EditOthersViews => "edit_others_gravityviews",
        ReadPrivateViews => "read_private_gravityviews",
        DeletePrivateViews => "delete_private_gravityviews",
        DeleteOthersViews => "delete_others_gravityviews",
        EditPrivateViews => "edit_private_gravityviews",
        PublishViews => "publish_gravityviews",
        DeletePublishedViews => "delete_published_gravityviews",
        EditPublishedViews => "edit_published_gravityviews",
        ContactSupport => "gravityview_contact_support",
        /// Duplicate an existing view.
        CopyViews => "copy_gravityviews",
        EditOthersEntries => "gravityview_edit_others_entries",
        ViewOthersEntryNotes => "gravityview_view_others_entry_notes",
        EditOthersEntryNotes => "gravityview_edit_others_entry_notes",
        /// Approve or reject entries.
        ModerateEntries => "gravityview_moderate_entries",
        DeleteOthersEntries => "gravityview_delete_others_entries",

        EditEntries => "gravityview_edit_entries",
        /// Like `EditEntries`, but checked against a form id.
        EditFormEntries => "gravityview_edit_form_entries",
        ViewEntryNotes => "gravityview_view_entry_notes",
        DeleteEntries => "gravityview_delete_entries",
        DeleteEntry => "gravityview_delete_entry",

        EditViews => "edit_gravityviews",
        DeleteViews => "delete_gravityviews",
        SupportPort => "gravityview_support_port",

        ViewEntries => "gravityview_view_entries",
        ViewOthersEntries => "gravityview_view_others_entries",
    }
}

capability_enum! {
    /// Capabilities owned by the forms plugin.
    pub enum FormsCapability {
        /// Sentinel; not a member of the closed set it unlocks.
        FullAccess => "gform_full_access",
        EditForms => "gravityforms_edit_forms",
        DeleteForms => "gravityforms_delete_forms",
        CreateForm => "gravityforms_create_form",
        ViewEntries => "gravityforms_view_entries",
        EditEntries => "gravityforms_edit_entries",
        DeleteEntries => "gravityforms_delete_entries",
        ViewSettings => "gravityforms_view_settings",
        EditSettings => "gravityforms_edit_settings",
        ExportEntries => "gravityforms_export_entries",
        Uninstall => "gravityforms_uninstall",
        ViewEntryNotes => "gravityforms_view_entry_notes",
        EditEntryNotes => "gravityforms_edit_entry_notes",
        ViewUpdates => "gravityforms_view_updates",
        ViewAddons => "gravityforms_view_addons",
        PreviewForms => "gravityforms_preview_forms",
        SystemStatus => "gravityforms_system_status",
        Logging => "gravityforms_logging",
        ApiSettings => "gravityforms_api_settings",
    }
}

/// One of the two permission systems that own a closed capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum System {
    /// The view plugin.
    GravityView,
    /// The forms plugin.
    GravityForms,
}

impl System {
    /// Get all systems.
    pub fn all() -> &'static [System] {
        &[System::GravityView, System::GravityForms]
    }

    /// The capability that implies every member of this system's closed set.
    pub fn full_access(self) -> Capability {
        match self {
            System::GravityView => Capability::View(ViewCapability::FullAccess),
            System::GravityForms => Capability::Forms(FormsCapability::FullAccess),
        }
    }

    /// The closed set of capabilities this system owns.
    ///
    /// The view plugin lists its own sentinel as a member; the forms plugin
    /// does not.
    pub fn closed_set(self) -> Vec<Capability> {
        match self {
            System::GravityView => ViewCapability::ALL
                .iter()
                .copied()
                .map(Capability::View)
                .collect(),
            System::GravityForms => FormsCapability::ALL
                .iter()
                .copied()
                .filter(|cap| *cap != FormsCapability::FullAccess)
                .map(Capability::Forms)
                .collect(),
        }
    }

    /// Whether `capability` belongs to this system's closed set.
    pub fn contains(self, capability: &Capability) -> bool {
        match (self, capability) {
            (System::GravityView, Capability::View(_)) => true,
            (System::GravityForms, Capability::Forms(cap)) => *cap != FormsCapability::FullAccess,
            _ => false,
        }
    }
}

/// A capability name.
///
/// Serializes as its canonical string so granted maps and role files stay
/// readable JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Capability {
    /// A view plugin capability.
    View(ViewCapability),
    /// A forms plugin capability.
    Forms(FormsCapability),
    /// A capability defined by the host that neither plugin owns.
    Host(String),
}

impl Capability {
    /// Build a host capability.
    pub fn host(name: impl Into<String>) -> Self {
        Capability::Host(name.into())
    }

    /// The canonical capability name.
    pub fn as_str(&self) -> &str {
        match self {
            Capability::View(cap) => cap.as_str(),
            Capability::Forms(cap) => cap.as_str(),
            Capability::Host(name) => name,
        }
    }

    /// The system owning this capability, if any.
    pub fn system(&self) -> Option<System> {
        match self {
            Capability::View(_) => Some(System::GravityView),
            Capability::Forms(_) => Some(System::GravityForms),
            Capability::Host(_) => None,
        }
    }
}

/// Whether `name` sits in a namespace one of the two systems owns.
fn is_owned_namespace(name: &str) -> bool {
    name.starts_with("gravityview_")
        || name.ends_with("_gravityviews")
        || name.starts_with("gravityforms_")
        || name.starts_with("gform_")
}

impl FromStr for Capability {
    type Err = ViewkitError;

    /// Parse a capability name.
    ///
    /// Names inside an owned namespace must match a known capability, so a
    /// typo such as `gravityview_edit_entires` is rejected instead of
    /// silently reading as "not held".
    fn from_str(name: &str) -> Result<Self> {
        if let Some(cap) = ViewCapability::from_name(name) {
            return Ok(Capability::View(cap));
        }
        if let Some(cap) = FormsCapability::from_name(name) {
            return Ok(Capability::Forms(cap));
        }
        if name.is_empty() || is_owned_namespace(name) {
            return Err(ViewkitError::unknown_capability(name));
        }
        Ok(Capability::Host(name.to_string()))
    }
}

impl TryFrom<String> for Capability {
    type Error = ViewkitError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Capability> for String {
    fn from(cap: Capability) -> Self {
        match cap {
            Capability::Host(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl From<ViewCapability> for Capability {
    fn from(cap: ViewCapability) -> Self {
        Capability::View(cap)
    }
}

impl From<FormsCapability> for Capability {
    fn from(cap: FormsCapability) -> Self {
        Capability::Forms(cap)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a list of capability names, failing on the first unknown owned name.
pub fn parse_capabilities<S: AsRef<str>>(names: &[S]) -> Result<Vec<Capability>> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}
