//! viewkit - template override cascade and capability composition for
//! form-entry views.
//!
//! viewkit resolves which template file renders a part of a view (most
//! specific override first) and decides what an actor may do by composing
//! two plugins' capability sets. It also carries the role tier table and
//! the view builder's layout store.

pub mod caps;
pub mod cli;
pub mod config;
pub mod error;
pub mod hooks;
pub mod layout;
pub mod roles;
pub mod template;
pub mod util;

pub use caps::{
    compose_capabilities, has_any_capability, Capabilities, Capability, CapabilityOracle,
    CheckScope, FormsCapability, GrantedCapabilities, System, ViewCapability,
};
pub use config::Config;
pub use error::{Result, ViewkitError};
pub use hooks::{Filters, TEMPLATE_CANDIDATES, USER_CAPABILITIES};
pub use layout::{Layout, LayoutAction, LayoutContext, LayoutStore};
pub use roles::{
    install_default_capabilities, FileRoleRegistry, MemoryRoleRegistry, RoleOracle, RoleRegistry,
    RoleTier,
};
pub use template::{
    candidates_for, FsTemplateLoader, RenderTarget, TemplateContext, TemplateLoader, ViewTemplate,
};

// CLI commands
pub use cli::{CheckCommand, ComposeCommand, LayoutCommand, RolesCommand, TemplatesCommand};
