//! Roles and their default capabilities.
//!
//! This module provides the role tier table, role storage (file-based and
//! in-memory), the one-time install step and a role-backed capability
//! oracle.

pub mod file;
pub mod install;
pub mod memory;
pub mod oracle;
pub mod tier;
pub mod traits;

pub use file::{FileRoleRegistry, RoleFile};
pub use install::{
    ensure_default_roles, install_default_capabilities, remove_capabilities, InstallReport,
    RoleChange,
};
pub use memory::MemoryRoleRegistry;
pub use oracle::RoleOracle;
pub use tier::{default_capabilities, RoleTier};
pub use traits::RoleRegistry;
