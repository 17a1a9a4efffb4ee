//! CLI commands for viewkit.
//!
//! Each command takes options, returns a serializable output and formats it
//! as human-readable text, JSON, or nothing (`--quiet`).
//! - **Templates**: templates (override cascade)
//! - **Capabilities**: compose, check
//! - **Setup**: roles (install/remove/list)
//! - **Builder**: layout

pub mod check_cmd;
pub mod compose_cmd;
pub mod layout_cmd;
pub mod roles_cmd;
pub mod templates_cmd;

pub use check_cmd::CheckCommand;
pub use compose_cmd::ComposeCommand;
pub use layout_cmd::LayoutCommand;
pub use roles_cmd::RolesCommand;
pub use templates_cmd::TemplatesCommand;
