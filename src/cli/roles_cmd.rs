//! Roles command for viewkit.
//!
//! Installs or removes the default tier capabilities and lists what each
//! role holds.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::roles::{
    ensure_default_roles, install_default_capabilities, remove_capabilities, InstallReport,
    RoleRegistry,
};

/// Action for the roles command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolesAction {
    /// Register the tier roles and grant their default capabilities.
    Install,
    /// Revoke every view capability from every role.
    Remove,
    /// Show registered roles.
    #[default]
    List,
}

/// Options for the roles command.
#[derive(Debug, Clone, Default)]
pub struct RolesOptions {
    /// What to do.
    pub action: RolesAction,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One role in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSummary {
    /// Role name.
    pub name: String,
    /// Granted capability names, sorted.
    pub capabilities: Vec<String>,
}

/// Output format for the roles command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolesOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Action performed.
    pub action: RolesAction,
    /// Per-role changes for install/remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<InstallReport>,
    /// Roles after the action.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<RoleSummary>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RolesOutput {
    /// Create a successful output.
    pub fn success(
        action: RolesAction,
        report: Option<InstallReport>,
        roles: Vec<RoleSummary>,
    ) -> Self {
        Self {
            success: true,
            action,
            report,
            roles,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(action: RolesAction, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action,
            report: None,
            roles: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The roles command implementation.
pub struct RolesCommand<R: RoleRegistry> {
    registry: R,
}

impl<R: RoleRegistry> RolesCommand<R> {
    /// Create a new roles command.
    pub fn new(registry: R) -> Self {
        Self { registry }
    }

    /// Run the roles command.
    pub fn run(&self, options: &RolesOptions) -> RolesOutput {
        match self.apply(options.action) {
            Ok(output) => output,
            Err(e) => RolesOutput::failure(options.action, e.to_string()),
        }
    }

    fn apply(&self, action: RolesAction) -> Result<RolesOutput> {
        let report = match action {
            RolesAction::Install => {
                ensure_default_roles(&self.registry)?;
                Some(install_default_capabilities(&self.registry)?)
            }
            RolesAction::Remove => Some(remove_capabilities(&self.registry)?),
            RolesAction::List => None,
        };

        Ok(RolesOutput::success(action, report, self.summaries()?))
    }

    fn summaries(&self) -> Result<Vec<RoleSummary>> {
        let mut roles = Vec::new();
        for name in self.registry.role_names()? {
            let capabilities = self
                .registry
                .capabilities(&name)?
                .unwrap_or_default()
                .into_iter()
                .map(String::from)
                .collect();
            roles.push(RoleSummary { name, capabilities });
        }
        Ok(roles)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RolesOutput, options: &RolesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &RolesOutput) -> String {
        if !output.success {
            return format!(
                "Roles command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();

        if let Some(report) = &output.report {
            let verb = match output.action {
                RolesAction::Remove => "Removed",
                _ => "Installed",
            };
            lines.push(format!("{} {} capabilities\n", verb, report.total()));
            for change in &report.roles {
                lines.push(format!("  {:<16} {:>3}", change.role, change.changed));
            }
            return lines.join("\n") + "\n";
        }

        if output.roles.is_empty() {
            return "No roles registered. Run 'viewkit roles install'.\n".to_string();
        }

        for role in &output.roles {
            lines.push(format!(
                "{} ({} capabilities)",
                role.name,
                role.capabilities.len()
            ));
            for cap in &role.capabilities {
                lines.push(format!("  {}", cap));
            }
        }

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{FileRoleRegistry, MemoryRoleRegistry};
    use tempfile::TempDir;

    fn options(action: RolesAction) -> RolesOptions {
        RolesOptions {
            action,
            ..Default::default()
        }
    }

    #[test]
    fn test_roles_install() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        let output = cmd.run(&options(RolesAction::Install));

        assert!(output.success);
        assert_eq!(output.roles.len(), 5);
        assert_eq!(output.report.unwrap().total(), 2 + 5 + 10 + 25 + 29);

        let admin = output
            .roles
            .iter()
            .find(|r| r.name == "administrator")
            .unwrap();
        assert_eq!(admin.capabilities.len(), 29);
    }

    #[test]
    fn test_roles_install_idempotent() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        cmd.run(&options(RolesAction::Install));
        let output = cmd.run(&options(RolesAction::Install));
        assert_eq!(output.report.unwrap().total(), 0);
    }

    #[test]
    fn test_roles_remove() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        cmd.run(&options(RolesAction::Install));

        let output = cmd.run(&options(RolesAction::Remove));
        assert!(output.success);
        assert_eq!(output.report.unwrap().total(), 71);
        assert!(output.roles.iter().all(|r| r.capabilities.is_empty()));
    }

    #[test]
    fn test_roles_list_empty() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        let opts = options(RolesAction::List);
        let output = cmd.run(&opts);
        assert!(output.success);
        assert!(output.report.is_none());
        assert!(cmd.format_output(&output, &opts).contains("No roles registered"));
    }

    #[test]
    fn test_roles_install_persists_to_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roles.json");

        let cmd = RolesCommand::new(FileRoleRegistry::with_path(&path));
        assert!(cmd.run(&options(RolesAction::Install)).success);

        let reopened = RolesCommand::new(FileRoleRegistry::with_path(&path));
        let output = reopened.run(&options(RolesAction::List));
        assert_eq!(output.roles.len(), 5);
    }

    #[test]
    fn test_roles_corrupt_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("roles.json");
        std::fs::write(&path, "not json").unwrap();

        let cmd = RolesCommand::new(FileRoleRegistry::with_path(&path));
        let output = cmd.run(&options(RolesAction::List));
        assert!(!output.success);
        assert_eq!(output.action, RolesAction::List);
    }

    #[test]
    fn test_format_output_json() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        let opts = RolesOptions {
            action: RolesAction::Install,
            json: true,
            quiet: false,
        };
        let output = cmd.run(&opts);
        let formatted = cmd.format_output(&output, &opts);
        assert!(formatted.contains("\"action\": \"install\""));
        assert!(formatted.contains("gravityview_full_access"));
    }

    #[test]
    fn test_format_output_human_readable() {
        let cmd = RolesCommand::new(MemoryRoleRegistry::new());
        let output = cmd.run(&options(RolesAction::Install));
        let formatted = cmd.format_output(&output, &options(RolesAction::Install));
        assert!(formatted.starts_with("Installed 71 capabilities"));

        let opts = options(RolesAction::List);
        let listed = cmd.run(&opts);
        let formatted = cmd.format_output(&listed, &opts);
        assert!(formatted.contains("subscriber (2 capabilities)"));
    }
}
