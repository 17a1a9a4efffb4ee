//! Check command for viewkit.
//!
//! Answers "does an actor with these roles hold any of these capabilities?"
//! using the role registry and the configured composition policy.

use serde::{Deserialize, Serialize};

use crate::caps::{
    expand_with_full_access, has_any_capability, parse_capabilities, Capabilities, CheckScope,
};
use crate::config::Config;
use crate::error::Result;
use crate::roles::{RoleOracle, RoleRegistry};

/// Options for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Roles held by the actor.
    pub roles: Vec<String>,
    /// Capabilities to test, in order.
    pub capabilities: Vec<String>,
    /// Object the check is scoped to.
    pub object_id: Option<u64>,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the check command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Whether any requested capability is held.
    pub allowed: bool,
    /// Capabilities that can satisfy the check, in lookup order, including
    /// full-access sentinels. Lookup stops at the first one held.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutput {
    /// Create a successful output.
    pub fn success(allowed: bool, candidates: Vec<String>) -> Self {
        Self {
            success: true,
            allowed,
            candidates,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            allowed: false,
            candidates: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The check command implementation.
pub struct CheckCommand<R: RoleRegistry> {
    registry: R,
    config: Config,
}

impl<R: RoleRegistry> CheckCommand<R> {
    /// Create a new check command.
    pub fn new(registry: R, config: Config) -> Self {
        Self { registry, config }
    }

    /// Run the check command.
    pub fn run(&self, options: &CheckOptions) -> CheckOutput {
        match self.check(options) {
            Ok(output) => output,
            Err(e) => CheckOutput::failure(e.to_string()),
        }
    }

    fn check(&self, options: &CheckOptions) -> Result<CheckOutput> {
        let requested = parse_capabilities(options.capabilities.as_slice())?;
        let policy = Capabilities::from_config(&self.config.capabilities)?;
        let oracle = RoleOracle::with_policy(&self.registry, options.roles.as_slice(), &policy)?;

        let mut scope = CheckScope::current();
        if let Some(object) = options.object_id {
            scope = scope.on_object(object);
        }

        let allowed = has_any_capability(&requested, &oracle, &scope);
        let candidates = expand_with_full_access(&requested)
            .into_iter()
            .map(String::from)
            .collect();

        Ok(CheckOutput::success(allowed, candidates))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CheckOutput, options: &CheckOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output, options)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &CheckOutput, options: &CheckOptions) -> String {
        if !output.success {
            return format!(
                "Check command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let verdict = if output.allowed { "allowed" } else { "denied" };
        let roles = if options.roles.is_empty() {
            "(no roles)".to_string()
        } else {
            options.roles.join(", ")
        };

        format!(
            "{} for {}\nCandidates: {}\n",
            verdict,
            roles,
            output.candidates.join(", ")
        )
    }
}
