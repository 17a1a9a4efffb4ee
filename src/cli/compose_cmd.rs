//! Compose command for viewkit.
//!
//! Reads a granted-capability mapping from a JSON file and prints it after
//! full-access propagation and equivalence backfill.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::caps::{Capabilities, GrantedCapabilities};
use crate::config::Config;
use crate::error::{Result, ViewkitError};
use crate::util::read_to_string_limited;

/// Options for the compose command.
#[derive(Debug, Clone, Default)]
pub struct ComposeOptions {
    /// JSON file holding `{"capability": bool, ...}`.
    pub grants: PathBuf,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the compose command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// The composed mapping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composed: Option<GrantedCapabilities>,
    /// Names the composition added.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComposeOutput {
    /// Create a successful output.
    pub fn success(composed: GrantedCapabilities, added: Vec<String>) -> Self {
        Self {
            success: true,
            composed: Some(composed),
            added,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            composed: None,
            added: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The compose command implementation.
pub struct ComposeCommand {
    config: Config,
}

impl ComposeCommand {
    /// Create a new compose command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the compose command.
    pub fn run(&self, options: &ComposeOptions) -> ComposeOutput {
        match self.compose(options) {
            Ok(output) => output,
            Err(e) => ComposeOutput::failure(e.to_string()),
        }
    }

    fn compose(&self, options: &ComposeOptions) -> Result<ComposeOutput> {
        let policy = Capabilities::from_config(&self.config.capabilities)?;

        let content = read_to_string_limited(&options.grants)?;
        let granted: GrantedCapabilities = serde_json::from_str(&content).map_err(|e| {
            ViewkitError::serde(format!("{}: {}", options.grants.display(), e))
        })?;

        let composed = policy.compose(granted.clone());
        let added = composed
            .iter()
            .filter(|(cap, _)| !granted.contains(cap))
            .map(|(cap, _)| cap.to_string())
            .collect();

        Ok(ComposeOutput::success(composed, added))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ComposeOutput, options: &ComposeOptions) -> String {
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
    fn format_human_readable(&self, output: &ComposeOutput) -> String {
        if !output.success {
            return format!(
                "Compose command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let Some(composed) = output.composed.as_ref() else {
            return "Error: composition succeeded but no mapping was produced.\n".to_string();
        };

        if composed.is_empty() {
            return "No capabilities granted.\n".to_string();
        }

        let mut lines = Vec::new();
        for (cap, granted) in composed.iter() {
            let marker = if output.added.iter().any(|a| a == cap.as_str()) {
                " (added)"
            } else {
                ""
            };
            let value = if granted { "yes" } else { "no" };
            lines.push(format!("{:<40} {}{}", cap.as_str(), value, marker));
        }

        lines.join("\n") + "\n"
    }
}
