//! Templates command for viewkit.
//!
//! Prints the override candidates for one template part and, optionally,
//! the file the cascade settles on.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::PathBuf;

use crate::config::Config;
use crate::template::{FsTemplateLoader, RenderTarget, TemplateLoader, ViewTemplate};

/// Options for the templates command.
#[derive(Debug, Clone, Default)]
pub struct TemplatesOptions {
    /// Template family, optionally with a directory prefix.
    pub slug: String,
    /// Sub-part; empty for the family's main file.
    pub part: String,
    /// View id.
    pub view_id: u64,
    /// Form id.
    pub form_id: u64,
    /// Embedding post id, if the view is embedded.
    pub post_id: Option<u64>,
    /// Also search the configured roots for the winning file.
    pub locate: bool,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the templates command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Candidates, most specific first.
    pub candidates: Vec<String>,
    /// Located file, when `--locate` was given and a file matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub located: Option<String>,
    /// Roots searched when locating.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub searched: Vec<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TemplatesOutput {
    /// Create a successful output.
    pub fn success(candidates: Vec<String>) -> Self {
        Self {
            success: true,
            candidates,
            located: None,
            searched: Vec::new(),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            candidates: Vec::new(),
            located: None,
            searched: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The templates command implementation.
pub struct TemplatesCommand {
    cwd: PathBuf,
    config: Config,
}

impl TemplatesCommand {
    /// Create a new templates command.
    pub fn new(cwd: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            cwd: cwd.into(),
            config,
        }
    }

    /// Run the templates command.
    pub fn run(&self, options: &TemplatesOptions) -> TemplatesOutput {
        let (Some(view_id), Some(form_id)) = (
            NonZeroU64::new(options.view_id),
            NonZeroU64::new(options.form_id),
        ) else {
            return TemplatesOutput::failure("view and form ids must be non-zero");
        };
        if options.slug.is_empty() {
            return TemplatesOutput::failure("slug must not be empty");
        }

        let loader = FsTemplateLoader::from_config(&self.config.templates, &self.cwd);
        self.resolve(&loader, view_id, form_id, options)
    }

    fn resolve<L: TemplateLoader>(
        &self,
        loader: &L,
        view_id: NonZeroU64,
        form_id: NonZeroU64,
        options: &TemplatesOptions,
    ) -> TemplatesOutput {
        let template = ViewTemplate::new(view_id, form_id, loader);
        let target = RenderTarget::from_post(options.post_id);

        let mut output =
            TemplatesOutput::success(template.candidates(&options.slug, &options.part, target));
        if options.locate {
            output.located = template
                .locate(&options.slug, &options.part, target)
                .map(|p| p.display().to_string());
        }
        output
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TemplatesOutput, options: &TemplatesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            let mut output = output.clone();
            if options.locate {
                output.searched = self.searched_roots();
            }
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output, options)
        }
    }

    fn searched_roots(&self) -> Vec<String> {
        FsTemplateLoader::from_config(&self.config.templates, &self.cwd)
            .roots()
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &TemplatesOutput, options: &TemplatesOptions) -> String {
        if !output.success {
            return format!(
                "Templates command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        lines.push("Candidates (most specific first):".to_string());
        for (i, candidate) in output.candidates.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, candidate));
        }

        if options.locate {
            match &output.located {
                Some(path) => lines.push(format!("\nLocated: {}", path)),
                None => {
                    lines.push("\nNo template found in:".to_string());
                    for root in self.searched_roots() {
                        lines.push(format!("  {}", root));
                    }
                }
            }
        }

        lines.join("\n") + "\n"
    }
}
