//! Layout command for viewkit.
//!
//! Applies one builder action to a layout file and writes it back when the
//! store reports a change.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, ViewkitError};
use crate::layout::{Layout, LayoutAction, LayoutContext, LayoutStore};
use crate::util::{read_to_string_limited, write_json_atomic};

/// On-disk layout file: the layout plus the tab the builder last showed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub active_tab: LayoutContext,
    #[serde(default = "Layout::empty")]
    pub layout: Layout,
}

/// Action for the layout command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayoutCommandAction {
    /// Insert a row, before `before` when given.
    AddRow {
        context: LayoutContext,
        structure: String,
        before: Option<String>,
    },
    /// Remove a row.
    RemoveRow { context: LayoutContext, row: String },
    /// Set one row attribute.
    SetRow {
        context: LayoutContext,
        row: String,
        key: String,
        value: String,
    },
    /// Switch the active tab.
    Tab { context: LayoutContext },
    /// Print the layout.
    #[default]
    Show,
}

impl LayoutCommandAction {
    fn name(&self) -> &'static str {
        match self {
            LayoutCommandAction::AddRow { .. } => "add-row",
            LayoutCommandAction::RemoveRow { .. } => "remove-row",
            LayoutCommandAction::SetRow { .. } => "set-row",
            LayoutCommandAction::Tab { .. } => "tab",
            LayoutCommandAction::Show => "show",
        }
    }

    fn into_store_action(self) -> Option<LayoutAction> {
        match self {
            LayoutCommandAction::AddRow {
                context,
                structure,
                before,
            } => Some(LayoutAction::AddRow {
                context,
                pointer: before,
                structure,
            }),
            LayoutCommandAction::RemoveRow { context, row } => Some(LayoutAction::DelRow {
                context,
                pointer: row,
            }),
            LayoutCommandAction::SetRow {
                context,
                row,
                key,
                value,
            } => Some(LayoutAction::SetRow {
                context,
                pointer: row,
                key,
                value,
            }),
            LayoutCommandAction::Tab { context } => Some(LayoutAction::ChangeTab { tab: context }),
            LayoutCommandAction::Show => None,
        }
    }
}

/// Options for the layout command.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptions {
    /// What to do.
    pub action: LayoutCommandAction,
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the layout command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Action performed.
    pub action: String,
    /// Whether the file was rewritten.
    pub saved: bool,
    /// Id of the row added by `add-row`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    /// The document after the action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<LayoutDocument>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LayoutOutput {
    /// Create a successful output.
    pub fn success(action: &str, saved: bool, document: LayoutDocument) -> Self {
        Self {
            success: true,
            action: action.to_string(),
            saved,
            row_id: None,
            document: Some(document),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(action: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: action.to_string(),
            saved: false,
            row_id: None,
            document: None,
            error: Some(error.into()),
        }
    }
}

/// The layout command implementation.
pub struct LayoutCommand {
    path: PathBuf,
}

impl LayoutCommand {
    /// Create a new layout command over `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the document; a missing file is an empty layout.
    pub fn load(&self) -> Result<LayoutDocument> {
        if !self.path.exists() {
            return Ok(LayoutDocument {
                active_tab: LayoutContext::default(),
                layout: Layout::empty(),
            });
        }
        let content = read_to_string_limited(&self.path)?;
        serde_json::from_str(&content)
            .map_err(|e| ViewkitError::serde(format!("{}: {}", self.path.display(), e)))
    }

    /// Run the layout command.
    pub fn run(&self, options: &LayoutOptions) -> LayoutOutput {
        let name = options.action.name();
        match self.apply(options.action.clone()) {
            Ok(output) => output,
            Err(e) => LayoutOutput::failure(name, e.to_string()),
        }
    }

    fn apply(&self, action: LayoutCommandAction) -> Result<LayoutOutput> {
        let name = action.name();
        let document = self.load()?;

        let mut store = LayoutStore::with_layout(document.layout);
        store.change_tab(document.active_tab);

        let changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&changed);
        store.add_change_listener(move |_| flag.store(true, Ordering::SeqCst));

        let added_to = match &action {
            LayoutCommandAction::AddRow { context, .. } => Some(*context),
            _ => None,
        };
        let before = added_to.map(|c| row_ids(&store, c)).unwrap_or_default();

        if let Some(store_action) = action.into_store_action() {
            store.dispatch(store_action)?;
        }

        let row_id = added_to.and_then(|c| {
            row_ids(&store, c)
                .into_iter()
                .find(|id| !before.contains(id))
        });

        let document = LayoutDocument {
            active_tab: store.active_tab(),
            layout: store.into_layout(),
        };

        let saved = changed.load(Ordering::SeqCst);
        if saved {
            write_json_atomic(&self.path, &document)?;
        }

        let mut output = LayoutOutput::success(name, saved, document);
        output.row_id = row_id;
        Ok(output)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LayoutOutput, options: &LayoutOptions) -> String {
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
    fn format_human_readable(&self, output: &LayoutOutput) -> String {
        if !output.success {
            return format!(
                "Layout command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let Some(document) = output.document.as_ref() else {
            return "Error: layout unavailable.\n".to_string();
        };

        let mut lines = Vec::new();
        if let Some(row_id) = &output.row_id {
            lines.push(format!("Added row {}", row_id));
        }
        if output.saved {
            lines.push(format!("Saved {}\n", self.path.display()));
        }

        lines.push(format!("Active tab: {}", document.active_tab));
        for (context, section) in &document.layout.sections {
            lines.push(format!("{} ({} rows)", context, section.rows.len()));
            for row in &section.rows {
                let structure: Vec<&str> =
                    row.columns.iter().map(|c| c.colspan.as_str()).collect();
                let fields: usize = row.columns.iter().map(|c| c.fields.len()).sum();
                lines.push(format!(
                    "  {}  {:<12} {} fields",
                    row.row_id,
                    structure.join("-"),
                    fields
                ));
            }
        }

        lines.join("\n") + "\n"
    }
}

fn row_ids(store: &LayoutStore, context: LayoutContext) -> Vec<String> {
    store
        .layout()
        .section(context)
        .map(|s| s.rows.iter().map(|r| r.row_id.clone()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LayoutCommand) {
        let temp = TempDir::new().unwrap();
        let cmd = LayoutCommand::new(temp.path().join("layout.json"));
        (temp, cmd)
    }

    fn run(cmd: &LayoutCommand, action: LayoutCommandAction) -> LayoutOutput {
        cmd.run(&LayoutOptions {
            action,
            ..Default::default()
        })
    }

    fn add(cmd: &LayoutCommand, structure: &str, before: Option<&str>) -> String {
        let output = run(
            cmd,
            LayoutCommandAction::AddRow {
                context: LayoutContext::Directory,
                structure: structure.to_string(),
                before: before.map(String::from),
            },
        );
        assert!(output.success, "{:?}", output.error);
        output.row_id.unwrap()
    }

    #[test]
    fn test_show_missing_file() {
        let (temp, cmd) = setup();
        let output = run(&cmd, LayoutCommandAction::Show);
        assert!(output.success);
        assert!(!output.saved);
        assert!(!temp.path().join("layout.json").exists());
        assert_eq!(output.document.unwrap().layout.sections.len(), 4);
    }

    #[test]
    fn test_add_row_persists() {
        let (_temp, cmd) = setup();
        let first = add(&cmd, "12", None);
        let second = add(&cmd, "6-6", Some(&first));

        let document = cmd.load().unwrap();
        let rows: Vec<&str> = document
            .layout
            .section(LayoutContext::Directory)
            .unwrap()
            .rows
            .iter()
            .map(|r| r.row_id.as_str())
            .collect();
        assert_eq!(rows, vec![second.as_str(), first.as_str()]);
    }

    #[test]
    fn test_remove_row() {
        let (_temp, cmd) = setup();
        let row = add(&cmd, "12", None);

        let output = run(
            &cmd,
            LayoutCommandAction::RemoveRow {
                context: LayoutContext::Directory,
                row,
            },
        );
        assert!(output.success);
        assert!(output.saved);
        assert!(cmd
            .load()
            .unwrap()
            .layout
            .section(LayoutContext::Directory)
            .unwrap()
            .rows
            .is_empty());
    }

    #[test]
    fn test_remove_missing_row_not_saved() {
        let (temp, cmd) = setup();
        let output = run(
            &cmd,
            LayoutCommandAction::RemoveRow {
                context: LayoutContext::Directory,
                row: "missing".to_string(),
            },
        );
        assert!(output.success);
        assert!(!output.saved);
        assert!(!temp.path().join("layout.json").exists());
    }

    #[test]
    fn test_set_row_and_unknown_key() {
        let (_temp, cmd) = setup();
        let row = add(&cmd, "4-4-4", None);

        let output = run(
            &cmd,
            LayoutCommandAction::SetRow {
                context: LayoutContext::Directory,
                row: row.clone(),
                key: "class".to_string(),
                value: "striped".to_string(),
            },
        );
        assert!(output.success);
        let document = cmd.load().unwrap();
        let section = document.layout.section(LayoutContext::Directory).unwrap();
        assert_eq!(section.rows[0].atts.class, "striped");

        let output = run(
            &cmd,
            LayoutCommandAction::SetRow {
                context: LayoutContext::Directory,
                row,
                key: "onclick".to_string(),
                value: "x".to_string(),
            },
        );
        assert!(!output.success);
        assert_eq!(output.action, "set-row");
    }

    #[test]
    fn test_tab_persists() {
        let (_temp, cmd) = setup();
        let output = run(
            &cmd,
            LayoutCommandAction::Tab {
                context: LayoutContext::Edit,
            },
        );
        assert!(output.saved);
        assert_eq!(cmd.load().unwrap().active_tab, LayoutContext::Edit);
    }

    #[test]
    fn test_invalid_file_fails() {
        let (temp, cmd) = setup();
        fs::write(temp.path().join("layout.json"), "[1, 2").unwrap();
        let output = run(&cmd, LayoutCommandAction::Show);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("layout.json"));
    }

    #[test]
    fn test_missing_context_in_file_fails() {
        let (temp, cmd) = setup();
        fs::write(
            temp.path().join("layout.json"),
            r#"{"active_tab": "single", "layout": {"single": {"rows": []}}}"#,
        )
        .unwrap();

        let output = run(
            &cmd,
            LayoutCommandAction::AddRow {
                context: LayoutContext::Export,
                structure: "12".to_string(),
                before: None,
            },
        );
        assert!(!output.success);
    }

    #[test]
    fn test_format_output_human_readable() {
        let (_temp, cmd) = setup();
        let output = run(
            &cmd,
            LayoutCommandAction::AddRow {
                context: LayoutContext::Single,
                structure: "3-9".to_string(),
                before: None,
            },
        );
        let formatted = cmd.format_output(&output, &LayoutOptions::default());
        assert!(formatted.contains("Added row"));
        assert!(formatted.contains("single (1 rows)"));
        assert!(formatted.contains("3-9"));
    }

    #[test]
    fn test_format_output_json_and_quiet() {
        let (_temp, cmd) = setup();
        let output = run(&cmd, LayoutCommandAction::Show);

        let json = LayoutOptions {
            json: true,
            ..Default::default()
        };
        let formatted = cmd.format_output(&output, &json);
        assert!(formatted.contains("\"action\": \"show\""));
        assert!(formatted.contains("\"active_tab\": \"directory\""));

        let quiet = LayoutOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &quiet).is_empty());
    }
}
