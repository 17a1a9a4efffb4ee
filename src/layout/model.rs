//! Layout tree types.
//!
//! A layout has one section per rendering context; each section is a list
//! of rows, each row a list of columns holding field configurations.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewkitError};

/// Per-process counter mixed into row ids so ids minted in the same
/// microsecond still differ.
static ROW_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Rendering context a layout section applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutContext {
    /// Multiple entries.
    #[default]
    Directory,
    /// Single entry.
    Single,
    /// Edit entry.
    Edit,
    /// Export.
    Export,
}

impl LayoutContext {
    /// Get all contexts.
    pub fn all() -> &'static [LayoutContext] {
        &[
            LayoutContext::Directory,
            LayoutContext::Single,
            LayoutContext::Edit,
            LayoutContext::Export,
        ]
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutContext::Directory => "directory",
            LayoutContext::Single => "single",
            LayoutContext::Edit => "edit",
            LayoutContext::Export => "export",
        }
    }
}

impl fmt::Display for LayoutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutContext {
    type Err = ViewkitError;

    fn from_str(value: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| ViewkitError::layout(format!("unknown context: {}", value)))
    }
}

/// HTML attributes of a row or column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atts {
    pub id: String,
    pub class: String,
    pub style: String,
}

impl Atts {
    /// Set an attribute by name (`id`, `class` or `style`).
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = match key {
            "id" => &mut self.id,
            "class" => &mut self.class,
            "style" => &mut self.style,
            other => return Err(ViewkitError::layout(format!("unknown attribute: {}", other))),
        };
        *slot = value.into();
        Ok(())
    }
}

/// One column of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Width in grid units, as written in the row structure (`"4"`).
    pub colspan: String,
    #[serde(default)]
    pub atts: Atts,
    /// Field configurations placed in this column.
    #[serde(default)]
    pub fields: Vec<serde_json::Value>,
}

/// One row of a layout section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub atts: Atts,
    #[serde(default)]
    pub columns: Vec<Column>,
    pub row_id: String,
}

impl Row {
    /// Build an empty row from a column structure such as `"4-4-4"`.
    pub fn build(structure: &str) -> Self {
        let columns = structure
            .split('-')
            .map(|colspan| Column {
                colspan: colspan.to_string(),
                atts: Atts::default(),
                fields: Vec::new(),
            })
            .collect();

        Self {
            atts: Atts::default(),
            columns,
            row_id: unique_row_id(),
        }
    }
}

/// Rows of one context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Section {
    /// Index of the row with `row_id`.
    pub fn find_row(&self, row_id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.row_id == row_id)
    }
}

/// The complete layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    pub sections: BTreeMap<LayoutContext, Section>,
}

impl Layout {
    /// A layout with an empty section for every context.
    pub fn empty() -> Self {
        Self {
            sections: LayoutContext::all()
                .iter()
                .map(|c| (*c, Section::default()))
                .collect(),
        }
    }

    /// The section for `context`.
    pub fn section(&self, context: LayoutContext) -> Option<&Section> {
        self.sections.get(&context)
    }

    /// The section for `context`, or a layout error if it is missing.
    pub fn section_mut(&mut self, context: LayoutContext) -> Result<&mut Section> {
        self.sections
            .get_mut(&context)
            .ok_or_else(|| ViewkitError::layout(format!("no such context: {}", context)))
    }
}

/// A 13-character hex id: 8 digits of seconds and 5 of microseconds.
fn unique_row_id() -> String {
    let now = Utc::now();
    let seq = ROW_COUNTER.fetch_add(1, Ordering::SeqCst);
    let micros = (now.timestamp_subsec_micros().wrapping_add(seq)) & 0xfffff;
    format!("{:08x}{:05x}", now.timestamp() as u32, micros)
}
