//! Layout store and action dispatcher.
//!
//! The store holds the builder's layout and active tab. Every change goes
//! through [`LayoutStore::dispatch`], which applies the action and, when it
//! changed something, notifies change listeners.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::layout::{Layout, LayoutContext, Row};

/// Handle returned by [`LayoutStore::add_change_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&LayoutStore) + Send + Sync>;

/// Actions understood by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum LayoutAction {
    /// Replace the whole layout.
    UpdateLayoutAll { values: Layout },
    /// Switch the active tab.
    ChangeTab { tab: LayoutContext },
    /// Insert a new row before `pointer` (appended when `pointer` is unknown).
    AddRow {
        context: LayoutContext,
        pointer: Option<String>,
        #[serde(rename = "struct")]
        structure: String,
    },
    /// Remove the row `pointer`.
    DelRow {
        context: LayoutContext,
        pointer: String,
    },
    /// Set one attribute of the row `pointer`.
    SetRow {
        context: LayoutContext,
        pointer: String,
        key: String,
        value: String,
    },
}

/// In-memory layout configuration with change notification.
#[derive(Default)]
pub struct LayoutStore {
    active_tab: LayoutContext,
    layout: Layout,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutStore")
            .field("active_tab", &self.active_tab)
            .field("layout", &self.layout)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl LayoutStore {
    /// Create a store with an empty layout and the directory tab active.
    pub fn new() -> Self {
        Self::with_layout(Layout::empty())
    }

    /// Create a store over an existing layout.
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Register a listener called after every dispatched action that changed
    /// the store.
    pub fn add_change_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: Fn(&LayoutStore) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Returns whether it was registered.
    pub fn remove_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    fn emit_change(&self) {
        for (_, listener) in &self.listeners {
            listener(self);
        }
    }

    /// The active tab.
    pub fn active_tab(&self) -> LayoutContext {
        self.active_tab
    }

    /// Set the active tab.
    pub fn change_tab(&mut self, tab: LayoutContext) {
        self.active_tab = tab;
    }

    /// The current layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Consume the store, returning its layout.
    pub fn into_layout(self) -> Layout {
        self.layout
    }

    /// Replace the layout.
    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout;
    }

    /// Insert a row built from `structure` before the row `pointer`.
    ///
    /// With no pointer, or one that matches no row, the row is appended.
    /// Returns the new row's id.
    pub fn add_row(
        &mut self,
        context: LayoutContext,
        pointer: Option<&str>,
        structure: &str,
    ) -> Result<String> {
        let section = self.layout.section_mut(context)?;
        let row = Row::build(structure);
        let row_id = row.row_id.clone();

        let index = pointer
            .and_then(|p| section.find_row(p))
            .unwrap_or(section.rows.len());
        section.rows.insert(index, row);

        debug!(%context, index, row_id = %row_id, "added layout row");
        Ok(row_id)
    }

    /// Remove the row `pointer`. Returns whether a row was removed.
    pub fn remove_row(&mut self, context: LayoutContext, pointer: &str) -> Result<bool> {
        let section = self.layout.section_mut(context)?;
        match section.find_row(pointer) {
            Some(index) => {
                section.rows.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Set attribute `key` of the row `pointer`. Returns whether the row exists.
    pub fn update_row(
        &mut self,
        context: LayoutContext,
        pointer: &str,
        key: &str,
        value: &str,
    ) -> Result<bool> {
        let section = self.layout.section_mut(context)?;
        match section.find_row(pointer) {
            Some(index) => {
                section.rows[index].atts.set(key, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Apply an action, then notify listeners if it changed the store.
    ///
    /// Returns whether the store changed. Removing or updating a row that
    /// does not exist changes nothing. Listeners are not notified when the
    /// action fails.
    pub fn dispatch(&mut self, action: LayoutAction) -> Result<bool> {
        let changed = match action {
            LayoutAction::UpdateLayoutAll { values } => {
                self.set_layout(values);
                true
            }
            LayoutAction::ChangeTab { tab } => {
                self.change_tab(tab);
                true
            }
            LayoutAction::AddRow {
                context,
                pointer,
                structure,
            } => {
                self.add_row(context, pointer.as_deref(), &structure)?;
                true
            }
            LayoutAction::DelRow { context, pointer } => self.remove_row(context, &pointer)?,
            LayoutAction::SetRow {
                context,
                pointer,
                key,
                value,
            } => self.update_row(context, &pointer, &key, &value)?,
        };
        if changed {
            self.emit_change();
        }
        Ok(changed)
    }
}
