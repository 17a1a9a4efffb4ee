//! View layout builder state.
//!
//! This module contains the nested layout tree (contexts, rows, columns,
//! fields) and the store that mutates it through dispatched actions.

pub mod model;
pub mod store;

pub use model::{Atts, Column, Layout, LayoutContext, Row, Section};
pub use store::{LayoutAction, LayoutStore, ListenerId};
