//! Template override resolution.
//!
//! This module builds the specificity-ordered candidate list for a template
//! part and finds the first candidate that exists on disk.

pub mod context;
pub mod loader;
pub mod resolver;
pub mod view;

pub use context::{RenderTarget, TemplateContext};
pub use loader::{FsTemplateLoader, TemplateLoader};
pub use resolver::{base_candidates, candidates_for, resolve_candidates, split_slug};
pub use view::ViewTemplate;
