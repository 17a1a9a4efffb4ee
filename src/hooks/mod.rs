//! Extension points.
//!
//! Values pass through ordered, named filter chains at a few well-known
//! points so callers can adjust template candidates or an actor's
//! capabilities without touching the core.

pub mod filter;

pub use filter::{FilterChain, Filters};

/// Template candidate list, after the id-specific overrides were prepended.
pub const TEMPLATE_CANDIDATES: &str = "template_candidates";

/// An actor's granted capabilities, before lookups.
pub const USER_CAPABILITIES: &str = "user_capabilities";
