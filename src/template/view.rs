//! View templates.
//!
//! A [`ViewTemplate`] belongs to one view and resolves its template parts
//! through the override cascade, the `template_candidates` filters and a
//! loader.

use std::num::NonZeroU64;
use std::path::PathBuf;

use crate::hooks::{Filters, TEMPLATE_CANDIDATES};
use crate::template::{base_candidates, resolve_candidates, RenderTarget, TemplateContext, TemplateLoader};

/// Template resolution bound to a single view.
pub struct ViewTemplate<'a, L: TemplateLoader> {
    view_id: NonZeroU64,
    form_id: NonZeroU64,
    loader: &'a L,
    filters: Option<&'a Filters<Vec<String>>>,
}

impl<'a, L: TemplateLoader> ViewTemplate<'a, L> {
    /// Create a template for a view over its source form.
    pub fn new(view_id: NonZeroU64, form_id: NonZeroU64, loader: &'a L) -> Self {
        Self {
            view_id,
            form_id,
            loader,
            filters: None,
        }
    }

    /// Run candidate lists through `filters` before locating.
    pub fn with_filters(mut self, filters: &'a Filters<Vec<String>>) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Context for one part of `slug`.
    pub fn context(&self, slug: &str, part: &str, target: RenderTarget) -> TemplateContext {
        TemplateContext::new(slug, part, self.view_id, self.form_id).with_target(target)
    }

    /// Ordered candidates for one part, after filters.
    pub fn candidates(&self, slug: &str, part: &str, target: RenderTarget) -> Vec<String> {
        let context = self.context(slug, part, target);
        let candidates = resolve_candidates(&context, base_candidates(slug, part));
        match self.filters {
            Some(filters) => filters.apply_filters(TEMPLATE_CANDIDATES, candidates),
            None => candidates,
        }
    }

    /// The most specific existing template file for one part.
    pub fn locate(&self, slug: &str, part: &str, target: RenderTarget) -> Option<PathBuf> {
        self.loader.locate(&self.candidates(slug, part, target))
    }
}
