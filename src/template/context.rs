//! Template resolution context.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Where a view is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind", content = "post_id")]
pub enum RenderTarget {
    /// The request is the view's own page.
    #[default]
    OwnPage,
    /// The view is embedded in another post or page.
    Embedded(u64),
}

impl RenderTarget {
    /// Build a target from an optional embedding post id.
    pub fn from_post(post_id: Option<u64>) -> Self {
        post_id.map_or(RenderTarget::OwnPage, RenderTarget::Embedded)
    }

    /// The embedding post id, if any.
    pub fn embedding_post_id(self) -> Option<u64> {
        match self {
            RenderTarget::OwnPage => None,
            RenderTarget::Embedded(id) => Some(id),
        }
    }
}

/// Everything the override cascade needs to know about one template part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    /// Template family, optionally prefixed with a directory (`table`, `partials/list`).
    pub slug: String,
    /// Sub-part (`body`, `footer`); empty for the family's main file.
    pub part: String,
    /// Where the view is rendered.
    pub target: RenderTarget,
    /// View configuration id.
    pub view_id: NonZeroU64,
    /// Source form id.
    pub form_id: NonZeroU64,
}

impl TemplateContext {
    /// Create a context for a view rendered on its own page.
    pub fn new(
        slug: impl Into<String>,
        part: impl Into<String>,
        view_id: NonZeroU64,
        form_id: NonZeroU64,
    ) -> Self {
        Self {
            slug: slug.into(),
            part: part.into(),
            target: RenderTarget::OwnPage,
            view_id,
            form_id,
        }
    }

    /// Mark the view as embedded in `post_id`.
    pub fn embedded_in(mut self, post_id: u64) -> Self {
        self.target = RenderTarget::Embedded(post_id);
        self
    }

    /// Set the render target.
    pub fn with_target(mut self, target: RenderTarget) -> Self {
        self.target = target;
        self
    }

    /// The embedding post id, if any.
    pub fn embedding_post_id(&self) -> Option<u64> {
        self.target.embedding_post_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    #[test]
    fn test_default_target_is_own_page() {
        let ctx = TemplateContext::new("table", "body", id(3), id(9));
        assert_eq!(ctx.target, RenderTarget::OwnPage);
        assert_eq!(ctx.embedding_post_id(), None);
    }

    #[test]
    fn test_embedded_in() {
        let ctx = TemplateContext::new("table", "body", id(3), id(9)).embedded_in(7);
        assert_eq!(ctx.embedding_post_id(), Some(7));
    }

    #[test]
    fn test_from_post() {
        assert_eq!(RenderTarget::from_post(None), RenderTarget::OwnPage);
        assert_eq!(RenderTarget::from_post(Some(4)), RenderTarget::Embedded(4));
    }

    #[test]
    fn test_zero_ids_are_rejected_by_serde() {
        let json = r#"{"slug":"table","part":"body","target":{"kind":"own_page"},"view_id":0,"form_id":9}"#;
        assert!(serde_json::from_str::<TemplateContext>(json).is_err());
    }

    #[test]
    fn test_context_json_shape() {
        let ctx = TemplateContext::new("list", "footer", id(1), id(2)).embedded_in(5);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["target"]["kind"], "embedded");
        assert_eq!(json["target"]["post_id"], 5);
    }
}
