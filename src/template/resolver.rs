//! Template override cascade.
//!
//! For `slug = "table"`, `part = "footer"`, view 3, form 9, embedded in
//! post 7, candidates are tried in this order:
//!
//! - `post-7-view-3-table-footer`
//! - `post-7-table-footer`
//! - `view-3-table-footer`
//! - `form-9-table-footer`
//! - `table-footer`
//! - `table`
//!
//! The last two come from [`base_candidates`]; the resolver only prepends.

use tracing::debug;

use crate::template::TemplateContext;

/// Split a possibly directory-qualified slug into `(dir prefix, file stem)`.
///
/// `("partials/table", "body")` becomes `("partials/", "table-body")`.
/// An empty part leaves the bare slug name.
pub fn split_slug(slug: &str, part: &str) -> (String, String) {
    let (dir, name) = match slug.rsplit_once('/') {
        Some((dir, name)) if !dir.is_empty() => (format!("{}/", dir), name),
        Some((_, name)) => (String::new(), name),
        None => (String::new(), slug),
    };

    let stem = if part.is_empty() {
        name.to_string()
    } else {
        format!("{}-{}", name, part)
    };

    (dir, stem)
}

/// The loader's generic candidates: `{slug}-{part}` then `{slug}`.
pub fn base_candidates(slug: &str, part: &str) -> Vec<String> {
    let mut candidates = Vec::with_capacity(2);
    if !part.is_empty() {
        candidates.push(format!("{}-{}", slug, part));
    }
    candidates.push(slug.to_string());
    candidates
}

/// Prepend the id-specific overrides for `context` to `base`.
///
/// Entries of `base` are kept as given, after the generated ones.
pub fn resolve_candidates(context: &TemplateContext, base: Vec<String>) -> Vec<String> {
    let (dir, stem) = split_slug(&context.slug, &context.part);
    let view = context.view_id;
    let form = context.form_id;

    let mut candidates = Vec::with_capacity(base.len() + 4);

    if let Some(post) = context.embedding_post_id() {
        candidates.push(format!("{dir}post-{post}-view-{view}-{stem}"));
        candidates.push(format!("{dir}post-{post}-{stem}"));
    }
    candidates.push(format!("{dir}view-{view}-{stem}"));
    candidates.push(format!("{dir}form-{form}-{stem}"));
    candidates.extend(base);

    debug!(slug = %context.slug, part = %context.part, ?candidates, "resolved template candidates");
    candidates
}

/// [`resolve_candidates`] over the default [`base_candidates`].
pub fn candidates_for(context: &TemplateContext) -> Vec<String> {
    resolve_candidates(context, base_candidates(&context.slug, &context.part))
}
