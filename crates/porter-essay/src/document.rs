//! Single-document conversion.

use porter_frontmatter::split;
use porter_markup::{
    AttributeAudit, convert_tags, extract_header, normalize, rewrite_root_links,
};

use crate::DocumentError;

/// Options shared by every document of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Prefix of the injected `media_subpath`, e.g. `/assets/posts`.
    pub media_subpath_prefix: String,
    /// Prefix root-relative links with `{{ site.baseurl }}`.
    pub rewrite_links: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            media_subpath_prefix: "/assets/posts".to_owned(),
            rewrite_links: false,
        }
    }
}

/// Destination stem of an essay: `<date>-<name>`.
#[must_use]
pub fn post_stem(date: &str, name: &str) -> String {
    format!("{date}-{name}")
}

/// Convert one essay source into a post.
///
/// `stem` is the destination filename without extension; it becomes the last
/// segment of `media_subpath`. The header directive is removed and its `img`
/// becomes `image.path`. All other directives are converted, the body is
/// normalized, and the front matter is written back with the two injected
/// keys.
///
/// # Errors
///
/// Returns an error if the front matter is invalid or the header directive
/// has no `img`.
pub fn convert_document(
    source: &str,
    stem: &str,
    options: &ConvertOptions,
    audit: &mut AttributeAudit,
) -> Result<String, DocumentError> {
    let (mut front_matter, body) = split(source)?;
    let (header, body) = extract_header(body);
    let image = header
        .value("img")
        .ok_or(DocumentError::MissingHeaderImage)?;

    let body = normalize(&convert_tags(&body, audit));
    let body = if options.rewrite_links {
        rewrite_root_links(&body)
    } else {
        body
    };

    let prefix = options.media_subpath_prefix.trim_end_matches('/');
    front_matter.insert("media_subpath", format!("{prefix}/{stem}"));
    front_matter.insert_path(&["image", "path"], image);
    Ok(front_matter.render(&body)?)
}
