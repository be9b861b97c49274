//! `header` directive extraction.
//!
//! The header is parsed with a permissive `key=value` scanner rather than the
//! attribute tokenizer: pairs are picked up wherever they appear, so stray
//! quotes or directive-like text inside the header do not derail parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::Attributes;

static HEADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`header[ \t]+([^`\n]*)`").expect("invalid header regex"));

static PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'`]+))"#)
        .expect("invalid header pair regex")
});

/// Remove the first `header` directive from `body` and return its attributes.
///
/// Returns an empty map and the unchanged body when there is no header.
///
/// # Example
///
/// ```
/// use porter_markup::extract_header;
///
/// let (attrs, body) = extract_header("`header title=\"On Tea\" img=tea.jpg`\nText");
/// assert_eq!(attrs.value("img"), Some("tea.jpg"));
/// assert_eq!(body, "\nText");
/// ```
#[must_use]
pub fn extract_header(body: &str) -> (Attributes, String) {
    let Some(caps) = HEADER_PATTERN.captures(body) else {
        return (Attributes::default(), body.to_owned());
    };
    let span = caps.get(0).map_or(0..0, |m| m.range());
    let attrs = scan_pairs(caps.get(1).map_or("", |m| m.as_str()));

    let mut rest = String::with_capacity(body.len() - span.len());
    rest.push_str(&body[..span.start]);
    rest.push_str(&body[span.end..]);
    (attrs, rest)
}

/// Scan `key=value` pairs anywhere in `text`.
///
/// Supports `key="value"`, `key='value'` and `key=value`. Anything that is
/// not a pair is ignored.
#[must_use]
pub fn scan_pairs(text: &str) -> Attributes {
    let mut attrs = Attributes::default();
    for caps in PAIR_PATTERN.captures_iter(text) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attrs.insert(&caps[1], Some(value.to_owned()));
    }
    attrs
}
