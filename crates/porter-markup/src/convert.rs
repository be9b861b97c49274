//! Directive to include conversion.
//!
//! Each widget has its own pattern. Widgets are applied one after another in
//! [`Widget::ALL`] order, each on the output of the previous one.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::{AttributeAudit, Attributes, MapBlock, Widget};

static IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| inline_pattern(Widget::Image.keyword()));
static IMAGE_COMPARE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| inline_pattern(Widget::ImageCompare.keyword()));
static IFRAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| inline_pattern(Widget::Iframe.keyword()));
static YOUTUBE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| inline_pattern(Widget::Youtube.keyword()));

/// Tag line at the start of a line plus directly following `` `- ...` `` lines.
static MAP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^`map(?:[ \t][^`\n]*)?`(?:\r?\n`- [^`\n]*`)*").expect("invalid map regex")
});

fn inline_pattern(keyword: &str) -> Regex {
    Regex::new(&format!(r"`{}[ \t]+([^`\n]*)`", regex::escape(keyword)))
        .expect("invalid inline directive regex")
}

fn pattern(widget: Widget) -> &'static Regex {
    match widget {
        Widget::Image => &*IMAGE_PATTERN,
        Widget::ImageCompare => &*IMAGE_COMPARE_PATTERN,
        Widget::Map => &*MAP_PATTERN,
        Widget::Iframe => &*IFRAME_PATTERN,
        Widget::Youtube => &*YOUTUBE_PATTERN,
    }
}

/// Convert every widget directive in `body` to an include string.
///
/// # Example
///
/// ```
/// use porter_markup::{convert_tags, AttributeAudit};
///
/// let mut audit = AttributeAudit::new();
/// let out = convert_tags(r#"`image src="a.jpg" caption="A cat"`"#, &mut audit);
/// assert_eq!(
///     out,
///     r#"{% include embed/image.html src="a.jpg" caption="A cat" class="right" %}"#
/// );
/// ```
#[must_use]
pub fn convert_tags(body: &str, audit: &mut AttributeAudit) -> String {
    Widget::ALL
        .into_iter()
        .fold(body.to_owned(), |text, widget| {
            convert_widget(widget, &text, audit)
        })
}

/// Convert the occurrences of a single widget kind.
#[must_use]
pub fn convert_widget(widget: Widget, body: &str, audit: &mut AttributeAudit) -> String {
    pattern(widget)
        .replace_all(body, |caps: &Captures<'_>| match widget {
            Widget::Map => MapBlock::parse(&caps[0], audit).include().render(),
            _ => {
                let attrs = parse_attrs(caps[1].trim(), audit);
                audit.record(widget.domain(), widget.unrecognized(&attrs));
                widget.include(&attrs).render()
            }
        })
        .into_owned()
}

/// Tokenize directive attributes, recording malformed text in the audit.
pub(crate) fn parse_attrs(text: &str, audit: &mut AttributeAudit) -> Attributes {
    Attributes::parse_with(text, |_| audit.record_malformed())
}
