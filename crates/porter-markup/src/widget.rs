//! Widget directive table and include builder.
//!
//! Every directive kind is a [`Widget`] variant with a fixed table of
//! recognized attributes. The table drives [`Widget::include`], the single
//! routine that turns parsed attributes into an include string.

use crate::{Attributes, AuditDomain};

/// A recognized attribute and the name it is emitted under.
#[derive(Debug, Clone, Copy)]
struct Field {
    key: &'static str,
    output: &'static str,
}

const fn field(key: &'static str) -> Field {
    Field { key, output: key }
}

const fn renamed(key: &'static str, output: &'static str) -> Field {
    Field { key, output }
}

const IMAGE_FIELDS: &[Field] = &[
    field("id"),
    field("src"),
    field("manifest"),
    field("seq"),
    field("caption"),
    field("attribution"),
    field("description"),
    field("label"),
    field("license"),
    field("source"),
    field("cover"),
    field("region"),
    field("rotation"),
    field("aspect"),
];

const IMAGE_COMPARE_FIELDS: &[Field] = &[
    field("id"),
    field("before"),
    field("after"),
    field("caption"),
    field("aspect"),
];

const MAP_FIELDS: &[Field] = &[
    field("id"),
    field("center"),
    field("zoom"),
    field("basemap"),
    renamed("basemaps", "basemap"),
    field("caption"),
    field("aspect"),
];

const IFRAME_FIELDS: &[Field] = &[
    field("id"),
    field("src"),
    field("caption"),
    field("aspect"),
];

const YOUTUBE_FIELDS: &[Field] = &[
    field("id"),
    renamed("vid", "id"),
    field("caption"),
    field("aspect"),
];

/// When a recognized attribute is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    /// Whenever the key is present. Bare flags emit an empty value.
    Present,
    /// Only when the key has a non-empty value.
    NonEmpty,
}

/// Directive kinds converted to includes, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    /// `` `image ...` ``
    Image,
    /// `` `image-compare ...` ``
    ImageCompare,
    /// `` `map ...` `` with optional `` `- ...` `` lines.
    Map,
    /// `` `iframe ...` ``
    Iframe,
    /// `` `youtube ...` ``
    Youtube,
}

impl Widget {
    /// All widgets in the order they are applied to a document.
    pub const ALL: [Self; 5] = [
        Self::Image,
        Self::ImageCompare,
        Self::Map,
        Self::Iframe,
        Self::Youtube,
    ];

    /// Directive keyword, also used as the include template name.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::ImageCompare => "image-compare",
            Self::Map => "map",
            Self::Iframe => "iframe",
            Self::Youtube => "youtube",
        }
    }

    /// Audit namespace for unrecognized attributes.
    #[must_use]
    pub fn domain(self) -> AuditDomain {
        match self {
            Self::Map => AuditDomain::Map,
            _ => AuditDomain::Image,
        }
    }

    /// Whether `key` is understood by this widget.
    ///
    /// `#id` shorthand keys are always recognized.
    #[must_use]
    pub fn recognizes(self, key: &str) -> bool {
        key.starts_with('#') || self.fields().iter().any(|f| f.key == key)
    }

    /// Keys of `attrs` this widget does not recognize, in source order.
    pub fn unrecognized(self, attrs: &Attributes) -> impl Iterator<Item = &str> {
        attrs.keys().filter(move |k| !self.recognizes(k))
    }

    /// Build the include for `attrs`.
    ///
    /// Shorthand ids come first, then recognized attributes in the widget's
    /// canonical order. Source order is not preserved.
    #[must_use]
    pub fn include(self, attrs: &Attributes) -> Include {
        let mut include = Include::new(self.keyword());
        for id in attrs.shorthand_ids() {
            if self.emit() == Emit::Present || !id.is_empty() {
                include.attr("id", id);
            }
        }
        for field in self.fields() {
            match (attrs.get(field.key), self.emit()) {
                (Some(value), Emit::Present) => include.attr(field.output, value.unwrap_or("")),
                (Some(Some(value)), Emit::NonEmpty) if !value.is_empty() => {
                    include.attr(field.output, value);
                }
                _ => {}
            }
        }
        include
    }

    fn fields(self) -> &'static [Field] {
        match self {
            Self::Image => IMAGE_FIELDS,
            Self::ImageCompare => IMAGE_COMPARE_FIELDS,
            Self::Map => MAP_FIELDS,
            Self::Iframe => IFRAME_FIELDS,
            Self::Youtube => YOUTUBE_FIELDS,
        }
    }

    fn emit(self) -> Emit {
        match self {
            Self::Image | Self::Map => Emit::Present,
            Self::ImageCompare | Self::Iframe | Self::Youtube => Emit::NonEmpty,
        }
    }
}

/// An include string under construction.
///
/// Renders as `{% include embed/<template>.html k="v" ... class="right" %}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    template: &'static str,
    attrs: Vec<(&'static str, String)>,
}

impl Include {
    /// Start an include for the given template name.
    #[must_use]
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            attrs: Vec::new(),
        }
    }

    /// Append an attribute. Duplicate names are kept.
    pub fn attr(&mut self, name: &'static str, value: impl Into<String>) {
        self.attrs.push((name, value.into()));
    }

    /// Render the include tag.
    #[must_use]
    pub fn render(&self) -> String {
        let mut tag = format!("{{% include embed/{}.html ", self.template);
        for (name, value) in &self.attrs {
            tag.push_str(&format!(r#"{name}="{value}" "#));
        }
        tag.push_str(r#"class="right" %}"#);
        tag
    }
}
