//! `map` block parsing.
//!
//! A map block is a `` `map ...` `` tag line followed by zero or more
//! `` `- ...` `` sub-lines:
//!
//! ```text
//! `map id=m1 zoom=4 basemap=osm`
//! `- marker qid=Q1 layer=sites`
//! `- geojson url=rivers.json`
//! ```
//!
//! Marker lines contribute `qid[~layer]`, geojson lines `url[~layer]`.

use crate::convert::parse_attrs;
use crate::{AttributeAudit, Attributes, Include, Widget};

/// Keys understood on a sub-line.
const SUB_LINE_KEYS: &[&str] = &["marker", "qid", "geojson", "url", "layer"];

/// A parsed map block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapBlock {
    /// Attributes of the tag line.
    pub attrs: Attributes,
    /// Marker entries in source order.
    pub markers: Vec<String>,
    /// Geojson entries in source order.
    pub geojson: Vec<String>,
}

impl MapBlock {
    /// Parse a block matched in the document.
    ///
    /// Unrecognized keys of the tag line and all sub-lines are recorded once
    /// for the whole block.
    pub fn parse(block: &str, audit: &mut AttributeAudit) -> Self {
        let mut lines = block.lines();
        let head = lines.next().map(tag_line_text).unwrap_or_default();

        let mut map = Self {
            attrs: parse_attrs(head, audit),
            ..Self::default()
        };
        let mut unrecognized: Vec<String> = Widget::Map
            .unrecognized(&map.attrs)
            .map(ToOwned::to_owned)
            .collect();

        for line in lines {
            let attrs = parse_attrs(sub_line_text(line), audit);
            unrecognized.extend(
                attrs
                    .keys()
                    .filter(|k| !SUB_LINE_KEYS.contains(k))
                    .map(ToOwned::to_owned),
            );
            if attrs.contains_key("marker") {
                push_entry(&mut map.markers, &attrs, "qid");
            }
            if attrs.contains_key("geojson") {
                push_entry(&mut map.geojson, &attrs, "url");
            }
        }

        audit.record(Widget::Map.domain(), unrecognized.iter().map(String::as_str));
        map
    }

    /// Build the `map` include.
    #[must_use]
    pub fn include(&self) -> Include {
        let mut include = Widget::Map.include(&self.attrs);
        if !self.markers.is_empty() {
            include.attr("markers", self.markers.join("|"));
        }
        if !self.geojson.is_empty() {
            include.attr("geojson", self.geojson.join("|"));
        }
        include
    }
}

/// Append `<ident>[~<layer>]` when it is not empty.
///
/// A layer without an identifier yields `~<layer>`.
fn push_entry(entries: &mut Vec<String>, attrs: &Attributes, ident_key: &str) {
    let mut entry = attrs.value(ident_key).unwrap_or_default().to_owned();
    if let Some(layer) = attrs.get("layer") {
        entry.push('~');
        entry.push_str(layer.unwrap_or_default());
    }
    if !entry.is_empty() {
        entries.push(entry);
    }
}

fn unquote(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix('`').unwrap_or(line);
    line.strip_suffix('`').unwrap_or(line)
}

fn tag_line_text(line: &str) -> &str {
    let inner = unquote(line);
    inner.strip_prefix("map").unwrap_or(inner).trim()
}

fn sub_line_text(line: &str) -> &str {
    let inner = unquote(line);
    inner.strip_prefix('-').unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuditDomain;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tag_line_only() {
        let mut audit = AttributeAudit::new();
        let map = MapBlock::parse("`map id=m1 center=Q90 zoom=5`", &mut audit);
        assert_eq!(map.attrs.value("center"), Some("Q90"));
        assert!(map.markers.is_empty());
        assert_eq!(
            map.include().render(),
            r#"{% include embed/map.html id="m1" center="Q90" zoom="5" class="right" %}"#
        );
    }

    #[test]
    fn test_markers_and_geojson() {
        let mut audit = AttributeAudit::new();
        let block = "`map id=m1 zoom=4 basemap=osm`\n`- marker qid=Q1 layer=sites`\n`- geojson url=rivers.json`";
        let map = MapBlock::parse(block, &mut audit);
        assert_eq!(map.markers, vec!["Q1~sites"]);
        assert_eq!(map.geojson, vec!["rivers.json"]);
        assert_eq!(
            map.include().render(),
            r#"{% include embed/map.html id="m1" zoom="4" basemap="osm" markers="Q1~sites" geojson="rivers.json" class="right" %}"#
        );
        assert!(audit.is_empty());
    }

    #[test]
    fn test_markers_joined_in_source_order() {
        let mut audit = AttributeAudit::new();
        let block = "`map`\n`- marker qid=Q2`\n`- marker qid=Q1 layer=a`\n`- marker qid=Q3`";
        let map = MapBlock::parse(block, &mut audit);
        assert_eq!(map.markers.join("|"), "Q2|Q1~a|Q3");
    }

    #[test]
    fn test_layer_without_identifier_keeps_empty_prefix() {
        let mut audit = AttributeAudit::new();
        let block = "`map id=m`\n`- marker layer=sites`\n`- geojson layer=rivers`\n`- marker`";
        let map = MapBlock::parse(block, &mut audit);
        assert_eq!(map.markers, vec!["~sites"]);
        assert_eq!(map.geojson, vec!["~rivers"]);
    }

    #[test]
    fn test_unrecognized_keys_counted_once_per_block() {
        let mut audit = AttributeAudit::new();
        let block = "`map id=m width=3`\n`- marker qid=Q1 label=A`\n`- marker qid=Q2 label=B`";
        MapBlock::parse(block, &mut audit);
        assert_eq!(audit.count(AuditDomain::Map, "width"), 1);
        assert_eq!(audit.count(AuditDomain::Map, "label"), 1);
        assert_eq!(audit.count(AuditDomain::Map, "qid"), 0);
        assert_eq!(audit.count(AuditDomain::Image, "width"), 0);
    }

    #[test]
    fn test_crlf_lines() {
        let mut audit = AttributeAudit::new();
        let map = MapBlock::parse("`map id=m`\r\n`- marker qid=Q1`", &mut audit);
        assert_eq!(map.markers, vec!["Q1"]);
    }
}
