//! Unrecognized attribute accounting.
//!
//! [`AttributeAudit`] is a batch-scoped accumulator. Converters record every
//! attribute name they do not recognize; the caller reports the totals once
//! the batch is done. Parallel workers keep their own audit and
//! [`merge`](AttributeAudit::merge) at the end.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Namespace an unrecognized attribute is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditDomain {
    /// `image`, `image-compare`, `iframe` and `youtube` directives.
    Image,
    /// `map` blocks, including their marker and geojson lines.
    Map,
}

/// Counters of unrecognized attribute names, keyed by name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeAudit {
    image: BTreeMap<String, usize>,
    map: BTreeMap<String, usize>,
    /// Directive occurrences whose attribute text had unbalanced quoting.
    malformed: usize,
}

impl AttributeAudit {
    /// Create an empty audit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the unrecognized names of one directive occurrence.
    ///
    /// Each distinct name is counted once per call, however many times it
    /// appears in the occurrence.
    pub fn record<'a>(&mut self, domain: AuditDomain, names: impl IntoIterator<Item = &'a str>) {
        let distinct: BTreeSet<&str> = names.into_iter().collect();
        let counters = self.counters_mut(domain);
        for name in distinct {
            *counters.entry(name.to_owned()).or_default() += 1;
        }
    }

    /// Record one directive occurrence with malformed attribute text.
    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    /// Count for one attribute name (0 if never seen).
    #[must_use]
    pub fn count(&self, domain: AuditDomain, name: &str) -> usize {
        self.counters(domain).get(name).copied().unwrap_or(0)
    }

    /// All counters of one domain, sorted by name.
    #[must_use]
    pub fn counters(&self, domain: AuditDomain) -> &BTreeMap<String, usize> {
        match domain {
            AuditDomain::Image => &self.image,
            AuditDomain::Map => &self.map,
        }
    }

    /// Number of occurrences with malformed attribute text.
    #[must_use]
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_empty() && self.map.is_empty() && self.malformed == 0
    }

    /// Add another audit's counts into this one.
    pub fn merge(&mut self, other: Self) {
        for (name, count) in other.image {
            *self.image.entry(name).or_default() += count;
        }
        for (name, count) in other.map {
            *self.map.entry(name).or_default() += count;
        }
        self.malformed += other.malformed;
    }

    fn counters_mut(&mut self, domain: AuditDomain) -> &mut BTreeMap<String, usize> {
        match domain {
            AuditDomain::Image => &mut self.image,
            AuditDomain::Map => &mut self.map,
        }
    }
}
