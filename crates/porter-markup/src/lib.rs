//! Directive conversion engine for Porter.
//!
//! Turns the backtick directives of the essay dialect into templating
//! includes:
//!
//! ```text
//! `image src="a.jpg" caption="A cat"`
//! ```
//!
//! becomes
//!
//! ```text
//! {% include embed/image.html src="a.jpg" caption="A cat" class="right" %}
//! ```
//!
//! # Components
//!
//! - [`Attributes`]: shell-quoted attribute tokenizer with a whitespace fallback
//! - [`extract_header`]: removes the `header` directive, parsed with the
//!   permissive [`scan_pairs`] scanner
//! - [`Widget`] / [`MapBlock`]: recognized attribute tables and include building
//! - [`convert_tags`]: applies every widget to a document body
//! - [`AttributeAudit`]: counts of unrecognized attribute names
//! - [`normalize`]: blank line and heading cleanup
//! - [`rewrite_root_links`]: optional `{{ site.baseurl }}` link prefixing

mod attrs;
mod audit;
mod convert;
mod header;
mod links;
mod map;
mod normalize;
mod widget;

pub use attrs::{Attributes, TokenizeError};
pub use audit::{AttributeAudit, AuditDomain};
pub use convert::{convert_tags, convert_widget};
pub use header::{extract_header, scan_pairs};
pub use links::rewrite_root_links;
pub use map::MapBlock;
pub use normalize::normalize;
pub use widget::{Include, Widget};
