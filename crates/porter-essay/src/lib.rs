//! Essay pipeline for Porter.
//!
//! [`convert_document`] turns one essay source into a post. [`Batch`] walks
//! an essay tree with the [`Scanner`], dates each post through a
//! [`CreationDate`] provider, and writes `<date>-<name>.md` files.

mod batch;
mod date;
mod document;
mod error;
mod scanner;

pub use batch::{Batch, BatchConfig, BatchReport, Converted, Failed, Outcome};
pub use date::{BirthTime, CreationDate, FixedDate};
pub use document::{ConvertOptions, convert_document, post_stem};
pub use error::{BatchError, DocumentError};
pub use scanner::{EssayRef, Scanner};
