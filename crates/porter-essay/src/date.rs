//! Creation dates for destination filenames.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Local};

/// Supplies the `YYYY-MM-DD` date prefix of a converted essay.
pub trait CreationDate: Send + Sync {
    /// Date for the essay stored in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the date cannot be determined.
    fn creation_date(&self, dir: &Path) -> io::Result<String>;
}

/// Filesystem birth time of the essay directory, in local time.
///
/// Falls back to the modification time on filesystems without birth times.
#[derive(Debug, Clone, Copy, Default)]
pub struct BirthTime;

impl CreationDate for BirthTime {
    fn creation_date(&self, dir: &Path) -> io::Result<String> {
        let meta = fs::metadata(dir)?;
        let time = meta.created().or_else(|e| {
            tracing::debug!(
                dir = %dir.display(),
                error = %e,
                "Birth time unavailable, using modification time"
            );
            meta.modified()
        })?;
        Ok(DateTime::<Local>::from(time).format("%Y-%m-%d").to_string())
    }
}

/// The same date for every essay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDate(pub String);

impl FixedDate {
    #[must_use]
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }
}

impl CreationDate for FixedDate {
    fn creation_date(&self, _dir: &Path) -> io::Result<String> {
        Ok(self.0.clone())
    }
}
