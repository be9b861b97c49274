//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod preview;

pub(crate) use convert::ConvertArgs;
pub(crate) use preview::PreviewArgs;

use chrono::NaiveDate;

use crate::error::CliError;

/// Check a `--date` override is a `YYYY-MM-DD` calendar date.
fn validate_date(date: &str) -> Result<(), CliError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|e| CliError::Validation(format!("Invalid --date {date:?}: {e}")))
}
