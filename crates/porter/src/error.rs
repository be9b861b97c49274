//! CLI error types.

use porter_config::ConfigError;
use porter_essay::{BatchError, DocumentError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("Failed to serialize audit: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}
