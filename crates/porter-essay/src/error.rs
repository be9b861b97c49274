use std::io;
use std::path::PathBuf;

use porter_frontmatter::FrontMatterError;

/// Error converting a single document.
///
/// The batch runner logs these per document and moves on.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    FrontMatter(#[from] FrontMatterError),
    /// The header directive has no `img`, so `image.path` cannot be set.
    #[error("header directive has no `img` attribute")]
    MissingHeaderImage,
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read creation date of {}: {source}", path.display())]
    CreationDate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error that stops a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
