//! Essay discovery by filesystem walking.
//!
//! An essay is a leaf directory: it holds the body file and no visible
//! subdirectories. Hidden entries (leading `.`) are ignored everywhere.

use std::fs;
use std::path::{Path, PathBuf};

/// Location of one essay. No content is read at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EssayRef {
    /// Directory name, used in the destination filename.
    pub name: String,
    /// The essay directory.
    pub dir: PathBuf,
    /// The body file inside `dir`.
    pub body_path: PathBuf,
}

/// Finds essays under a source directory.
pub struct Scanner {
    source_dir: PathBuf,
    body_filename: String,
}

impl Scanner {
    /// Create a new Scanner.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root directory to scan
    /// * `body_filename` - Name of the essay body file (e.g., "index.md")
    #[must_use]
    pub fn new(source_dir: PathBuf, body_filename: String) -> Self {
        Self {
            source_dir,
            body_filename,
        }
    }

    /// Scan the filesystem and return essays sorted by path.
    ///
    /// Returns an empty Vec if the source directory doesn't exist.
    #[must_use]
    pub fn scan(&self) -> Vec<EssayRef> {
        let mut refs = Vec::new();
        if self.source_dir.is_dir() {
            self.scan_directory(&self.source_dir, &mut refs);
        }
        refs
    }

    fn scan_directory(&self, dir_path: &Path, refs: &mut Vec<EssayRef>) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir_path.display(), error = %e, "Failed to read directory");
                return;
            }
        };

        // Cache file_type to avoid repeated stat calls
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e, is_dir)
            })
            .collect();
        entries.sort_by_key(|(e, _)| e.file_name());

        let mut body_path = None;
        let mut subdirs = Vec::new();
        for (entry, is_dir) in entries {
            if is_dir {
                subdirs.push(entry.path());
            } else if entry.file_name().to_string_lossy() == self.body_filename {
                body_path = Some(entry.path());
            }
        }

        if subdirs.is_empty() {
            if let Some(body_path) = body_path {
                refs.push(EssayRef {
                    name: essay_name(dir_path),
                    dir: dir_path.to_path_buf(),
                    body_path,
                });
            }
            return;
        }
        for subdir in &subdirs {
            self.scan_directory(subdir, refs);
        }
    }
}

fn essay_name(dir: &Path) -> String {
    dir.file_name()
        .map_or_else(|| "index".to_owned(), |n| n.to_string_lossy().into_owned())
}
