//! Context types for rule execution.

use std::path::{Path, PathBuf};

use crate::boundary::ProjectBoundary;
use crate::utils::paths::DirectoryStack;

/// Display name for sources analyzed without a file identity.
pub const ANONYMOUS_SOURCE: &str = "<text>";

/// Context provided to per-file rules.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file, if the source has an identity.
    pub path: Option<&'a Path>,
    /// File contents as a string.
    pub content: &'a str,
    /// Path used in reported locations, relative to the analysis root.
    pub relative_path: PathBuf,
    /// The file's directory below the project boundary.
    ///
    /// `None` when the source has no identity or lies outside the boundary.
    pub directory: Option<DirectoryStack>,
}

impl<'a> FileContext<'a> {
    /// Creates a context for a file on disk.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path, boundary: &ProjectBoundary) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path: Some(path),
            content,
            relative_path,
            directory: boundary.locate(path),
        }
    }

    /// Creates a context for source text with no file identity.
    #[must_use]
    pub fn anonymous(content: &'a str) -> Self {
        Self {
            path: None,
            content,
            relative_path: PathBuf::from(ANONYMOUS_SOURCE),
            directory: None,
        }
    }

    /// Returns true when the source has no file identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.path.is_none()
    }
}
