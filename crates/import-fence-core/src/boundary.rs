//! The project boundary: the directory relative imports must stay inside.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::utils::paths::DirectoryStack;

/// Default name of the sources folder below the analysis root.
pub const DEFAULT_SOURCES_DIR: &str = "src";

/// Absolute directory below which every relative import must resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectBoundary {
    root: PathBuf,
}

impl ProjectBoundary {
    /// Creates a boundary at `root`.
    ///
    /// Relative paths are made absolute against the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(Self {
            root: normalize(&root),
        })
    }

    /// Boundary at `<current dir>/<sources>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be determined.
    pub fn from_current_dir(sources: impl AsRef<Path>) -> std::io::Result<Self> {
        Self::new(std::env::current_dir()?.join(sources))
    }

    /// The boundary directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory stack of `module`, or `None` if it lies outside the boundary.
    ///
    /// Relative module paths are taken relative to the current directory.
    #[must_use]
    pub fn locate(&self, module: &Path) -> Option<DirectoryStack> {
        let module = if module.is_absolute() {
            normalize(module)
        } else {
            normalize(&std::env::current_dir().ok()?.join(module))
        };
        let directory = DirectoryStack::for_module(&self.root, &module);
        if directory.is_none() {
            debug!(
                "{} is outside the boundary {}",
                module.display(),
                self.root.display()
            );
        }
        directory
    }
}

/// Lexically removes `.` components and folds `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
