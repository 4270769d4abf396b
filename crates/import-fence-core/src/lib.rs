//! # import-fence-core
//!
//! Language-agnostic building blocks for import boundary linting.
//!
//! This crate provides:
//!
//! - [`Violation`], [`Location`] and [`LintResult`] for representing findings
//! - [`Config`] for the `import-fence.toml` configuration file
//! - [`ProjectBoundary`] and [`DirectoryStack`] for the path algebra that
//!   decides whether a relative specifier climbs out of the sources folder
//! - [`FileContext`] describing one analyzed source
//!
//! ## Example
//!
//! ```
//! use import_fence_core::DirectoryStack;
//!
//! let dir = DirectoryStack::from_segments(["a", "b"]).unwrap();
//! assert_eq!(dir.resolve("../../c").unwrap().segments(), ["c"]);
//! assert!(DirectoryStack::new().resolve("../x").is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod boundary;
mod config;
mod context;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use boundary::{ProjectBoundary, DEFAULT_SOURCES_DIR};
pub use config::{AnalyzerConfig, Config, ConfigError, RuleConfig};
pub use context::{FileContext, ANONYMOUS_SOURCE};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
pub use utils::allowance::AllowCheck;
pub use utils::paths::{BoundaryEscape, DirectoryStack};
