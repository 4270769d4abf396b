//! # import-fence-js
//!
//! Tree-sitter based import boundary checks for JavaScript and TypeScript.
//!
//! Plugins are bundled from a single sources folder. This crate keeps them
//! honest about it:
//!
//! - [`NoImportFn`] (`IF001`) reports `import("...")` in statement and
//!   initializer position, since the bundler resolves it out of band.
//! - [`NoParentScopeImports`] (`IF002`) reports relative specifiers that
//!   climb above the sources folder.
//!
//! Files are parsed once with tree-sitter; every rule subscribes to the
//! node kinds it needs through a [`Visitor`].
//!
//! ## Usage
//!
//! ```no_run
//! use import_fence_js::Analyzer;
//!
//! let result = Analyzer::builder()
//!     .root("./my-plugin")
//!     .sources("src")
//!     .build()?
//!     .analyze()?;
//!
//! for violation in &result.violations {
//!     println!("{violation}");
//! }
//! # Ok::<(), import_fence_js::AnalyzerError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyzer;
pub mod reference;
pub mod rule;
pub mod rules;
pub mod syntax;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerError};
pub use reference::{ImportReference, ModuleStyles, ReferenceKind};
pub use rule::{Reporter, Rule, RuleBox};
pub use rules::{all_rules, configured_rules, NoImportFn, NoParentScopeImports};
pub use syntax::{walk, Dialect, SourceTree, Span, SyntaxError, SyntaxKind, Visitor};

/// Re-export core types for convenience.
pub use import_fence_core::{Config, LintResult, Severity, Violation};
