//! Rule to forbid relative imports that climb out of the sources folder.
//!
//! # Rationale
//!
//! A plugin may only ship what lives under its sources folder. A relative
//! specifier such as `../package.json` reaches outside it and drags
//! arbitrary files into the bundle.
//!
//! # Algorithm
//!
//! The file's directory below the boundary is kept as a
//! [`DirectoryStack`]. Each relative specifier is replayed against a fresh
//! copy: `..` pops, `.` is skipped, anything else is pushed. The first `..`
//! applied to an empty stack is reported and the rest of that specifier is
//! ignored.
//!
//! # Detected Patterns
//!
//! - `import x from "../x"`, `import "../x"`, `export * from "../x"`
//! - `import("../x")`
//! - `require("../x")`
//! - AMD `define(["../x"], fn)` when the `amd` style is on
//!
//! # Configuration
//!
//! Module styles are forwarded from the rule block: `esmodule`,
//! `commonjs`, `amd`, `ignore`. `ignore` only filters the style-governed
//! references; `require("...")` calls are always checked.
//!
//! # Suppression
//!
//! - `// import-fence: allow(no-parent-scope-imports) reason="..."` comment

use import_fence_core::utils::is_relative_specifier;
use import_fence_core::{DirectoryStack, FileContext, Severity, Violation};
use regex::Regex;
use tracing::debug;
use tree_sitter::Node;

use crate::reference::{module_references, require_reference, ImportReference, ModuleStyles};
use crate::rule::{Reporter, Rule};
use crate::syntax::{walk, SourceTree, SyntaxKind, Visitor};

/// Rule code for no-parent-scope-imports.
pub const CODE: &str = "IF002";

/// Rule name for no-parent-scope-imports.
pub const NAME: &str = "no-parent-scope-imports";

/// Message reported for every reference that escapes the boundary.
pub const MESSAGE: &str = "relative imports outside of the sources folder is not allowed";

/// Forbids relative references that resolve above the project boundary.
#[derive(Debug, Clone)]
pub struct NoParentScopeImports {
    /// Module styles forwarded to the reference matchers.
    pub styles: ModuleStyles,
    /// Custom severity.
    pub severity: Severity,
    ignore: Vec<Regex>,
}

impl Default for NoParentScopeImports {
    fn default() -> Self {
        Self::new()
    }
}

impl NoParentScopeImports {
    /// Creates a new rule with the default module styles.
    #[must_use]
    pub fn new() -> Self {
        Self {
            styles: ModuleStyles::default(),
            severity: Severity::Error,
            ignore: Vec::new(),
        }
    }

    /// Creates a rule using the given module styles.
    ///
    /// # Errors
    ///
    /// Returns an error if an `ignore` expression is not a valid regex.
    pub fn with_styles(styles: ModuleStyles) -> Result<Self, regex::Error> {
        let ignore = styles.compile_ignore()?;
        Ok(Self {
            styles,
            severity: Severity::Error,
            ignore,
        })
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn is_ignored(&self, specifier: &str) -> bool {
        self.ignore.iter().any(|re| re.is_match(specifier))
    }
}

impl Rule for NoParentScopeImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids relative imports of files outside of the sources folder"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>, tree: &SourceTree<'_>) -> Vec<Violation> {
        let Some(base) = ctx.directory.as_ref() else {
            if ctx.is_anonymous() {
                debug!("{NAME}: source has no file identity, skipping");
            } else {
                debug!(
                    "{NAME}: {} is outside the boundary, skipping",
                    ctx.relative_path.display()
                );
            }
            return Vec::new();
        };

        let mut visitor = ParentScopeVisitor {
            rule: self,
            tree,
            base,
            reporter: Reporter::new(ctx, self),
        };
        walk(tree, &mut visitor);
        visitor.reporter.finish()
    }
}

struct ParentScopeVisitor<'a, 'src> {
    rule: &'a NoParentScopeImports,
    tree: &'a SourceTree<'src>,
    base: &'a DirectoryStack,
    reporter: Reporter<'a, NoParentScopeImports>,
}

impl ParentScopeVisitor<'_, '_> {
    fn reconstruct(&mut self, reference: &ImportReference<'_>) {
        let specifier = reference.specifier.as_ref();
        if !is_relative_specifier(specifier) {
            return;
        }

        if let Err(escape) = self.base.resolve(specifier) {
            debug!(
                "{NAME}: '{}' ({:?}) escapes at segment {} from '{}'",
                specifier, reference.kind, escape.segment, self.base
            );
            self.reporter.report(
                reference.span,
                MESSAGE,
                "Move the referenced file under the sources folder",
            );
        }
    }
}

impl<'tree> Visitor<'tree> for ParentScopeVisitor<'_, '_> {
    fn visit(&mut self, kind: SyntaxKind, node: Node<'tree>) {
        if !matches!(
            kind,
            SyntaxKind::ImportDeclaration | SyntaxKind::ExportDeclaration | SyntaxKind::CallExpression
        ) {
            return;
        }

        // `ignore` belongs to the style-governed matchers only.
        let mut references: Vec<_> = module_references(kind, &node, self.tree, &self.rule.styles)
            .into_iter()
            .filter(|r| !self.rule.is_ignored(&r.specifier))
            .collect();
        references.extend(require_reference(&node, self.tree));
        for reference in &references {
            self.reconstruct(reference);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Dialect;

    fn check_in(dir: &[&str], code: &str) -> Vec<Violation> {
        check_with(NoParentScopeImports::new(), dir, code)
    }

    fn check_with(rule: NoParentScopeImports, dir: &[&str], code: &str) -> Vec<Violation> {
        let tree = SourceTree::parse(code, Dialect::JavaScript).expect("Failed to parse");
        let mut ctx = FileContext::anonymous(code);
        ctx.relative_path = "src/file.js".into();
        ctx.directory = DirectoryStack::from_segments(dir);
        rule.check(&ctx, &tree)
    }

    #[test]
    fn static_import_escaping_root_directory() {
        let violations = check_in(&[], "import pkg from \"../package.json\";\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].message, MESSAGE);
        // Reported on the specifier literal.
        assert_eq!(violations[0].location.column, 17);
    }

    #[test]
    fn require_escaping_root_directory() {
        let violations = check_in(&[], "const pkg = require(\"../package.json\");\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, MESSAGE);
        // Reported on the call.
        assert_eq!(violations[0].location.column, 13);
    }

    #[test]
    fn climbing_within_bounds_is_fine() {
        let violations = check_in(
            &["a", "b"],
            "import c from '../../c';\nimport d from '../d';\nimport e from './e';\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn one_violation_per_reference() {
        let violations = check_in(&["a"], "import c from '../../../../c';\n");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn each_reference_starts_from_the_file_directory() {
        // A previous import's target must not shift the base for the next one.
        let violations = check_in(
            &["a"],
            "import x from './deep/deeper/x';\nimport y from '../../y';\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn dot_only_specifiers_never_violate() {
        assert!(check_in(&[], "import a from '.';\nimport b from './.';\n").is_empty());
    }

    #[test]
    fn bare_and_absolute_specifiers_are_skipped() {
        let violations = check_in(
            &[],
            "import React from 'react';\nimport fp from 'lodash/../../fp';\nimport abs from '/etc/x';\n",
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn re_exports_and_dynamic_imports_are_checked() {
        let violations = check_in(
            &[],
            "export * from '../a';\nexport { b } from '../b';\nimport('../c');\n",
        );
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn computed_specifiers_are_skipped() {
        let violations = check_in(&[], "require(path);\nrequire(`../x`);\n");
        assert!(violations.is_empty());
    }

    #[test]
    fn no_directory_means_no_work() {
        let code = "import pkg from '../package.json';\nrequire('../../x');\n";
        let tree = SourceTree::parse(code, Dialect::JavaScript).unwrap();
        let violations = NoParentScopeImports::new().check(&FileContext::anonymous(code), &tree);
        assert!(violations.is_empty());
    }

    #[test]
    fn esmodule_off_still_checks_require() {
        let styles = ModuleStyles {
            esmodule: false,
            ..ModuleStyles::default()
        };
        let rule = NoParentScopeImports::with_styles(styles).unwrap();
        let violations = check_with(
            rule,
            &[],
            "import a from '../a';\nconst b = require('../b');\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 2);
    }

    #[test]
    fn commonjs_style_reports_require_once() {
        let styles = ModuleStyles {
            commonjs: true,
            ..ModuleStyles::default()
        };
        let rule = NoParentScopeImports::with_styles(styles).unwrap();
        assert_eq!(check_with(rule, &[], "require('../a');\n").len(), 1);
    }

    #[test]
    fn amd_dependencies_when_enabled() {
        let styles = ModuleStyles {
            amd: true,
            ..ModuleStyles::default()
        };
        let rule = NoParentScopeImports::with_styles(styles).unwrap();
        let violations = check_with(
            rule,
            &["widgets"],
            "define(['require', '../ok', '../../bad'], function (require) {});\n",
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, 29);
    }

    #[test]
    fn ignore_patterns_skip_matching_specifiers() {
        let styles = ModuleStyles {
            ignore: vec![r"\.json$".to_string()],
            ..ModuleStyles::default()
        };
        let rule = NoParentScopeImports::with_styles(styles).unwrap();
        let violations = check_with(
            rule,
            &[],
            "import pkg from '../package.json';\nimport x from '../x.js';\nrequire('../package.json');\n",
        );
        let lines: Vec<usize> = violations.iter().map(|v| v.location.line).collect();
        // The require call is not subject to `ignore`.
        assert_eq!(lines, [2, 3]);
    }

    #[test]
    fn severity_is_configurable() {
        let rule = NoParentScopeImports::new().severity(Severity::Warning);
        let violations = check_with(rule, &[], "import '../x';\n");
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn windows_separators_are_understood() {
        let violations = check_in(&["a"], "import x from '..\\\\..\\\\x';\n");
        assert_eq!(violations.len(), 1);
    }
}
