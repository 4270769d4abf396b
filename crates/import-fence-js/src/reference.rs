//! Classification of import-like nodes into [`ImportReference`]s.
//!
//! Two matchers feed the boundary check:
//!
//! - [`module_references`] covers the module styles selected by
//!   [`ModuleStyles`]: ES module declarations and `import()` calls, plus
//!   AMD `require`/`define` dependency arrays.
//! - [`require_reference`] is the dedicated CommonJS matcher. It always
//!   applies, whatever the styles say.
//!
//! Both produce the same [`ImportReference`] shape so the segment replay
//! lives in one place.

use std::borrow::Cow;

use import_fence_core::RuleConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::syntax::{is_dynamic_import, named_children, SourceTree, Span, SyntaxKind};

/// Syntactic form a reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    /// `import ... from "x"` or `import "x"`.
    Import,
    /// `export ... from "x"`.
    ReExport,
    /// `import("x")`.
    DynamicImport,
    /// `require("x")`, or `import x = require("x")` in TypeScript.
    Require,
    /// An element of an AMD `require([...], fn)` / `define([...], fn)` array.
    AmdDependency,
}

/// One literal module specifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference<'src> {
    /// Specifier value, quotes removed and escapes decoded.
    pub specifier: Cow<'src, str>,
    /// Form the reference was written in.
    pub kind: ReferenceKind,
    /// Where to report findings about this reference.
    pub span: Span,
}

/// Module styles the reference matchers consider import-like.
///
/// Read from the options of the `no-parent-scope-imports` rule block and
/// passed through to the matchers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStyles {
    /// ES module declarations and `import()` (default: on).
    #[serde(default = "default_true")]
    pub esmodule: bool,
    /// Single-argument `require("x")` calls.
    #[serde(default)]
    pub commonjs: bool,
    /// AMD `require([...], fn)` / `define([...], fn)`.
    #[serde(default)]
    pub amd: bool,
    /// Regular expressions; matching specifiers are skipped.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for ModuleStyles {
    fn default() -> Self {
        Self {
            esmodule: true,
            commonjs: false,
            amd: false,
            ignore: Vec::new(),
        }
    }
}

impl ModuleStyles {
    /// Reads the styles from a rule configuration block.
    #[must_use]
    pub fn from_rule_config(config: &RuleConfig) -> Self {
        let defaults = Self::default();
        Self {
            esmodule: config.get_bool("esmodule").unwrap_or(defaults.esmodule),
            commonjs: config.get_bool("commonjs").unwrap_or(defaults.commonjs),
            amd: config.get_bool("amd").unwrap_or(defaults.amd),
            ignore: config.get_str_array("ignore"),
        }
    }

    /// Compiles the `ignore` expressions.
    ///
    /// # Errors
    ///
    /// Returns the first expression that fails to compile.
    pub fn compile_ignore(&self) -> Result<Vec<Regex>, regex::Error> {
        self.ignore.iter().map(|p| Regex::new(p)).collect()
    }
}

/// References found by the style-governed matchers on one node.
#[must_use]
pub fn module_references<'src>(
    kind: SyntaxKind,
    node: &Node<'_>,
    tree: &SourceTree<'src>,
    styles: &ModuleStyles,
) -> Vec<ImportReference<'src>> {
    let mut found = Vec::new();
    match kind {
        SyntaxKind::ImportDeclaration if styles.esmodule => {
            found.extend(source_reference(node, tree, ReferenceKind::Import));
        }
        SyntaxKind::ExportDeclaration if styles.esmodule => {
            found.extend(source_reference(node, tree, ReferenceKind::ReExport));
        }
        SyntaxKind::CallExpression => {
            if styles.esmodule {
                found.extend(dynamic_import_reference(node, tree));
            }
            // Single-argument `require` calls are always picked up by
            // `require_reference`; the commonjs style adds nothing on top.
            if styles.amd {
                found.extend(amd_references(node, tree));
            }
        }
        _ => {}
    }
    found
}

/// The CommonJS reference on `node`, if it is one.
///
/// Matches calls whose callee is the identifier `require` and whose first
/// argument is a string literal, and TypeScript `import x = require("x")`.
#[must_use]
pub fn require_reference<'src>(
    node: &Node<'_>,
    tree: &SourceTree<'src>,
) -> Option<ImportReference<'src>> {
    match node.kind() {
        "call_expression" => {
            let callee = node.child_by_field_name("function")?;
            if callee.kind() != "identifier" || tree.text(&callee) != "require" {
                return None;
            }
            let first = call_arguments(node)?.into_iter().next()?;
            Some(ImportReference {
                specifier: tree.string_value(&first)?,
                kind: ReferenceKind::Require,
                span: Span::of(node),
            })
        }
        "import_statement" => {
            let clause = named_children(node)
                .into_iter()
                .find(|c| c.kind() == "import_require_clause")?;
            let source = clause.child_by_field_name("source").or_else(|| {
                named_children(&clause)
                    .into_iter()
                    .find(|c| c.kind() == "string")
            })?;
            Some(ImportReference {
                specifier: tree.string_value(&source)?,
                kind: ReferenceKind::Require,
                span: Span::of(&source),
            })
        }
        _ => None,
    }
}

fn source_reference<'src>(
    node: &Node<'_>,
    tree: &SourceTree<'src>,
    kind: ReferenceKind,
) -> Option<ImportReference<'src>> {
    let source = node.child_by_field_name("source")?;
    Some(ImportReference {
        specifier: tree.string_value(&source)?,
        kind,
        span: Span::of(&source),
    })
}

fn dynamic_import_reference<'src>(
    node: &Node<'_>,
    tree: &SourceTree<'src>,
) -> Option<ImportReference<'src>> {
    if !is_dynamic_import(node) {
        return None;
    }
    let first = call_arguments(node)?.into_iter().next()?;
    Some(ImportReference {
        specifier: tree.string_value(&first)?,
        kind: ReferenceKind::DynamicImport,
        span: Span::of(&first),
    })
}

fn amd_references<'src>(node: &Node<'_>, tree: &SourceTree<'src>) -> Vec<ImportReference<'src>> {
    let Some(callee) = node.child_by_field_name("function") else {
        return Vec::new();
    };
    if callee.kind() != "identifier" || !matches!(tree.text(&callee), "require" | "define") {
        return Vec::new();
    }
    let Some(args) = call_arguments(node) else {
        return Vec::new();
    };
    if args.len() != 2 || args[0].kind() != "array" {
        return Vec::new();
    }

    named_children(&args[0])
        .into_iter()
        .filter_map(|element| {
            let specifier = tree.string_value(&element)?;
            if matches!(specifier.as_ref(), "require" | "exports") {
                return None;
            }
            Some(ImportReference {
                specifier,
                kind: ReferenceKind::AmdDependency,
                span: Span::of(&element),
            })
        })
        .collect()
}

/// Argument nodes of a call, or `None` for tagged templates.
fn call_arguments<'tree>(node: &Node<'tree>) -> Option<Vec<Node<'tree>>> {
    let args = node.child_by_field_name("arguments")?;
    (args.kind() == "arguments").then(|| named_children(&args))
}
