//! Tree-sitter parsing and the node dispatch used by every rule.
//!
//! Rules never walk the tree themselves. [`walk`] performs one depth-first
//! pass, maps each node onto the closed [`SyntaxKind`] set and hands the
//! matches to a [`Visitor`].

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use import_fence_core::Location;
use tree_sitter::{Language, Node, Parser, Tree};

/// Source dialect, selecting the tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// JavaScript, including JSX.
    JavaScript,
    /// TypeScript.
    TypeScript,
    /// TypeScript with JSX.
    Tsx,
}

impl Dialect {
    /// Picks the dialect from a file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }

    /// Picks the dialect from a path's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Short identifier used in logs and errors.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    fn language(self) -> Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Failure to produce a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    /// The grammar is incompatible with the linked tree-sitter runtime.
    #[error("failed to load {dialect} grammar: {message}")]
    Grammar {
        /// Dialect whose grammar failed to load.
        dialect: Dialect,
        /// Loader error detail.
        message: String,
    },
    /// The parser returned no tree.
    #[error("{dialect} parser produced no tree")]
    NoTree {
        /// Dialect being parsed.
        dialect: Dialect,
    },
}

/// A parsed source file.
pub struct SourceTree<'src> {
    source: &'src str,
    tree: Tree,
}

impl<'src> SourceTree<'src> {
    /// Parses `source` with the grammar of `dialect`.
    ///
    /// Syntax errors do not fail the parse; tree-sitter recovers and the
    /// damaged region shows up as `ERROR` nodes.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or no tree is produced.
    pub fn parse(source: &'src str, dialect: Dialect) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|e| SyntaxError::Grammar {
                dialect,
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or(SyntaxError::NoTree { dialect })?;

        Ok(Self { source, tree })
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns true if tree-sitter had to recover from syntax errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Source text covered by `node`.
    #[must_use]
    pub fn text(&self, node: &Node<'_>) -> &'src str {
        self.source
            .get(node.start_byte()..node.end_byte())
            .unwrap_or("")
    }

    /// Value of a string literal node, without its quotes.
    ///
    /// Returns `None` for anything that is not a plain `string` node;
    /// template literals are computed and never analyzable.
    #[must_use]
    pub fn string_value(&self, node: &Node<'_>) -> Option<Cow<'src, str>> {
        if node.kind() != "string" {
            return None;
        }
        let text = self.text(node);
        if text.len() < 2 {
            return None;
        }
        let raw = text.get(1..text.len() - 1)?;
        if raw.contains('\\') {
            Some(Cow::Owned(unescape(raw)))
        } else {
            Some(Cow::Borrowed(raw))
        }
    }
}

/// Decodes JavaScript string escapes. Malformed escapes keep their text.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            // Line continuation.
            Some('\n') => {}
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, "\\x", &hex);
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&h| h != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, "\\u", &hex);
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn push_code_point(out: &mut String, prefix: &str, hex: &str) {
    match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        Some(decoded) => out.push(decoded),
        None => {
            out.push_str(prefix);
            out.push_str(hex);
        }
    }
}

/// Where a node sits in its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column (1-indexed byte offset within the line).
    pub column: usize,
    /// Byte offset from the start of the file.
    pub offset: usize,
    /// Length in bytes.
    pub length: usize,
}

impl Span {
    /// Span covering `node`.
    #[must_use]
    pub fn of(node: &Node<'_>) -> Self {
        let start = node.start_position();
        Self {
            line: start.row + 1,
            column: start.column + 1,
            offset: node.start_byte(),
            length: node.end_byte() - node.start_byte(),
        }
    }

    /// Converts to a reportable location in `file`.
    #[must_use]
    pub fn to_location(self, file: PathBuf) -> Location {
        Location::new(file, self.line, self.column).with_span(self.offset, self.length)
    }
}

/// Node kinds rules can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// `x = <init>` inside `let`/`const`/`var`.
    VariableDeclarator,
    /// An expression used as a statement.
    ExpressionStatement,
    /// `import ... from "x"`, `import "x"`, `import x = require("x")`.
    ImportDeclaration,
    /// `export ...`, including re-exports with a `from` clause.
    ExportDeclaration,
    /// Any call, including `import(...)`, `require(...)` and `define(...)`.
    CallExpression,
}

impl SyntaxKind {
    /// Maps a tree-sitter node kind onto the closed set.
    #[must_use]
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "variable_declarator" => Some(Self::VariableDeclarator),
            "expression_statement" => Some(Self::ExpressionStatement),
            "import_statement" => Some(Self::ImportDeclaration),
            "export_statement" => Some(Self::ExportDeclaration),
            "call_expression" => Some(Self::CallExpression),
            _ => None,
        }
    }
}

/// Receives every node of a kind in the closed set, once, in document order.
pub trait Visitor<'tree> {
    /// Called for each matching node.
    fn visit(&mut self, kind: SyntaxKind, node: Node<'tree>);
}

/// Depth-first pass over the whole tree.
pub fn walk<'tree, V>(tree: &'tree SourceTree<'_>, visitor: &mut V)
where
    V: Visitor<'tree> + ?Sized,
{
    let mut cursor = tree.root().walk();
    loop {
        let node = cursor.node();
        if let Some(kind) = SyntaxKind::from_node_kind(node.kind()) {
            visitor.visit(kind, node);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Named children of `node`, skipping comments.
pub(crate) fn named_children<'tree>(node: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Unwraps any `(...)` layers around an expression.
pub(crate) fn strip_parens<'tree>(node: Node<'tree>) -> Node<'tree> {
    let mut node = node;
    while node.kind() == "parenthesized_expression" {
        match named_children(&node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Returns true if `node` is a call whose callee is the `import` keyword.
#[must_use]
pub fn is_dynamic_import(node: &Node<'_>) -> bool {
    node.kind() == "call_expression"
        && node
            .child_by_field_name("function")
            .is_some_and(|callee| callee.kind() == "import")
}
