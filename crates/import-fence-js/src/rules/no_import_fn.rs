//! Rule to forbid the functional form of `import`.
//!
//! # Rationale
//!
//! `import("...")` is resolved by the bundler at build time and happily
//! copies or inlines files from anywhere on disk, so it slips past the
//! boundary check a static import would fail. Plugins must use static
//! `import` declarations instead.
//!
//! # Detected Patterns
//!
//! - `import("./x");` as a statement
//! - `let x = import("./x");` as a declarator initializer
//!
//! Parentheses around the call do not hide it.
//!
//! Only these two positions are inspected. `foo(import("x"))`,
//! `await import("x")` and `import("x").then(...)` are not reported.
//!
//! # Suppression
//!
//! - `// import-fence: allow(no-import-fn) reason="..."` comment

use import_fence_core::{FileContext, Severity, Violation};
use tree_sitter::Node;

use crate::rule::{Reporter, Rule};
use crate::syntax::{
    is_dynamic_import, named_children, strip_parens, walk, SourceTree, Span, SyntaxKind, Visitor,
};

/// Rule code for no-import-fn.
pub const CODE: &str = "IF001";

/// Rule name for no-import-fn.
pub const NAME: &str = "no-import-fn";

/// Message reported for every dynamic import.
pub const MESSAGE: &str = "use of dynamic import is not allowed";

/// Forbids `import(...)` in statement and initializer position.
#[derive(Debug, Clone)]
pub struct NoImportFn {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for NoImportFn {
    fn default() -> Self {
        Self::new()
    }
}

impl NoImportFn {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Error,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for NoImportFn {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids functional style use of `import()`"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check(&self, ctx: &FileContext<'_>, tree: &SourceTree<'_>) -> Vec<Violation> {
        let mut visitor = ImportFnVisitor {
            reporter: Reporter::new(ctx, self),
        };
        walk(tree, &mut visitor);
        visitor.reporter.finish()
    }
}

struct ImportFnVisitor<'a> {
    reporter: Reporter<'a, NoImportFn>,
}

impl ImportFnVisitor<'_> {
    fn analyze(&mut self, node: &Node<'_>, subject: Node<'_>) {
        if is_dynamic_import(&strip_parens(subject)) {
            self.reporter.report(
                Span::of(node),
                MESSAGE,
                "Use a static `import ... from \"...\"` declaration",
            );
        }
    }
}

impl<'tree> Visitor<'tree> for ImportFnVisitor<'_> {
    fn visit(&mut self, kind: SyntaxKind, node: Node<'tree>) {
        match kind {
            SyntaxKind::VariableDeclarator => {
                if let Some(init) = node.child_by_field_name("value") {
                    self.analyze(&init, init);
                }
            }
            SyntaxKind::ExpressionStatement => {
                if let Some(expression) = named_children(&node).into_iter().next() {
                    self.analyze(&node, expression);
                }
            }
            SyntaxKind::ImportDeclaration
            | SyntaxKind::ExportDeclaration
            | SyntaxKind::CallExpression => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::Dialect;

    fn check_code(code: &str) -> Vec<Violation> {
        check_dialect(code, Dialect::JavaScript)
    }

    fn check_dialect(code: &str, dialect: Dialect) -> Vec<Violation> {
        let tree = SourceTree::parse(code, dialect).expect("Failed to parse");
        NoImportFn::new().check(&FileContext::anonymous(code), &tree)
    }

    #[test]
    fn detects_bare_statement() {
        let violations = check_code("import(\"../package.json\");\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, CODE);
        assert_eq!(violations[0].message, MESSAGE);
        assert_eq!(violations[0].location.line, 1);
        assert_eq!(violations[0].location.column, 1);
    }

    #[test]
    fn detects_declarator_initializer() {
        let code = "let pkg2 = import(\"../package.json\");\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        // Reported on the initializer, not the whole declaration.
        assert_eq!(violations[0].location.column, 12);
        assert_eq!(
            &code[violations[0].location.offset
                ..violations[0].location.offset + violations[0].location.length],
            "import(\"../package.json\")"
        );
    }

    #[test]
    fn detects_var_and_const() {
        let violations = check_code("var a = import('./a');\nconst b = import('./b');\n");
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn ignores_static_imports() {
        let violations = check_code(
            r#"
import pkg1 from "../package.json";
import "./side-effect";
export * from "./reexport";
"#,
        );
        assert!(violations.is_empty());
    }

    #[test]
    fn ignores_other_positions() {
        let violations = check_code(
            r#"
load(import("./a"));
async function f() { await import("./b"); }
import("./c").then(m => m.default);
const d = cond ? import("./d") : null;
"#,
        );
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn sees_through_parentheses() {
        let violations = check_code("(import(\"../package.json\"));\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.column, 1);

        let code = "let x = ((import(\"../package.json\")));\n";
        let violations = check_code(code);
        assert_eq!(violations.len(), 1);
        // Still reported on the initializer as written.
        assert_eq!(violations[0].location.column, 9);
        assert_eq!(
            &code[violations[0].location.offset
                ..violations[0].location.offset + violations[0].location.length],
            "((import(\"../package.json\")))"
        );
    }

    #[test]
    fn ignores_declarator_without_initializer() {
        assert!(check_code("let x;\nvar y, z = 1;\n").is_empty());
    }

    #[test]
    fn ignores_calls_to_other_functions() {
        assert!(check_code("require('./x');\nconst y = requireLazy('./y');\n").is_empty());
    }

    #[test]
    fn detects_in_typescript() {
        let violations = check_dialect(
            "const mod: Promise<unknown> = import('./mod');\n",
            Dialect::TypeScript,
        );
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn detects_inside_nested_blocks() {
        let violations = check_code("function f() {\n  if (x) {\n    import('./deep');\n  }\n}\n");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location.line, 3);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let code = "import('./a');\nlet b = import('./b');\n";
        let first: Vec<String> = check_code(code).iter().map(ToString::to_string).collect();
        let second: Vec<String> = check_code(code).iter().map(ToString::to_string).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn allows_with_reason() {
        let violations = check_code(
            "// import-fence: allow(no-import-fn) reason=\"code split\"\nimport('./chunk');\n",
        );
        assert!(violations.is_empty());
    }
}
