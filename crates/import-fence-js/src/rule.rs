//! Rule trait for defining lint rules over tree-sitter syntax trees.

use import_fence_core::utils::check_allow_with_reason;
use import_fence_core::{FileContext, Severity, Suggestion, Violation};

use crate::syntax::{SourceTree, Span};

/// A per-file lint rule.
///
/// Rules receive the parsed tree and subscribe to node kinds through
/// [`crate::syntax::walk`] with their own [`crate::syntax::Visitor`].
///
/// # Example
///
/// ```ignore
/// use import_fence_js::{Rule, SourceTree};
/// use import_fence_core::{FileContext, Violation};
///
/// pub struct NoEval;
///
/// impl Rule for NoEval {
///     fn name(&self) -> &'static str { "no-eval" }
///     fn code(&self) -> &'static str { "IF100" }
///
///     fn check(&self, ctx: &FileContext<'_>, tree: &SourceTree<'_>) -> Vec<Violation> {
///         let mut visitor = EvalVisitor::new(ctx, self);
///         import_fence_js::syntax::walk(tree, &mut visitor);
///         visitor.finish()
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "no-import-fn").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "IF001").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether an allow directive for this rule must carry a reason.
    ///
    /// By default, rules with `Severity::Error` require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Checks a single file and returns any violations found.
    fn check(&self, ctx: &FileContext<'_>, tree: &SourceTree<'_>) -> Vec<Violation>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Collects a rule's findings for one file, honoring allow directives.
pub struct Reporter<'a, R: Rule + ?Sized> {
    ctx: &'a FileContext<'a>,
    rule: &'a R,
    violations: Vec<Violation>,
}

impl<'a, R: Rule + ?Sized> Reporter<'a, R> {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new(ctx: &'a FileContext<'a>, rule: &'a R) -> Self {
        Self {
            ctx,
            rule,
            violations: Vec::new(),
        }
    }

    /// Records a violation at `span` unless an allow directive covers it.
    ///
    /// A directive without a reason on a rule that requires one still
    /// suppresses the finding, but a warning about the directive is recorded.
    pub fn report(&mut self, span: Span, message: &str, help: &str) {
        let location = span.to_location(self.ctx.relative_path.clone());
        let name = self.rule.name();

        let allow = check_allow_with_reason(self.ctx.content, span.line, name);
        if allow.is_allowed() {
            if self.rule.requires_allow_reason() && allow.reason().is_none() {
                self.violations.push(
                    Violation::new(
                        self.rule.code(),
                        name,
                        Severity::Warning,
                        location,
                        format!("Allow directive for '{name}' is missing required reason"),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            return;
        }

        self.violations.push(
            Violation::new(
                self.rule.code(),
                name,
                self.rule.default_severity(),
                location,
                message,
            )
            .with_suggestion(Suggestion::new(help)),
        );
    }

    /// Returns the recorded violations.
    #[must_use]
    pub fn finish(self) -> Vec<Violation> {
        self.violations
    }
}
