//! Built-in import boundary rules.
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | IF001 | `no-import-fn` | Forbids `import()` in statement and initializer position |
//! | IF002 | `no-parent-scope-imports` | Forbids relative imports climbing out of the sources folder |

pub mod no_import_fn;
pub mod no_parent_scope_imports;

use import_fence_core::Config;

use crate::reference::ModuleStyles;
use crate::rule::RuleBox;

pub use no_import_fn::NoImportFn;
pub use no_parent_scope_imports::NoParentScopeImports;

/// Returns every rule with its default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![
        Box::new(NoImportFn::new()),
        Box::new(NoParentScopeImports::new()),
    ]
}

/// Returns every rule configured from the `[rules.<name>]` blocks.
///
/// Disabled rules are still returned; the analyzer skips them.
///
/// # Errors
///
/// Returns an error if an `ignore` expression of
/// `no-parent-scope-imports` is not a valid regex.
pub fn configured_rules(config: &Config) -> Result<Vec<RuleBox>, regex::Error> {
    let styles = config
        .rule(no_parent_scope_imports::NAME)
        .map(ModuleStyles::from_rule_config)
        .unwrap_or_default();

    Ok(vec![
        Box::new(NoImportFn::new()),
        Box::new(NoParentScopeImports::with_styles(styles)?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_rules_have_unique_codes() {
        let rules = all_rules();
        let codes: Vec<_> = rules.iter().map(|r| r.code()).collect();
        assert_eq!(codes, ["IF001", "IF002"]);
    }

    #[test]
    fn configured_rules_reject_bad_ignore_pattern() {
        let config = Config::parse("[rules.no-parent-scope-imports]\nignore = [\"(\"]\n").unwrap();
        assert!(configured_rules(&config).is_err());
    }

    #[test]
    fn configured_rules_default_without_blocks() {
        let rules = configured_rules(&Config::default()).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["no-import-fn", "no-parent-scope-imports"]);
    }
}
