//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config_resolver::PROJECT_CONFIG_NAMES;

const DEFAULT_CONFIG: &str = r#"# import-fence configuration

# Lowest severity that makes `import-fence check` exit non-zero
fail_on = "error"

[analyzer]
# Project root, relative to the checked path (default: ".")
# root = "."

# Folder below the root that relative imports must stay inside
sources = "src"

# Glob patterns to exclude from analysis
exclude = [
    "**/node_modules/**",
    "**/dist/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads (default: available cores)
# parallelism = 4

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden

[rules.no-import-fn]
enabled = true
# severity = "warning"

[rules.no-parent-scope-imports]
enabled = true
# Module styles treated as imports
esmodule = true
commonjs = false
amd = false
# Regular expressions for specifiers that are never checked
# ignore = ["\\.json$"]
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let config_path = Path::new(PROJECT_CONFIG_NAMES[0]);
    write_config(config_path, force)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point `sources` at the folder your bundle is built from");
    println!("  2. Run: import-fence check");

    Ok(())
}

fn write_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
