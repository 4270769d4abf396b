//! Configuration types for import-fence.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::boundary::DEFAULT_SOURCES_DIR;
use crate::types::Severity;

/// Top-level configuration, usually loaded from `import-fence.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lowest severity that fails the run (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Per-rule configurations, keyed by rule name.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks structural constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analyzer.sources.is_absolute() {
            return Err(ConfigError::Validation(format!(
                "analyzer.sources must be relative to the root, got {}",
                self.analyzer.sources.display()
            )));
        }
        if self.analyzer.parallelism == Some(0) {
            return Err(ConfigError::Validation(
                "analyzer.parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Severity threshold for a failing run.
    #[must_use]
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rules
            .get(rule_name)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule_name: &str) -> Option<Severity> {
        self.rules.get(rule_name).and_then(|c| c.severity)
    }

    /// Gets the configuration block of a rule, if present.
    #[must_use]
    pub fn rule(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.rules.get(rule_name)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Root directory to analyze (default: current directory).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Sources folder below `root` that relative imports must stay inside.
    #[serde(default = "default_sources")]
    pub sources: PathBuf,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Maximum number of parallel file analyses.
    #[serde(default)]
    pub parallelism: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            sources: default_sources(),
            exclude: default_exclude(),
            respect_gitignore: true,
            parallelism: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_sources() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCES_DIR)
}

fn default_exclude() -> Vec<String> {
    vec!["**/node_modules/**".to_string(), "**/dist/**".to_string()]
}

fn default_true() -> bool {
    true
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets a boolean option, if set.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(toml::Value::as_bool)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Config is structurally invalid.
    #[error("Invalid config: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.analyzer.respect_gitignore);
        assert_eq!(config.analyzer.sources, PathBuf::from("src"));
        assert_eq!(config.fail_on(), Severity::Error);
        assert!(config.is_rule_enabled("no-import-fn"));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("").expect("Failed to parse");
        assert_eq!(config.analyzer.root, PathBuf::from("."));
        assert_eq!(config.analyzer.exclude.len(), 2);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
root = "./overlay"
sources = "lib"
exclude = ["**/generated/**"]
parallelism = 2

[rules.no-import-fn]
enabled = false

[rules.no-parent-scope-imports]
severity = "warning"
commonjs = true
ignore = ["\\.json$"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.fail_on(), Severity::Warning);
        assert_eq!(config.analyzer.root, PathBuf::from("./overlay"));
        assert_eq!(config.analyzer.sources, PathBuf::from("lib"));
        assert_eq!(config.analyzer.parallelism, Some(2));
        assert!(!config.is_rule_enabled("no-import-fn"));
        assert!(config.is_rule_enabled("no-parent-scope-imports"));
        assert_eq!(
            config.rule_severity("no-parent-scope-imports"),
            Some(Severity::Warning)
        );

        let rule = config.rule("no-parent-scope-imports").unwrap();
        assert_eq!(rule.get_bool("commonjs"), Some(true));
        assert_eq!(rule.get_bool("amd"), None);
        assert_eq!(rule.get_str_array("ignore"), vec!["\\.json$".to_string()]);
    }

    #[test]
    fn rejects_zero_parallelism() {
        let err = Config::parse("[analyzer]\nparallelism = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_absolute_sources() {
        let err = Config::parse("[analyzer]\nsources = \"/src\"\n").unwrap_err();
        assert!(err.to_string().contains("analyzer.sources"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Config::parse("[analyzer\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
