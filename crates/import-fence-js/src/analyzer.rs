//! Analyzer orchestrating file discovery, parsing and rule execution.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use import_fence_core::{Config, ConfigError, FileContext, LintResult, ProjectBoundary, Violation};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::rule::{Rule, RuleBox};
use crate::rules::configured_rules;
use crate::syntax::{Dialect, SourceTree, SyntaxError};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error resolving paths.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// File that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to walk sources: {0}")]
    Walk(#[from] ignore::Error),

    /// The grammar could not produce a tree.
    #[error("Failed to parse {path}: {source}")]
    Syntax {
        /// File being parsed.
        path: PathBuf,
        /// Parser failure.
        source: SyntaxError,
    },

    /// The file parsed with syntax errors and `fail_on_parse_error` is set.
    #[error("Syntax errors in {path}")]
    Parse {
        /// File with syntax errors.
        path: PathBuf,
    },

    /// Invalid exclude pattern.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Invalid `ignore` expression in a rule block.
    #[error("Invalid ignore pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    sources: Option<PathBuf>,
    paths: Vec<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    parallelism: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the analysis root. Reported paths are relative to it.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the sources folder below the root (default: `src`).
    #[must_use]
    pub fn sources(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources = Some(path.into());
        self
    }

    /// Restricts discovery to a file or directory instead of the whole root.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Adds a rule to the analyzer.
    ///
    /// Without any explicit rule, the rules built from the configuration
    /// are used.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the analyzer.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether unreadable files and files with syntax errors abort
    /// the run (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn parallelism(mut self, workers: usize) -> Self {
        self.parallelism = Some(workers);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is unavailable, the
    /// configuration is invalid, or an exclude or ignore pattern does not
    /// compile.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let root = self
            .root
            .unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let sources = self
            .sources
            .unwrap_or_else(|| config.analyzer.sources.clone());
        let boundary = ProjectBoundary::new(root.join(sources))?;

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let excludes = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let rules = if self.rules.is_empty() {
            configured_rules(&config)?
        } else {
            self.rules
        };

        let parallelism = self
            .parallelism
            .or(config.analyzer.parallelism)
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(1)
            .max(1);

        let paths = if self.paths.is_empty() {
            vec![root.clone()]
        } else {
            self.paths
                .into_iter()
                .map(|p| if p.is_absolute() { p } else { root.join(p) })
                .collect()
        };

        debug!(
            "Boundary at {}, {} workers, {} exclude patterns",
            boundary.root().display(),
            parallelism,
            excludes.len()
        );

        Ok(Analyzer {
            root,
            boundary,
            paths,
            rules,
            excludes,
            respect_gitignore: config.analyzer.respect_gitignore,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            parallelism,
        })
    }
}

/// The main analyzer that orchestrates lint execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    boundary: ProjectBoundary,
    paths: Vec<PathBuf>,
    rules: Vec<RuleBox>,
    excludes: Vec<glob::Pattern>,
    respect_gitignore: bool,
    config: Config,
    fail_on_parse_error: bool,
    parallelism: usize,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the project boundary.
    #[must_use]
    pub fn boundary(&self) -> &ProjectBoundary {
        &self.boundary
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Analyzes all discovered files and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, or if a file cannot be read or
    /// has syntax errors while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let mut result = LintResult::new();
        if files.is_empty() {
            return Ok(result);
        }

        let workers = self.parallelism.min(files.len());
        let chunk_size = files.len().div_ceil(workers);

        let outcomes: Vec<Result<LintResult, AnalyzerError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.analyze_chunk(chunk)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        for outcome in outcomes {
            result.extend(outcome?);
        }
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes source text that may not exist on disk.
    ///
    /// With a `path`, the text is located against the boundary as if it
    /// were that file. Without one it is anonymous and only the
    /// dynamic-import check can report anything. The dialect defaults to
    /// the one implied by `path`, then JavaScript.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed, or has syntax errors
    /// while `fail_on_parse_error` is set.
    pub fn analyze_source(
        &self,
        source: &str,
        path: Option<&Path>,
        dialect: Option<Dialect>,
    ) -> Result<LintResult, AnalyzerError> {
        let dialect = dialect
            .or_else(|| path.and_then(Dialect::from_path))
            .unwrap_or(Dialect::JavaScript);

        let absolute = match path {
            Some(p) if p.is_absolute() => Some(p.to_path_buf()),
            Some(p) => Some(std::env::current_dir()?.join(p)),
            None => None,
        };
        let ctx = match absolute.as_deref() {
            Some(p) => FileContext::new(p, source, &self.root, &self.boundary),
            None => FileContext::anonymous(source),
        };

        let tree = self.parse(&ctx, dialect)?;
        let mut result = LintResult::new();
        result.violations = self.run_rules(&ctx, &tree);
        result.files_checked = 1;
        result.sort();
        Ok(result)
    }

    fn analyze_chunk(&self, files: &[PathBuf]) -> Result<LintResult, AnalyzerError> {
        let mut result = LintResult::new();
        for path in files {
            if let Some(violations) = self.analyze_file(path)? {
                result.violations.extend(violations);
                result.files_checked += 1;
            }
        }
        Ok(result)
    }

    /// Analyzes a single file. Returns `None` for files that are skipped.
    fn analyze_file(&self, path: &Path) -> Result<Option<Vec<Violation>>, AnalyzerError> {
        debug!("Analyzing: {}", path.display());

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) if self.fail_on_parse_error => {
                return Err(AnalyzerError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                return Ok(None);
            }
        };

        let dialect = Dialect::from_path(path).unwrap_or(Dialect::JavaScript);
        let ctx = FileContext::new(path, &content, &self.root, &self.boundary);
        let tree = self.parse(&ctx, dialect)?;

        Ok(Some(self.run_rules(&ctx, &tree)))
    }

    fn parse<'src>(
        &self,
        ctx: &FileContext<'src>,
        dialect: Dialect,
    ) -> Result<SourceTree<'src>, AnalyzerError> {
        let tree =
            SourceTree::parse(ctx.content, dialect).map_err(|source| AnalyzerError::Syntax {
                path: ctx.relative_path.clone(),
                source,
            })?;

        if tree.has_errors() {
            warn!(
                "Syntax errors in {}, results may be incomplete",
                ctx.relative_path.display()
            );
            if self.fail_on_parse_error {
                return Err(AnalyzerError::Parse {
                    path: ctx.relative_path.clone(),
                });
            }
        }
        Ok(tree)
    }

    fn run_rules(&self, ctx: &FileContext<'_>, tree: &SourceTree<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            if !self.config.is_rule_enabled(rule.name()) {
                debug!("Skipping disabled rule: {}", rule.name());
                continue;
            }

            let rule_violations = rule.check(ctx, tree);
            violations.extend(self.apply_severity_override(rule.as_ref(), rule_violations));
        }
        violations
    }

    /// Applies severity overrides from configuration.
    ///
    /// Only findings at the rule's own severity are remapped; warnings about
    /// malformed allow directives keep their level.
    fn apply_severity_override(
        &self,
        rule: &dyn Rule,
        mut violations: Vec<Violation>,
    ) -> Vec<Violation> {
        if let Some(severity) = self.config.rule_severity(rule.name()) {
            let default = rule.default_severity();
            for v in violations.iter_mut().filter(|v| v.severity == default) {
                v.severity = severity;
            }
        }
        violations
    }

    /// Discovers all JavaScript and TypeScript files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let Some((first, rest)) = self.paths.split_first() else {
            return Ok(Vec::new());
        };

        let mut walker = WalkBuilder::new(first);
        for path in rest {
            walker.add(path);
        }
        walker
            .hidden(true)
            .require_git(false)
            .ignore(self.respect_gitignore)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore);

        let mut files = Vec::new();
        for entry in walker.build() {
            let entry = entry?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if Dialect::from_path(path).is_none() {
                continue;
            }
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Checks if a path matches an exclude pattern, either relative to the
    /// root or as given.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path(relative) || pattern.matches_path(path))
    }
}
