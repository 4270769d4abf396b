//! Check command implementation.

use anyhow::{bail, Context, Result};
use import_fence_core::Config;
use import_fence_js::{configured_rules, Analyzer, Dialect, RuleBox};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use super::output::{self, SourceText};
use crate::config_resolver::ResolvedConfig;
use crate::OutputFormat;

/// Options for linting standard input.
#[derive(Debug, Default)]
pub struct StdinArgs {
    /// Path the text is analyzed as, if any.
    pub filename: Option<PathBuf>,
    /// Grammar override.
    pub dialect: Option<Dialect>,
}

/// Arguments of the check command.
#[derive(Debug)]
pub struct CheckArgs {
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated rule names or codes.
    pub rules: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
    /// Sources folder override.
    pub sources: Option<PathBuf>,
    /// Set when linting standard input.
    pub stdin: Option<StdinArgs>,
}

/// Runs the check command.
pub fn run(args: CheckArgs, project: ResolvedConfig) -> Result<ExitCode> {
    if execute(args, project)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Lints and prints the report. Returns false when a violation reaches
/// the configured `fail_on` severity.
fn execute(args: CheckArgs, project: ResolvedConfig) -> Result<bool> {
    let root = project.analysis_root();
    let single_file = project.targets_file().then(|| project.target.clone());
    let ResolvedConfig {
        source,
        config,
        target,
        ..
    } = project;
    tracing::debug!("Config: {source:?}");

    let fail_on = config.fail_on();
    let rules = select_rules(&config, args.rules.as_deref())?;

    let mut builder = Analyzer::builder()
        .root(root)
        .config(config)
        .excludes(args.exclude);
    if let Some(file) = single_file {
        builder = builder.path(file);
    }
    if let Some(sources) = args.sources {
        builder = builder.sources(sources);
    }
    for rule in rules {
        builder = builder.rule_box(rule);
    }

    let analyzer = builder.build().context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {} with {} rules",
        target.display(),
        analyzer.rule_count()
    );

    let (result, text) = match args.stdin {
        Some(stdin) => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            let result = analyzer
                .analyze_source(&text, stdin.filename.as_deref(), stdin.dialect)
                .context("Analysis failed")?;
            (result, Some(text))
        }
        None => (analyzer.analyze().context("Analysis failed")?, None),
    };

    let sources = match &text {
        Some(text) => SourceText::Inline(text),
        None => SourceText::Disk(analyzer.root()),
    };
    output::print(&result, args.format, &sources)?;

    Ok(!result.has_violations_at(fail_on))
}

/// Builds the configured rules, keeping only those named in `filter`.
fn select_rules(config: &Config, filter: Option<&str>) -> Result<Vec<RuleBox>> {
    let rules = configured_rules(config).context("Invalid rule configuration")?;
    let Some(filter) = filter else {
        return Ok(rules);
    };

    let wanted: Vec<&str> = filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    for name in &wanted {
        if !rules.iter().any(|r| r.name() == *name || r.code() == *name) {
            tracing::warn!("Unknown rule: {}", name);
        }
    }

    let selected: Vec<RuleBox> = rules
        .into_iter()
        .filter(|r| wanted.iter().any(|w| r.name() == *w || r.code() == *w))
        .collect();
    if selected.is_empty() {
        bail!("No known rules selected by --rules {filter}");
    }
    Ok(selected)
}
