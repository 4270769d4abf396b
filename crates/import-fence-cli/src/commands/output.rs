//! Shared output formatting for lint results.

use anyhow::{Context, Result};
use import_fence_core::{LintResult, Severity, Violation};
use miette::{GraphicalReportHandler, GraphicalTheme};
use serde::Serialize;
use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::Path;

use crate::OutputFormat;

/// Where the text behind reported locations comes from.
#[derive(Debug, Clone, Copy)]
pub enum SourceText<'a> {
    /// Files on disk, with locations relative to this root.
    Disk(&'a Path),
    /// A single in-memory source, such as standard input.
    Inline(&'a str),
}

impl SourceText<'_> {
    fn load(&self, violation: &Violation) -> Option<String> {
        match self {
            Self::Disk(root) => std::fs::read_to_string(root.join(&violation.location.file)).ok(),
            Self::Inline(text) => Some((*text).to_string()),
        }
    }
}

/// Print lint results in the specified format.
pub fn print(result: &LintResult, format: OutputFormat, sources: &SourceText<'_>) -> Result<()> {
    let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
    print!("{}", render(result, format, sources, color)?);
    Ok(())
}

fn render(
    result: &LintResult,
    format: OutputFormat,
    sources: &SourceText<'_>,
    color: bool,
) -> Result<String> {
    match format {
        OutputFormat::Text if color => Ok(render_text(result)),
        OutputFormat::Text => Ok(result.format_report(Severity::Info)),
        OutputFormat::Json => render_json(result),
        OutputFormat::Compact => Ok(render_compact(result)),
        OutputFormat::Pretty => render_pretty(result, sources, color),
    }
}

fn render_text(result: &LintResult) -> String {
    let mut out = String::new();

    for violation in &result.violations {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        let _ = writeln!(
            out,
            "{} {} at {}:{}:{}",
            violation.code,
            violation.rule,
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
        );
        let _ = writeln!(out, "  {}: {}", severity_indicator, violation.message);
        if let Some(suggestion) = &violation.suggestion {
            let _ = writeln!(out, "  = help: {}", suggestion.message);
        }
        out.push('\n');
    }

    out.push_str(&summary(result, true));
    out
}

fn summary(result: &LintResult, color: bool) -> String {
    let line = result.summary_line();
    if !color {
        return format!("{line}\n");
    }

    let (errors, warnings, _) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!("{summary_color}{line}\x1b[0m\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a LintResult,
    errors: usize,
    warnings: usize,
    infos: usize,
}

fn render_json(result: &LintResult) -> Result<String> {
    let (errors, warnings, infos) = result.count_by_severity();
    let report = JsonReport {
        result,
        errors,
        warnings,
        infos,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

fn render_compact(result: &LintResult) -> String {
    let mut out = String::new();
    for violation in &result.violations {
        let _ = writeln!(out, "{violation}");
    }
    out
}

fn render_pretty(result: &LintResult, sources: &SourceText<'_>, color: bool) -> Result<String> {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);

    let mut out = String::new();
    for violation in &result.violations {
        let Some(source) = sources.load(violation) else {
            tracing::debug!(
                "Source of {} unavailable, falling back to text",
                violation.location.file.display()
            );
            out.push_str(&violation.format());
            out.push('\n');
            continue;
        };

        let diagnostic = violation.to_diagnostic(source);
        handler
            .render_report(&mut out, &diagnostic)
            .ok()
            .context("Failed to render diagnostic")?;
        out.push('\n');
    }

    out.push_str(&summary(result, color));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use import_fence_core::{Location, Suggestion};
    use std::path::PathBuf;

    const SOURCE: &str = "import pkg from \"../package.json\";\n";

    fn sample() -> LintResult {
        let mut result = LintResult::new();
        result.files_checked = 1;
        result.violations.push(
            Violation::new(
                "IF002",
                "no-parent-scope-imports",
                Severity::Error,
                Location::new(PathBuf::from("src/index.js"), 1, 17).with_span(16, 17),
                "relative imports outside of the sources folder is not allowed",
            )
            .with_suggestion(Suggestion::new(
                "Move the referenced file under the sources folder",
            )),
        );
        result
    }

    #[test]
    fn compact_is_one_line_per_violation() {
        let out = render(
            &sample(),
            OutputFormat::Compact,
            &SourceText::Inline(SOURCE),
            false,
        )
        .unwrap();
        insta::assert_snapshot!(out, @"src/index.js:1:17: error [IF002] relative imports outside of the sources folder is not allowed");
    }

    #[test]
    fn plain_text_report() {
        let out = render(
            &sample(),
            OutputFormat::Text,
            &SourceText::Inline(SOURCE),
            false,
        )
        .unwrap();
        insta::assert_snapshot!(out, @r"
        IF002 no-parent-scope-imports at src/index.js:1:17
          error: relative imports outside of the sources folder is not allowed
          = help: Move the referenced file under the sources folder

        Found 1 error(s), 0 warning(s), 0 info(s) in 1 file(s)
        ");
    }

    #[test]
    fn colored_text_marks_severity() {
        let out = render_text(&sample());
        assert!(out.contains("\x1b[31merror\x1b[0m"));
        assert!(out.ends_with("in 1 file(s)\x1b[0m\n"));
    }

    #[test]
    fn plain_and_colored_text_share_the_summary() {
        let result = sample();
        let plain = render(&result, OutputFormat::Text, &SourceText::Inline(SOURCE), false).unwrap();
        let colored = render(&result, OutputFormat::Text, &SourceText::Inline(SOURCE), true).unwrap();
        let line = result.summary_line();
        assert!(plain.ends_with(&format!("{line}\n")));
        assert!(colored.contains(&line));
    }

    #[test]
    fn json_carries_counts_and_violations() {
        let out = render(
            &sample(),
            OutputFormat::Json,
            &SourceText::Inline(SOURCE),
            false,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["errors"], 1);
        assert_eq!(value["files_checked"], 1);
        assert_eq!(value["violations"][0]["code"], "IF002");
        assert_eq!(value["violations"][0]["severity"], "error");
        assert_eq!(value["violations"][0]["location"]["line"], 1);
    }

    #[test]
    fn pretty_labels_the_specifier() {
        let out = render(
            &sample(),
            OutputFormat::Pretty,
            &SourceText::Inline(SOURCE),
            false,
        )
        .unwrap();
        assert!(out.contains("[IF002] relative imports outside of the sources folder"));
        assert!(out.contains("src/index.js"));
        assert!(out.contains("no-parent-scope-imports"));
        assert!(out.contains("Move the referenced file under the sources folder"));
    }

    #[test]
    fn pretty_falls_back_without_source() {
        let dir = tempfile::tempdir().unwrap();
        let out = render(
            &sample(),
            OutputFormat::Pretty,
            &SourceText::Disk(dir.path()),
            false,
        )
        .unwrap();
        assert!(out.starts_with("IF002 no-parent-scope-imports at src/index.js:1:17"));
    }

    #[test]
    fn pretty_reads_source_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/index.js"), SOURCE).unwrap();
        let out = render(
            &sample(),
            OutputFormat::Pretty,
            &SourceText::Disk(dir.path()),
            false,
        )
        .unwrap();
        assert!(out.contains("../package.json"));
    }
}
