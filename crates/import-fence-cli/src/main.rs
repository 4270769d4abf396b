//! import-fence CLI tool.
//!
//! Usage:
//! ```bash
//! import-fence check [OPTIONS] [PATH]
//! import-fence list-rules
//! import-fence init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use import_fence_js::Dialect;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

use config_resolver::ResolvedConfig;

/// Keeps plugin bundles inside their sources folder
#[derive(Parser)]
#[command(name = "import-fence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "IMPORT_FENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run lint checks
    Check {
        /// Project directory or single file to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules, by name or code (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Sources folder below the project root (overrides config)
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Read source text from standard input
        #[arg(long)]
        stdin: bool,

        /// File name to assume for standard input
        #[arg(long, requires = "stdin")]
        stdin_filename: Option<PathBuf>,

        /// Grammar for standard input (default: from the file name, then js)
        #[arg(long, requires = "stdin")]
        dialect: Option<DialectArg>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Annotated source snippets.
    Pretty,
}

/// Grammar selection for standard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DialectArg {
    /// JavaScript and JSX
    Js,
    /// TypeScript
    Ts,
    /// TypeScript with JSX
    Tsx,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Js => Self::JavaScript,
            DialectArg::Ts => Self::TypeScript,
            DialectArg::Tsx => Self::Tsx,
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
            sources,
            stdin,
            stdin_filename,
            dialect,
        } => {
            let project = ResolvedConfig::for_target(&path, cli.config.as_deref())?;
            let args = commands::check::CheckArgs {
                format,
                rules,
                exclude,
                sources,
                stdin: stdin.then(|| commands::check::StdinArgs {
                    filename: stdin_filename,
                    dialect: dialect.map(Dialect::from),
                }),
            };
            commands::check::run(args, project)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
