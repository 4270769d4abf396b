//! Locating the project and its configuration for a check target.
//!
//! The configuration is taken from the first of:
//!
//! 1. `--config` (explicit path, must exist)
//! 2. `import-fence.toml` or `.import-fence.toml` in the project directory
//! 3. `$IMPORT_FENCE_CONFIG_DIR/config.toml` or `~/.import-fence/config.toml`
//! 4. built-in defaults
//!
//! A directory target is its own project directory. For a file target the
//! file's ancestors are searched for a project config, nearest first; the
//! directory holding it becomes the project directory. Without one, the
//! current directory is the project.

use anyhow::{Context, Result};
use import_fence_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["import-fence.toml", ".import-fence.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

const GLOBAL_DIR_ENV: &str = "IMPORT_FENCE_CONFIG_DIR";

/// Where the configuration was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project directory.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found; defaults apply.
    Default,
}

impl ConfigSource {
    /// Returns the config file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }

    fn load(&self) -> Result<Config> {
        let Some(path) = self.path() else {
            return Ok(Config::default());
        };
        if matches!(self, Self::Global(_)) {
            tracing::info!("Using global config: {}", path.display());
        }
        Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
    }
}

/// The project a check runs against, with its validated configuration.
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Where the configuration came from.
    pub source: ConfigSource,
    /// Loaded and validated configuration.
    pub config: Config,
    /// Project directory; `[analyzer] root` is relative to it.
    pub project_dir: PathBuf,
    /// Absolute path of the check target.
    pub target: PathBuf,
}

impl ResolvedConfig {
    /// Resolves the project and configuration for `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is unavailable or the
    /// selected config file cannot be read, parsed or validated.
    pub fn for_target(target: &Path, explicit: Option<&Path>) -> Result<Self> {
        Self::resolve_with(target, explicit, global_config_dir().as_deref())
    }

    /// Like [`Self::for_target`], with the global config directory given.
    pub(crate) fn resolve_with(
        target: &Path,
        explicit: Option<&Path>,
        global_dir: Option<&Path>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let target = cwd.join(target);

        let (project_dir, project_config) = if target.is_file() {
            target
                .parent()
                .into_iter()
                .flat_map(Path::ancestors)
                .find_map(|dir| project_config_in(dir).map(|config| (dir.to_path_buf(), Some(config))))
                .unwrap_or((cwd, None))
        } else {
            let config = project_config_in(&target);
            (target.clone(), config)
        };

        let source = if let Some(path) = explicit {
            ConfigSource::Explicit(path.to_path_buf())
        } else if let Some(path) = project_config {
            ConfigSource::Project(path)
        } else if let Some(path) = global_dir.map(|d| d.join(GLOBAL_CONFIG_NAME)).filter(|p| p.is_file()) {
            ConfigSource::Global(path)
        } else {
            ConfigSource::Default
        };
        tracing::debug!("Project directory: {}", project_dir.display());

        let config = source.load()?;
        Ok(Self {
            source,
            config,
            project_dir,
            target,
        })
    }

    /// Directory the analyzer runs from: the project directory joined with
    /// the configured `[analyzer] root`.
    #[must_use]
    pub fn analysis_root(&self) -> PathBuf {
        self.project_dir.join(&self.config.analyzer.root)
    }

    /// Returns true when the target is a single file.
    #[must_use]
    pub fn targets_file(&self) -> bool {
        self.target.is_file()
    }
}

fn project_config_in(dir: &Path) -> Option<PathBuf> {
    PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

/// `$IMPORT_FENCE_CONFIG_DIR`, else `~/.import-fence/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(GLOBAL_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".import-fence"))
}
