//! Application configuration.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given
//!    with `--config`
//! 3. `DUPESWEEP_*` environment variables (e.g. `DUPESWEEP_MODE=content`)
//! 4. command-line flags, applied by the caller
//!
//! ```toml
//! mode = "exact"
//! workers = 8
//! follow_symlinks = false
//! skip_hidden = true
//! ignore_patterns = ["node_modules/", "*.tmp"]
//! text_extensions = ["txt", "md", "rs"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duplicates::{ScanMode, TextExtensions, DEFAULT_TEXT_EXTENSIONS};
use crate::scanner::WalkerConfig;
use crate::session::ScanOptions;

/// Prefix of the environment variables read into [`Config`].
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Errors raised while loading or rendering configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The effective configuration could not be rendered as TOML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        Self::Invalid(Box::new(e))
    }
}

/// Effective application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default scan mode
    pub mode: ScanMode,
    /// Hash worker count; derived from the core count when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Gitignore-style patterns to exclude
    pub ignore_patterns: Vec<String>,
    /// Extensions verified by text equality in `content` mode
    pub text_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: ScanMode::Exact,
            workers: None,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            text_extensions: DEFAULT_TEXT_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// With `explicit` set, that file must exist. Otherwise the platform
    /// config file is used if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit file and
    /// [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match explicit {
            Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };

        if let Some(path) = &file {
            log::debug!("Loading configuration from {}", path.display());
        }

        let config: Self = Self::figment(file.as_deref())
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        Ok(config)
    }

    /// Defaults merged with an optional TOML file, without the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment,
        }
    }

    /// Platform-specific location of `config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Engine options derived from this configuration.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        let mut options = ScanOptions::default()
            .with_walker(WalkerConfig::new(
                self.follow_symlinks,
                self.skip_hidden,
                self.ignore_patterns.clone(),
            ))
            .with_text_extensions(TextExtensions::new(&self.text_extensions));
        if let Some(workers) = self.workers {
            options = options.with_workers(workers);
        }
        options
    }
}
