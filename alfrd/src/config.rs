//! Configuration for the alfrd home directory, plugins and logging.

use crate::errors::{AlfrdError, ProjectError};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "ALFRD_HOME";

/// Name of the optional config file inside the home directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlfrdConfig {
    /// Root directory holding projects.
    #[serde(default = "default_home")]
    pub home: PathBuf,
    /// Directory holding one sub-directory per project.
    ///
    /// Defaults to `<home>/projects`.
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,
    /// Glob matched against file names in a project directory.
    #[serde(default = "default_plugin_pattern")]
    pub plugin_pattern: String,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".alfrd")
}

fn default_plugin_pattern() -> String {
    "*.json".to_string()
}

impl Default for AlfrdConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            projects_dir: None,
            plugin_pattern: default_plugin_pattern(),
            log: LogConfig::default(),
        }
    }
}

impl AlfrdConfig {
    /// Creates a configuration rooted at `home`.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Self::default()
        }
    }

    /// Sets the plugin pattern.
    #[must_use]
    pub fn with_plugin_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.plugin_pattern = pattern.into();
        self
    }

    /// Returns the projects directory.
    #[must_use]
    pub fn projects_dir(&self) -> PathBuf {
        self.projects_dir
            .clone()
            .unwrap_or_else(|| self.home.join("projects"))
    }

    /// Returns the directory of a named project.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidName` unless `project` is a single
    /// plain path component.
    pub fn project_dir(&self, project: &str) -> Result<PathBuf, ProjectError> {
        let mut components = Path::new(project).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == project => {
                Ok(self.projects_dir().join(name))
            }
            _ => Err(ProjectError::InvalidName {
                name: project.to_string(),
            }),
        }
    }

    /// Parses a TOML document; a missing `home` falls back to `home`.
    ///
    /// # Errors
    ///
    /// Returns `AlfrdError::Config` if the document is not valid.
    pub fn from_toml(contents: &str, home: &Path) -> Result<Self, AlfrdError> {
        let mut table: toml::Table =
            toml::from_str(contents).map_err(|e| AlfrdError::Config(e.to_string()))?;
        table
            .entry("home")
            .or_insert_with(|| toml::Value::String(home.display().to_string()));
        toml::Value::Table(table)
            .try_into()
            .map_err(|e: toml::de::Error| AlfrdError::Config(e.to_string()))
    }

    /// Loads configuration from the environment.
    ///
    /// The home directory is `$ALFRD_HOME` or `~/.alfrd`; if it contains a
    /// `config.toml`, that file is applied on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self, AlfrdError> {
        let home = std::env::var_os(HOME_ENV).map_or_else(default_home, PathBuf::from);
        Self::load_from(&home)
    }

    /// Loads configuration rooted at an explicit home directory.
    ///
    /// # Errors
    ///
    /// See [`AlfrdConfig::load`].
    pub fn load_from(home: &Path) -> Result<Self, AlfrdError> {
        let path = home.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::with_home(home));
        }
        let contents = std::fs::read_to_string(&path)?;
        Self::from_toml(&contents, home)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Raises the level according to a `-v` count.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        match verbose {
            0 => {}
            1 => self.level = "info".to_string(),
            2 => self.level = "debug".to_string(),
            _ => self.level = "trace".to_string(),
        }
        self
    }
}
