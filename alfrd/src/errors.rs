//! Error types for the alfrd step runner.
//!
//! Every category here is terminal for a run: the executor recovers nothing
//! locally and hands the error back to its driver.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for alfrd operations.
#[derive(Debug, Error)]
pub enum AlfrdError {
    /// A registration or binding error.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// A step or validator was missing required parameters.
    #[error("{0}")]
    MissingParameters(#[from] MissingParametersError),

    /// A step callable raised an error.
    #[error("{0}")]
    StepExecution(#[from] StepExecutionError),

    /// A validator callable raised an error.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The requested step range could not be selected.
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// A plugin file failed to load.
    #[error("{0}")]
    PluginLoad(#[from] PluginLoadError),

    /// A project directory problem.
    #[error("{0}")]
    Project(#[from] ProjectError),

    /// Configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AlfrdError {
    /// Returns a short machine-readable kind for diagnostics and run logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Registry(e) => e.kind(),
            Self::MissingParameters(_) => "MissingParametersError",
            Self::StepExecution(_) => "StepExecutionError",
            Self::Validation(_) => "ValidationError",
            Self::Selection(_) => "SelectionError",
            Self::PluginLoad(_) => "PluginLoadError",
            Self::Project(_) => "ProjectError",
            Self::Config(_) => "ConfigError",
            Self::Serialization(_) => "SerializationError",
            Self::Io(_) => "IoError",
        }
    }
}

/// Errors raised while registering steps/validators or binding them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A step with this name is already registered.
    #[error("Step with name '{name}' already registered")]
    DuplicateStep {
        /// The step name.
        name: String,
    },

    /// A validator with this name is already registered.
    #[error("Validator with name '{name}' already registered")]
    DuplicateValidator {
        /// The validator name.
        name: String,
    },

    /// The step is not registered.
    #[error("Step with name '{name}' not registered")]
    UnknownStep {
        /// The step name.
        name: String,
    },

    /// The validator reference does not resolve to a registered validator.
    #[error("Validator with name '{name}' does not exist")]
    UnknownValidator {
        /// The validator name, or a description of the unresolved callable.
        name: String,
    },
}

impl RegistryError {
    /// Creates a duplicate step error.
    #[must_use]
    pub fn duplicate_step(name: impl Into<String>) -> Self {
        Self::DuplicateStep { name: name.into() }
    }

    /// Creates a duplicate validator error.
    #[must_use]
    pub fn duplicate_validator(name: impl Into<String>) -> Self {
        Self::DuplicateValidator { name: name.into() }
    }

    /// Creates an unknown step error.
    #[must_use]
    pub fn unknown_step(name: impl Into<String>) -> Self {
        Self::UnknownStep { name: name.into() }
    }

    /// Creates an unknown validator error.
    #[must_use]
    pub fn unknown_validator(name: impl Into<String>) -> Self {
        Self::UnknownValidator { name: name.into() }
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateStep { .. } => "DuplicateStepError",
            Self::DuplicateValidator { .. } => "DuplicateValidatorError",
            Self::UnknownStep { .. } => "UnknownStepError",
            Self::UnknownValidator { .. } => "UnknownValidatorError",
        }
    }
}

/// Raised when required parameters are absent from the parameter space.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing required parameters: {}", missing.join(", "))]
pub struct MissingParametersError {
    /// Every missing key, in declaration order.
    pub missing: Vec<String>,
}

impl MissingParametersError {
    /// Creates a new missing parameters error.
    #[must_use]
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }
}

/// Wraps an error raised inside a step callable.
#[derive(Debug, Error)]
#[error("Step '{step}' failed: {source}")]
pub struct StepExecutionError {
    /// The failing step.
    pub step: String,
    /// The error raised by the callable.
    #[source]
    pub source: anyhow::Error,
}

impl StepExecutionError {
    /// Creates a new step execution error.
    #[must_use]
    pub fn new(step: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            step: step.into(),
            source,
        }
    }
}

/// Wraps an error raised inside a validator callable.
#[derive(Debug, Error)]
#[error("Validation '{validator}' failed for step '{step}': {source}")]
pub struct ValidationError {
    /// The failing validator.
    pub validator: String,
    /// The step the validator was gating.
    pub step: String,
    /// The error raised by the callable.
    #[source]
    pub source: anyhow::Error,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(validator: impl Into<String>, step: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            validator: validator.into(),
            step: step.into(),
            source,
        }
    }
}

/// Errors raised while selecting the slice of steps to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The start or end name is not part of the step order.
    #[error("Step '{name}' not found! Use `ls` to view available steps.")]
    UnknownStep {
        /// The step name.
        name: String,
    },

    /// The end step comes before the start step.
    #[error("Step '{end}' comes before '{start}'; nothing to run")]
    EmptyRange {
        /// The requested start.
        start: String,
        /// The requested end.
        end: String,
    },
}

/// Raised when a plugin file cannot be loaded.
#[derive(Debug, Clone, Error)]
#[error("Failed to load plugin '{}': {reason}", path.display())]
pub struct PluginLoadError {
    /// The offending file.
    pub path: PathBuf,
    /// Why loading failed.
    pub reason: String,
}

impl PluginLoadError {
    /// Creates a new plugin load error.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors related to project directories.
#[derive(Debug, Clone, Error)]
pub enum ProjectError {
    /// The project directory does not exist.
    #[error("Project '{name}' not found at {}", dir.display())]
    NotFound {
        /// The project name.
        name: String,
        /// The expected directory.
        dir: PathBuf,
    },

    /// The project name is not a single directory name.
    #[error("Invalid project name '{name}'")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The plugin source to add does not exist.
    #[error("File '{}' not found", path.display())]
    PluginSourceMissing {
        /// The missing file.
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_message_names_every_key() {
        let err = MissingParametersError::new(vec!["n".to_string(), "m".to_string()]);
        assert_eq!(err.to_string(), "Missing required parameters: n, m");
    }

    #[test]
    fn test_step_execution_error_keeps_source() {
        let err = StepExecutionError::new("fetch", anyhow::anyhow!("disk full"));
        assert!(err.to_string().contains("disk full"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_alfrd_error_kind() {
        let err: AlfrdError = RegistryError::unknown_validator("v").into();
        assert_eq!(err.kind(), "UnknownValidatorError");

        let err: AlfrdError = MissingParametersError::new(vec!["x".into()]).into();
        assert_eq!(err.kind(), "MissingParametersError");
    }

    #[test]
    fn test_plugin_load_error_names_file() {
        let err = PluginLoadError::new("/tmp/p/broken.json", "expected value");
        assert!(err.to_string().contains("broken.json"));
    }
}
