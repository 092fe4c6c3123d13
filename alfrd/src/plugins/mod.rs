//! Plugin loading.
//!
//! A plugin file registers steps and validators into a [`PipelineContext`].
//! How a file is turned into registrations is up to a [`PluginModule`]; the
//! built-in [`ManifestPlugin`] reads JSON manifests whose steps and
//! validators run shell commands.

mod command;
mod loader;
mod manifest;

pub use command::{env_var_name, shell_quote, ShellCommand};
pub use loader::{LoadReport, PluginLoader};
pub use manifest::{Manifest, ManifestPlugin, StepEntry, ValidatorEntry};

use crate::context::PipelineContext;
use crate::errors::PluginLoadError;
use std::path::Path;

/// Names registered by one plugin file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registrations {
    /// Step names, in registration order.
    pub steps: Vec<String>,
    /// Validator names, in registration order.
    pub validators: Vec<String>,
}

impl Registrations {
    /// Returns true if nothing was registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.validators.is_empty()
    }

    /// Appends another file's registrations.
    pub fn extend(&mut self, other: Self) {
        self.steps.extend(other.steps);
        self.validators.extend(other.validators);
    }
}

/// Turns a plugin file into registrations.
#[cfg_attr(test, mockall::automock)]
pub trait PluginModule: Send + Sync {
    /// Loads `path`, registering its steps and validators into `ctx`.
    ///
    /// # Errors
    ///
    /// Returns `PluginLoadError` naming the file if it cannot be read or
    /// registered.
    fn load(&self, path: &Path, ctx: &mut PipelineContext) -> Result<Registrations, PluginLoadError>;
}
