//! JSON plugin manifests.

use super::{PluginModule, Registrations, ShellCommand};
use crate::context::PipelineContext;
use crate::errors::PluginLoadError;
use crate::params::{ParamSignature, ParamValue};
use crate::registry::ValidatorOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A validator declared in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorEntry {
    /// Unique validator name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Run after the step instead of before it.
    #[serde(default)]
    pub after: bool,
    /// Run at most once per run.
    #[serde(default)]
    pub run_once: bool,
    /// Command template.
    pub command: String,
    /// Parameters without a default.
    #[serde(default)]
    pub required: Vec<String>,
    /// Parameters with a default.
    #[serde(default)]
    pub defaults: BTreeMap<String, ParamValue>,
}

/// A step declared in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    /// Unique step name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Command template.
    pub command: String,
    /// Parameters without a default.
    #[serde(default)]
    pub required: Vec<String>,
    /// Parameters with a default.
    #[serde(default)]
    pub defaults: BTreeMap<String, ParamValue>,
    /// Validators gating the step.
    #[serde(default)]
    pub validate_by: Vec<String>,
}

/// The contents of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Validators, registered first.
    #[serde(default)]
    pub validators: Vec<ValidatorEntry>,
    /// Steps, in pipeline order.
    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

fn signature(required: &[String], defaults: &BTreeMap<String, ParamValue>) -> ParamSignature {
    defaults
        .iter()
        .fold(ParamSignature::new().require_all(required), |sig, (k, v)| {
            sig.with_default(k.clone(), v.clone())
        })
}

/// Loads JSON manifests whose steps and validators run shell commands.
///
/// Commands run in the manifest's directory.
#[derive(Debug, Clone)]
pub struct ManifestPlugin {
    shell: String,
}

impl Default for ManifestPlugin {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
        }
    }
}

impl ManifestPlugin {
    /// Creates a manifest loader using `sh`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shell commands are run with.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    fn command(&self, template: &str, path: &Path) -> ShellCommand {
        let command = ShellCommand::new(template).with_shell(&self.shell);
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => command.with_workdir(dir),
            _ => command,
        }
    }

    /// Registers a parsed manifest.
    ///
    /// # Errors
    ///
    /// Returns `PluginLoadError` on the first registration or binding error.
    pub fn register(
        &self,
        manifest: Manifest,
        path: &Path,
        ctx: &mut PipelineContext,
    ) -> Result<Registrations, PluginLoadError> {
        let fail = |e: crate::errors::RegistryError| PluginLoadError::new(path, e.to_string());
        let mut registrations = Registrations::default();

        for entry in manifest.validators {
            let options = ValidatorOptions {
                after: entry.after,
                run_once: entry.run_once,
            };
            let callable = self
                .command(&entry.command, path)
                .with_empty_output(true)
                .into_callable();
            ctx.register_validator(
                entry.name.clone(),
                entry.description,
                signature(&entry.required, &entry.defaults),
                options,
                callable,
            )
            .map_err(fail)?;
            registrations.validators.push(entry.name);
        }

        let mut bindings = Vec::new();
        for entry in manifest.steps {
            let callable = self.command(&entry.command, path).into_callable();
            ctx.register_step(
                entry.name.clone(),
                entry.description,
                signature(&entry.required, &entry.defaults),
                callable,
            )
            .map_err(fail)?;
            if !entry.validate_by.is_empty() {
                bindings.push((entry.name.clone(), entry.validate_by));
            }
            registrations.steps.push(entry.name);
        }

        for (step, validators) in bindings {
            ctx.bind_validators(&step, validators).map_err(fail)?;
        }

        debug!(
            path = %path.display(),
            steps = registrations.steps.len(),
            validators = registrations.validators.len(),
            "Registered manifest"
        );
        Ok(registrations)
    }
}

impl PluginModule for ManifestPlugin {
    fn load(&self, path: &Path, ctx: &mut PipelineContext) -> Result<Registrations, PluginLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| PluginLoadError::new(path, e.to_string()))?;
        let manifest: Manifest = serde_json::from_str(&contents)
            .map_err(|e| PluginLoadError::new(path, format!("invalid manifest: {e}")))?;
        self.register(manifest, path, ctx)
    }
}
