//! Shell commands as step and validator bodies.

use crate::params::{ParamValue, Params};
use crate::registry::{callable, Callable};
use anyhow::Context as _;
use regex::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

/// Returns the environment variable a parameter is exported as.
///
/// `n_iter` becomes `ALFRD_N_ITER`; characters outside `[A-Za-z0-9_]` map to
/// `_`.
#[must_use]
pub fn env_var_name(key: &str) -> String {
    let key: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("ALFRD_{key}")
}

/// Quotes a value as one single-quoted shell word.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// A command template run through a shell.
///
/// `{key}` placeholders are replaced by the shell-quoted value, so each one
/// expands to exactly one word. Use `$ALFRD_KEY` where the raw value is needed
/// inside shell syntax such as `$((...))`.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    template: String,
    shell: String,
    workdir: Option<PathBuf>,
    empty_output: ParamValue,
}

impl ShellCommand {
    /// Creates a command run with `sh -c`; empty output yields `Null`.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            shell: "sh".to_string(),
            workdir: None,
            empty_output: ParamValue::Null,
        }
    }

    /// Sets the shell binary.
    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Sets the value returned when the command prints nothing.
    #[must_use]
    pub fn with_empty_output(mut self, value: impl Into<ParamValue>) -> Self {
        self.empty_output = value.into();
        self
    }

    /// Substitutes quoted values for `{key}` placeholders; unknown keys are
    /// left as is.
    #[must_use]
    pub fn render(&self, params: &Params) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |caps: &regex::Captures<'_>| {
                params
                    .get(&caps[1])
                    .map_or_else(|| caps[0].to_string(), |value| shell_quote(&value.to_string()))
            })
            .into_owned()
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Fails if the shell cannot be spawned or the command exits non-zero;
    /// the error carries the command's stderr.
    pub fn run(&self, params: &Params) -> anyhow::Result<ParamValue> {
        let rendered = self.render(params);
        debug!(command = %rendered, "Running command");

        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(&rendered);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }
        for (key, value) in params.iter() {
            command.env(env_var_name(key), value.to_string());
        }

        let output = command
            .output()
            .with_context(|| format!("failed to spawn `{} -c {rendered}`", self.shell))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("command `{rendered}` exited with {}: {}", output.status, stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            Ok(self.empty_output.clone())
        } else {
            Ok(ParamValue::parse(stdout))
        }
    }

    /// Wraps the command into a callable.
    #[must_use]
    pub fn into_callable(self) -> Callable {
        callable(move |params| self.run(params))
    }
}
