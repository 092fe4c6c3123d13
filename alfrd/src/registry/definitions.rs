//! Step and validator definitions.

use crate::params::{ParamSignature, ParamValue, Params};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A registered step or validator body.
///
/// Receives the resolved arguments (empty when it declares none) and returns
/// the value stored under `ret` / `ret_valid`.
pub type Callable = Arc<dyn Fn(&Params) -> anyhow::Result<ParamValue> + Send + Sync>;

/// Wraps a closure into a [`Callable`].
pub fn callable<F>(f: F) -> Callable
where
    F: Fn(&Params) -> anyhow::Result<ParamValue> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// When a validator runs relative to its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the step body.
    #[default]
    Before,
    /// After the step body.
    After,
}

impl Phase {
    /// Returns the banner label used when reporting a validation pass.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Before => "Pre-process",
            Self::After => "Post-process",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// Definition of a registered step.
#[derive(Clone)]
pub struct StepDefinition {
    /// The unique step name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters.
    pub signature: ParamSignature,
    /// The step body.
    pub callable: Callable,
}

impl StepDefinition {
    /// Creates a new step definition.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ParamSignature,
        callable: Callable,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            signature,
            callable,
        }
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Registration options for a validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorOptions {
    /// Run after the step instead of before it.
    #[serde(default)]
    pub after: bool,
    /// Run at most once per pipeline run.
    #[serde(default)]
    pub run_once: bool,
}

impl ValidatorOptions {
    /// Creates default options (before, every time).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the validator as an after-step check.
    #[must_use]
    pub const fn after(mut self) -> Self {
        self.after = true;
        self
    }

    /// Limits the validator to one successful invocation per run.
    #[must_use]
    pub const fn run_once(mut self) -> Self {
        self.run_once = true;
        self
    }

    /// Returns the phase these options select.
    #[must_use]
    pub const fn phase(self) -> Phase {
        if self.after {
            Phase::After
        } else {
            Phase::Before
        }
    }
}

/// Definition of a registered validator.
#[derive(Clone)]
pub struct ValidatorDefinition {
    /// The unique validator name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared parameters.
    pub signature: ParamSignature,
    /// The validator body.
    pub callable: Callable,
    /// Which binding list the validator lands in.
    pub phase: Phase,
    /// Whether the validator runs at most once per run.
    pub run_once: bool,
    run_count: u32,
}

impl ValidatorDefinition {
    /// Creates a new validator definition with a zero run count.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ParamSignature,
        options: ValidatorOptions,
        callable: Callable,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            signature,
            callable,
            phase: options.phase(),
            run_once: options.run_once,
            run_count: 0,
        }
    }

    /// Returns the number of successful invocations in the current run.
    #[must_use]
    pub const fn run_count(&self) -> u32 {
        self.run_count
    }

    /// Returns true if a run-once validator has already run.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.run_once && self.run_count > 0
    }

    pub(crate) fn record_run(&mut self) {
        self.run_count += 1;
    }

    pub(crate) fn reset_run_count(&mut self) {
        self.run_count = 0;
    }
}

impl fmt::Debug for ValidatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("signature", &self.signature)
            .field("phase", &self.phase)
            .field("run_once", &self.run_once)
            .field("run_count", &self.run_count)
            .finish_non_exhaustive()
    }
}
