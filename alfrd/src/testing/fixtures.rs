//! Context fixtures.

use super::CallProbe;
use crate::context::PipelineContext;
use crate::executor::PipelineExecutor;
use crate::params::{ParamSignature, ParamValue};
use crate::registry::ValidatorOptions;
use std::collections::HashMap;

/// Builds a context with steps registered in the given order, each returning
/// its own name and declaring no parameters.
#[must_use]
pub fn linear_context(steps: &[&str]) -> PipelineContext {
    let mut ctx = PipelineContext::new();
    for step in steps {
        let _ = ctx.register_step(*step, "", ParamSignature::new(), super::returning(*step));
    }
    ctx
}

/// A context whose every step and validator is backed by a [`CallProbe`].
#[derive(Debug, Default)]
pub struct TestPipeline {
    /// The context under construction.
    pub ctx: PipelineContext,
    probes: HashMap<String, CallProbe>,
}

impl TestPipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step returning `value`.
    #[must_use]
    pub fn step(mut self, name: &str, signature: ParamSignature, value: impl Into<ParamValue>) -> Self {
        let probe = CallProbe::new();
        let _ = self.ctx.register_step(name, "", signature, probe.returning(value));
        self.probes.insert(name.to_string(), probe);
        self
    }

    /// Adds a step that fails.
    #[must_use]
    pub fn failing_step(mut self, name: &str, message: &str) -> Self {
        let probe = CallProbe::new();
        let _ = self
            .ctx
            .register_step(name, "", ParamSignature::new(), probe.failing(message));
        self.probes.insert(name.to_string(), probe);
        self
    }

    /// Adds a validator returning `value`.
    #[must_use]
    pub fn validator(
        mut self,
        name: &str,
        options: ValidatorOptions,
        value: impl Into<ParamValue>,
    ) -> Self {
        let probe = CallProbe::new();
        let _ = self
            .ctx
            .register_validator(name, "", ParamSignature::new(), options, probe.returning(value));
        self.probes.insert(name.to_string(), probe);
        self
    }

    /// Adds a validator that fails.
    #[must_use]
    pub fn failing_validator(mut self, name: &str, options: ValidatorOptions, message: &str) -> Self {
        let probe = CallProbe::new();
        let _ = self.ctx.register_validator(
            name,
            "",
            ParamSignature::new(),
            options,
            probe.failing(message),
        );
        self.probes.insert(name.to_string(), probe);
        self
    }

    /// Binds validators to a step, ignoring unresolved names.
    #[must_use]
    pub fn bind(mut self, step: &str, validators: &[&str]) -> Self {
        let _ = self.ctx.bind_validators(step, validators.iter().copied());
        self
    }

    /// Returns the number of calls to a step or validator.
    #[must_use]
    pub fn calls(&self, name: &str) -> usize {
        self.probes.get(name).map_or(0, CallProbe::call_count)
    }

    /// Returns the probe of a step or validator.
    #[must_use]
    pub fn probe(&self, name: &str) -> Option<&CallProbe> {
        self.probes.get(name)
    }

    /// Builds an executor over a copy of the context.
    ///
    /// Probes stay attached, so calls made by the executor are visible here.
    #[must_use]
    pub fn executor(&self) -> PipelineExecutor {
        PipelineExecutor::new(self.ctx.clone())
    }
}
