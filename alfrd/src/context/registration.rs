//! Fluent registration builders.
//!
//! These replace decorator-style registration: describe the step or
//! validator, then hand over the closure. The closure comes back as a
//! [`Callable`] that can still be invoked directly.

use super::{PipelineContext, ValidatorRef};
use crate::errors::RegistryError;
use crate::params::{ParamSignature, ParamValue, Params};
use crate::registry::{callable, Callable, ValidatorOptions};

/// Builder for registering a step.
#[derive(Debug)]
pub struct StepRegistration<'a> {
    ctx: &'a mut PipelineContext,
    name: String,
    description: String,
    signature: ParamSignature,
    validate_by: Vec<ValidatorRef>,
}

impl<'a> StepRegistration<'a> {
    pub(crate) fn new(ctx: &'a mut PipelineContext, name: impl Into<String>) -> Self {
        Self {
            ctx,
            name: name.into(),
            description: String::new(),
            signature: ParamSignature::new(),
            validate_by: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a required parameter.
    #[must_use]
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.signature = self.signature.require(name);
        self
    }

    /// Declares a parameter with a default.
    #[must_use]
    pub fn default_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.signature = self.signature.with_default(name, value);
        self
    }

    /// Replaces the whole signature.
    #[must_use]
    pub fn signature(mut self, signature: ParamSignature) -> Self {
        self.signature = signature;
        self
    }

    /// Binds validators to the step once it is registered.
    #[must_use]
    pub fn validate_by<R: Into<ValidatorRef>>(mut self, refs: impl IntoIterator<Item = R>) -> Self {
        self.validate_by.extend(refs.into_iter().map(Into::into));
        self
    }

    /// Registers the step with `f` as its body.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateStep` for a taken name, or a binding error if a
    /// `validate_by` reference does not resolve. On a binding error the step
    /// stays registered but unbound.
    pub fn register<F>(self, f: F) -> Result<Callable, RegistryError>
    where
        F: Fn(&Params) -> anyhow::Result<ParamValue> + Send + Sync + 'static,
    {
        self.register_callable(callable(f))
    }

    /// Registers the step with an existing callable.
    ///
    /// # Errors
    ///
    /// See [`StepRegistration::register`].
    pub fn register_callable(self, f: Callable) -> Result<Callable, RegistryError> {
        let registered = self
            .ctx
            .register_step(&self.name, self.description, self.signature, f)?;
        if !self.validate_by.is_empty() {
            self.ctx.bind_validators(&self.name, self.validate_by)?;
        }
        Ok(registered)
    }
}

/// Builder for registering a validator.
#[derive(Debug)]
pub struct ValidatorRegistration<'a> {
    ctx: &'a mut PipelineContext,
    name: String,
    description: String,
    signature: ParamSignature,
    options: ValidatorOptions,
}

impl<'a> ValidatorRegistration<'a> {
    pub(crate) fn new(ctx: &'a mut PipelineContext, name: impl Into<String>) -> Self {
        Self {
            ctx,
            name: name.into(),
            description: String::new(),
            signature: ParamSignature::new(),
            options: ValidatorOptions::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares a required parameter.
    #[must_use]
    pub fn requires(mut self, name: impl Into<String>) -> Self {
        self.signature = self.signature.require(name);
        self
    }

    /// Declares a parameter with a default.
    #[must_use]
    pub fn default_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.signature = self.signature.with_default(name, value);
        self
    }

    /// Runs the validator after the step.
    #[must_use]
    pub const fn after(mut self) -> Self {
        self.options.after = true;
        self
    }

    /// Runs the validator at most once per run.
    #[must_use]
    pub const fn run_once(mut self) -> Self {
        self.options.run_once = true;
        self
    }

    /// Registers the validator with `f` as its body.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateValidator` for a taken name.
    pub fn register<F>(self, f: F) -> Result<Callable, RegistryError>
    where
        F: Fn(&Params) -> anyhow::Result<ParamValue> + Send + Sync + 'static,
    {
        self.ctx.register_validator(
            self.name,
            self.description,
            self.signature,
            self.options,
            callable(f),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Phase;

    #[test]
    fn test_step_builder_registers_and_binds() {
        let mut ctx = PipelineContext::new();
        let check = ctx
            .validator("has_input")
            .describe("input present")
            .requires("input")
            .run_once()
            .register(|p| Ok(ParamValue::Bool(!p.str("input")?.is_empty())))
            .unwrap();

        let step = ctx
            .step("calibrate")
            .describe("calibrate data")
            .requires("input")
            .default_param("gain", 2)
            .validate_by([&check])
            .register(|p| Ok(ParamValue::Int(p.int("gain")? * 10)))
            .unwrap();

        let def = ctx.steps.get("calibrate").unwrap();
        assert_eq!(def.description, "calibrate data");
        assert_eq!(def.signature.required, vec!["input".to_string()]);
        assert_eq!(ctx.bindings.validators_for(Phase::Before, "calibrate"), ["has_input"]);
        assert!(ctx.validators.get("has_input").unwrap().run_once);

        // The returned callable is still directly invokable.
        let params: Params = [("gain", 3)].into_iter().collect();
        assert_eq!(step(&params).unwrap(), ParamValue::Int(30));
    }

    #[test]
    fn test_validator_builder_after() {
        let mut ctx = PipelineContext::new();
        ctx.validator("post")
            .after()
            .register(|_| Ok(ParamValue::Bool(true)))
            .unwrap();
        assert_eq!(ctx.validators.get("post").unwrap().phase, Phase::After);
    }

    #[test]
    fn test_step_builder_duplicate() {
        let mut ctx = PipelineContext::new();
        ctx.step("a").register(|_| Ok(ParamValue::Null)).unwrap();
        let err = ctx.step("a").register(|_| Ok(ParamValue::Null)).err().unwrap();
        assert_eq!(err, RegistryError::duplicate_step("a"));
    }
}
