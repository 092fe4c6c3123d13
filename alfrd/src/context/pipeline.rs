//! The pipeline context owning registries and the parameter space.

use super::{StepRegistration, ValidatorRegistration};
use crate::errors::RegistryError;
use crate::params::{ParamSignature, ParamValue, ParameterSpace};
use crate::registry::{
    BindingTable, Callable, StepDefinition, StepRegistry, ValidatorDefinition, ValidatorOptions,
    ValidatorRegistry,
};
use std::sync::Arc;
use tracing::debug;

/// A reference to a registered validator, by name or by callable identity.
#[derive(Clone)]
pub enum ValidatorRef {
    /// The validator's registered name.
    Name(String),
    /// The callable returned when the validator was registered.
    Callable(Callable),
}

impl std::fmt::Debug for ValidatorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Callable(c) => f
                .debug_tuple("Callable")
                .field(&Arc::as_ptr(c).cast::<()>())
                .finish(),
        }
    }
}

impl From<&str> for ValidatorRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for ValidatorRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Callable> for ValidatorRef {
    fn from(callable: Callable) -> Self {
        Self::Callable(callable)
    }
}

impl From<&Callable> for ValidatorRef {
    fn from(callable: &Callable) -> Self {
        Self::Callable(Arc::clone(callable))
    }
}

/// Everything a run needs: steps, validators, bindings and parameters.
///
/// Registries are populated during a load phase and then only read by the
/// executor; the parameter space is written by merges and return values.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Registered steps.
    pub steps: StepRegistry,
    /// Registered validators.
    pub validators: ValidatorRegistry,
    /// Validator bindings per step and phase.
    pub bindings: BindingTable,
    /// The shared parameter space.
    pub params: ParameterSpace,
}

impl PipelineContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a step.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateStep` if `name` is already taken.
    pub fn register_step(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ParamSignature,
        callable: Callable,
    ) -> Result<Callable, RegistryError> {
        let definition = StepDefinition::new(name, description, signature, callable);
        debug!(step = %definition.name, "Registering step");
        self.steps.register(definition)
    }

    /// Registers a validator.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateValidator` if `name` is already taken.
    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ParamSignature,
        options: ValidatorOptions,
        callable: Callable,
    ) -> Result<Callable, RegistryError> {
        let definition = ValidatorDefinition::new(name, description, signature, options, callable);
        debug!(validator = %definition.name, phase = %definition.phase, "Registering validator");
        self.validators.register(definition)
    }

    /// Binds validators to a registered step.
    ///
    /// Each validator lands in the Before or After list according to its own
    /// phase, in the order given. Nothing is recorded unless every reference
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownStep` if the step is not registered, or
    /// `RegistryError::UnknownValidator` if a reference does not resolve.
    pub fn bind_validators<I, R>(&mut self, step: &str, refs: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = R>,
        R: Into<ValidatorRef>,
    {
        if !self.steps.contains(step) {
            return Err(RegistryError::unknown_step(step));
        }

        let resolved = refs
            .into_iter()
            .map(|r| self.resolve_validator(&r.into()))
            .collect::<Result<Vec<_>, _>>()?;

        for (name, phase) in resolved {
            debug!(step, validator = %name, %phase, "Binding validator");
            self.bindings.push(phase, step, name);
        }
        Ok(())
    }

    fn resolve_validator(
        &self,
        reference: &ValidatorRef,
    ) -> Result<(String, crate::registry::Phase), RegistryError> {
        let definition = match reference {
            ValidatorRef::Name(name) => self
                .validators
                .get(name)
                .ok_or_else(|| RegistryError::unknown_validator(name))?,
            ValidatorRef::Callable(callable) => self
                .validators
                .find_by_callable(callable)
                .ok_or_else(|| RegistryError::unknown_validator("<unregistered callable>"))?,
        };
        Ok((definition.name.clone(), definition.phase))
    }

    /// Starts a fluent step registration.
    pub fn step(&mut self, name: impl Into<String>) -> StepRegistration<'_> {
        StepRegistration::new(self, name)
    }

    /// Starts a fluent validator registration.
    pub fn validator(&mut self, name: impl Into<String>) -> ValidatorRegistration<'_> {
        ValidatorRegistration::new(self, name)
    }

    /// Merges values into the parameter space, overwriting on conflict.
    pub fn merge_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.params.merge(params);
    }
}
