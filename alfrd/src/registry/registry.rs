//! Step and validator registries.

use super::{Callable, StepDefinition, ValidatorDefinition};
use crate::errors::RegistryError;
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of steps, ordered by registration.
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: IndexMap<String, StepDefinition>,
}

impl StepRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a step and returns its callable.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateStep` if the name is taken; the
    /// registry is left unchanged.
    pub fn register(&mut self, definition: StepDefinition) -> Result<Callable, RegistryError> {
        if self.steps.contains_key(&definition.name) {
            return Err(RegistryError::duplicate_step(&definition.name));
        }
        let callable = Arc::clone(&definition.callable);
        self.steps.insert(definition.name.clone(), definition);
        Ok(callable)
    }

    /// Gets a step by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StepDefinition> {
        self.steps.get(name)
    }

    /// Checks if a step is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Returns step names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Iterates over definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.values()
    }

    /// Returns the number of registered steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if no steps are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Registry of validators, ordered by registration.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    validators: IndexMap<String, ValidatorDefinition>,
}

impl ValidatorRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a validator and returns its callable.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateValidator` if the name is taken.
    pub fn register(&mut self, definition: ValidatorDefinition) -> Result<Callable, RegistryError> {
        if self.validators.contains_key(&definition.name) {
            return Err(RegistryError::duplicate_validator(&definition.name));
        }
        let callable = Arc::clone(&definition.callable);
        self.validators.insert(definition.name.clone(), definition);
        Ok(callable)
    }

    /// Gets a validator by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValidatorDefinition> {
        self.validators.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ValidatorDefinition> {
        self.validators.get_mut(name)
    }

    /// Checks if a validator is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Finds the validator registered with this exact callable.
    #[must_use]
    pub fn find_by_callable(&self, callable: &Callable) -> Option<&ValidatorDefinition> {
        self.validators
            .values()
            .find(|def| Arc::ptr_eq(&def.callable, callable))
    }

    /// Returns validator names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.validators.keys().cloned().collect()
    }

    /// Iterates over definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorDefinition> {
        self.validators.values()
    }

    /// Resets every run count to zero.
    pub fn reset_run_counts(&mut self) {
        for def in self.validators.values_mut() {
            def.reset_run_count();
        }
    }

    /// Returns the number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}
