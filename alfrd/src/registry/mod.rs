//! Registries for steps and validators, and the table binding them.
//!
//! This module provides:
//! - Step and validator definitions
//! - Registration-ordered registries that reject duplicate names
//! - The Before/After binding table

mod bindings;
mod definitions;
#[allow(clippy::module_inception)]
mod registry;

pub use bindings::BindingTable;
pub use definitions::{
    callable, Callable, Phase, StepDefinition, ValidatorDefinition, ValidatorOptions,
};
pub use registry::{StepRegistry, ValidatorRegistry};
