//! Context management for pipeline runs.
//!
//! This module provides:
//! - The pipeline context owning registries, bindings and parameters
//! - Fluent registration builders
//! - Run identity

mod identity;
mod pipeline;
mod registration;

pub use identity::RunIdentity;
pub use pipeline::{PipelineContext, ValidatorRef};
pub use registration::{StepRegistration, ValidatorRegistration};
