//! Testing utilities for alfrd pipelines.
//!
//! This module provides:
//! - Probe callables that record how often and with what they were called
//! - Callables that always fail
//! - A context fixture with a typical step/validator layout

mod fixtures;
mod probes;

pub use fixtures::{linear_context, TestPipeline};
pub use probes::{failing, returning, CallProbe};
