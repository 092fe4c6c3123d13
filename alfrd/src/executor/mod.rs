//! The step/validation state machine.
//!
//! For every requested step the executor runs the step's Before validators,
//! the step body and its After validators, gated by two tri-state flags, and
//! aborts the whole run on the first unrecovered error.

#[allow(clippy::module_inception)]
mod executor;
mod report;
mod selection;
mod state;

mod executor_tests;

pub use executor::PipelineExecutor;
pub use report::{RunSummary, StepOutcome, StepReport};
pub use selection::{check_steps, select_steps};
pub use state::ExecutorState;
