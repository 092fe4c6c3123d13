//! Event sinks for executor observability.
//!
//! The executor reports every gating decision through an [`EventSink`]. The
//! default sink discards everything, so the core runs without any
//! collaborator attached.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, RecordedEvent};

/// Event emitted when a step body starts.
pub const STEP_STARTED: &str = "step.started";
/// Event emitted when a step body returns.
pub const STEP_COMPLETED: &str = "step.completed";
/// Event emitted when a step body raises.
pub const STEP_FAILED: &str = "step.failed";
/// Event emitted when a step is reported finished.
pub const STEP_FINISHED: &str = "step.finished";
/// Event emitted when a step is reported skipped.
pub const STEP_SKIPPED: &str = "step.skipped";
/// Event emitted when a validator starts.
pub const VALIDATOR_STARTED: &str = "validator.started";
/// Event emitted when a validator returns.
pub const VALIDATOR_COMPLETED: &str = "validator.completed";
/// Event emitted when a validator is passed over.
pub const VALIDATOR_SKIPPED: &str = "validator.skipped";
/// Event emitted when a validator raises.
pub const VALIDATOR_FAILED: &str = "validator.failed";
