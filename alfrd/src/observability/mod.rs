//! Observability utilities.

mod logging;
mod timer;

pub use logging::init_tracing;
pub use timer::{format_duration, SpanTimer};
