//! Wall-clock timing for steps.

use std::time::{Duration, Instant};
use tracing::trace;

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span, logs it at trace level and returns the duration.
    #[must_use]
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        trace!(span = self.name(), elapsed_ms = self.elapsed_ms(), "Span finished");
        elapsed
    }
}

/// Formats a duration as minutes and seconds, e.g. `2m3.5s`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs_f64();
    let minutes = (total / 60.0).floor();
    let seconds = total - minutes * 60.0;
    format!("{minutes:.0}m{seconds:.1}s")
}
