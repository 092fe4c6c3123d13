//! Event sink trait and implementations.

use parking_lot::RwLock;
use tracing::{debug, info, warn, Level};

/// Receives executor events.
///
/// Emitting must never fail a run: implementations log and swallow their own
/// errors.
pub trait EventSink: Send + Sync {
    /// Emits an event such as `step.started`, with an optional JSON payload.
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>);
}

/// Discards every event. The executor's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event_type: &str, _data: Option<serde_json::Value>) {}
}

/// Forwards events to `tracing`.
///
/// `*.failed` events are always logged at warn; everything else at the
/// configured level.
#[derive(Debug, Clone)]
pub struct LoggingEventSink {
    level: Level,
}

impl Default for LoggingEventSink {
    fn default() -> Self {
        Self::info()
    }
}

impl LoggingEventSink {
    /// Creates a sink logging at `level` (debug or info).
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level sink.
    #[must_use]
    pub const fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level sink.
    #[must_use]
    pub const fn info() -> Self {
        Self::new(Level::INFO)
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        let payload = data.map(|d| d.to_string()).unwrap_or_default();
        if event_type.ends_with(".failed") {
            warn!(event = event_type, %payload, "executor event");
        } else if self.level == Level::DEBUG {
            debug!(event = event_type, %payload, "executor event");
        } else {
            info!(event = event_type, %payload, "executor event");
        }
    }
}

/// One event captured by a [`CollectingEventSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// The event name.
    pub event_type: String,
    /// The payload, if any.
    pub data: Option<serde_json::Value>,
}

impl RecordedEvent {
    /// Returns a string field of the payload.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// Records every event in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<RecordedEvent>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.read().clone()
    }

    /// Returns recorded event names in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.read().iter().map(|e| e.event_type.clone()).collect()
    }

    /// Returns events whose name starts with `prefix`.
    #[must_use]
    pub fn events_of_type(&self, prefix: &str) -> Vec<RecordedEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Returns the `step` field of every event named `event_type`.
    #[must_use]
    pub fn step_sequence(&self, event_type: &str) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type == event_type)
            .filter_map(|e| e.field("step").map(str::to_string))
            .collect()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Forgets every recorded event.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event_type: &str, data: Option<serde_json::Value>) {
        self.events.write().push(RecordedEvent {
            event_type: event_type.to_string(),
            data,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_noop_and_logging_sinks_accept_events() {
        NoOpEventSink.emit("step.started", Some(json!({"step": "a"})));
        LoggingEventSink::default().emit("step.finished", Some(json!({"step": "a"})));
        LoggingEventSink::debug().emit("validator.failed", None);
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit("step.started", Some(json!({"step": "a"})));
        sink.emit("validator.completed", Some(json!({"validator": "v", "step": "a"})));
        sink.emit("step.finished", Some(json!({"step": "a"})));
        sink.emit("step.started", Some(json!({"step": "b"})));

        assert_eq!(sink.len(), 4);
        assert_eq!(sink.events_of_type("step.").len(), 3);
        assert_eq!(sink.step_sequence("step.started"), vec!["a", "b"]);
        assert_eq!(sink.events()[1].field("validator"), Some("v"));
        assert_eq!(sink.events()[0].field("missing"), None);

        sink.clear();
        assert!(sink.is_empty());
    }
}
