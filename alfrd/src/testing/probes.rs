//! Probe callables.

use crate::params::{ParamValue, Params};
use crate::registry::{callable, Callable};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records invocations of the callables it hands out.
///
/// Clones share their counters, so a probe can be kept by the test while its
/// callable is moved into a context.
#[derive(Debug, Clone, Default)]
pub struct CallProbe {
    calls: Arc<Mutex<Vec<Params>>>,
}

impl CallProbe {
    /// Creates a probe with no recorded calls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callable that records its arguments and returns `value`.
    #[must_use]
    pub fn returning(&self, value: impl Into<ParamValue>) -> Callable {
        let calls = Arc::clone(&self.calls);
        let value = value.into();
        callable(move |params| {
            calls.lock().push(params.clone());
            Ok(value.clone())
        })
    }

    /// Returns a callable that records its arguments and then fails.
    #[must_use]
    pub fn failing(&self, message: impl Into<String>) -> Callable {
        let calls = Arc::clone(&self.calls);
        let message = message.into();
        callable(move |params| {
            calls.lock().push(params.clone());
            Err(anyhow::anyhow!(message.clone()))
        })
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns true if the callable was never invoked.
    #[must_use]
    pub fn never_called(&self) -> bool {
        self.call_count() == 0
    }

    /// Returns the arguments of the most recent call.
    #[must_use]
    pub fn last_params(&self) -> Option<Params> {
        self.calls.lock().last().cloned()
    }

    /// Clears recorded calls.
    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

/// A callable that always returns `value`.
#[must_use]
pub fn returning(value: impl Into<ParamValue>) -> Callable {
    let value = value.into();
    callable(move |_| Ok(value.clone()))
}

/// A callable that always fails with `message`.
#[must_use]
pub fn failing(message: impl Into<String>) -> Callable {
    let message = message.into();
    callable(move |_| Err(anyhow::anyhow!(message.clone())))
}
