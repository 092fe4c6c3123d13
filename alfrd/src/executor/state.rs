//! Executor flags.

use crate::registry::Phase;

/// Mutable state carried from step to step within a run.
///
/// `None` means "unset": a fresh executor that never began a run executes
/// nothing until a first step sets both flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorState {
    /// The step being processed.
    pub current_step: Option<String>,
    /// Whether the most recent callable returned without error.
    pub prev_step_success: Option<bool>,
    /// The verdict of the most recent validation pass that ran a validator.
    pub validation_success: Option<bool>,
    /// The phase whose validators `run_validations` iterates.
    pub active_phase: Phase,
}

impl ExecutorState {
    /// Creates unset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a run: both flags become true.
    pub fn begin_run(&mut self) {
        self.prev_step_success = Some(true);
        self.validation_success = Some(true);
    }

    /// Returns true if the previous callable succeeded.
    #[must_use]
    pub fn prev_ok(&self) -> bool {
        self.prev_step_success == Some(true)
    }

    /// Returns true if both flags are set and true.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.prev_ok() && self.validation_success == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_not_ready() {
        let state = ExecutorState::new();
        assert!(!state.ready());
        assert!(!state.prev_ok());
        assert_eq!(state.active_phase, Phase::Before);
    }

    #[test]
    fn test_begin_run() {
        let mut state = ExecutorState::new();
        state.begin_run();
        assert!(state.ready());

        state.validation_success = Some(false);
        assert!(state.prev_ok());
        assert!(!state.ready());
    }
}
