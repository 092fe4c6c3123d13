//! Validator-to-step bindings.

use super::Phase;
use indexmap::IndexMap;

/// Ordered Before and After validator lists per step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    before: IndexMap<String, Vec<String>>,
    after: IndexMap<String, Vec<String>>,
}

impl BindingTable {
    /// Creates an empty binding table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, phase: Phase) -> &IndexMap<String, Vec<String>> {
        match phase {
            Phase::Before => &self.before,
            Phase::After => &self.after,
        }
    }

    /// Appends a validator to a step's list for `phase`.
    pub fn push(&mut self, phase: Phase, step: impl Into<String>, validator: impl Into<String>) {
        let table = match phase {
            Phase::Before => &mut self.before,
            Phase::After => &mut self.after,
        };
        table.entry(step.into()).or_default().push(validator.into());
    }

    /// Returns the validators gating `step` in `phase`, in declaration order.
    #[must_use]
    pub fn validators_for(&self, phase: Phase, step: &str) -> &[String] {
        self.table(phase).get(step).map_or(&[], Vec::as_slice)
    }

    /// Returns true if `step` has at least one validator in `phase`.
    #[must_use]
    pub fn has_validators(&self, phase: Phase, step: &str) -> bool {
        !self.validators_for(phase, step).is_empty()
    }

    /// Returns true if no bindings exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}
