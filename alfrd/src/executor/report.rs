//! Per-step reports and run summaries.

use crate::observability::format_duration;
use crate::params::ParamValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    /// The step's validation verdict was true.
    Finished,
    /// The step was passed over, or a validator voted against it.
    Skipped,
    /// A callable raised and the run was aborted.
    Failed,
}

impl StepOutcome {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finished => "finished",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of processing one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// The step name.
    pub step: String,
    /// How the step ended.
    pub outcome: StepOutcome,
    /// `prev_step_success` after the step.
    pub prev_step_success: Option<bool>,
    /// `validation_success` after the step.
    pub validation_success: Option<bool>,
    /// Wall-clock time spent on the step and its validators.
    pub duration: Duration,
    /// The step body's return value, if the body ran.
    pub ret: Option<ParamValue>,
    /// The fatal error message for a failed step.
    pub error: Option<String>,
    /// The kind of that error, e.g. `MissingParametersError`.
    pub error_kind: Option<&'static str>,
}

impl StepReport {
    /// Returns true if the step finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome == StepOutcome::Finished
    }

    /// Returns the line printed by the command-line driver.
    ///
    /// Outcome names are padded so step names line up.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{:<9}: {}", self.outcome.as_str(), self.step)
    }

    /// Converts to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "step": self.step,
            "outcome": self.outcome,
            "prev_step_success": self.prev_step_success,
            "validation_success": self.validation_success,
            "duration": format_duration(self.duration),
            "ret": self.ret.as_ref().map(ParamValue::to_json),
            "error": self.error,
            "error_kind": self.error_kind,
        })
    }
}

/// All reports of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// The run ID.
    pub run_id: Uuid,
    /// Reports in execution order.
    pub reports: Vec<StepReport>,
}

impl RunSummary {
    /// Names of the finished steps.
    #[must_use]
    pub fn finished(&self) -> Vec<&str> {
        self.with_outcome(StepOutcome::Finished)
    }

    /// Names of the skipped steps.
    #[must_use]
    pub fn skipped(&self) -> Vec<&str> {
        self.with_outcome(StepOutcome::Skipped)
    }

    fn with_outcome(&self, outcome: StepOutcome) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.outcome == outcome)
            .map(|r| r.step.as_str())
            .collect()
    }

    /// Total wall-clock time of the run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.reports.iter().map(|r| r.duration).sum()
    }
}
