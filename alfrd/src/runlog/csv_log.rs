//! CSV run log.

use super::RunLog;
use crate::context::RunIdentity;
use crate::errors::AlfrdError;
use crate::executor::StepReport;
use crate::observability::format_duration;
use crate::params::ParameterSpace;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogRow {
    /// When the row was written (RFC 3339).
    pub timestamp: String,
    /// The run ID.
    pub run_id: String,
    /// The project, if any.
    pub project: String,
    /// The step name.
    pub step: String,
    /// `finished`, `skipped` or `failed`.
    pub outcome: String,
    /// `prev_step_success` after the step.
    pub prev_step_success: String,
    /// `validation_success` after the step.
    pub validation_success: String,
    /// Duration as `XmY.Ys`.
    pub duration: String,
    /// The final parameter space as JSON.
    pub params: String,
    /// `Kind: message` for a failed step, otherwise empty.
    pub error: String,
}

fn flag(value: Option<bool>) -> String {
    value.map_or_else(String::new, |b| b.to_string())
}

impl RunLogRow {
    /// Builds a row for one report.
    #[must_use]
    pub fn new(identity: &RunIdentity, report: &StepReport, params: &ParameterSpace) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            run_id: identity.run_id.to_string(),
            project: identity.project.clone().unwrap_or_default(),
            step: report.step.clone(),
            outcome: report.outcome.to_string(),
            prev_step_success: flag(report.prev_step_success),
            validation_success: flag(report.validation_success),
            duration: format_duration(report.duration),
            params: params.to_json().to_string(),
            error: match (report.error_kind, &report.error) {
                (Some(kind), Some(message)) => format!("{kind}: {message}"),
                (_, Some(message)) => message.clone(),
                _ => String::new(),
            },
        }
    }
}

/// Appends report rows to a CSV file, writing a header for a new file.
#[derive(Debug, Clone)]
pub struct CsvRunLog {
    path: PathBuf,
}

impl CsvRunLog {
    /// Creates a log writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every row back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(&self) -> Result<Vec<RunLogRow>, AlfrdError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| AlfrdError::Serialization(e.to_string()))?;
        reader
            .deserialize()
            .map(|row| row.map_err(|e| AlfrdError::Serialization(e.to_string())))
            .collect()
    }
}

impl RunLog for CsvRunLog {
    fn record(
        &mut self,
        identity: &RunIdentity,
        reports: &[StepReport],
        params: &ParameterSpace,
    ) -> Result<(), AlfrdError> {
        let is_new = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        for report in reports {
            writer
                .serialize(RunLogRow::new(identity, report, params))
                .map_err(|e| AlfrdError::Serialization(e.to_string()))?;
        }
        writer.flush()?;

        debug!(path = %self.path.display(), rows = reports.len(), "Wrote run log");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::StepOutcome;
    use crate::params::ParamValue;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn report(step: &str, outcome: StepOutcome) -> StepReport {
        StepReport {
            step: step.to_string(),
            outcome,
            prev_step_success: Some(true),
            validation_success: Some(outcome == StepOutcome::Finished),
            duration: Duration::from_millis(61_200),
            ret: None,
            error: None,
            error_kind: None,
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/runs.csv");
        let mut log = CsvRunLog::new(&path);
        let identity = RunIdentity::new().with_project("vlbi");
        let mut params = ParameterSpace::new();
        params.set("n", ParamValue::Int(3));

        log.record(&identity, &[report("a", StepOutcome::Finished)], &params)
            .unwrap();
        log.record(&identity, &[report("b", StepOutcome::Skipped)], &params)
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("timestamp,run_id").count(), 1);

        let rows = log.read().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].step, "a");
        assert_eq!(rows[0].project, "vlbi");
        assert_eq!(rows[0].duration, "1m1.2s");
        assert_eq!(rows[1].outcome, "skipped");
        assert_eq!(rows[1].validation_success, "false");
        assert_eq!(rows[1].params, r#"{"n":3}"#);
        assert_eq!(rows[1].error, "");
    }

    #[test]
    fn test_failed_row_carries_error_kind() {
        let mut failed = report("a", StepOutcome::Failed);
        failed.error = Some("Missing required parameters: n".to_string());
        failed.error_kind = Some("MissingParametersError");

        let row = RunLogRow::new(&RunIdentity::new(), &failed, &ParameterSpace::new());
        assert_eq!(row.outcome, "failed");
        assert_eq!(row.error, "MissingParametersError: Missing required parameters: n");
    }

    #[test]
    fn test_unset_flags_are_empty() {
        assert_eq!(flag(None), "");
        assert_eq!(flag(Some(true)), "true");
    }
}
