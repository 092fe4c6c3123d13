//! Run logs: a persistent record of what each run did.

mod csv_log;

pub use csv_log::{CsvRunLog, RunLogRow};

use crate::context::RunIdentity;
use crate::errors::AlfrdError;
use crate::executor::StepReport;
use crate::params::ParameterSpace;

/// A destination for step reports.
pub trait RunLog {
    /// Records the reports of one run along with its final parameter space.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    fn record(
        &mut self,
        identity: &RunIdentity,
        reports: &[StepReport],
        params: &ParameterSpace,
    ) -> Result<(), AlfrdError>;
}
