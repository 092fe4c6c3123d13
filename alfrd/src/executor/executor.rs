//! The pipeline executor.

use super::{ExecutorState, RunSummary, StepOutcome, StepReport};
use crate::context::{PipelineContext, RunIdentity};
use crate::errors::{AlfrdError, RegistryError, StepExecutionError, ValidationError};
use crate::events::{
    EventSink, NoOpEventSink, STEP_COMPLETED, STEP_FAILED, STEP_FINISHED, STEP_SKIPPED,
    STEP_STARTED, VALIDATOR_COMPLETED, VALIDATOR_FAILED, VALIDATOR_SKIPPED, VALIDATOR_STARTED,
};
use crate::observability::SpanTimer;
use crate::params::{ParamValue, ParameterSpace, RET_KEY, RET_VALID_KEY};
use crate::registry::Phase;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};

/// Runs steps and their validators against a [`PipelineContext`].
pub struct PipelineExecutor {
    ctx: PipelineContext,
    sink: Arc<dyn EventSink>,
    identity: RunIdentity,
    state: ExecutorState,
    reports: Vec<StepReport>,
}

impl fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("steps", &self.ctx.steps.names())
            .field("reports", &self.reports.len())
            .finish_non_exhaustive()
    }
}

impl PipelineExecutor {
    /// Creates an executor over a loaded context, with a no-op event sink.
    #[must_use]
    pub fn new(ctx: PipelineContext) -> Self {
        Self {
            ctx,
            sink: Arc::new(NoOpEventSink),
            identity: RunIdentity::new(),
            state: ExecutorState::new(),
            reports: Vec::new(),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the run identity.
    #[must_use]
    pub fn with_identity(mut self, identity: RunIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Returns the run identity.
    #[must_use]
    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    /// Returns the current flags.
    #[must_use]
    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    /// Returns the context.
    #[must_use]
    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Returns the context mutably.
    pub fn context_mut(&mut self) -> &mut PipelineContext {
        &mut self.ctx
    }

    /// Consumes the executor, returning its context.
    #[must_use]
    pub fn into_context(self) -> PipelineContext {
        self.ctx
    }

    /// Returns the parameter space.
    #[must_use]
    pub fn params(&self) -> &ParameterSpace {
        &self.ctx.params
    }

    /// Returns the reports of the current (or last) run, including a
    /// trailing failed report if the run was aborted.
    #[must_use]
    pub fn reports(&self) -> &[StepReport] {
        &self.reports
    }

    /// Merges values into the parameter space.
    pub fn merge_params<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.ctx.merge_params(params);
    }

    /// Sets the step that `run_step` and `run_validations` act on.
    pub fn set_current_step(&mut self, name: impl Into<String>) {
        self.state.current_step = Some(name.into());
    }

    /// Sets the phase whose validators `run_validations` iterates.
    pub fn set_active_phase(&mut self, phase: Phase) {
        self.state.active_phase = phase;
    }

    fn current_step(&self) -> Result<String, AlfrdError> {
        self.state
            .current_step
            .clone()
            .ok_or_else(|| RegistryError::unknown_step("<none>").into())
    }

    fn emit(&self, event_type: &str, mut data: serde_json::Value) {
        if let Some(map) = data.as_object_mut() {
            map.extend(self.identity.to_dict());
        }
        self.sink.emit(event_type, Some(data));
    }

    /// Executes the current step's body.
    ///
    /// On success `prev_step_success` becomes true and the return value is
    /// stored under `ret`.
    ///
    /// # Errors
    ///
    /// Returns `MissingParametersError` if the step's required parameters
    /// are absent, or `StepExecutionError` wrapping the callable's error.
    /// Either way `prev_step_success` becomes false.
    pub fn run_step(&mut self) -> Result<ParamValue, AlfrdError> {
        let step = self.current_step()?;
        let definition = self
            .ctx
            .steps
            .get(&step)
            .ok_or_else(|| RegistryError::unknown_step(&step))?;
        let callable = Arc::clone(&definition.callable);

        let params = match definition.signature.resolve(&self.ctx.params) {
            Ok(params) => params,
            Err(e) => {
                self.state.prev_step_success = Some(false);
                error!(step = %step, error = %e, "Step parameters could not be resolved");
                self.emit(STEP_FAILED, json!({"step": step, "error": e.to_string()}));
                return Err(e.into());
            }
        };

        info!(step = %step, "Running step");
        self.emit(STEP_STARTED, json!({"step": step}));

        match callable(&params) {
            Ok(value) => {
                self.state.prev_step_success = Some(true);
                self.ctx.params.set(RET_KEY, value.clone());
                self.emit(STEP_COMPLETED, json!({"step": step, "ret": value.to_json()}));
                Ok(value)
            }
            Err(source) => {
                self.state.prev_step_success = Some(false);
                error!(step = %step, error = ?source, "Step raised an error");
                self.emit(STEP_FAILED, json!({"step": step, "error": format!("{source:#}")}));
                Err(StepExecutionError::new(step, source).into())
            }
        }
    }

    /// Runs one validation pass over the current step's validators for the
    /// active phase.
    ///
    /// The pass clears `validation_success`; the first validator that runs
    /// sets it from the truthiness of its return value and later validators
    /// in the pass are skipped once it is false. Run-once validators that
    /// already ran this run are skipped. If no validator runs, the flag keeps
    /// its value from before the pass.
    ///
    /// # Errors
    ///
    /// Returns `MissingParametersError` or `ValidationError` from the first
    /// validator that cannot run; `prev_step_success` becomes false.
    pub fn run_validations(&mut self) -> Result<(), AlfrdError> {
        let step = self.current_step()?;
        let phase = self.state.active_phase;
        let names = self.ctx.bindings.validators_for(phase, &step).to_vec();

        debug!(step = %step, %phase, count = names.len(), "{}", phase.label());

        let prior = self.state.validation_success.take();
        let mut ran = false;

        for name in names {
            let definition = self
                .ctx
                .validators
                .get(&name)
                .ok_or_else(|| RegistryError::unknown_validator(&name))?;

            if definition.is_exhausted() || self.state.validation_success == Some(false) {
                let reason = if definition.is_exhausted() {
                    "run_once"
                } else {
                    "validation_failed"
                };
                debug!(step = %step, validator = %name, reason, "Skipping validator");
                self.emit(
                    VALIDATOR_SKIPPED,
                    json!({"step": step, "validator": name, "phase": phase, "reason": reason}),
                );
                continue;
            }

            let callable = Arc::clone(&definition.callable);
            let params = match definition.signature.resolve(&self.ctx.params) {
                Ok(params) => params,
                Err(e) => {
                    self.state.prev_step_success = Some(false);
                    error!(step = %step, validator = %name, error = %e, "Validator parameters could not be resolved");
                    self.emit(
                        VALIDATOR_FAILED,
                        json!({"step": step, "validator": name, "error": e.to_string()}),
                    );
                    return Err(e.into());
                }
            };

            self.emit(
                VALIDATOR_STARTED,
                json!({"step": step, "validator": name, "phase": phase}),
            );

            match callable(&params) {
                Ok(value) => {
                    self.state.prev_step_success = Some(true);
                    if let Some(definition) = self.ctx.validators.get_mut(&name) {
                        definition.record_run();
                    }
                    let verdict = value.is_truthy();
                    self.ctx.params.set(RET_VALID_KEY, value.clone());
                    if self.state.validation_success.is_none() {
                        self.state.validation_success = Some(verdict);
                    }
                    ran = true;
                    debug!(step = %step, validator = %name, verdict, "Validator returned");
                    self.emit(
                        VALIDATOR_COMPLETED,
                        json!({"step": step, "validator": name, "ret_valid": value.to_json()}),
                    );
                }
                Err(source) => {
                    self.state.prev_step_success = Some(false);
                    error!(step = %step, validator = %name, error = ?source, "Validator raised an error");
                    self.emit(
                        VALIDATOR_FAILED,
                        json!({"step": step, "validator": name, "error": format!("{source:#}")}),
                    );
                    return Err(ValidationError::new(name, step, source).into());
                }
            }
        }

        if !ran {
            self.state.validation_success = prior;
        }
        Ok(())
    }

    /// Processes one step: Before validation, execution, After validation.
    ///
    /// `first` marks the first step of a run, which sets both flags to true
    /// and resets every validator's run count.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownStep` for an unregistered step, or the
    /// first fatal error raised by a validator or the step body. A failed
    /// report is recorded before the error is returned.
    pub fn process_step(&mut self, name: &str, first: bool) -> Result<StepReport, AlfrdError> {
        if !self.ctx.steps.contains(name) {
            return Err(RegistryError::unknown_step(name).into());
        }
        if first {
            self.state.begin_run();
            self.ctx.validators.reset_run_counts();
        }
        self.set_current_step(name);

        let span = info_span!("step", step = %name, run_id = %self.identity.run_id);
        let _enter = span.enter();
        let timer = SpanTimer::start(name);

        match self.run_phases(name) {
            Ok(ret) => {
                let outcome = if self.state.validation_success == Some(true) {
                    StepOutcome::Finished
                } else {
                    StepOutcome::Skipped
                };
                let report = self.report(name, outcome, timer, ret, None);
                let event = match outcome {
                    StepOutcome::Finished => STEP_FINISHED,
                    _ => STEP_SKIPPED,
                };
                info!(step = %name, %outcome, "Step processed");
                self.emit(event, json!({"step": name, "duration_ms": report.duration.as_secs_f64() * 1000.0}));
                Ok(report)
            }
            Err(e) => {
                let _ = self.report(name, StepOutcome::Failed, timer, None, Some(&e));
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, name: &str) -> Result<Option<ParamValue>, AlfrdError> {
        if self.ctx.bindings.has_validators(Phase::Before, name) && self.state.prev_ok() {
            self.set_active_phase(Phase::Before);
            self.run_validations()?;
        }

        let ret = if self.state.ready() {
            Some(self.run_step()?)
        } else {
            debug!(
                step = %name,
                prev_step_success = ?self.state.prev_step_success,
                validation_success = ?self.state.validation_success,
                "Not executing step"
            );
            None
        };

        if self.ctx.bindings.has_validators(Phase::After, name) && self.state.ready() {
            self.set_active_phase(Phase::After);
            self.run_validations()?;
        }
        Ok(ret)
    }

    fn report(
        &mut self,
        name: &str,
        outcome: StepOutcome,
        timer: SpanTimer,
        ret: Option<ParamValue>,
        error: Option<&AlfrdError>,
    ) -> StepReport {
        let report = StepReport {
            step: name.to_string(),
            outcome,
            prev_step_success: self.state.prev_step_success,
            validation_success: self.state.validation_success,
            duration: timer.finish(),
            ret,
            error: error.map(ToString::to_string),
            error_kind: error.map(AlfrdError::kind),
        };
        self.reports.push(report.clone());
        report
    }

    /// Runs a sequence of steps, the first of which starts the run.
    ///
    /// Every name is checked before anything executes. Previous reports are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error; `reports()` still holds every report
    /// up to and including the failed step.
    pub fn run(&mut self, steps: &[String]) -> Result<RunSummary, AlfrdError> {
        if let Some(unknown) = steps.iter().find(|s| !self.ctx.steps.contains(s)) {
            return Err(RegistryError::unknown_step(unknown).into());
        }

        self.reports.clear();
        info!(run_id = %self.identity.run_id, steps = ?steps, "Starting run");

        for (i, step) in steps.iter().enumerate() {
            self.process_step(step, i == 0)?;
        }

        Ok(RunSummary {
            run_id: self.identity.run_id,
            reports: self.reports.clone(),
        })
    }
}
