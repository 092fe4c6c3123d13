//! Scenario tests for the executor state machine.

#[cfg(test)]
mod tests {
    use crate::errors::{AlfrdError, MissingParametersError};
    use crate::events::CollectingEventSink;
    use crate::executor::{select_steps, PipelineExecutor, StepOutcome};
    use crate::params::{ParamSignature, ParamValue};
    use crate::registry::{Phase, ValidatorOptions};
    use crate::testing::TestPipeline;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn names(steps: &[&str]) -> Vec<String> {
        steps.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_validated_step_finishes() {
        let pipeline = TestPipeline::new()
            .validator("V", ValidatorOptions::new(), true)
            .step("A", ParamSignature::new(), "ok")
            .bind("A", &["V"]);
        let mut executor = pipeline.executor();

        let summary = executor.run(&names(&["A"])).unwrap();

        assert_eq!(summary.finished(), vec!["A"]);
        assert_eq!(executor.params().ret(), Some(&ParamValue::from("ok")));
        assert_eq!(executor.params().ret_valid(), Some(&ParamValue::Bool(true)));
        assert_eq!(pipeline.calls("V"), 1);
        assert_eq!(pipeline.calls("A"), 1);
    }

    #[test]
    fn test_missing_parameter_aborts_without_invoking() {
        let pipeline = TestPipeline::new().step("B", ParamSignature::new().require("n"), 1);
        let mut executor = pipeline.executor();

        let err = executor.run(&names(&["B"])).unwrap_err();

        match err {
            AlfrdError::MissingParameters(MissingParametersError { missing }) => {
                assert_eq!(missing, vec!["n"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(pipeline.probe("B").unwrap().never_called());
        assert_eq!(executor.state().prev_step_success, Some(false));
        assert_eq!(executor.reports().last().unwrap().outcome, StepOutcome::Failed);
    }

    #[test]
    fn test_slice_never_runs_later_steps() {
        let pipeline = TestPipeline::new()
            .step("A", ParamSignature::new(), 1)
            .step("B", ParamSignature::new(), 2)
            .step("C", ParamSignature::new(), 3);
        let mut executor = pipeline.executor();

        let order = executor.context().steps.names();
        let selected = select_steps(&order, "A", Some("B")).unwrap();
        let summary = executor.run(&selected).unwrap();

        assert_eq!(summary.finished(), vec!["A", "B"]);
        assert_eq!(pipeline.calls("C"), 0);
        assert_eq!(executor.params().ret(), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn test_raising_step_halts_run() {
        let pipeline = TestPipeline::new()
            .failing_step("A", "disk full")
            .step("B", ParamSignature::new(), 2);
        let mut executor = pipeline.executor();

        let err = executor.run(&names(&["A", "B"])).unwrap_err();

        assert!(matches!(err, AlfrdError::StepExecution(ref e) if e.step == "A"));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(pipeline.calls("B"), 0);
        assert_eq!(executor.reports().len(), 1);
        assert_eq!(executor.reports()[0].error.as_deref(), Some(err.to_string().as_str()));
        assert_eq!(executor.reports()[0].error_kind, Some("StepExecutionError"));
    }

    #[test]
    fn test_run_once_validator_runs_once_across_steps() {
        let pipeline = TestPipeline::new()
            .validator("V", ValidatorOptions::new().run_once(), true)
            .step("A", ParamSignature::new(), 1)
            .step("B", ParamSignature::new(), 2)
            .bind("A", &["V"])
            .bind("B", &["V"]);
        let mut executor = pipeline.executor();

        let summary = executor.run(&names(&["A", "B"])).unwrap();

        assert_eq!(summary.finished(), vec!["A", "B"]);
        assert_eq!(pipeline.calls("V"), 1);
        assert_eq!(executor.context().validators.get("V").unwrap().run_count(), 1);
    }

    #[test]
    fn test_run_counts_reset_between_runs() {
        let pipeline = TestPipeline::new()
            .validator("V", ValidatorOptions::new().run_once(), true)
            .step("A", ParamSignature::new(), 1)
            .bind("A", &["V"]);
        let mut executor = pipeline.executor();

        executor.run(&names(&["A"])).unwrap();
        executor.run(&names(&["A"])).unwrap();

        assert_eq!(pipeline.calls("V"), 2);
        assert_eq!(executor.context().validators.get("V").unwrap().run_count(), 1);
    }

    #[test]
    fn test_falsy_validator_skips_step_and_later_unvalidated_steps() {
        let pipeline = TestPipeline::new()
            .validator("no", ValidatorOptions::new(), false)
            .validator("yes", ValidatorOptions::new(), true)
            .step("A", ParamSignature::new(), 1)
            .step("B", ParamSignature::new(), 2)
            .step("C", ParamSignature::new(), 3)
            .bind("A", &["no"])
            .bind("C", &["yes"]);
        let mut executor = pipeline.executor();

        let summary = executor.run(&names(&["A", "B", "C"])).unwrap();

        assert_eq!(summary.skipped(), vec!["A", "B"]);
        assert_eq!(summary.finished(), vec!["C"]);
        assert_eq!(pipeline.calls("A"), 0);
        assert_eq!(pipeline.calls("B"), 0);
        assert_eq!(pipeline.calls("C"), 1);
    }

    #[test]
    fn test_first_validator_decides_the_pass() {
        let pipeline = TestPipeline::new()
            .validator("pass", ValidatorOptions::new(), true)
            .validator("fail", ValidatorOptions::new(), 0)
            .step("A", ParamSignature::new(), 1)
            .bind("A", &["pass", "fail"]);
        let mut executor = pipeline.executor();

        let summary = executor.run(&names(&["A"])).unwrap();

        assert_eq!(summary.finished(), vec!["A"]);
        assert_eq!(pipeline.calls("fail"), 1);
        assert_eq!(executor.params().ret_valid(), Some(&ParamValue::Int(0)));
    }

    #[test]
    fn test_false_verdict_skips_remaining_validators() {
        let pipeline = TestPipeline::new()
            .validator("fail", ValidatorOptions::new(), "")
            .validator("pass", ValidatorOptions::new(), true)
            .step("A", ParamSignature::new(), 1)
            .bind("A", &["fail", "pass"]);
        let sink = Arc::new(CollectingEventSink::new());
        let mut executor = pipeline.executor().with_event_sink(sink.clone());

        let summary = executor.run(&names(&["A"])).unwrap();

        assert_eq!(summary.skipped(), vec!["A"]);
        assert_eq!(pipeline.calls("pass"), 0);
        assert_eq!(pipeline.calls("A"), 0);
        assert_eq!(sink.events_of_type("validator.skipped").len(), 1);
    }

    #[test]
    fn test_after_validator_verdict_decides_report() {
        let pipeline = TestPipeline::new()
            .validator("post", ValidatorOptions::new().after(), false)
            .step("A", ParamSignature::new(), "done")
            .bind("A", &["post"]);
        let mut executor = pipeline.executor();

        let summary = executor.run(&names(&["A"])).unwrap();

        assert_eq!(pipeline.calls("A"), 1);
        assert_eq!(summary.skipped(), vec!["A"]);
        assert_eq!(summary.reports[0].ret, Some(ParamValue::from("done")));
    }

    #[test]
    fn test_after_validators_do_not_run_for_skipped_step() {
        let pipeline = TestPipeline::new()
            .validator("pre", ValidatorOptions::new(), false)
            .validator("post", ValidatorOptions::new().after(), true)
            .step("A", ParamSignature::new(), 1)
            .bind("A", &["pre", "post"]);
        let mut executor = pipeline.executor();

        executor.run(&names(&["A"])).unwrap();

        assert_eq!(pipeline.calls("post"), 0);
    }

    #[test]
    fn test_raising_validator_halts_run() {
        let pipeline = TestPipeline::new()
            .failing_validator("V", ValidatorOptions::new(), "not ready")
            .step("A", ParamSignature::new(), 1)
            .step("B", ParamSignature::new(), 2)
            .bind("A", &["V"]);
        let mut executor = pipeline.executor();

        let err = executor.run(&names(&["A", "B"])).unwrap_err();

        match err {
            AlfrdError::Validation(e) => {
                assert_eq!(e.validator, "V");
                assert_eq!(e.step, "A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(pipeline.calls("A"), 0);
        assert_eq!(pipeline.calls("B"), 0);
        assert_eq!(executor.state().prev_step_success, Some(false));
    }

    #[test]
    fn test_validator_missing_parameters() {
        let mut pipeline = TestPipeline::new().step("A", ParamSignature::new(), 1);
        pipeline
            .ctx
            .validator("needs_path")
            .requires("path")
            .register(|_| Ok(ParamValue::Bool(true)))
            .unwrap();
        pipeline.ctx.bind_validators("A", ["needs_path"]).unwrap();
        let mut executor = pipeline.executor();

        let err = executor.run(&names(&["A"])).unwrap_err();

        assert!(matches!(err, AlfrdError::MissingParameters(_)));
        assert_eq!(pipeline.calls("A"), 0);
    }

    #[test]
    fn test_space_overrides_defaults() {
        let pipeline = TestPipeline::new().step(
            "A",
            ParamSignature::new().require("n").with_default("k", 1),
            "ok",
        );
        let mut executor = pipeline.executor();
        executor.merge_params([("n", 2), ("k", 5)]);

        executor.run(&names(&["A"])).unwrap();

        let params = pipeline.probe("A").unwrap().last_params().unwrap();
        assert_eq!(params.int("n").unwrap(), 2);
        assert_eq!(params.int("k").unwrap(), 5);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parameterless_step_gets_empty_params() {
        let pipeline = TestPipeline::new().step("A", ParamSignature::new(), 1);
        let mut executor = pipeline.executor();
        executor.merge_params([("unrelated", "x")]);

        executor.run(&names(&["A"])).unwrap();

        assert!(pipeline.probe("A").unwrap().last_params().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_step_rejected_before_execution() {
        let pipeline = TestPipeline::new().step("A", ParamSignature::new(), 1);
        let mut executor = pipeline.executor();

        let err = executor.run(&names(&["A", "ghost"])).unwrap_err();

        assert!(matches!(err, AlfrdError::Registry(_)));
        assert_eq!(pipeline.calls("A"), 0);
    }

    #[test]
    fn test_step_without_run_start_is_skipped() {
        let pipeline = TestPipeline::new().step("A", ParamSignature::new(), 1);
        let mut executor = pipeline.executor();

        let report = executor.process_step("A", false).unwrap();

        assert_eq!(report.outcome, StepOutcome::Skipped);
        assert_eq!(pipeline.calls("A"), 0);
    }

    #[test]
    fn test_return_value_feeds_next_step() {
        let mut pipeline = TestPipeline::new().step("A", ParamSignature::new(), 20);
        pipeline
            .ctx
            .step("B")
            .requires("ret")
            .register(|p| Ok(ParamValue::Int(p.int("ret")? + 1)))
            .unwrap();
        let mut executor = pipeline.executor();

        executor.run(&names(&["A", "B"])).unwrap();

        assert_eq!(executor.params().ret(), Some(&ParamValue::Int(21)));
    }

    #[test]
    fn test_manual_validation_pass() {
        let pipeline = TestPipeline::new()
            .validator("post", ValidatorOptions::new().after(), true)
            .step("A", ParamSignature::new(), 1)
            .bind("A", &["post"]);
        let mut executor = pipeline.executor();

        executor.set_current_step("A");
        executor.set_active_phase(Phase::Before);
        executor.run_validations().unwrap();
        assert_eq!(pipeline.calls("post"), 0);
        assert_eq!(executor.state().validation_success, None);

        executor.set_active_phase(Phase::After);
        executor.run_validations().unwrap();
        assert_eq!(pipeline.calls("post"), 1);
        assert_eq!(executor.state().validation_success, Some(true));

        assert_eq!(executor.run_step().unwrap(), ParamValue::Int(1));
        assert_eq!(executor.state().prev_step_success, Some(true));
    }

    #[test]
    fn test_event_sequence() {
        let pipeline = TestPipeline::new()
            .validator("V", ValidatorOptions::new(), true)
            .step("A", ParamSignature::new(), "ok")
            .bind("A", &["V"]);
        let sink = Arc::new(CollectingEventSink::new());
        let mut executor = pipeline.executor().with_event_sink(sink.clone());

        executor.run(&names(&["A"])).unwrap();

        assert_eq!(
            sink.event_types(),
            vec![
                "validator.started",
                "validator.completed",
                "step.started",
                "step.completed",
                "step.finished",
            ]
        );
        let first = &sink.events()[0];
        assert_eq!(first.field("validator"), Some("V"));
        let run_id = executor.identity().run_id.to_string();
        assert_eq!(first.field("run_id"), Some(run_id.as_str()));
        assert!(first.field("started_at").is_some());
        assert_eq!(first.data.as_ref().unwrap()["project"], serde_json::Value::Null);
        assert_eq!(sink.step_sequence("step.finished"), vec!["A"]);
    }

    #[test]
    fn test_into_context_keeps_params() {
        let pipeline = TestPipeline::new().step("A", ParamSignature::new(), "ok");
        let mut executor = PipelineExecutor::new(pipeline.ctx.clone());
        executor.run(&names(&["A"])).unwrap();

        let ctx = executor.into_context();
        assert_eq!(ctx.params.ret(), Some(&ParamValue::from("ok")));
    }
}
