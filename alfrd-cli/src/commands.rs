//! Subcommand implementations.
//!
//! Every command writes its user-facing output to `out` so it can be tested
//! without a terminal.

use alfrd::config::AlfrdConfig;
use alfrd::context::{PipelineContext, RunIdentity};
use alfrd::errors::{AlfrdError, ProjectError, SelectionError};
use alfrd::events::LoggingEventSink;
use alfrd::executor::{check_steps, select_steps, PipelineExecutor};
use alfrd::params::{read_input_files, ParamValue};
use alfrd::project::Project;
use alfrd::runlog::{CsvRunLog, RunLog};
use anyhow::Context as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Arguments of `alfrd run`.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub step: String,
    pub proj: String,
    pub params: Vec<String>,
    pub step_to: Option<String>,
    pub steps: Vec<String>,
    pub log_csv: Option<PathBuf>,
}

/// Returns the kind of the first alfrd error in the chain, for the exit
/// diagnostic.
pub fn error_kind(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<AlfrdError>() {
            Some(e.kind())
        } else if cause.is::<ProjectError>() {
            Some("ProjectError")
        } else if cause.is::<SelectionError>() {
            Some("SelectionError")
        } else {
            None
        }
    })
}

pub fn init(config: &AlfrdConfig, proj: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let (project, created) = Project::init(config, proj)?;
    if created {
        writeln!(out, "Created project directory at {}", project.dir().display())?;
    } else {
        writeln!(out, "Project directory already exists at {}", project.dir().display())?;
    }
    Ok(())
}

fn load(config: &AlfrdConfig, proj: &str, out: &mut impl Write) -> anyhow::Result<PipelineContext> {
    let project = Project::open(config, proj)?;
    let mut ctx = PipelineContext::new();
    let report = project.load(config, &mut ctx)?;
    for warning in &report.warnings {
        writeln!(out, "{warning}")?;
    }
    Ok(ctx)
}

pub fn ls(config: &AlfrdConfig, proj: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let ctx = load(config, proj, out)?;

    writeln!(out, "\n\t\tALFRD ({})\n", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "  Run following pipeline steps for {}", proj.to_uppercase())?;
    if ctx.steps.is_empty() {
        writeln!(out, "No pipeline steps registered.")?;
    }
    for (i, step) in ctx.steps.iter().enumerate() {
        writeln!(out, "- {i}\t {:<20}: {}", step.name, step.description)?;
    }
    Ok(())
}

/// Turns `run` arguments into parameters.
///
/// Arguments without `=` that name existing files are read as input files
/// first; `key=value` arguments are applied on top, split at the first `=`.
pub fn collect_params(args: &[String]) -> anyhow::Result<Vec<(String, ParamValue)>> {
    let mut params = Vec::new();

    for arg in args.iter().filter(|a| !a.contains('=')) {
        let path = Path::new(arg);
        if !path.is_file() {
            warn!(arg = %arg, "Ignoring argument that is neither key=value nor a file");
            continue;
        }
        let path = path
            .canonicalize()
            .with_context(|| format!("cannot resolve input file {arg}"))?;
        let folder = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let input = read_input_files(folder, &name)?;
        params.extend(input.params);
    }

    for (key, value) in args.iter().filter_map(|a| a.split_once('=')) {
        params.push((key.trim().to_string(), ParamValue::parse(value)));
    }
    Ok(params)
}

pub fn run(config: &AlfrdConfig, args: &RunArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let params = collect_params(&args.params)?;
    let ctx = load(config, &args.proj, out)?;

    let registered = ctx.steps.names();
    let order = if args.steps.is_empty() {
        registered
    } else {
        check_steps(&registered, &args.steps)?
    };
    let selected = select_steps(&order, &args.step, args.step_to.as_deref())?;

    writeln!(out, "Following steps will be executed in the sequence:")?;
    writeln!(out, "{selected:?}\n")?;

    let mut executor = PipelineExecutor::new(ctx)
        .with_identity(RunIdentity::new().with_project(&args.proj))
        .with_event_sink(Arc::new(LoggingEventSink::debug()));
    executor.merge_params(params);

    let result = executor.run(&selected);

    for report in executor.reports() {
        writeln!(out, " {}", report.status_line())?;
    }

    if let Some(path) = &args.log_csv {
        CsvRunLog::new(path)
            .record(executor.identity(), executor.reports(), executor.params())
            .with_context(|| format!("cannot write run log {}", path.display()))?;
    }

    result
        .map(|_| ())
        .with_context(|| format!("run of project '{}' aborted", args.proj))
}

pub fn add(
    config: &AlfrdConfig,
    script: &Path,
    proj: &str,
    symlink: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let project = Project::open(config, proj)?;
    let dest = project.add_plugin(script, symlink)?;
    writeln!(out, "Added plugin to {proj}: {}", dest.display())?;
    Ok(())
}

pub fn rm(config: &AlfrdConfig, proj: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let dir = Project::open(config, proj)?.remove()?;
    writeln!(out, "removed {proj}: {}", dir.display())?;
    Ok(())
}
