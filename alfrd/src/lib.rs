//! # alfrd
//!
//! A small step runner for project pipelines.
//!
//! Users register named *steps* and *validators* into a
//! [`PipelineContext`](context::PipelineContext), bind validators to steps as
//! before/after gates, and execute a contiguous slice of the steps against a
//! single shared parameter space:
//!
//! - **Registration**: registries that reject duplicate names and return the
//!   registered callable
//! - **Parameter resolution**: declared required/default parameters are
//!   pulled from the shared space, which always wins over defaults
//! - **Execution**: a per-step state machine that runs pre-validators, the
//!   step body and post-validators, and aborts the run on the first error
//! - **Plugins**: project directories of JSON manifests whose steps run shell
//!   commands
//!
//! ## Quick Start
//!
//! ```rust
//! use alfrd::prelude::*;
//!
//! let mut ctx = PipelineContext::new();
//! ctx.validator("has_input")
//!     .requires("msname")
//!     .register(|p| Ok(ParamValue::Bool(!p.str("msname")?.is_empty())))?;
//! ctx.step("flag")
//!     .requires("msname")
//!     .validate_by(["has_input"])
//!     .register(|p| Ok(format!("flagged {}", p.str("msname")?).into()))?;
//!
//! let mut executor = PipelineExecutor::new(ctx);
//! executor.merge_params([("msname", "m87.ms")]);
//! let summary = executor.run(&["flag".to_string()])?;
//! assert_eq!(summary.finished(), vec!["flag"]);
//! # Ok::<(), alfrd::errors::AlfrdError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod executor;
pub mod observability;
pub mod params;
pub mod plugins;
pub mod project;
pub mod registry;
pub mod runlog;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{AlfrdConfig, LogConfig};
    pub use crate::context::{
        PipelineContext, RunIdentity, StepRegistration, ValidatorRef, ValidatorRegistration,
    };
    pub use crate::errors::{
        AlfrdError, MissingParametersError, PluginLoadError, ProjectError, RegistryError,
        SelectionError, StepExecutionError, ValidationError,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
        RecordedEvent,
    };
    pub use crate::executor::{
        check_steps, select_steps, PipelineExecutor, RunSummary, StepOutcome, StepReport,
    };
    pub use crate::params::{ParamSignature, ParamValue, Params, ParameterSpace};
    pub use crate::plugins::{ManifestPlugin, PluginLoader, PluginModule, Registrations};
    pub use crate::project::Project;
    pub use crate::registry::{callable, Callable, Phase, ValidatorOptions};
    pub use crate::runlog::{CsvRunLog, RunLog};
}
