//! The `alfrd` command line.

mod commands;

use alfrd::config::AlfrdConfig;
use alfrd::observability::init_tracing;
use clap::{Parser, Subcommand};
use commands::RunArgs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

/// Run project pipeline steps with pre- and post-validation
#[derive(Parser)]
#[command(name = "alfrd", version)]
#[command(about = "Run project pipeline steps with pre- and post-validation", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Home directory (defaults to $ALFRD_HOME or ~/.alfrd)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the project-specific plugin directory
    Init {
        /// Name of the project
        proj: String,
    },
    /// List all available pipeline steps for a project
    Ls {
        /// Name of the project
        proj: String,
    },
    /// Run a pipeline step (or a range of steps) for a project
    Run {
        /// Name of the step to start from
        step: String,
        /// Name of the project
        proj: String,
        /// `key=value` pairs, or paths of input files
        params: Vec<String>,
        /// Run through this step (inclusive)
        #[arg(long)]
        step_to: Option<String>,
        /// Explicit step order; replaces the registration order
        #[arg(long)]
        steps: Vec<String>,
        /// Append step reports to this CSV file
        #[arg(long)]
        log_csv: Option<PathBuf>,
    },
    /// Add a plugin file to a project
    Add {
        /// Path of the plugin file
        script: PathBuf,
        /// Name of the project
        proj: String,
        /// Place a symlink instead of copying the file
        #[arg(long)]
        symlink: bool,
    },
    /// Remove a project
    Rm {
        /// Name of the project
        proj: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e}");
            match commands::error_kind(&e) {
                Some(kind) => eprintln!("Error [{kind}]: {e:?}"),
                None => eprintln!("Error: {e:?}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.home {
        Some(home) => AlfrdConfig::load_from(home)?,
        None => AlfrdConfig::load()?,
    };
    config.log = config.log.with_verbosity(cli.verbose);
    if cli.json_logs {
        config.log.json = true;
    }
    init_tracing(&config.log)?;
    debug!(home = %config.home.display(), "alfrd started");

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Init { proj } => commands::init(&config, &proj, &mut out),
        Commands::Ls { proj } => commands::ls(&config, &proj, &mut out),
        Commands::Run {
            step,
            proj,
            params,
            step_to,
            steps,
            log_csv,
        } => commands::run(
            &config,
            &RunArgs {
                step,
                proj,
                params,
                step_to,
                steps,
                log_csv,
            },
            &mut out,
        ),
        Commands::Add {
            script,
            proj,
            symlink,
        } => commands::add(&config, &script, &proj, symlink, &mut out),
        Commands::Rm { proj } => commands::rm(&config, &proj, &mut out),
    }
}
