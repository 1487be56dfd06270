//! Argument definitions and tracing setup.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// paperbuild: compile a LaTeX paper and sort the build output.
#[derive(Parser, Debug)]
#[command(
    name = "paperbuild",
    version,
    about = "Compile LaTeX documents, organize build artifacts and package submissions.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Document to compile, relative to the LaTeX directory.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Rebuild whenever a source file changes.
    #[arg(short, long)]
    pub watch: bool,

    /// Project root containing the LaTeX directory.
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Config file (defaults to <root>/paperbuild.json when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Rejects `--watch` together with a subcommand; only the default compile
    /// can be watched.
    pub(crate) fn validate(&self) -> Result<(), clap::Error> {
        if self.watch && self.command.is_some() {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "--watch cannot be used with a subcommand",
            ));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Render every standalone document in the LaTeX directory.
    All,

    /// Clean, compile and package the paper into a submission archive.
    Submit {
        /// Skip the final single-pass compile of the packaged sources.
        #[arg(long)]
        skip_test_compile: bool,
    },
}

/// `RUST_LOG` wins over `-v`.
pub(crate) fn env_filter(verbose: u8) -> EnvFilter {
    let default = match verbose {
        0 => "paperbuild=info",
        1 => "paperbuild=debug",
        _ => "paperbuild=trace",
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber (stderr) and forwards `log` records from
/// dependencies into it.
pub(crate) fn init_tracing(cli: &Cli) {
    let filter = env_filter(cli.verbose);

    let installed = match cli.log_format {
        LogFormat::Text => {
            let subscriber = Registry::default().with(filter).with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            );
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    if installed.is_ok() {
        let _ = tracing_log::LogTracer::init();
    }
}
