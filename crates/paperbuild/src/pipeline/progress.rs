use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use super::error::PipelineError;
use super::plan::StepKind;

/// Events emitted by the pipeline while building a document.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    DocumentStarted {
        document: PathBuf,
    },
    StepStarted {
        step: StepKind,
        command: String,
    },
    StepSkipped {
        step: StepKind,
        reason: String,
    },
    StepFinished {
        step: StepKind,
        elapsed: Duration,
    },
    Relocated {
        from: PathBuf,
        to: PathBuf,
    },
    Completed {
        document: PathBuf,
        output_path: Option<PathBuf>,
    },
    Failed {
        document: PathBuf,
        error: String,
        /// Captured diagnostics of the tool that failed.
        output: Option<String>,
    },
}

impl ProgressEvent {
    pub fn failed(document: &Path, error: &PipelineError) -> Self {
        Self::Failed {
            document: document.to_path_buf(),
            error: error.to_string(),
            output: error
                .tool_output()
                .filter(|o| !o.trim().is_empty())
                .map(str::to_string),
        }
    }
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards progress to the `tracing` subscriber.
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::DocumentStarted { document } => {
                info!("Compiling {}", document.display());
            }
            ProgressEvent::StepStarted { step, command } => {
                info!("Step {} ({}): {}", step.number(), step, command);
            }
            ProgressEvent::StepSkipped { step, reason } => {
                info!("Skipping {}: {}", step, reason);
            }
            ProgressEvent::StepFinished { step, elapsed } => {
                info!("Finished {} in {:.2?}", step, elapsed);
            }
            ProgressEvent::Relocated { from, to } => {
                info!("Moved {} -> {}", from.display(), to.display());
            }
            ProgressEvent::Completed {
                document,
                output_path,
            } => match output_path {
                Some(path) => info!(
                    "Successfully compiled {} -> {}",
                    document.display(),
                    path.display()
                ),
                None => info!("Successfully compiled {}", document.display()),
            },
            ProgressEvent::Failed {
                document,
                error,
                output,
            } => match output {
                Some(output) => warn!(
                    output = %output,
                    "Compiling {} failed: {}",
                    document.display(),
                    error
                ),
                None => warn!("Compiling {} failed: {}", document.display(), error),
            },
        }
    }
}
