use std::path::PathBuf;

use thiserror::Error;

use super::plan::StepKind;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{} not found", .0.display())]
    MissingDocument(PathBuf),

    #[error("Cannot prepare destination directories: {0}")]
    Directory(#[source] crate::error::StorageError),

    #[error("Error in step {} ({tool}): {}", .step.number(), describe_status(.status))]
    ToolFailed {
        step: StepKind,
        tool: String,
        status: Option<i32>,
        /// Decoded stdout and stderr of the failed process.
        output: String,
    },

    #[error("Error in step {} ({tool}): could not be started: {source}", .step.number())]
    ToolLaunch {
        step: StepKind,
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Relocating artifacts failed: {0}")]
    Relocation(#[source] crate::error::StorageError),
}

impl PipelineError {
    /// Captured tool output, if the failure came from a tool that ran.
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Self::ToolFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn failed_step(&self) -> Option<StepKind> {
        match self {
            Self::ToolFailed { step, .. } | Self::ToolLaunch { step, .. } => Some(*step),
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    }
}
