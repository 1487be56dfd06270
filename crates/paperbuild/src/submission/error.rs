use std::path::PathBuf;

use thiserror::Error;

use crate::error::StorageError;
use crate::pipeline::PipelineError;

use super::SubmissionStep;

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("LaTeX directory not found at {}", .0.display())]
    MissingLatexDirectory(PathBuf),

    #[error("Cleaning the LaTeX directory failed: {0}")]
    Clean(#[source] StorageError),

    #[error("Compilation failed: {0}")]
    Compile(#[source] PipelineError),

    #[error("{} not found in the auxiliary directory", .0.display())]
    MissingBibliography(PathBuf),

    #[error("Copying the bibliography failed: {0}")]
    Prepare(#[source] StorageError),

    #[error("Invalid include pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to write archive '{path}': {source}")]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write archive '{path}': {source}")]
    ArchiveZip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Test compilation failed: {0}")]
    TestCompile(#[source] PipelineError),

    #[error("Missing required files: {}", .0.join(", "))]
    MissingFiles(Vec<String>),
}

impl SubmissionError {
    /// The step that produced this error.
    pub fn step(&self) -> SubmissionStep {
        match self {
            Self::MissingLatexDirectory(_) | Self::Clean(_) => SubmissionStep::Clean,
            Self::Compile(_) => SubmissionStep::Compile,
            Self::MissingBibliography(_) | Self::Prepare(_) => SubmissionStep::Prepare,
            Self::InvalidPattern { .. }
            | Self::ArchiveIo { .. }
            | Self::ArchiveZip { .. }
            | Self::TooLarge { .. } => SubmissionStep::Archive,
            Self::TestCompile(_) => SubmissionStep::TestCompile,
            Self::MissingFiles(_) => SubmissionStep::Verify,
        }
    }
}
