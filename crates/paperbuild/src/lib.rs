pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod storage;
pub mod submission;
pub mod tool;
pub mod watch;

pub use batch::{build_all, resolve_documents, BatchReport};
pub use config::{load_config, load_project_config, Config, ProjectLayout};
pub use error::{ConfigError, PaperbuildError, Result, StorageError, WatchError};
pub use pipeline::{
    BuildResult, NoopProgress, Pipeline, PipelineConfig, PipelineContext, PipelineError,
    ProgressEvent, ProgressReporter, SourceDocument, TracingProgress,
};
pub use submission::{SubmissionError, SubmissionPackager, SubmissionReport, SubmissionStep};
pub use tool::{CommandRunner, SystemRunner, TextEncoding, ToolInvocation};
pub use watch::{watch_and_build, SourceWatcher};
