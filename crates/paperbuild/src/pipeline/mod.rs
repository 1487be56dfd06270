pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod plan;
pub mod progress;
pub mod runner;

pub use config::PipelineConfig;
pub use context::{BuildResult, PipelineContext, StepOutcome, StepRecord};
pub use document::SourceDocument;
pub use error::PipelineError;
pub use plan::{BuildPlan, BuildStep, StepKind, Toolchain};
pub use progress::{NoopProgress, ProgressEvent, ProgressReporter, TracingProgress};
pub use runner::Pipeline;
