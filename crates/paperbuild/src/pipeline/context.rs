use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::storage::{ArtifactKind, RelocatedArtifact};

use super::document::SourceDocument;
use super::error::PipelineError;
use super::plan::StepKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct StepRecord {
    pub kind: StepKind,
    pub command: String,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

pub struct PipelineContext {
    // Input
    pub document: SourceDocument,

    // Compile steps, in execution order
    pub steps: Vec<StepRecord>,

    // Relocation result
    pub relocated: Vec<RelocatedArtifact>,
}

impl PipelineContext {
    pub fn new(document: SourceDocument) -> Self {
        Self {
            document,
            steps: Vec::new(),
            relocated: Vec::new(),
        }
    }

    pub fn executed(&self, kind: StepKind) -> bool {
        self.steps
            .iter()
            .any(|s| s.kind == kind && s.outcome != StepOutcome::Skipped)
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.relocated
            .iter()
            .find(|a| a.kind == ArtifactKind::Output)
            .map(|a| a.to.clone())
    }
}

/// Outcome of building one document.
#[derive(Debug)]
pub struct BuildResult {
    pub source_path: PathBuf,
    pub success: bool,
    pub error: Option<PipelineError>,
    /// Relocated rendered document, if one was produced.
    pub output_path: Option<PathBuf>,
    pub relocated: Vec<RelocatedArtifact>,
    pub steps: Vec<StepRecord>,
    pub completed_at: DateTime<Utc>,
}

impl BuildResult {
    pub fn success(ctx: &PipelineContext) -> Self {
        Self {
            source_path: ctx.document.path().to_path_buf(),
            success: true,
            error: None,
            output_path: ctx.output_path(),
            relocated: ctx.relocated.clone(),
            steps: ctx.steps.clone(),
            completed_at: Utc::now(),
        }
    }

    pub fn failure(source_path: PathBuf, steps: Vec<StepRecord>, error: PipelineError) -> Self {
        Self {
            source_path,
            success: false,
            error: Some(error),
            output_path: None,
            relocated: Vec::new(),
            steps,
            completed_at: Utc::now(),
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    pub fn skipped(&self) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Skipped)
            .map(|s| s.kind)
            .collect()
    }
}
