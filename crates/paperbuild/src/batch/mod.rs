//! Rendering every standalone document of a project in one go.
//!
//! Documents are compiled one after another with the same pipeline. A failure is
//! recorded and the batch moves on to the next document.

pub mod discovery;

use std::path::PathBuf;

use tracing::{info, info_span, warn};

use crate::config::{Config, ProjectLayout};
use crate::error::StorageError;
use crate::pipeline::{BuildResult, Pipeline, ProgressReporter};

pub use discovery::{discover_documents, is_standalone};

#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<BuildResult>,
}

impl BatchReport {
    pub fn succeeded(&self) -> Vec<&BuildResult> {
        self.results.iter().filter(|r| r.success).collect()
    }

    pub fn failed(&self) -> Vec<&BuildResult> {
        self.results.iter().filter(|r| !r.success).collect()
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// The configured document list resolved against the LaTeX directory, or the
/// discovered standalone documents when the list is empty.
pub fn resolve_documents(
    config: &Config,
    layout: &ProjectLayout,
) -> Result<Vec<PathBuf>, StorageError> {
    if config.documents.is_empty() {
        return discover_documents(&layout.latex_directory);
    }

    Ok(config
        .documents
        .iter()
        .map(|name| layout.document_path(name))
        .collect())
}

pub fn build_all(
    pipeline: &Pipeline,
    documents: &[PathBuf],
    progress: &dyn ProgressReporter,
) -> BatchReport {
    let _span = info_span!("batch", documents = documents.len()).entered();
    let mut report = BatchReport::default();

    for document in documents {
        let result = pipeline.build(document, progress);
        if let Some(error) = &result.error {
            warn!("{}: {}", document.display(), error);
        }
        report.results.push(result);
    }

    info!(
        "Batch finished: {} succeeded, {} failed",
        report.succeeded().len(),
        report.failed().len()
    );
    report
}
