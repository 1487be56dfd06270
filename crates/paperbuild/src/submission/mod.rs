//! Packaging a compiled paper for upload to a preprint server.
//!
//! Steps run in a fixed order and stop at the first failure: clean, compile,
//! prepare, archive, test compile (optional), verify.

pub mod archive;
pub mod error;

use std::fmt;
use std::path::PathBuf;

use tracing::{info, info_span};

use crate::config::{ProjectLayout, SubmissionConfig};
use crate::pipeline::{BuildPlan, Pipeline, ProgressEvent, ProgressReporter, SourceDocument};
use crate::storage::{clean_matching, copy_file, move_file};

pub use archive::{collect_entries, expand_stem, write_archive, ArchiveEntry};
pub use error::SubmissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStep {
    Clean,
    Compile,
    Prepare,
    Archive,
    TestCompile,
    Verify,
}

impl SubmissionStep {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clean => "Clean LaTeX directory",
            Self::Compile => "Compile document",
            Self::Prepare => "Prepare submission files",
            Self::Archive => "Create submission archive",
            Self::TestCompile => "Test compilation",
            Self::Verify => "Verify submission package",
        }
    }
}

impl fmt::Display for SubmissionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    pub completed: Vec<SubmissionStep>,
    pub cleaned: Vec<PathBuf>,
    pub archive_path: PathBuf,
    pub entries: Vec<String>,
    pub archive_size: u64,
    pub test_compiled: bool,
}

pub struct SubmissionPackager<'a> {
    pipeline: &'a Pipeline,
    layout: &'a ProjectLayout,
    config: &'a SubmissionConfig,
    document: String,
    test_compile: bool,
}

impl<'a> SubmissionPackager<'a> {
    /// `document` is the main file name inside the LaTeX directory.
    pub fn new(
        pipeline: &'a Pipeline,
        layout: &'a ProjectLayout,
        config: &'a SubmissionConfig,
        document: &str,
    ) -> Self {
        Self {
            pipeline,
            layout,
            config,
            document: document.to_string(),
            test_compile: config.test_compile,
        }
    }

    pub fn with_test_compile(mut self, enabled: bool) -> Self {
        self.test_compile = enabled;
        self
    }

    pub fn archive_path(&self) -> PathBuf {
        self.layout.root.join(&self.config.archive_name)
    }

    fn stem(&self) -> String {
        std::path::Path::new(&self.document)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.document.clone())
    }

    pub fn run(&self, progress: &dyn ProgressReporter) -> Result<SubmissionReport, SubmissionError> {
        let _span = info_span!("submission", document = %self.document).entered();
        let latex_dir = &self.layout.latex_directory;
        if !latex_dir.is_dir() {
            return Err(SubmissionError::MissingLatexDirectory(latex_dir.clone()));
        }

        let mut report = SubmissionReport {
            archive_path: self.archive_path(),
            ..Default::default()
        };

        // Step 1: Clean
        {
            let _step = info_span!("clean").entered();
            report.cleaned =
                clean_matching(latex_dir, &self.config.clean_patterns).map_err(SubmissionError::Clean)?;
            for path in &report.cleaned {
                info!("Removed {}", path.display());
            }
            report.completed.push(SubmissionStep::Clean);
        }

        // Step 2: Compile
        {
            let _step = info_span!("compile").entered();
            let result = self
                .pipeline
                .build(self.layout.document_path(&self.document), progress);
            if let Some(error) = result.error {
                return Err(SubmissionError::Compile(error));
            }
            report.completed.push(SubmissionStep::Compile);
        }

        // Step 3: Bring the bibliography next to the source
        {
            let _step = info_span!("prepare").entered();
            let file_name = format!("{}.bbl", self.stem());
            let source = self.layout.auxiliary_directory.join(&file_name);
            if !source.is_file() {
                return Err(SubmissionError::MissingBibliography(source));
            }
            copy_file(&source, &latex_dir.join(&file_name)).map_err(SubmissionError::Prepare)?;
            info!("Copied {} to {}", file_name, latex_dir.display());
            report.completed.push(SubmissionStep::Prepare);
        }

        // Step 4: Archive
        {
            let _step = info_span!("archive").entered();
            let stem = self.stem();
            let entries = collect_entries(
                latex_dir,
                &expand_stem(&self.config.include, &stem),
                &self.config.include_globs,
                &self.config.archive_prefix,
            )?;
            let size = write_archive(&report.archive_path, &entries)?;
            info!(
                "Created {} ({} entries, {} KB)",
                report.archive_path.display(),
                entries.len(),
                size / 1024
            );

            report.entries = entries.into_iter().map(|e| e.name).collect();
            report.archive_size = size;
            if size > self.config.size_limit_bytes {
                return Err(SubmissionError::TooLarge {
                    size,
                    limit: self.config.size_limit_bytes,
                });
            }
            report.completed.push(SubmissionStep::Archive);
        }

        // Step 5: Make sure the packaged sources still compile on their own
        if self.test_compile {
            let _step = info_span!("test_compile").entered();
            self.step_test_compile(progress)?;
            report.test_compiled = true;
            report.completed.push(SubmissionStep::TestCompile);
        }

        // Step 6: Verify
        {
            let _step = info_span!("verify").entered();
            let stem = self.stem();
            let mut missing: Vec<String> = expand_stem(&self.config.required, &stem)
                .into_iter()
                .map(|name| latex_dir.join(name))
                .filter(|path| !path.exists())
                .map(|path| path.display().to_string())
                .collect();
            if !report.archive_path.is_file() {
                missing.push(report.archive_path.display().to_string());
            }
            if !missing.is_empty() {
                return Err(SubmissionError::MissingFiles(missing));
            }
            report.completed.push(SubmissionStep::Verify);
        }

        Ok(report)
    }

    fn step_test_compile(&self, progress: &dyn ProgressReporter) -> Result<(), SubmissionError> {
        let document = SourceDocument::new(self.layout.document_path(&self.document))
            .map_err(SubmissionError::TestCompile)?;
        let plan = BuildPlan::primary_only(&document, &self.pipeline.config().toolchain);
        // The rendered PDF lives next to the sources when the output directory is
        // the LaTeX directory; the single pass would overwrite it.
        let pdf = document.artifact("pdf");
        let kept = if self.layout.output_directory == document.directory() && pdf.is_file() {
            let kept = document.artifact("pdf.kept");
            copy_file(&pdf, &kept).map_err(SubmissionError::Clean)?;
            Some(kept)
        } else {
            None
        };

        let mut records = Vec::new();
        let outcome = self.pipeline.execute_plan(&plan, &mut records, progress);
        if let Err(error) = &outcome {
            progress.report(ProgressEvent::failed(document.path(), error));
        }

        // The single pass leaves byproducts and a half-resolved PDF behind either way
        let mut patterns = self.config.clean_patterns.clone();
        patterns.push(format!("{}.pdf", glob::Pattern::escape(document.stem())));
        clean_matching(document.directory(), &patterns).map_err(SubmissionError::Clean)?;
        if let Some(kept) = kept {
            move_file(&kept, &pdf).map_err(SubmissionError::Clean)?;
        }

        outcome.map_err(SubmissionError::TestCompile)
    }
}
