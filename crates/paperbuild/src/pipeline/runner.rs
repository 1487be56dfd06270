use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info_span};

use crate::storage::ArtifactOrganizer;
use crate::tool::{CommandRunner, SystemRunner};

use super::config::PipelineConfig;
use super::context::{BuildResult, PipelineContext, StepOutcome, StepRecord};
use super::document::SourceDocument;
use super::error::PipelineError;
use super::plan::BuildPlan;
use super::progress::{ProgressEvent, ProgressReporter};

pub struct Pipeline {
    config: Arc<PipelineConfig>,
    runner: Arc<dyn CommandRunner>,
    organizer: ArtifactOrganizer,
}

impl Pipeline {
    /// Production constructor: tools run as child processes.
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        Self::with_runner(config, Arc::new(SystemRunner))
    }

    pub fn with_runner(config: Arc<PipelineConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        let organizer = ArtifactOrganizer::new(config.artifact_layout());
        Self {
            config,
            runner,
            organizer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Compile the document at `path`. A missing file yields a failed result.
    pub fn build<P: AsRef<Path>>(&self, path: P, progress: &dyn ProgressReporter) -> BuildResult {
        let path = path.as_ref();
        match SourceDocument::new(path) {
            Ok(document) => self.run(PipelineContext::new(document), progress).0,
            Err(e) => {
                progress.report(ProgressEvent::failed(path, &e));
                BuildResult::failure(path.to_path_buf(), Vec::new(), e)
            }
        }
    }

    /// Run the full pipeline for a single document.
    /// Returns a (BuildResult, PipelineContext) pair.
    pub fn run(
        &self,
        mut ctx: PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> (BuildResult, PipelineContext) {
        let _pipeline_span = info_span!("build",
            document = %ctx.document.file_name(),
            directory = %ctx.document.directory().display(),
        )
        .entered();

        progress.report(ProgressEvent::DocumentStarted {
            document: ctx.document.path().to_path_buf(),
        });

        // Step 1: Check the source and prepare destinations
        {
            let _step = info_span!("prepare").entered();
            if let Err(e) = self.step_prepare(&ctx) {
                return self.fail(ctx, e, progress);
            }
        }

        // Step 2: Run the tool chain
        {
            let _step = info_span!("compile").entered();
            let plan = BuildPlan::for_document(&ctx.document, &self.config.toolchain);
            if let Err(e) = self.execute_plan(&plan, &mut ctx.steps, progress) {
                return self.fail(ctx, e, progress);
            }
        }

        // Step 3: Relocate artifacts
        {
            let _step = info_span!("relocate").entered();
            if let Err(e) = self.step_relocate(&mut ctx, progress) {
                return self.fail(ctx, e, progress);
            }
        }

        progress.report(ProgressEvent::Completed {
            document: ctx.document.path().to_path_buf(),
            output_path: ctx.output_path(),
        });

        let result = BuildResult::success(&ctx);
        (result, ctx)
    }

    /// Runs the steps of `plan` in order, stopping at the first failure. Every
    /// reached step is appended to `records`.
    pub fn execute_plan(
        &self,
        plan: &BuildPlan,
        records: &mut Vec<StepRecord>,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        for step in plan.steps() {
            let _span = info_span!("step", kind = %step.kind).entered();
            let command = step.invocation.to_string();

            if let Some(precondition) = &step.precondition {
                if !precondition.exists() {
                    let file = precondition
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    debug!("{} not present, skipping {}", file, step.kind);
                    progress.report(ProgressEvent::StepSkipped {
                        step: step.kind,
                        reason: format!("no {} found", file),
                    });
                    records.push(StepRecord {
                        kind: step.kind,
                        command,
                        outcome: StepOutcome::Skipped,
                        elapsed: Default::default(),
                    });
                    continue;
                }
            }

            progress.report(ProgressEvent::StepStarted {
                step: step.kind,
                command: command.clone(),
            });

            let started = Instant::now();
            let outcome = self.runner.run(&step.invocation);
            let elapsed = started.elapsed();

            let output = match outcome {
                Ok(output) => output,
                Err(e) => {
                    records.push(StepRecord {
                        kind: step.kind,
                        command,
                        outcome: StepOutcome::Failed,
                        elapsed,
                    });
                    return Err(PipelineError::ToolLaunch {
                        step: step.kind,
                        tool: step.invocation.program.clone(),
                        source: e,
                    });
                }
            };

            if !output.success {
                records.push(StepRecord {
                    kind: step.kind,
                    command,
                    outcome: StepOutcome::Failed,
                    elapsed,
                });
                return Err(PipelineError::ToolFailed {
                    step: step.kind,
                    tool: step.invocation.program.clone(),
                    status: output.status_code,
                    output: output.combined(&self.config.toolchain.output_encodings),
                });
            }

            debug!(
                "{} finished in {:.2?}: {} bytes of output",
                step.kind,
                elapsed,
                output.stdout.len() + output.stderr.len()
            );
            progress.report(ProgressEvent::StepFinished {
                step: step.kind,
                elapsed,
            });
            records.push(StepRecord {
                kind: step.kind,
                command,
                outcome: StepOutcome::Succeeded,
                elapsed,
            });
        }

        Ok(())
    }

    fn step_prepare(&self, ctx: &PipelineContext) -> Result<(), PipelineError> {
        if !ctx.document.exists() {
            return Err(PipelineError::MissingDocument(
                ctx.document.path().to_path_buf(),
            ));
        }

        self.organizer
            .layout()
            .ensure_directories()
            .map_err(PipelineError::Directory)
    }

    fn step_relocate(
        &self,
        ctx: &mut PipelineContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        let relocated = self
            .organizer
            .relocate(&ctx.document)
            .map_err(PipelineError::Relocation)?;

        for artifact in &relocated {
            progress.report(ProgressEvent::Relocated {
                from: artifact.from.clone(),
                to: artifact.to.clone(),
            });
        }

        ctx.relocated = relocated;
        Ok(())
    }

    fn fail(
        &self,
        ctx: PipelineContext,
        error: PipelineError,
        progress: &dyn ProgressReporter,
    ) -> (BuildResult, PipelineContext) {
        progress.report(ProgressEvent::failed(ctx.document.path(), &error));
        let result =
            BuildResult::failure(ctx.document.path().to_path_buf(), ctx.steps.clone(), error);
        (result, ctx)
    }
}
