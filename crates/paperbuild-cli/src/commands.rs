//! Command dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use paperbuild::config::load_project_config;
use paperbuild::{
    build_all, resolve_documents, watch_and_build, CommandRunner, Config,
    PaperbuildError, Pipeline, PipelineConfig, PipelineError, ProgressReporter, ProjectLayout,
    SourceWatcher, SubmissionPackager, SubmissionReport, SystemRunner, TracingProgress,
};
use tracing::{info, warn};

use crate::cli::{Cli, Command, LogFormat};
use crate::console::ConsoleProgress;

pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;

/// Run the CLI command with the real toolchain.
pub(crate) fn run(cli: Cli) -> ExitCode {
    match dispatch(&cli, Arc::new(SystemRunner)) {
        Ok(true) => ExitCode::from(EXIT_SUCCESS),
        Ok(false) => ExitCode::from(EXIT_ERROR),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

struct Project {
    config: Config,
    layout: ProjectLayout,
    pipeline: Pipeline,
    progress: Box<dyn ProgressReporter>,
}

fn open_project(cli: &Cli, runner: Arc<dyn CommandRunner>) -> paperbuild::Result<Project> {
    let config = load_project_config(&cli.root, cli.config.as_deref())?;
    let layout = ProjectLayout::resolve(&cli.root, &config);
    if !layout.latex_directory.is_dir() {
        return Err(PaperbuildError::MissingLatexDirectory(
            layout.latex_directory.clone(),
        ));
    }

    // Fatal before any command runs, watch mode included
    let pipeline_config = PipelineConfig::from_layout(&config, &layout);
    pipeline_config.artifact_layout().ensure_directories()?;
    let pipeline = Pipeline::with_runner(Arc::new(pipeline_config), runner);

    // JSON logs carry progress as events instead of console lines
    let progress: Box<dyn ProgressReporter> = match cli.log_format {
        LogFormat::Text => Box::new(ConsoleProgress),
        LogFormat::Json => Box::new(TracingProgress),
    };

    Ok(Project {
        config,
        layout,
        pipeline,
        progress,
    })
}

/// `Ok(false)` means the command ran but something failed; `Err` is a fatal
/// up-front error.
pub(crate) fn dispatch(cli: &Cli, runner: Arc<dyn CommandRunner>) -> paperbuild::Result<bool> {
    let project = open_project(cli, runner)?;

    match &cli.command {
        None if cli.watch => cmd_watch(&project, cli.file.as_deref()),
        None => cmd_compile(&project, cli.file.as_deref()),
        Some(Command::All) => cmd_all(&project),
        Some(Command::Submit { skip_test_compile }) => cmd_submit(&project, *skip_test_compile),
    }
}

fn document_path(project: &Project, file: Option<&str>) -> paperbuild::Result<PathBuf> {
    let name = file.unwrap_or(&project.config.default_document);
    let path = project.layout.document_path(name);
    if !path.is_file() {
        return Err(PipelineError::MissingDocument(path).into());
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

fn cmd_compile(project: &Project, file: Option<&str>) -> paperbuild::Result<bool> {
    let path = document_path(project, file)?;
    let result = project.pipeline.build(&path, project.progress.as_ref());
    Ok(result.success)
}

fn cmd_watch(project: &Project, file: Option<&str>) -> paperbuild::Result<bool> {
    let path = document_path(project, file)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!("Could not install Ctrl+C handler: {}", e);
    }

    let watcher = SourceWatcher::for_project(&project.layout, &project.config.watch);
    println!(
        "Watching {} for changes. Press Ctrl+C to stop.",
        watcher.directory().display()
    );

    let builds = watch_and_build(
        &project.pipeline,
        &path,
        &watcher,
        shutdown,
        project.progress.as_ref(),
    )?;
    info!("Watch mode stopped after {} builds", builds);
    Ok(true)
}

fn cmd_all(project: &Project) -> paperbuild::Result<bool> {
    let documents = resolve_documents(&project.config, &project.layout)?;
    if documents.is_empty() {
        println!(
            "No standalone documents found in {}",
            project.layout.latex_directory.display()
        );
        return Ok(true);
    }

    // Failures and their diagnostics were already reported per document
    let report = build_all(&project.pipeline, &documents, project.progress.as_ref());
    println!(
        "Rendered {} of {} documents",
        report.succeeded().len(),
        report.len()
    );
    Ok(report.is_success())
}

fn cmd_submit(project: &Project, skip_test_compile: bool) -> paperbuild::Result<bool> {
    let packager = SubmissionPackager::new(
        &project.pipeline,
        &project.layout,
        &project.config.submission,
        &project.config.default_document,
    )
    .with_test_compile(project.config.submission.test_compile && !skip_test_compile);

    match packager.run(project.progress.as_ref()) {
        Ok(report) => {
            print_submission(&report);
            Ok(true)
        }
        Err(e) => {
            eprintln!("✗ Failed at step: {}", e.step());
            Err(e.into())
        }
    }
}

fn print_submission(report: &SubmissionReport) {
    for step in &report.completed {
        println!("✓ {}", step);
    }
    println!();
    println!(
        "Submission ready: {} ({} files, {} KB)",
        report.archive_path.display(),
        report.entries.len(),
        report.archive_size / 1024
    );
    println!("Next steps:");
    println!("  1. Upload the archive on the submission page");
    println!("  2. Check the server-side compiled preview");
    println!("  3. Review the metadata and submit");
}
