use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config as NotifyConfig, PollWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer_opt, Config as DebouncerConfig, DebouncedEventKind};
use tracing::{debug, error, info, warn};

use crate::config::{ProjectLayout, WatchConfig};
use crate::error::WatchError;
use crate::pipeline::{Pipeline, ProgressReporter};

/// Polls a source tree for changes to LaTeX inputs.
pub struct SourceWatcher {
    directory: PathBuf,
    ignored: Vec<PathBuf>,
    extensions: Vec<String>,
    poll_interval: Duration,
    debounce: Duration,
}

impl SourceWatcher {
    pub fn new<P: AsRef<Path>>(directory: P, config: &WatchConfig) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            ignored: Vec::new(),
            extensions: config.extensions.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            debounce: Duration::from_millis(config.debounce_ms),
        }
    }

    /// Watches the LaTeX directory, ignoring the output and auxiliary directories.
    pub fn for_project(layout: &ProjectLayout, config: &WatchConfig) -> Self {
        Self::new(&layout.latex_directory, config).ignoring(vec![
            layout.output_directory.clone(),
            layout.auxiliary_directory.clone(),
        ])
    }

    pub fn ignoring(mut self, directories: Vec<PathBuf>) -> Self {
        self.ignored = directories;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// A change to `path` should trigger a rebuild.
    pub fn is_relevant(&self, path: &Path) -> bool {
        if self.ignored.iter().any(|dir| path.starts_with(dir)) {
            return false;
        }

        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        if hidden {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    /// Blocks until `shutdown` is set, calling `on_change` with the relevant paths of
    /// each debounced batch of events.
    pub fn watch<F>(&self, mut on_change: F, shutdown: Arc<AtomicBool>) -> Result<(), WatchError>
    where
        F: FnMut(&[PathBuf]),
    {
        if !self.directory.is_dir() {
            return Err(WatchError::SourceNotFound(self.directory.clone()));
        }

        // Polling works the same on network mounts and inside containers
        let poll_config = NotifyConfig::default().with_poll_interval(self.poll_interval);

        let debouncer_config = DebouncerConfig::default()
            .with_timeout(self.debounce)
            .with_notify_config(poll_config);

        let (tx, rx) = std::sync::mpsc::channel();

        let mut debouncer = new_debouncer_opt::<_, PollWatcher>(debouncer_config, tx)
            .map_err(|e| WatchError::WatcherInit(e.to_string()))?;

        debouncer
            .watcher()
            .watch(&self.directory, RecursiveMode::Recursive)
            .map_err(|e| WatchError::WatchPath {
                path: self.directory.clone(),
                reason: e.to_string(),
            })?;

        info!("Watching {} for changes", self.directory.display());

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("Watch mode shutting down...");
                break;
            }

            match rx.recv_timeout(Duration::from_millis(100)) {
                Ok(Ok(events)) => {
                    let mut changed: Vec<PathBuf> = events
                        .into_iter()
                        .filter(|event| matches!(event.kind, DebouncedEventKind::Any))
                        .map(|event| event.path)
                        .filter(|path| self.is_relevant(path))
                        .collect();
                    changed.sort();
                    changed.dedup();

                    if changed.is_empty() {
                        continue;
                    }
                    for path in &changed {
                        debug!("Changed: {}", path.display());
                    }
                    on_change(&changed);
                }
                Ok(Err(errors)) => {
                    warn!("Watch error: {:?}", errors);
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    continue;
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    error!("Watch channel disconnected");
                    return Err(WatchError::ChannelClosed);
                }
            }
        }

        Ok(())
    }
}

/// Builds `document` once, then again after every relevant change until `shutdown`
/// is set. Failed builds are reported and do not end the loop. Returns the number of
/// builds run.
pub fn watch_and_build(
    pipeline: &Pipeline,
    document: &Path,
    watcher: &SourceWatcher,
    shutdown: Arc<AtomicBool>,
    progress: &dyn ProgressReporter,
) -> Result<usize, WatchError> {
    let mut builds = 0usize;

    let mut rebuild = || {
        let result = pipeline.build(document, progress);
        builds += 1;
        if let Some(error) = &result.error {
            warn!("Build failed, waiting for changes: {}", error);
        }
    };

    rebuild();
    watcher.watch(
        |changed| {
            info!(
                "{} file(s) changed, rebuilding {}",
                changed.len(),
                document.display()
            );
            rebuild();
        },
        shutdown,
    )?;

    Ok(builds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::pipeline::progress::testing::RecordingProgress;
    use crate::pipeline::{PipelineConfig, ProgressEvent};
    use crate::tool::testing::{Behavior, FakeRunner};
    use serial_test::serial;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;
    use tempfile::TempDir;

    fn fast_config() -> WatchConfig {
        WatchConfig {
            poll_interval_ms: 50,
            debounce_ms: 50,
            ..Default::default()
        }
    }

    #[test]
    fn test_is_relevant() {
        let layout = ProjectLayout::resolve("/p", &Config::default());
        let watcher = SourceWatcher::for_project(&layout, &WatchConfig::default());

        assert!(watcher.is_relevant(Path::new("/p/latex/main.tex")));
        assert!(watcher.is_relevant(Path::new("/p/latex/references.bib")));
        assert!(watcher.is_relevant(Path::new("/p/latex/sections/intro.tex")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/main.aux")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/main.pdf")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/auxiliary/main.bbl")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/pdfs/main.tex")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/.main.tex.swp")));
        assert!(!watcher.is_relevant(Path::new("/p/latex/Makefile")));
    }

    #[test]
    fn test_watch_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let watcher = SourceWatcher::new(tmp.path().join("missing"), &fast_config());
        let result = watcher.watch(|_| {}, Arc::new(AtomicBool::new(true)));
        assert!(matches!(result, Err(WatchError::SourceNotFound(_))));
    }

    #[test]
    fn test_watch_returns_when_shutdown_already_set() {
        let tmp = TempDir::new().unwrap();
        let watcher = SourceWatcher::new(tmp.path(), &fast_config());
        let calls = AtomicUsize::new(0);

        watcher
            .watch(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                },
                Arc::new(AtomicBool::new(true)),
            )
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    #[serial]
    fn test_watch_reports_new_source_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let watcher = SourceWatcher::new(&dir, &fast_config());
        let shutdown = Arc::new(AtomicBool::new(false));

        let writer = {
            let dir = dir.clone();
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(300));
                std::fs::write(dir.join("notes.txt"), b"ignored").unwrap();
                std::fs::write(dir.join("intro.tex"), b"\\section{Intro}").unwrap();
                // give up eventually so the test cannot hang
                std::thread::sleep(Duration::from_secs(10));
                shutdown.store(true, Ordering::SeqCst);
            })
        };

        let started = Instant::now();
        let mut seen: Vec<PathBuf> = Vec::new();
        watcher
            .watch(
                |changed| {
                    seen.extend_from_slice(changed);
                    shutdown.store(true, Ordering::SeqCst);
                },
                shutdown.clone(),
            )
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(seen.iter().any(|p| p.ends_with("intro.tex")));
        assert!(!seen.iter().any(|p| p.ends_with("notes.txt")));
        drop(writer);
    }

    fn failing_then_working() -> FakeRunner {
        FakeRunner::new()
            .on(
                "pdflatex",
                Behavior {
                    exit_code: 1,
                    stdout: b"! Undefined control sequence.".to_vec(),
                    ..Default::default()
                },
            )
            .on(
                "pdflatex",
                Behavior {
                    creates: vec!["{stem}.pdf".to_string(), "{stem}.log".to_string()],
                    ..Default::default()
                },
            )
    }

    fn project(runner: FakeRunner) -> (TempDir, ProjectLayout, Pipeline) {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let layout = ProjectLayout::resolve(tmp.path(), &config);
        std::fs::create_dir_all(&layout.latex_directory).unwrap();
        std::fs::write(
            layout.latex_directory.join("main.tex"),
            "\\documentclass{article}\n",
        )
        .unwrap();
        let pipeline = Pipeline::with_runner(
            Arc::new(PipelineConfig::from_layout(&config, &layout)),
            Arc::new(runner),
        );
        (tmp, layout, pipeline)
    }

    /// Stops the watch loop once a build succeeds.
    struct StopOnSuccess {
        events: RecordingProgress,
        shutdown: Arc<AtomicBool>,
    }

    impl ProgressReporter for StopOnSuccess {
        fn report(&self, event: ProgressEvent) {
            if matches!(event, ProgressEvent::Completed { .. }) {
                self.shutdown.store(true, Ordering::SeqCst);
            }
            self.events.report(event);
        }
    }

    #[test]
    fn test_failed_build_reports_tool_output() {
        let (_tmp, layout, pipeline) = project(failing_then_working());
        let watcher = SourceWatcher::for_project(&layout, &fast_config());
        let progress = RecordingProgress::default();

        let builds = watch_and_build(
            &pipeline,
            &layout.document_path("main.tex"),
            &watcher,
            Arc::new(AtomicBool::new(true)),
            &progress,
        )
        .unwrap();

        assert_eq!(builds, 1);
        match progress.last() {
            Some(ProgressEvent::Failed { error, output, .. }) => {
                assert!(error.starts_with("Error in step 1 (pdflatex)"));
                assert_eq!(output.as_deref(), Some("! Undefined control sequence."));
            }
            other => panic!("expected a failure event, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_rebuilds_after_failed_build() {
        let (_tmp, layout, pipeline) = project(failing_then_working());
        let watcher = SourceWatcher::for_project(&layout, &fast_config());
        let shutdown = Arc::new(AtomicBool::new(false));
        let progress = StopOnSuccess {
            events: RecordingProgress::default(),
            shutdown: shutdown.clone(),
        };

        let writer = {
            let dir = layout.latex_directory.clone();
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(300));
                std::fs::write(dir.join("intro.tex"), b"\\section{Intro}").unwrap();
                // give up eventually so the test cannot hang
                std::thread::sleep(Duration::from_secs(10));
                shutdown.store(true, Ordering::SeqCst);
            })
        };

        let started = Instant::now();
        let builds = watch_and_build(
            &pipeline,
            &layout.document_path("main.tex"),
            &watcher,
            shutdown.clone(),
            &progress,
        )
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(builds >= 2);
        let events = progress.events.events.lock().unwrap();
        let failed = events
            .iter()
            .position(|e| matches!(e, ProgressEvent::Failed { .. }));
        let completed = events
            .iter()
            .position(|e| matches!(e, ProgressEvent::Completed { .. }));
        assert!(matches!((failed, completed), (Some(f), Some(c)) if f < c));
        assert!(layout.output_directory.join("main.pdf").is_file());
        drop(writer);
    }
}
