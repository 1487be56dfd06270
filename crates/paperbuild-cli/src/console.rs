use paperbuild::pipeline::StepKind;
use paperbuild::{ProgressEvent, ProgressReporter};

/// Prints build progress for humans on stdout. Captured output of a failed tool
/// goes to stderr.
pub(crate) struct ConsoleProgress;

impl ConsoleProgress {
    /// The line printed for `event`, if any.
    pub(crate) fn render(event: &ProgressEvent) -> Option<String> {
        match event {
            ProgressEvent::DocumentStarted { document } => {
                Some(format!("Compiling {}...", document.display()))
            }
            ProgressEvent::StepStarted { step, command } => {
                Some(format!("  [{}/4] {}", step.number(), command))
            }
            ProgressEvent::StepSkipped { step, reason } => match step {
                StepKind::Bibliography => {
                    Some(format!("  No bibliography ({}), skipping {}.", reason, step))
                }
                _ => Some(format!("  Skipping {}: {}", step, reason)),
            },
            ProgressEvent::StepFinished { .. } | ProgressEvent::Relocated { .. } => None,
            ProgressEvent::Completed {
                document,
                output_path,
            } => Some(match output_path {
                Some(path) => format!(
                    "✓ Successfully compiled {} -> {}",
                    document.display(),
                    path.display()
                ),
                None => format!("✓ Successfully compiled {}", document.display()),
            }),
            ProgressEvent::Failed {
                document, error, ..
            } => Some(format!("✗ {}: {}", document.display(), error)),
        }
    }

    pub(crate) fn diagnostics(event: &ProgressEvent) -> Option<&str> {
        match event {
            ProgressEvent::Failed {
                output: Some(output),
                ..
            } => Some(output),
            _ => None,
        }
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        if let Some(line) = Self::render(&event) {
            println!("{}", line);
        }
        if let Some(output) = Self::diagnostics(&event) {
            eprintln!("{}", output);
        }
    }
}
