pub mod decode;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

pub use decode::{decode_output, TextEncoding, DEFAULT_ENCODINGS};

/// A single external command, run in `working_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl ToolInvocation {
    pub fn new<P: AsRef<Path>>(program: impl Into<String>, working_dir: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and raw captured streams of a finished process.
#[derive(Debug, Clone, Default)]
pub struct RawOutput {
    /// `None` when the process was terminated by a signal.
    pub status_code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RawOutput {
    /// Decoded stdout and stderr joined by a newline, trimmed.
    pub fn combined(&self, encodings: &[TextEncoding]) -> String {
        let stdout = decode_output(&self.stdout, encodings);
        let stderr = decode_output(&self.stderr, encodings);
        format!("{}\n{}", stdout, stderr).trim().to_string()
    }
}

pub trait CommandRunner: Send + Sync {
    /// Runs the invocation to completion. An `Err` means the process could not be
    /// started at all; a nonzero exit is reported through `RawOutput`.
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<RawOutput>;
}

/// Runs tools as child processes found on `PATH`. Blocks until the child exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &ToolInvocation) -> std::io::Result<RawOutput> {
        debug!(
            "Running `{}` in {}",
            invocation,
            invocation.working_dir.display()
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .output()?;

        Ok(RawOutput {
            status_code: output.status.code(),
            success: output.status.success(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
