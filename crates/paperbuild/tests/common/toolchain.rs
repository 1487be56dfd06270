//! A fake TeX toolchain driven by the document source.
//!
//! The engine writes `<stem>.pdf`, `.aux` and `.log`, plus `<stem>.bcf` when the source
//! contains `\addbibresource`. A source containing `\undefined` fails with exit status 1.
//! The bibliography tool writes `<stem>.bbl` and `<stem>.blg`.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use paperbuild::tool::RawOutput;
use paperbuild::{CommandRunner, ToolInvocation};

pub struct ScriptedToolchain {
    engine: String,
    bibliography_tool: String,
    missing: HashSet<String>,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self {
            engine: "pdflatex".to_string(),
            bibliography_tool: "biber".to_string(),
            missing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn engine(mut self, name: &str) -> Self {
        self.engine = name.to_string();
        self
    }

    /// Launching `program` fails as if it were not installed.
    pub fn without(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.program).collect()
    }

    fn run_engine(&self, dir: &Path, file: &str) -> io::Result<RawOutput> {
        let stem = file.trim_end_matches(".tex");
        let source = std::fs::read_to_string(dir.join(file))?;
        std::fs::write(dir.join(format!("{}.log", stem)), "This is pdfTeX")?;

        if source.contains("\\undefined") {
            return Ok(RawOutput {
                status_code: Some(1),
                success: false,
                stdout: b"! Undefined control sequence.\nl.3 \\undefined".to_vec(),
                stderr: Vec::new(),
            });
        }

        std::fs::write(dir.join(format!("{}.aux", stem)), "\\relax")?;
        std::fs::write(dir.join(format!("{}.pdf", stem)), "%PDF-1.5")?;
        if source.contains("\\addbibresource") {
            std::fs::write(dir.join(format!("{}.bcf", stem)), "<bcf/>")?;
        }

        Ok(RawOutput {
            status_code: Some(0),
            success: true,
            stdout: format!("Output written on {}.pdf", stem).into_bytes(),
            stderr: Vec::new(),
        })
    }

    fn run_bibliography(&self, dir: &Path, stem: &str) -> io::Result<RawOutput> {
        std::fs::write(dir.join(format!("{}.bbl", stem)), "\\begin{thebibliography}")?;
        std::fs::write(dir.join(format!("{}.blg", stem)), "INFO - done")?;
        Ok(RawOutput {
            status_code: Some(0),
            success: true,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

impl Default for ScriptedToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for ScriptedToolchain {
    fn run(&self, invocation: &ToolInvocation) -> io::Result<RawOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        if self.missing.contains(&invocation.program) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "not installed"));
        }

        let target = invocation.args.last().cloned().unwrap_or_default();
        if invocation.program == self.engine {
            self.run_engine(&invocation.working_dir, &target)
        } else if invocation.program == self.bibliography_tool {
            self.run_bibliography(&invocation.working_dir, &target)
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, "unknown program"))
        }
    }
}
