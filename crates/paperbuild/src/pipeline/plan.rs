use std::fmt;
use std::path::PathBuf;

use crate::config::ToolchainConfig;
use crate::tool::{TextEncoding, ToolInvocation};

use super::document::SourceDocument;

/// External tools and flags used for a build.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub engine: String,
    pub engine_args: Vec<String>,
    pub bibliography_tool: String,
    pub bibliography_args: Vec<String>,
    pub bibliography_control: String,
    pub output_encodings: Vec<TextEncoding>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::from(&ToolchainConfig::default())
    }
}

impl From<&ToolchainConfig> for Toolchain {
    fn from(config: &ToolchainConfig) -> Self {
        Self {
            engine: config.engine.clone(),
            engine_args: config.engine_args.clone(),
            bibliography_tool: config.bibliography_tool.clone(),
            bibliography_args: config.bibliography_args.clone(),
            bibliography_control: config.bibliography_control.clone(),
            output_encodings: config.output_encodings.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Primary,
    Bibliography,
    Secondary,
    Tertiary,
}

impl StepKind {
    /// 1-based position in the full chain.
    pub fn number(&self) -> usize {
        match self {
            Self::Primary => 1,
            Self::Bibliography => 2,
            Self::Secondary => 3,
            Self::Tertiary => 4,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary pass",
            Self::Bibliography => "bibliography pass",
            Self::Secondary => "secondary pass",
            Self::Tertiary => "tertiary pass",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct BuildStep {
    pub kind: StepKind,
    pub invocation: ToolInvocation,
    /// The step is skipped when this file is absent at the moment it is reached.
    pub precondition: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct BuildPlan {
    steps: Vec<BuildStep>,
}

impl BuildPlan {
    /// primary → bibliography (if `<stem>.<control>` exists) → secondary → tertiary
    pub fn for_document(document: &SourceDocument, toolchain: &Toolchain) -> Self {
        let bibliography = BuildStep {
            kind: StepKind::Bibliography,
            invocation: ToolInvocation::new(&toolchain.bibliography_tool, document.directory())
                .args(toolchain.bibliography_args.iter().cloned())
                .arg(document.stem()),
            precondition: Some(document.artifact(&toolchain.bibliography_control)),
        };

        Self {
            steps: vec![
                engine_step(StepKind::Primary, document, toolchain),
                bibliography,
                engine_step(StepKind::Secondary, document, toolchain),
                engine_step(StepKind::Tertiary, document, toolchain),
            ],
        }
    }

    /// A single engine pass, used to check that a document still compiles.
    pub fn primary_only(document: &SourceDocument, toolchain: &Toolchain) -> Self {
        Self {
            steps: vec![engine_step(StepKind::Primary, document, toolchain)],
        }
    }

    pub fn steps(&self) -> &[BuildStep] {
        &self.steps
    }
}

fn engine_step(kind: StepKind, document: &SourceDocument, toolchain: &Toolchain) -> BuildStep {
    BuildStep {
        kind,
        invocation: ToolInvocation::new(&toolchain.engine, document.directory())
            .args(toolchain.engine_args.iter().cloned())
            .arg(document.file_name()),
        precondition: None,
    }
}
