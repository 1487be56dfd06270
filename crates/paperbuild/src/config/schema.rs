use serde::{Deserialize, Serialize};

use crate::tool::{TextEncoding, DEFAULT_ENCODINGS};

pub const CONFIG_VERSION: &str = "1.0";

/// Contents of `paperbuild.json`. Every section except `version` may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Directory holding the sources, relative to the project root.
    #[serde(default = "default_latex_directory")]
    pub latex_directory: String,
    /// Rendered results, relative to the LaTeX directory.
    #[serde(default = "default_output_directory")]
    pub output_directory: String,
    /// Build byproducts, relative to the LaTeX directory.
    #[serde(default = "default_auxiliary_directory")]
    pub auxiliary_directory: String,
    #[serde(default = "default_document")]
    pub default_document: String,
    /// Standalone documents rendered by `paperbuild all`. Empty means discover them.
    #[serde(default = "default_documents")]
    pub documents: Vec<String>,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

fn default_latex_directory() -> String {
    "latex".to_string()
}

fn default_output_directory() -> String {
    "pdfs".to_string()
}

fn default_auxiliary_directory() -> String {
    "auxiliary".to_string()
}

fn default_document() -> String {
    "main.tex".to_string()
}

fn default_documents() -> Vec<String> {
    vec![default_document()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            latex_directory: default_latex_directory(),
            output_directory: default_output_directory(),
            auxiliary_directory: default_auxiliary_directory(),
            default_document: default_document(),
            documents: default_documents(),
            toolchain: ToolchainConfig::default(),
            artifacts: ArtifactsConfig::default(),
            watch: WatchConfig::default(),
            submission: SubmissionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_engine")]
    pub engine: String,
    #[serde(default = "default_engine_args")]
    pub engine_args: Vec<String>,
    #[serde(default = "default_bibliography_tool")]
    pub bibliography_tool: String,
    #[serde(default)]
    pub bibliography_args: Vec<String>,
    /// Extension of the file whose presence after the first pass requests a
    /// bibliography run.
    #[serde(default = "default_bibliography_control")]
    pub bibliography_control: String,
    #[serde(default = "default_encodings")]
    pub output_encodings: Vec<TextEncoding>,
}

fn default_engine() -> String {
    "pdflatex".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["-interaction=nonstopmode".to_string()]
}

fn default_bibliography_tool() -> String {
    "biber".to_string()
}

fn default_bibliography_control() -> String {
    "bcf".to_string()
}

fn default_encodings() -> Vec<TextEncoding> {
    DEFAULT_ENCODINGS.to_vec()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engine_args: default_engine_args(),
            bibliography_tool: default_bibliography_tool(),
            bibliography_args: Vec::new(),
            bibliography_control: default_bibliography_control(),
            output_encodings: default_encodings(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_output_extensions")]
    pub output_extensions: Vec<String>,
    #[serde(default = "default_auxiliary_extensions")]
    pub auxiliary_extensions: Vec<String>,
}

fn default_output_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_auxiliary_extensions() -> Vec<String> {
    [
        "aux", "log", "out", "toc", "bbl", "blg", "lof", "lot", "bcf", "run.xml", "synctex.gz",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            output_extensions: default_output_extensions(),
            auxiliary_extensions: default_auxiliary_extensions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Source extensions whose changes trigger a rebuild.
    #[serde(default = "default_watch_extensions")]
    pub extensions: Vec<String>,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_watch_extensions() -> Vec<String> {
    ["tex", "bib", "sty", "cls", "bst"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            extensions: default_watch_extensions(),
        }
    }
}

/// Submission archive settings. File entries may contain `{stem}`, replaced by the
/// default document's stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Archive path, relative to the project root.
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    /// Directory prefix for every entry inside the archive.
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    /// Glob patterns relative to the LaTeX directory.
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_required")]
    pub required: Vec<String>,
    #[serde(default = "default_clean_patterns")]
    pub clean_patterns: Vec<String>,
    #[serde(default = "default_size_limit_bytes")]
    pub size_limit_bytes: u64,
    #[serde(default = "default_true")]
    pub test_compile: bool,
}

fn default_archive_name() -> String {
    "submission.zip".to_string()
}

fn default_archive_prefix() -> String {
    "latex".to_string()
}

fn default_include() -> Vec<String> {
    [
        "{stem}.tex",
        "{stem}.bbl",
        "references.bib",
        "macros.tex",
        "README_SUBMISSION.md",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_include_globs() -> Vec<String> {
    vec!["sections/*.tex".to_string(), "figures/*.pdf".to_string()]
}

fn default_required() -> Vec<String> {
    ["{stem}.tex", "{stem}.bbl", "references.bib"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_clean_patterns() -> Vec<String> {
    [
        "*.aux",
        "*.log",
        "*.out",
        "*.toc",
        "*.bcf",
        "*.run.xml",
        "*.synctex.gz",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_size_limit_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            archive_name: default_archive_name(),
            archive_prefix: default_archive_prefix(),
            include: default_include(),
            include_globs: default_include_globs(),
            required: default_required(),
            clean_patterns: default_clean_patterns(),
            size_limit_bytes: default_size_limit_bytes(),
            test_compile: true,
        }
    }
}
