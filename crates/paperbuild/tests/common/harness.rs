//! Test harness for isolated test execution.
//!
//! `TestHarness` owns a temporary project root with a LaTeX directory, writes sources
//! and config files into it, and builds documents with a `ScriptedToolchain`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use paperbuild::config::{Config, ProjectLayout};
use paperbuild::{BuildResult, NoopProgress, Pipeline, PipelineConfig};

use super::toolchain::ScriptedToolchain;

pub struct TestHarness {
    temp_dir: TempDir,
    pub root: PathBuf,
    pub config: Config,
    pub toolchain: Arc<ScriptedToolchain>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();
        std::fs::create_dir_all(root.join(&config.latex_directory))
            .expect("Failed to create LaTeX dir");

        Self {
            temp_dir,
            root,
            config,
            toolchain: Arc::new(ScriptedToolchain::new()),
        }
    }

    /// Replace the fake toolchain, e.g. to make a tool unavailable.
    pub fn toolchain(mut self, toolchain: ScriptedToolchain) -> Self {
        self.toolchain = Arc::new(toolchain);
        self
    }

    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::resolve(&self.root, &self.config)
    }

    pub fn latex_dir(&self) -> PathBuf {
        self.layout().latex_directory
    }

    /// Write a file relative to the LaTeX directory, creating parents.
    pub fn write_source(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.latex_dir().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create source dir");
        }
        std::fs::write(&path, content).expect("Failed to write source file");
        path
    }

    /// Write `config` to `<root>/paperbuild.json`.
    pub fn write_config(&self, config: &Config) -> PathBuf {
        let path = self.root.join(paperbuild::config::CONFIG_FILE_NAME);
        let json = serde_json::to_string_pretty(config).expect("Failed to serialize config");
        std::fs::write(&path, json).expect("Failed to write config file");
        path
    }

    pub fn pipeline(&self) -> Pipeline {
        let config = PipelineConfig::from_layout(&self.config, &self.layout());
        Pipeline::with_runner(Arc::new(config), self.toolchain.clone())
    }

    /// Build a document by name inside the LaTeX directory.
    pub fn build(&self, document: &str) -> BuildResult {
        self.pipeline()
            .build(self.latex_dir().join(document), &NoopProgress)
    }

    pub fn assert_output_exists(&self, relative: &str) {
        let path = self.latex_dir().join(relative);
        assert!(path.is_file(), "Expected file does not exist: {:?}", path);
    }

    pub fn assert_absent(&self, relative: &str) {
        let path = self.latex_dir().join(relative);
        assert!(!path.exists(), "Expected no file at {:?}", path);
    }

    /// Files directly inside `relative` (relative to the LaTeX directory), sorted.
    pub fn list_files(&self, relative: &str) -> Vec<String> {
        let dir = self.latex_dir().join(relative);
        let mut names: Vec<String> = walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_creates_latex_directory() {
        let harness = TestHarness::new();

        assert!(harness.latex_dir().is_dir());
        assert!(harness.latex_dir().starts_with(harness.temp_path()));
    }

    #[test]
    fn test_write_source_creates_parents() {
        let harness = TestHarness::new();
        let path = harness.write_source("sections/intro.tex", "Intro");

        assert_eq!(std::fs::read_to_string(path).unwrap(), "Intro");
    }
}
