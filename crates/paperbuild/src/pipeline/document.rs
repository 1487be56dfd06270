use std::path::{Path, PathBuf};

use super::error::PipelineError;

/// A LaTeX source file. Builds run in its directory and name artifacts after its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    directory: PathBuf,
    file_name: String,
    stem: String,
}

impl SourceDocument {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::MissingDocument(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::MissingDocument(path.to_path_buf()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.clone());
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            path: path.to_path_buf(),
            directory,
            file_name,
            stem,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// `<directory>/<stem>.<extension>`
    pub fn artifact(&self, extension: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", self.stem, extension))
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
