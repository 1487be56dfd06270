use std::path::{Path, PathBuf};

use crate::config::schema::Config;

/// Absolute locations derived from a project root and its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub latex_directory: PathBuf,
    pub output_directory: PathBuf,
    pub auxiliary_directory: PathBuf,
}

impl ProjectLayout {
    /// The LaTeX directory is resolved against `root`; output and auxiliary
    /// directories against the LaTeX directory. Absolute entries are kept as-is.
    pub fn resolve<P: AsRef<Path>>(root: P, config: &Config) -> Self {
        let root = root.as_ref().to_path_buf();
        let latex_directory = root.join(&config.latex_directory);
        let output_directory = latex_directory.join(&config.output_directory);
        let auxiliary_directory = latex_directory.join(&config.auxiliary_directory);

        Self {
            root,
            latex_directory,
            output_directory,
            auxiliary_directory,
        }
    }

    pub fn document_path(&self, name: &str) -> PathBuf {
        self.latex_directory.join(name)
    }
}
