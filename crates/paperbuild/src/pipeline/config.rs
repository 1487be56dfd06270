use std::path::PathBuf;

use crate::config::{Config, ProjectLayout};
use crate::storage::ArtifactLayout;

use super::plan::Toolchain;

pub struct PipelineConfig {
    pub output_directory: PathBuf,
    pub auxiliary_directory: PathBuf,
    pub output_extensions: Vec<String>,
    pub auxiliary_extensions: Vec<String>,
    pub toolchain: Toolchain,
}

impl PipelineConfig {
    pub fn from_layout(config: &Config, layout: &ProjectLayout) -> Self {
        Self {
            output_directory: layout.output_directory.clone(),
            auxiliary_directory: layout.auxiliary_directory.clone(),
            output_extensions: config.artifacts.output_extensions.clone(),
            auxiliary_extensions: config.artifacts.auxiliary_extensions.clone(),
            toolchain: Toolchain::from(&config.toolchain),
        }
    }

    pub fn artifact_layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(
            &self.output_directory,
            &self.auxiliary_directory,
            self.output_extensions.clone(),
            self.auxiliary_extensions.clone(),
        )
    }
}
