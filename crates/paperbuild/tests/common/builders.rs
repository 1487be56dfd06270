//! Builder for creating test configurations programmatically.

#![allow(dead_code)]

use paperbuild::config::{Config, CONFIG_VERSION};

/// Builder for creating `Config` instances.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.config.version = version.to_string();
        self
    }

    pub fn latex_directory(mut self, path: &str) -> Self {
        self.config.latex_directory = path.to_string();
        self
    }

    pub fn output_directory(mut self, path: &str) -> Self {
        self.config.output_directory = path.to_string();
        self
    }

    pub fn auxiliary_directory(mut self, path: &str) -> Self {
        self.config.auxiliary_directory = path.to_string();
        self
    }

    pub fn default_document(mut self, name: &str) -> Self {
        self.config.default_document = name.to_string();
        self
    }

    /// Documents for `all`; an empty list means discovery.
    pub fn documents(mut self, names: &[&str]) -> Self {
        self.config.documents = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn engine(mut self, engine: &str) -> Self {
        self.config.toolchain.engine = engine.to_string();
        self
    }

    pub fn size_limit_bytes(mut self, limit: u64) -> Self {
        self.config.submission.size_limit_bytes = limit;
        self
    }

    pub fn test_compile(mut self, enabled: bool) -> Self {
        self.config.submission.test_compile = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = ConfigBuilder::new().build();

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.latex_directory, "latex");
        assert_eq!(config.documents, vec!["main.tex".to_string()]);
    }

    #[test]
    fn test_config_builder_overrides() {
        let config = ConfigBuilder::new()
            .latex_directory("paper")
            .documents(&[])
            .engine("xelatex")
            .build();

        assert_eq!(config.latex_directory, "paper");
        assert!(config.documents.is_empty());
        assert_eq!(config.toolchain.engine, "xelatex");
    }
}
