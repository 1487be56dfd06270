use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads `explicit` when given, otherwise `<root>/paperbuild.json` if it exists, otherwise
/// the built-in defaults.
pub fn load_project_config(root: &Path, explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }

    let candidate = root.join(super::CONFIG_FILE_NAME);
    if candidate.is_file() {
        tracing::debug!("Using config file {}", candidate.display());
        load_config(&candidate)
    } else {
        Ok(Config::default())
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

pub(crate) fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.toolchain.engine.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "toolchain.engine must not be empty".to_string(),
        });
    }

    if !config.default_document.ends_with(".tex") {
        return Err(ConfigError::Validation {
            message: format!(
                "default_document must be a .tex file, got '{}'",
                config.default_document
            ),
        });
    }

    if config.watch.poll_interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "watch.poll_interval_ms must be greater than zero".to_string(),
        });
    }

    let outputs: HashSet<&str> = config
        .artifacts
        .output_extensions
        .iter()
        .map(String::as_str)
        .collect();
    if let Some(ext) = config
        .artifacts
        .auxiliary_extensions
        .iter()
        .find(|ext| outputs.contains(ext.as_str()))
    {
        return Err(ConfigError::AmbiguousExtension {
            extension: ext.clone(),
        });
    }

    Ok(())
}
