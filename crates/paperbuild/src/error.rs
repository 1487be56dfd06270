use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperbuildError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("LaTeX directory not found at {}", .0.display())]
    MissingLatexDirectory(PathBuf),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Submission error: {0}")]
    Submission(#[from] crate::submission::SubmissionError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Extension '{extension}' is mapped to both the output and the auxiliary directory")]
    AmbiguousExtension { extension: String },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read directory '{path}': {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parent directory of '{path}' does not exist")]
    MissingParent { path: PathBuf },

    #[error("Failed to copy file from '{from}' to '{to}': {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move file from '{from}' to '{to}': {source}")]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove file '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(String),

    #[error("Failed to watch '{path}': {reason}")]
    WatchPath { path: PathBuf, reason: String },

    #[error("Watch channel closed unexpectedly")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, PaperbuildError>;
