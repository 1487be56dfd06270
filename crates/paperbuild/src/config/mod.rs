pub mod layout;
pub mod loader;
pub mod schema;

pub use layout::ProjectLayout;
pub use loader::{load_config, load_config_from_str, load_project_config};
pub use schema::{
    ArtifactsConfig, Config, SubmissionConfig, ToolchainConfig, WatchConfig, CONFIG_VERSION,
};

/// Looked up in the project root when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "paperbuild.json";
