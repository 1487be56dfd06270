pub mod filesystem;

pub use filesystem::{
    clean_matching, copy_file, ensure_directory, move_file, ArtifactKind, ArtifactLayout,
    ArtifactOrganizer, RelocatedArtifact,
};
