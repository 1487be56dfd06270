use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StorageError;
use crate::pipeline::SourceDocument;

/// Move a file from `src` to `dst`, replacing `dst` if it exists. Uses `rename`
/// first and falls back to copy + delete when rename fails (cross-device moves).
pub fn move_file(src: &Path, dst: &Path) -> Result<(), StorageError> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    std::fs::copy(src, dst).map_err(|e| StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    std::fs::remove_file(src).map_err(|e| StorageError::MoveFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Copies `src` to `dst`, replacing `dst`.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, StorageError> {
    std::fs::copy(src, dst).map_err(|e| StorageError::CopyFile {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })
}

/// Creates `path` if absent. The parent must already exist.
pub fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    if path.is_dir() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(StorageError::MissingParent {
                path: path.to_path_buf(),
            });
        }
    }

    match std::fs::create_dir(path) {
        Ok(()) => {
            debug!("Created directory {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(StorageError::CreateDirectory {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Deletes regular files directly inside `dir` whose names match any of the glob
/// `patterns`. Returns the removed paths in sorted order.
pub fn clean_matching(dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, StorageError> {
    let compiled = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| StorageError::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let entries = std::fs::read_dir(dir).map_err(|e| StorageError::ReadDirectory {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut removed = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if compiled.iter().any(|p| p.matches(&name)) {
            std::fs::remove_file(&path).map_err(|e| StorageError::RemoveFile {
                path: path.clone(),
                source: e,
            })?;
            removed.push(path);
        }
    }

    removed.sort();
    Ok(removed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Output,
    Auxiliary,
}

/// Static mapping from artifact extension to destination directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    pub output_directory: PathBuf,
    pub auxiliary_directory: PathBuf,
    pub output_extensions: Vec<String>,
    pub auxiliary_extensions: Vec<String>,
}

impl ArtifactLayout {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        output_directory: P,
        auxiliary_directory: Q,
        output_extensions: Vec<String>,
        auxiliary_extensions: Vec<String>,
    ) -> Self {
        Self {
            output_directory: output_directory.as_ref().to_path_buf(),
            auxiliary_directory: auxiliary_directory.as_ref().to_path_buf(),
            output_extensions,
            auxiliary_extensions,
        }
    }

    pub fn kind_of(&self, extension: &str) -> Option<ArtifactKind> {
        if self.output_extensions.iter().any(|e| e == extension) {
            Some(ArtifactKind::Output)
        } else if self.auxiliary_extensions.iter().any(|e| e == extension) {
            Some(ArtifactKind::Auxiliary)
        } else {
            None
        }
    }

    pub fn destination_for(&self, extension: &str) -> Option<&Path> {
        self.kind_of(extension).map(|kind| match kind {
            ArtifactKind::Output => self.output_directory.as_path(),
            ArtifactKind::Auxiliary => self.auxiliary_directory.as_path(),
        })
    }

    /// Creates both destination directories when absent (non-recursively).
    pub fn ensure_directories(&self) -> Result<(), StorageError> {
        ensure_directory(&self.output_directory)?;
        ensure_directory(&self.auxiliary_directory)
    }

    /// Every recognized extension, output extensions first.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.output_extensions
            .iter()
            .chain(self.auxiliary_extensions.iter())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocatedArtifact {
    pub extension: String,
    pub kind: ArtifactKind,
    pub from: PathBuf,
    pub to: PathBuf,
}

pub struct ArtifactOrganizer {
    layout: ArtifactLayout,
}

impl ArtifactOrganizer {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Moves every `<stem>.<ext>` that exists next to the document into its
    /// destination directory. Missing artifacts are skipped.
    pub fn relocate(
        &self,
        document: &SourceDocument,
    ) -> Result<Vec<RelocatedArtifact>, StorageError> {
        let mut relocated = Vec::new();

        for extension in self.layout.extensions() {
            let from = document.artifact(extension);
            if !from.is_file() {
                continue;
            }
            let (kind, directory) = match (
                self.layout.kind_of(extension),
                self.layout.destination_for(extension),
            ) {
                (Some(kind), Some(directory)) => (kind, directory),
                _ => continue,
            };
            let to = directory.join(format!("{}.{}", document.stem(), extension));

            move_file(&from, &to)?;
            debug!("Moved {} -> {}", from.display(), to.display());

            relocated.push(RelocatedArtifact {
                extension: extension.to_string(),
                kind,
                from,
                to,
            });
        }

        Ok(relocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn layout_in(dir: &Path) -> ArtifactLayout {
        ArtifactLayout::new(
            dir.join("pdfs"),
            dir.join("auxiliary"),
            strings(&["pdf"]),
            strings(&["aux", "log", "run.xml"]),
        )
    }

    #[test]
    fn test_move_file_replaces_destination() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("a.pdf");
        let dst = temp_dir.path().join("b.pdf");
        std::fs::write(&src, b"new").unwrap();
        std::fs::write(&dst, b"old").unwrap();

        move_file(&src, &dst).unwrap();

        assert!(!src.exists());
        assert_eq!(std::fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn test_move_missing_source_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = move_file(
            &temp_dir.path().join("nonexistent.pdf"),
            &temp_dir.path().join("out.pdf"),
        );
        match result {
            Err(StorageError::MoveFile { from, .. }) => {
                assert!(from.to_string_lossy().contains("nonexistent.pdf"));
            }
            _ => panic!("Expected MoveFile error"),
        }
    }

    #[test]
    fn test_ensure_directory_is_not_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("missing").join("pdfs");

        let result = ensure_directory(&nested);

        assert!(matches!(result, Err(StorageError::MissingParent { .. })));
        assert!(!temp_dir.path().join("missing").exists());
    }

    #[test]
    fn test_ensure_directory_creates_and_tolerates_existing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("pdfs");
        ensure_directory(&dir).unwrap();
        ensure_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_destination_for() {
        let temp_dir = TempDir::new().unwrap();
        let layout = layout_in(temp_dir.path());

        assert_eq!(
            layout.destination_for("pdf"),
            Some(temp_dir.path().join("pdfs").as_path())
        );
        assert_eq!(
            layout.destination_for("run.xml"),
            Some(temp_dir.path().join("auxiliary").as_path())
        );
        assert_eq!(layout.destination_for("tex"), None);
        assert_eq!(layout.kind_of("log"), Some(ArtifactKind::Auxiliary));
    }

    #[test]
    fn test_relocate_splits_output_and_auxiliary() {
        let temp_dir = TempDir::new().unwrap();
        let layout = layout_in(temp_dir.path());
        layout.ensure_directories().unwrap();
        for name in ["paper.tex", "paper.pdf", "paper.aux", "paper.log"] {
            std::fs::write(temp_dir.path().join(name), name).unwrap();
        }
        let document = SourceDocument::new(temp_dir.path().join("paper.tex")).unwrap();

        let relocated = ArtifactOrganizer::new(layout).relocate(&document).unwrap();

        assert_eq!(relocated.len(), 3);
        assert_eq!(relocated[0].kind, ArtifactKind::Output);
        assert!(temp_dir.path().join("pdfs/paper.pdf").is_file());
        assert!(temp_dir.path().join("auxiliary/paper.aux").is_file());
        assert!(temp_dir.path().join("auxiliary/paper.log").is_file());
        assert!(!temp_dir.path().join("paper.pdf").exists());
        assert!(!temp_dir.path().join("paper.aux").exists());
        assert!(temp_dir.path().join("paper.tex").is_file());
    }

    #[test]
    fn test_relocate_skips_missing_and_ignores_other_stems() {
        let temp_dir = TempDir::new().unwrap();
        let layout = layout_in(temp_dir.path());
        layout.ensure_directories().unwrap();
        std::fs::write(temp_dir.path().join("paper.tex"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("other.aux"), b"x").unwrap();
        let document = SourceDocument::new(temp_dir.path().join("paper.tex")).unwrap();

        let relocated = ArtifactOrganizer::new(layout).relocate(&document).unwrap();

        assert!(relocated.is_empty());
        assert!(temp_dir.path().join("other.aux").exists());
    }

    #[test]
    fn test_clean_matching() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["main.aux", "main.log", "main.tex", "main.run.xml", "refs.bib"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(temp_dir.path().join("sub.aux")).unwrap();

        let removed =
            clean_matching(temp_dir.path(), &strings(&["*.aux", "*.log", "*.run.xml"])).unwrap();

        assert_eq!(removed.len(), 3);
        assert!(temp_dir.path().join("main.tex").exists());
        assert!(temp_dir.path().join("refs.bib").exists());
        assert!(temp_dir.path().join("sub.aux").is_dir());
        assert!(!temp_dir.path().join("main.run.xml").exists());
    }

    #[test]
    fn test_clean_matching_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let result = clean_matching(temp_dir.path(), &strings(&["[unclosed"]));
        assert!(matches!(result, Err(StorageError::InvalidPattern { .. })));
    }
}
