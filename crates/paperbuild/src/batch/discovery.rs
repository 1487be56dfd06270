use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::tool::{decode_output, DEFAULT_ENCODINGS};

static RE_DOCUMENTCLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\\documentclass\b").unwrap());

/// True if `content` declares a document class outside a comment.
pub fn is_standalone(content: &str) -> bool {
    RE_DOCUMENTCLASS.is_match(content)
}

/// Top-level `*.tex` files in `directory` that declare a document class, sorted by name.
/// Included fragments (sections, macros) are skipped.
pub fn discover_documents(directory: &Path) -> Result<Vec<PathBuf>, StorageError> {
    if !directory.is_dir() {
        return Err(StorageError::ReadDirectory {
            path: directory.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("tex") {
            continue;
        }

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping unreadable {}: {}", path.display(), e);
                continue;
            }
        };
        if is_standalone(&decode_output(&bytes, &DEFAULT_ENCODINGS)) {
            debug!("Found standalone document: {}", path.display());
            documents.push(path.to_path_buf());
        }
    }

    documents.sort();
    info!(
        "Discovered {} standalone documents in {}",
        documents.len(),
        directory.display()
    );
    Ok(documents)
}
