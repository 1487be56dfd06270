use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::SubmissionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    /// Name inside the archive, `/`-separated.
    pub name: String,
}

/// Expands `{stem}` in allow-list entries.
pub fn expand_stem(entries: &[String], stem: &str) -> Vec<String> {
    entries.iter().map(|e| e.replace("{stem}", stem)).collect()
}

/// Allow-listed files that exist under `base`, followed by the files matching
/// `patterns`. Every entry is named `<prefix>/<relative path>`.
pub fn collect_entries(
    base: &Path,
    files: &[String],
    patterns: &[String],
    prefix: &str,
) -> Result<Vec<ArchiveEntry>, SubmissionError> {
    let mut entries: Vec<ArchiveEntry> = Vec::new();

    for file in files {
        let source = base.join(file);
        if source.is_file() {
            entries.push(ArchiveEntry {
                name: entry_name(prefix, Path::new(file)),
                source,
            });
        } else {
            debug!("Skipping absent {}", file);
        }
    }

    let escaped_base = glob::Pattern::escape(&base.to_string_lossy());
    for pattern in patterns {
        let full = format!("{}/{}", escaped_base, pattern);
        let paths = glob::glob(&full).map_err(|e| SubmissionError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        let mut matched: Vec<PathBuf> = paths
            .filter_map(|p| p.ok())
            .filter(|p| p.is_file())
            .collect();
        matched.sort();

        for source in matched {
            let relative = source.strip_prefix(base).unwrap_or(&source).to_path_buf();
            let name = entry_name(prefix, &relative);
            if entries.iter().any(|e| e.name == name) {
                continue;
            }
            entries.push(ArchiveEntry { source, name });
        }
    }

    Ok(entries)
}

fn entry_name(prefix: &str, relative: &Path) -> String {
    let relative = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        relative
    } else {
        format!("{}/{}", prefix, relative)
    }
}

/// Writes a deflate-compressed archive at `path`, replacing any existing file.
/// Returns the archive size in bytes.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> Result<u64, SubmissionError> {
    let io_err = |source: std::io::Error| SubmissionError::ArchiveIo {
        path: path.to_path_buf(),
        source,
    };
    let zip_err = |source: zip::result::ZipError| SubmissionError::ArchiveZip {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .map_err(zip_err)?;
        let mut source = File::open(&entry.source).map_err(io_err)?;
        std::io::copy(&mut source, &mut zip).map_err(io_err)?;
        debug!("Added {}", entry.name);
    }

    zip.finish().map_err(zip_err)?;

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    Ok(size)
}
