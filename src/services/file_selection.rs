//! Picks the files in the working directory that should be uploaded.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs;
use std::io;

/// List the regular files directly inside `dir` that have an allowed
/// extension and are not ignored.
///
/// Extensions are compared with their leading dot (`.jpg`), names and
/// extensions case-insensitively. Directories, symlinks and entries whose
/// names are not UTF-8 are skipped. The result keeps directory-listing order.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed.
pub fn select_files(
    dir: &Utf8Path,
    allowed_formats: &[String],
    ignored_files: &[String],
) -> io::Result<Vec<Utf8PathBuf>> {
    let allowed: HashSet<String> = allowed_formats.iter().map(|f| f.to_lowercase()).collect();
    let ignored: HashSet<String> = ignored_files.iter().map(|f| f.to_lowercase()).collect();

    let mut selected = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;

        // DirEntry::file_type does not follow symlinks
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = match Utf8PathBuf::try_from(entry.path()) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping non UTF-8 file name: {}", e.as_path().display());
                continue;
            }
        };

        let Some(name) = path.file_name() else {
            continue;
        };

        if ignored.contains(&name.to_lowercase()) {
            tracing::debug!("Ignoring {}", name);
            continue;
        }

        let suffix = match path.extension() {
            Some(ext) => format!(".{}", ext.to_lowercase()),
            None => continue,
        };

        if allowed.contains(&suffix) {
            selected.push(path);
        }
    }

    tracing::info!("Selected {} file(s) from {}", selected.len(), dir);
    Ok(selected)
}
