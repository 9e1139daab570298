//! Corpus enumeration.

use std::path::{Path, PathBuf};
use tracing::debug;

/// List every regular file under `root`.
///
/// A missing root, or one that is not a directory, yields an empty list.
/// Traversal is depth-first over an explicit stack, visiting entries in
/// name order, so deep trees cannot exhaust the call stack and the output
/// order is stable across runs. Symlinks are not followed. Directories
/// that cannot be read are skipped.
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(current) = stack.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %current.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(|e| e.file_name());

        let mut subdirs = Vec::new();
        for entry in entries {
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(_) => continue,
            };
            if file_type.is_dir() {
                subdirs.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }

        // Reverse so the alphabetically first directory is popped first.
        stack.extend(subdirs.into_iter().rev());
    }

    files
}
