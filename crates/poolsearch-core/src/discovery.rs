//! Candidate-file discovery for one pool.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `root` depth-first, following symlinks, and yield the regular files
/// whose final extension matches one of `extensions` (compared without
/// regard to ASCII case, no leading dot).
///
/// A missing root or an unreadable subtree produces no entries rather than
/// an error. Symlink cycles are reported by the walker as errors and are
/// likewise skipped, so a cycle terminates instead of looping.
pub fn matching_files<'a>(
    root: &Path,
    extensions: &'a [String],
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| extensions.iter().any(|f| f.eq_ignore_ascii_case(ext)))
        })
        .map(|e| e.path().to_path_buf())
}
