//! File discovery under the requirements, tests and code roots
//!
//! Every enumeration is depth-first with entries sorted by file name, so
//! batch results and "first match wins" lookups are reproducible.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of requirement documents
pub const REQUIREMENT_EXTENSION: &str = "md";

/// All files under `root` accepted by `filter`, in sorted depth-first order
pub fn collect_files<F>(root: &Path, mut filter: F) -> Vec<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    if !root.is_dir() {
        tracing::debug!("skipping missing directory {}", root.display());
        return Vec::new();
    }

    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| filter(path.as_path()))
        .collect()
}

/// Files under `root` with the given extension (without the dot)
pub fn files_with_extension(root: &Path, extension: &str) -> Vec<PathBuf> {
    collect_files(root, |path| has_extension(path, extension))
}

/// Requirement documents under `root`
pub fn requirement_files(root: &Path) -> Vec<PathBuf> {
    files_with_extension(root, REQUIREMENT_EXTENSION)
}

/// First requirement document whose file name contains `id`.
///
/// Several matches are not disambiguated; the first in sorted order wins.
pub fn find_requirement_file(root: &Path, id: &str) -> Option<PathBuf> {
    if id.is_empty() {
        return None;
    }
    let found = collect_files(root, |path| {
        has_extension(path, REQUIREMENT_EXTENSION) && file_name(path).contains(id)
    })
    .into_iter()
    .next();
    tracing::debug!("requirement lookup {} -> {:?}", id, found);
    found
}

/// Locates a file named by a link (`tests/TC-UT-001_x.py`, `auth/login.py`).
///
/// The link is first taken as a path relative to `root`; failing that, the
/// first file anywhere under `root` with the same file name is used.
pub fn find_linked_file(root: &Path, link: &str) -> Option<PathBuf> {
    if link.is_empty() {
        return None;
    }
    let direct = root.join(link);
    if direct.is_file() {
        return Some(direct);
    }

    let wanted = Path::new(link).file_name()?.to_string_lossy().into_owned();
    let found = collect_files(root, |path| file_name(path) == wanted)
        .into_iter()
        .next();
    tracing::debug!("linked file lookup {} -> {:?}", link, found);
    found
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == extension)
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
