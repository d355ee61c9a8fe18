//! Service discovery
//!
//! A service is any directory under a configured root that contains a
//! manifest file.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories under `roots` containing `manifest_filename`, sorted
///
/// Missing roots are skipped.
#[must_use]
pub fn discover_services<P: AsRef<Path>>(roots: &[P], manifest_filename: &str) -> Vec<PathBuf> {
    let mut services = Vec::new();
    for root in roots {
        let root = root.as_ref();
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "service root missing; skipping");
            continue;
        }
        for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() && entry.file_name() == manifest_filename {
                if let Some(parent) = entry.path().parent() {
                    services.push(parent.to_path_buf());
                }
            }
        }
    }
    services.sort();
    services.dedup();
    services
}
