//! Exclusion matching
//!
//! A symbol is excluded when its qualified path is listed explicitly, or
//! its file path matches one of the exclusion globs. `*` stays within one
//! path segment; `**` crosses directories.

use crate::model::Exclusions;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

/// Compile one exclusion glob
pub(crate) fn compile(pattern: &str) -> Result<globset::Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}

/// Compiled manifest exclusions
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    symbols: HashSet<String>,
    globs: GlobSet,
}

impl ExclusionMatcher {
    /// Compile exclusions; invalid patterns are skipped with a warning
    #[must_use]
    pub fn new(exclusions: &Exclusions) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &exclusions.patterns {
            match compile(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => tracing::warn!(pattern = %pattern, "skipping invalid exclusion pattern: {e}"),
            }
        }
        let globs = builder.build().unwrap_or_else(|e| {
            tracing::warn!("exclusion patterns could not be combined: {e}");
            GlobSet::empty()
        });

        Self {
            symbols: exclusions.symbols.iter().cloned().collect(),
            globs,
        }
    }

    /// Whether a symbol is excluded
    #[must_use]
    pub fn is_excluded(&self, qualified_path: &str, file_path: &str) -> bool {
        self.symbols.contains(qualified_path) || self.globs.is_match(file_path)
    }
}
