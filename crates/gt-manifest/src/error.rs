//! Manifest loading errors
//!
//! Any of these fails the run for the service before validation starts.

use std::path::PathBuf;

/// Errors while loading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// File does not exist
    #[error("manifest file not found: {0}")]
    NotFound(PathBuf),

    /// File exists but could not be read
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File has no content
    #[error("manifest file is empty: {0}")]
    Empty(PathBuf),

    /// Not valid YAML
    #[error("failed to parse manifest file: {0}")]
    Syntax(#[source] serde_yaml::Error),

    /// Valid YAML with a missing or mistyped field
    #[error("invalid manifest format: {0}")]
    Format(#[source] serde_yaml::Error),

    /// Exclusion pattern is not a valid glob
    #[error("invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}
