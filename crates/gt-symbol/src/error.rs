//! Extraction errors

use std::path::PathBuf;

/// Per-file extraction failure
///
/// Callers skip the file and continue; one broken file never aborts a pass.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source file could not be read
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax tree contains errors
    #[error("syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },

    /// Grammar could not be loaded into the parser
    #[error("failed to initialize {language} parser: {message}")]
    ParserInit { language: String, message: String },

    /// Parser produced no tree
    #[error("failed to parse {0}")]
    ParseFailed(String),
}

impl ParseError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
