//! Golden Thread Symbol Model
//!
//! Language-agnostic code symbols and the tree-sitter extractors that
//! produce them.
//!
//! # Overview
//!
//! - **CodeSymbol**: one declaration with a canonical qualified path
//! - **SymbolExtractor**: per-language extraction (Python, TypeScript/JavaScript, Go)
//! - **ExtractorSet**: runs extractors over a service root, skipping broken files
//!
//! # Example
//!
//! ```rust
//! use gt_symbol::{KindFilter, PythonExtractor, SymbolExtractor};
//!
//! let extractor = PythonExtractor::new(KindFilter::all());
//! let symbols = extractor
//!     .parse_source("auth/oauth.py", "class OAuthProvider:\n    def login(self):\n        pass\n")
//!     .unwrap();
//!
//! assert_eq!(symbols[1].qualified_path(), "auth/oauth.py::OAuthProvider.login");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod extractor;
pub mod symbol;

// Re-exports
pub use error::ParseError;
pub use extractor::{
    default_extractors, relative_path, Extraction, ExtractorSet, GoExtractor, IgnoreSet, Language,
    PythonExtractor, SymbolExtractor, TypeScriptExtractor,
};
pub use symbol::{is_checkable_name, CodeSymbol, KindFilter, SymbolKind};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for symbol extraction
    pub use crate::{CodeSymbol, ExtractorSet, IgnoreSet, KindFilter, SymbolExtractor, SymbolKind};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
