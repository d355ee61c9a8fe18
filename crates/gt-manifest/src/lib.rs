//! Golden Thread Manifest
//!
//! Per-service `.golden-thread.yaml` files: which code symbols map to which
//! registry identifiers, feature link declarations, and exclusions.
//!
//! # Example
//!
//! ```rust
//! use gt_manifest::Manifest;
//!
//! let manifest = Manifest::from_yaml_str(
//!     "service: auth\nversion: '1.0'\ntraceability:\n  symbols:\n    - path: a.py::A\n      type: class\n      ids: [FR-AUTH-001]\n",
//! )
//! .unwrap();
//! assert!(manifest.symbol_paths().contains("a.py::A"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod exclusion;
pub mod model;

// Re-exports
pub use error::ManifestError;
pub use exclusion::ExclusionMatcher;
pub use model::{
    Exclusions, FeatureMapping, InterfaceMapping, Manifest, SymbolMapping, TestMapping,
    Traceability,
};

/// Default manifest file name
pub const MANIFEST_FILENAME: &str = ".golden-thread.yaml";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
