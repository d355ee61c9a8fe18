//! Golden Thread Validation
//!
//! Read-only validators over a service manifest, its parsed code symbols,
//! and the requirements registry.
//!
//! # Overview
//!
//! - [`CoverageValidator`]: manifest entries without code, code without
//!   manifest entries, and the coverage percentage
//! - [`ConsistencyValidator`]: identifier format, existence, and chain
//!   completeness against a [`gt_registry::Registry`]
//! - [`OrphanValidator`]: orphans on both sides with suggested fixes
//! - [`ServiceReport`]: the combined per-service result
//!
//! No validator returns an error: every finding is an [`gt_core::Issue`].
//!
//! # Example
//!
//! ```rust
//! use gt_manifest::Manifest;
//! use gt_symbol::{CodeSymbol, SymbolKind};
//! use gt_validate::CoverageValidator;
//!
//! let manifest = Manifest::from_yaml_str(
//!     "service: auth\nversion: '1'\ntraceability:\n  symbols:\n    - path: a.py::A\n      type: class\n      ids: [FR-AUTH-001]\n",
//! )
//! .unwrap();
//! let symbols = vec![CodeSymbol::new("A", SymbolKind::Class, "a.py", 1, 4)];
//!
//! let result = CoverageValidator::new().validate(&manifest, &symbols);
//! assert_eq!(result.mapped_symbols, 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod consistency;
pub mod coverage;
pub mod orphans;
pub mod report;

// Re-exports
pub use consistency::{ConsistencyResult, ConsistencyValidator};
pub use coverage::{coverage_percentage, CoverageResult, CoverageValidator};
pub use orphans::{OrphanCode, OrphanManifest, OrphanResult, OrphanSide, OrphanValidator, Suggestion};
pub use report::ServiceReport;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running validators
    pub use crate::{ConsistencyValidator, CoverageValidator, OrphanValidator, ServiceReport};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
