//! Golden Thread Core
//!
//! Shared vocabulary for traceability validation.
//!
//! # Core Concepts
//!
//! - [`RegistryType`]: closed set of registry record types (BR, FEAT, V, ...)
//! - [`validate_format`]: fixed `<TYPE>-<SCOPE>-<NNN>` identifier rules
//! - [`Issue`] / [`IssueCode`]: structured validation findings
//!
//! # Example
//!
//! ```rust
//! use gt_core::{validate_format, id_type_of};
//!
//! assert!(validate_format("BR-AUTH-001"));
//! assert!(!validate_format("BR-001"));
//! assert_eq!(id_type_of("FEAT-AUTH-001"), Some("FEAT"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod id;
pub mod issue;

// Re-exports
pub use id::{id_type_of, registry_type_of, validate_format, RegistryType, UnknownRegistryType};
pub use issue::{Issue, IssueCode, IssueContext};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for validation code
    pub use crate::{id_type_of, validate_format, Issue, IssueCode, RegistryType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
