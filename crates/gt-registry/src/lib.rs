//! Golden Thread Registry
//!
//! Access to the remote requirements registry.
//!
//! # Overview
//!
//! - [`RegistryClient`]: blocking HTTP client with per-instance request
//!   pacing, cursor pagination, and an on-disk response cache
//! - [`RegistrySource`]: the query seam the accessor depends on
//! - [`Registry`]: typed entries and traceability chain audits
//!
//! # Example
//!
//! ```rust,no_run
//! use gt_registry::{ClientConfig, Registry, RegistryClient};
//! use std::collections::BTreeMap;
//!
//! let client = RegistryClient::new(ClientConfig::new("secret_token"))?;
//! let databases = BTreeMap::from([("FEAT".to_string(), "feature-db-id".to_string())]);
//! let registry = Registry::new(client, &databases);
//!
//! let report = registry.validate_chain("FEAT-AUTH-001")?;
//! for issue in &report.errors {
//!     println!("{issue}");
//! }
//! # Ok::<(), gt_registry::RegistryError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod client;
pub mod entry;
pub mod error;
pub mod rate_limit;
pub mod registry;
pub mod source;

// Re-exports
pub use cache::{CacheStats, ResponseCache};
pub use client::{ClientConfig, RegistryClient};
pub use entry::{expected_relations, RegistryEntry};
pub use error::{RegistryError, RegistryErrorKind};
pub use rate_limit::RateLimiter;
pub use registry::{ChainReport, Registry};
pub use source::RegistrySource;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for registry access
    pub use crate::{ChainReport, ClientConfig, Registry, RegistryClient, RegistryError, RegistrySource};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
