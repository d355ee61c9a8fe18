//! Golden Thread CLI
//!
//! Library half of the `golden-thread` binary: configuration loading,
//! service discovery, the per-service validation pipeline and report
//! rendering.
//!
//! # Overview
//!
//! - [`Config`]: YAML settings with `${VAR}` environment substitution
//! - [`discover_services`]: directories holding a service manifest
//! - [`validate_service`] / [`detect_orphans`]: parse, load, validate
//! - [`render_service`], [`render_orphans`], [`JsonReport`]: output
//!
//! # Example
//!
//! ```rust
//! use gt_cli::Config;
//!
//! let config = Config::from_yaml_str("registry:\n  api_token: ${TOKEN}\n", |name| {
//!     (name == "TOKEN").then(|| "secret".to_string())
//! })
//! .unwrap();
//! assert_eq!(config.registry.api_token, "secret");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod discovery;
pub mod report;
pub mod service;

// Re-exports
pub use config::{Config, ConfigError, CONFIG_FILENAME};
pub use discovery::discover_services;
pub use report::{render_orphans, render_service, write_json, JsonReport, ORPHANS_FILENAME, REPORT_FILENAME};
pub use service::{detect_orphans, extractors, load_manifest, parse_service, validate_service};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
