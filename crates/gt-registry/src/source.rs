//! Raw record access

use crate::error::RegistryError;
use serde_json::Value;

/// Query capability over a remote registry
///
/// [`crate::RegistryClient`] is the HTTP implementation; tests substitute
/// in-memory sources.
#[cfg_attr(test, mockall::automock)]
pub trait RegistrySource {
    /// All records of a collection matching `filter`, across every page
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the remote call fails.
    fn query(&self, collection_id: &str, filter: Option<Value>) -> Result<Vec<Value>, RegistryError>;

    /// A single record by its remote id
    ///
    /// # Errors
    /// Returns [`RegistryError::NotFound`] for unknown ids, or any other
    /// [`RegistryError`] when the remote call fails.
    fn get(&self, record_id: &str) -> Result<Value, RegistryError>;

    /// Drop every cached response
    fn clear_cache(&self);
}
