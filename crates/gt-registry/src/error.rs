//! Registry errors
//!
//! One error type at the API boundary; [`RegistryError::kind`] gives the
//! machine-distinguishable sub-reason.

/// Sub-reason of a [`RegistryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryErrorKind {
    NotFound,
    AuthFailed,
    RateLimited,
    Timeout,
    RequestFailed,
    InvalidId,
    UnknownType,
    Decode,
}

/// Registry access failure
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Remote returned 404
    #[error("{0} not found")]
    NotFound(String),

    /// Remote returned 401
    #[error("registry authentication failed; check the API token")]
    AuthFailed,

    /// Remote returned 429
    #[error("registry rate limit exceeded; try again later")]
    RateLimited,

    /// Request did not complete within the configured timeout
    #[error("request timeout {0}")]
    Timeout(String),

    /// Any other transport or HTTP failure
    #[error("registry request failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    /// Identifier has no type prefix
    #[error("invalid ID format: {0}")]
    InvalidId(String),

    /// Type prefix has no configured collection
    #[error("unknown ID type: {0}; add its database ID to the configuration")]
    UnknownType(String),

    /// Response body was not the expected JSON
    #[error("malformed registry response: {0}")]
    Decode(String),
}

impl RegistryError {
    /// Sub-reason
    #[must_use]
    pub fn kind(&self) -> RegistryErrorKind {
        match self {
            RegistryError::NotFound(_) => RegistryErrorKind::NotFound,
            RegistryError::AuthFailed => RegistryErrorKind::AuthFailed,
            RegistryError::RateLimited => RegistryErrorKind::RateLimited,
            RegistryError::Timeout(_) => RegistryErrorKind::Timeout,
            RegistryError::RequestFailed { .. } => RegistryErrorKind::RequestFailed,
            RegistryError::InvalidId(_) => RegistryErrorKind::InvalidId,
            RegistryError::UnknownType(_) => RegistryErrorKind::UnknownType,
            RegistryError::Decode(_) => RegistryErrorKind::Decode,
        }
    }

    /// Map an unsuccessful HTTP status to an error
    #[must_use]
    pub fn from_status(status: u16, body: String, resource: &str) -> Self {
        match status {
            404 => RegistryError::NotFound(resource.to_string()),
            401 => RegistryError::AuthFailed,
            429 => RegistryError::RateLimited,
            _ => RegistryError::RequestFailed {
                status: Some(status),
                message: body,
            },
        }
    }
}
