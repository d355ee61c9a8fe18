//! Validation issues
//!
//! Issues are data, not failures: every validator reports what it found as
//! a list of [`Issue`] values and never raises past its entry point.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Machine-readable issue code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Feature has no Business Requirement link
    MissingBr,
    /// Feature has no User Requirement link
    MissingUr,
    /// Feature has no requirement link of any kind
    MissingFr,
    /// Feature has no Call Flow link
    MissingCf,
    /// Requirement has no Verification link
    MissingV,
    /// Verification has no Test Case link
    MissingTc,
    /// Verified Verification has no Evidence Artifact link
    MissingEa,
    /// Code symbol absent from the manifest
    OrphanCode,
    /// Manifest symbol absent from the code
    OrphanManifest,
    /// Identifier does not resolve in the registry
    InvalidId,
    /// Identifier does not match its type's pattern
    InvalidFormat,
    /// Validation of a chain could not complete
    ValidationError,
}

impl IssueCode {
    /// Upper-snake tag used in reports
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingBr => "MISSING_BR",
            IssueCode::MissingUr => "MISSING_UR",
            IssueCode::MissingFr => "MISSING_FR",
            IssueCode::MissingCf => "MISSING_CF",
            IssueCode::MissingV => "MISSING_V",
            IssueCode::MissingTc => "MISSING_TC",
            IssueCode::MissingEa => "MISSING_EA",
            IssueCode::OrphanCode => "ORPHAN_CODE",
            IssueCode::OrphanManifest => "ORPHAN_MANIFEST",
            IssueCode::InvalidId => "INVALID_ID",
            IssueCode::InvalidFormat => "INVALID_FORMAT",
            IssueCode::ValidationError => "VALIDATION_ERROR",
        }
    }
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional context attached to an issue
///
/// Flattened into the issue on serialization; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub code: IssueCode,
    pub message: String,
    #[serde(flatten)]
    pub context: IssueContext,
}

impl Issue {
    /// Create an issue with no context
    #[must_use]
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: IssueContext::default(),
        }
    }

    /// Attach the identifier the issue is about
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.context.id = Some(id.into());
        self
    }

    /// Attach the identifier's type tag
    #[must_use]
    pub fn with_id_type(mut self, id_type: impl Into<String>) -> Self {
        self.context.id_type = Some(id_type.into());
        self
    }

    /// Attach the feature whose chain produced the issue
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.context.feature = Some(feature.into());
        self
    }

    /// Attach a symbol's qualified path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.context.path = Some(path.into());
        self
    }

    /// Attach a list of identifiers
    #[must_use]
    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.context.ids = Some(ids);
        self
    }

    /// Attach a source location
    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: usize) -> Self {
        self.context.file = Some(file.into());
        self.context.line = Some(line);
        self
    }

    /// Attach a symbol kind
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.context.kind = Some(kind.into());
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
