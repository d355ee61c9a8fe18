//! Registry identifiers
//!
//! Every traceability record is named `<TYPE>-<SCOPE>-<NNN>`, e.g.
//! `FEAT-AUTH-001`. The type tag comes from the closed [`RegistryType`]
//! vocabulary and each type has exactly one format pattern.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Registry type tag
///
/// The declaration order is the canonical order used when reports group
/// identifiers by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegistryType {
    /// Business Requirement
    #[serde(rename = "BR")]
    BusinessRequirement,
    /// User Requirement
    #[serde(rename = "UR")]
    UserRequirement,
    /// Feature
    #[serde(rename = "FEAT")]
    Feature,
    /// Call Flow
    #[serde(rename = "CF")]
    CallFlow,
    /// Functional Requirement
    #[serde(rename = "FR")]
    FunctionalRequirement,
    /// Non-Functional Requirement
    #[serde(rename = "NFR")]
    NonFunctionalRequirement,
    /// Technical & System Requirement
    #[serde(rename = "TSR")]
    TechnicalRequirement,
    /// Transitional & Compliance Requirement
    #[serde(rename = "TCR")]
    ComplianceRequirement,
    /// Verification
    #[serde(rename = "V")]
    Verification,
    /// Test Case
    #[serde(rename = "TC")]
    TestCase,
    /// Evidence Artifact
    #[serde(rename = "EA")]
    EvidenceArtifact,
    /// Interface
    #[serde(rename = "IF")]
    Interface,
    /// Event
    #[serde(rename = "EVT")]
    Event,
    /// GraphQL operation
    #[serde(rename = "GQL")]
    GraphQl,
    /// gRPC method
    #[serde(rename = "RPC")]
    Rpc,
}

impl RegistryType {
    /// Every registry type, in canonical order
    pub const ALL: [RegistryType; 15] = [
        RegistryType::BusinessRequirement,
        RegistryType::UserRequirement,
        RegistryType::Feature,
        RegistryType::CallFlow,
        RegistryType::FunctionalRequirement,
        RegistryType::NonFunctionalRequirement,
        RegistryType::TechnicalRequirement,
        RegistryType::ComplianceRequirement,
        RegistryType::Verification,
        RegistryType::TestCase,
        RegistryType::EvidenceArtifact,
        RegistryType::Interface,
        RegistryType::Event,
        RegistryType::GraphQl,
        RegistryType::Rpc,
    ];

    /// The four requirement kinds a feature must link at least one of
    pub const REQUIREMENT_KINDS: [RegistryType; 4] = [
        RegistryType::FunctionalRequirement,
        RegistryType::NonFunctionalRequirement,
        RegistryType::TechnicalRequirement,
        RegistryType::ComplianceRequirement,
    ];

    /// Short tag as it appears in identifiers
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RegistryType::BusinessRequirement => "BR",
            RegistryType::UserRequirement => "UR",
            RegistryType::Feature => "FEAT",
            RegistryType::CallFlow => "CF",
            RegistryType::FunctionalRequirement => "FR",
            RegistryType::NonFunctionalRequirement => "NFR",
            RegistryType::TechnicalRequirement => "TSR",
            RegistryType::ComplianceRequirement => "TCR",
            RegistryType::Verification => "V",
            RegistryType::TestCase => "TC",
            RegistryType::EvidenceArtifact => "EA",
            RegistryType::Interface => "IF",
            RegistryType::Event => "EVT",
            RegistryType::GraphQl => "GQL",
            RegistryType::Rpc => "RPC",
        }
    }

    /// Human-readable registry name
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            RegistryType::BusinessRequirement => "Business Requirement",
            RegistryType::UserRequirement => "User Requirement",
            RegistryType::Feature => "Feature",
            RegistryType::CallFlow => "Call Flow",
            RegistryType::FunctionalRequirement => "Functional Requirement",
            RegistryType::NonFunctionalRequirement => "Non-Functional Requirement",
            RegistryType::TechnicalRequirement => "Technical & System Requirement",
            RegistryType::ComplianceRequirement => "Transitional & Compliance Requirement",
            RegistryType::Verification => "Verification",
            RegistryType::TestCase => "Test Case",
            RegistryType::EvidenceArtifact => "Evidence Artifact",
            RegistryType::Interface => "Interface",
            RegistryType::Event => "Event",
            RegistryType::GraphQl => "GraphQL Operation",
            RegistryType::Rpc => "gRPC Method",
        }
    }

    /// Whether this is one of the requirement kinds (FR, NFR, TSR, TCR)
    #[inline]
    #[must_use]
    pub fn is_requirement(&self) -> bool {
        Self::REQUIREMENT_KINDS.contains(self)
    }

    /// Fixed format pattern for identifiers of this type
    #[must_use]
    pub fn pattern(&self) -> &'static Regex {
        // Every type has an entry; the map is built from ALL.
        &ID_PATTERNS[self]
    }
}

impl Display for RegistryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistryType {
    type Err = UnknownRegistryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegistryType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownRegistryType(s.to_string()))
    }
}

/// Tag that is not part of the registry vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown registry type: '{0}'")]
pub struct UnknownRegistryType(pub String);

static ID_PATTERNS: Lazy<HashMap<RegistryType, Regex>> = Lazy::new(|| {
    RegistryType::ALL
        .iter()
        .map(|t| {
            let pattern = format!(r"^{}-[A-Z]+-\d{{3}}$", t.as_str());
            let regex = Regex::new(&pattern).expect("identifier patterns are constant and valid");
            (*t, regex)
        })
        .collect()
});

/// Type prefix of an identifier: everything before the first `-`
///
/// Returns `None` when the identifier has no `-` at all.
#[must_use]
pub fn id_type_of(id: &str) -> Option<&str> {
    id.split_once('-').map(|(prefix, _)| prefix)
}

/// Registry type of an identifier, if its prefix is a known tag
#[must_use]
pub fn registry_type_of(id: &str) -> Option<RegistryType> {
    id_type_of(id).and_then(|prefix| prefix.parse().ok())
}

/// Check an identifier against its type's fixed pattern
///
/// Unknown or missing type prefixes are never valid.
#[must_use]
pub fn validate_format(id: &str) -> bool {
    registry_type_of(id).is_some_and(|t| t.pattern().is_match(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_roundtrip_through_from_str() {
        for t in RegistryType::ALL {
            assert_eq!(t.as_str().parse::<RegistryType>().unwrap(), t);
        }
        assert!("XYZ".parse::<RegistryType>().is_err());
    }

    #[test]
    fn format_accepts_well_formed_ids() {
        assert!(validate_format("BR-AUTH-001"));
        assert!(validate_format("FEAT-PAYMENTS-042"));
        assert!(validate_format("V-AUTH-999"));
        assert!(validate_format("RPC-X-000"));
    }

    #[test]
    fn format_is_case_sensitive() {
        assert!(!validate_format("br-auth-001"));
        assert!(!validate_format("BR-auth-001"));
    }

    #[test]
    fn format_rejects_malformed_ids() {
        assert!(!validate_format("BR-001"));
        assert!(!validate_format("INVALID"));
        assert!(!validate_format("BR-AUTH-01"));
        assert!(!validate_format("BR-AUTH-0001"));
        assert!(!validate_format("BR-AUTH1-001"));
        assert!(!validate_format("XX-AUTH-001"));
        assert!(!validate_format(""));
    }

    #[test]
    fn type_prefix_is_before_first_dash() {
        assert_eq!(id_type_of("FEAT-AUTH-001"), Some("FEAT"));
        assert_eq!(id_type_of("INVALID"), None);
        assert_eq!(registry_type_of("NFR-PERF-002"), Some(RegistryType::NonFunctionalRequirement));
        assert_eq!(registry_type_of("abc-def"), None);
    }

    #[test]
    fn requirement_kinds() {
        assert!(RegistryType::FunctionalRequirement.is_requirement());
        assert!(RegistryType::ComplianceRequirement.is_requirement());
        assert!(!RegistryType::Verification.is_requirement());
    }

    #[test]
    fn serde_uses_short_tags() {
        let json = serde_json::to_string(&RegistryType::TechnicalRequirement).unwrap();
        assert_eq!(json, "\"TSR\"");
        let back: RegistryType = serde_json::from_str("\"EA\"").unwrap();
        assert_eq!(back, RegistryType::EvidenceArtifact);
    }
}
