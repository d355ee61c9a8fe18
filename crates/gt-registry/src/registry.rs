//! Registry accessor
//!
//! Resolves identifiers to typed [`RegistryEntry`] values through a
//! [`RegistrySource`] and audits the Feature → Requirement → Verification →
//! Test Case chain.
//!
//! # Link resolution
//!
//! Relation properties hold remote record ids, not domain identifiers. A
//! link that already looks like a domain identifier is resolved with
//! [`Registry::get_entry`]; anything else is fetched directly and parsed as
//! the relation's type. Presence checks (BR, UR, FR, CF) only count links
//! and never resolve them.

use crate::entry::RegistryEntry;
use crate::error::{RegistryError, RegistryErrorKind};
use crate::source::RegistrySource;
use gt_core::{id_type_of, Issue, IssueCode, RegistryType};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Outcome of one chain audit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub feature: String,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ChainReport {
    fn new(feature: &str) -> Self {
        Self {
            feature: feature.to_string(),
            ..Self::default()
        }
    }

    /// Valid when no errors were recorded; warnings do not count
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, issue: Issue) {
        self.errors.push(issue);
    }

    fn warning(&mut self, issue: Issue) {
        self.warnings.push(issue);
    }
}

/// Typed view over a registry source
#[derive(Debug)]
pub struct Registry<S> {
    source: S,
    collections: BTreeMap<RegistryType, String>,
}

impl<S: RegistrySource> Registry<S> {
    /// Accessor over `source` with a type tag → collection id map
    ///
    /// Tags that are not registry types are ignored with a warning.
    pub fn new(source: S, databases: &BTreeMap<String, String>) -> Self {
        let mut collections = BTreeMap::new();
        for (tag, collection_id) in databases {
            match tag.parse::<RegistryType>() {
                Ok(registry_type) => {
                    collections.insert(registry_type, collection_id.clone());
                }
                Err(e) => tracing::warn!("ignoring database mapping: {e}"),
            }
        }
        Self { source, collections }
    }

    /// Underlying source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collection id configured for a type
    #[must_use]
    pub fn collection(&self, registry_type: RegistryType) -> Option<&str> {
        self.collections.get(&registry_type).map(String::as_str)
    }

    fn collection_for(&self, registry_type: RegistryType) -> Result<&str, RegistryError> {
        self.collection(registry_type)
            .ok_or_else(|| RegistryError::UnknownType(registry_type.to_string()))
    }

    /// Whether `id` matches its type's fixed pattern
    #[inline]
    #[must_use]
    pub fn validate_format(&self, id: &str) -> bool {
        gt_core::validate_format(id)
    }

    /// Look up an entry by domain identifier
    ///
    /// Queries the type's collection on the `ID` title property and, when
    /// that query fails, retries with a `Name contains` filter.
    ///
    /// # Errors
    /// [`RegistryError::InvalidId`] when `id` has no type prefix,
    /// [`RegistryError::UnknownType`] when the prefix is unknown or has no
    /// collection, or the source's error when the lookup fails.
    pub fn get_entry(&self, id: &str) -> Result<Option<RegistryEntry>, RegistryError> {
        let prefix = id_type_of(id).ok_or_else(|| RegistryError::InvalidId(id.to_string()))?;
        let registry_type: RegistryType = prefix
            .parse()
            .map_err(|_| RegistryError::UnknownType(prefix.to_string()))?;
        let collection = self.collection_for(registry_type)?;

        let by_id = json!({"property": "ID", "title": {"equals": id}});
        let records = match self.source.query(collection, Some(by_id)) {
            Ok(records) => records,
            Err(e) if matches!(e.kind(), RegistryErrorKind::NotFound | RegistryErrorKind::RequestFailed) => {
                tracing::debug!(id, "ID lookup failed ({e}); retrying by name");
                let by_name = json!({"property": "Name", "title": {"contains": id}});
                self.source.query(collection, Some(by_name))?
            }
            Err(e) => return Err(e),
        };

        Ok(records
            .first()
            .map(|record| RegistryEntry::parse(record, registry_type)))
    }

    /// Every entry of one type
    ///
    /// # Errors
    /// [`RegistryError::UnknownType`] when the type has no collection, or the
    /// source's error when the query fails.
    pub fn entries_of_type(&self, registry_type: RegistryType) -> Result<Vec<RegistryEntry>, RegistryError> {
        let collection = self.collection_for(registry_type)?;
        let records = self.source.query(collection, None)?;
        Ok(records
            .iter()
            .map(|record| RegistryEntry::parse(record, registry_type))
            .collect())
    }

    /// Resolve one relation link as an entry of `registry_type`
    fn resolve_link(&self, link: &str, registry_type: RegistryType) -> Result<Option<RegistryEntry>, RegistryError> {
        if gt_core::validate_format(link) {
            return self.get_entry(link);
        }
        match self.source.get(link) {
            Ok(record) => Ok(Some(RegistryEntry::parse(&record, registry_type))),
            Err(e) if e.kind() == RegistryErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Audit the traceability chain rooted at a feature
    ///
    /// Collects every finding instead of stopping at the first; only a
    /// missing feature ends the audit early. A failed lookup of a linked
    /// entry is recorded as an `INVALID_ID` finding for that link.
    ///
    /// # Errors
    /// Returns the source's error when the feature lookup fails.
    pub fn validate_chain(&self, feature_id: &str) -> Result<ChainReport, RegistryError> {
        let mut report = ChainReport::new(feature_id);

        let Some(feature) = self.get_entry(feature_id)? else {
            report.error(
                Issue::new(IssueCode::InvalidId, format!("{feature_id} not found in Feature Registry"))
                    .with_id(feature_id),
            );
            return Ok(report);
        };

        if !feature.has_links(RegistryType::BusinessRequirement) {
            report.error(
                Issue::new(IssueCode::MissingBr, format!("{feature_id} has no Business Requirement"))
                    .with_id(feature_id),
            );
        }
        if !feature.has_links(RegistryType::UserRequirement) {
            report.error(
                Issue::new(IssueCode::MissingUr, format!("{feature_id} has no User Requirement"))
                    .with_id(feature_id),
            );
        }

        let requirement_links: Vec<(RegistryType, &String)> = RegistryType::REQUIREMENT_KINDS
            .iter()
            .flat_map(|&kind| feature.links(kind).iter().map(move |link| (kind, link)))
            .collect();
        if requirement_links.is_empty() {
            report.error(
                Issue::new(IssueCode::MissingFr, format!("{feature_id} has no Functional Requirements"))
                    .with_id(feature_id),
            );
        }

        if !feature.has_links(RegistryType::CallFlow) {
            report.warning(
                Issue::new(IssueCode::MissingCf, format!("{feature_id} has no Call Flow")).with_id(feature_id),
            );
        }

        for (kind, link) in requirement_links {
            self.audit_requirement(link, kind, &mut report);
        }

        tracing::debug!(
            feature = feature_id,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "chain audited"
        );
        Ok(report)
    }

    /// Resolve a link, recording a finding when it cannot be resolved
    fn lookup_link(&self, link: &str, registry_type: RegistryType, report: &mut ChainReport) -> Option<RegistryEntry> {
        match self.resolve_link(link, registry_type) {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                report.error(not_found(link, registry_type));
                None
            }
            Err(e) => {
                tracing::warn!(link, registry_type = registry_type.as_str(), error = %e, "link lookup failed");
                report.error(
                    Issue::new(IssueCode::InvalidId, format!("Error resolving {link}: {e}"))
                        .with_id(link)
                        .with_id_type(registry_type.as_str()),
                );
                None
            }
        }
    }

    fn audit_requirement(&self, link: &str, kind: RegistryType, report: &mut ChainReport) {
        let Some(requirement) = self.lookup_link(link, kind, report) else {
            return;
        };
        let label = display_id(&requirement, link);

        let verifications = requirement.links(RegistryType::Verification);
        if verifications.is_empty() {
            report.error(Issue::new(IssueCode::MissingV, format!("{label} has no Verification")).with_id(label));
            return;
        }

        for v_link in verifications {
            let Some(verification) = self.lookup_link(v_link, RegistryType::Verification, report) else {
                continue;
            };
            let v_label = display_id(&verification, v_link);

            if !verification.has_links(RegistryType::TestCase) {
                report.error(
                    Issue::new(IssueCode::MissingTc, format!("{v_label} has no Test Case")).with_id(v_label),
                );
            }
            if verification.is_verified() && !verification.has_links(RegistryType::EvidenceArtifact) {
                report.error(
                    Issue::new(
                        IssueCode::MissingEa,
                        format!("{v_label} is Verified but has no Evidence Artifact"),
                    )
                    .with_id(v_label),
                );
            }
        }
    }
}

fn not_found(link: &str, registry_type: RegistryType) -> Issue {
    Issue::new(IssueCode::InvalidId, format!("{link} not found"))
        .with_id(link)
        .with_id_type(registry_type.as_str())
}

/// Domain identifier when the entry carries one, else the raw link
fn display_id<'a>(entry: &'a RegistryEntry, link: &'a str) -> &'a str {
    if entry.id.is_empty() {
        link
    } else {
        &entry.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRegistrySource;
    use pretty_assertions::assert_eq;

    fn databases() -> BTreeMap<String, String> {
        [("FEAT", "db-feat"), ("FR", "db-fr"), ("V", "db-v"), ("BR", "db-br")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn title(id: &str) -> Value {
        json!({"title": [{"plain_text": id}]})
    }

    fn relation(ids: &[&str]) -> Value {
        json!({"relation": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>()})
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let mut dbs = databases();
        dbs.insert("NOPE".into(), "db-x".into());
        let registry = Registry::new(MockRegistrySource::new(), &dbs);
        assert_eq!(registry.collection(RegistryType::Feature), Some("db-feat"));
        assert_eq!(registry.collection(RegistryType::TestCase), None);
    }

    #[test]
    fn get_entry_rejects_bad_ids_without_querying() {
        let registry = Registry::new(MockRegistrySource::new(), &databases());
        assert_eq!(
            registry.get_entry("INVALID").unwrap_err().kind(),
            RegistryErrorKind::InvalidId
        );
        assert_eq!(
            registry.get_entry("XYZ-AUTH-001").unwrap_err().kind(),
            RegistryErrorKind::UnknownType
        );
        assert_eq!(
            registry.get_entry("TC-AUTH-001").unwrap_err().kind(),
            RegistryErrorKind::UnknownType
        );
    }

    #[test]
    fn get_entry_queries_type_collection() {
        let mut source = MockRegistrySource::new();
        source
            .expect_query()
            .withf(|collection, filter| {
                collection == "db-br"
                    && filter.as_ref().and_then(|f| f.pointer("/title/equals")) == Some(&json!("BR-AUTH-001"))
            })
            .times(1)
            .returning(|_, _| Ok(vec![json!({"properties": {"ID": title("BR-AUTH-001")}})]));

        let registry = Registry::new(source, &databases());
        let entry = registry.get_entry("BR-AUTH-001").unwrap().unwrap();
        assert_eq!(entry.id, "BR-AUTH-001");
        assert_eq!(entry.registry_type, RegistryType::BusinessRequirement);
    }

    #[test]
    fn get_entry_falls_back_to_name_filter() {
        let mut source = MockRegistrySource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_query()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Err(RegistryError::RequestFailed {
                    status: Some(400),
                    message: "Could not find property with name or id: ID".into(),
                })
            });
        source
            .expect_query()
            .withf(|_, filter| filter.as_ref().and_then(|f| f.get("property")) == Some(&json!("Name")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(vec![json!({"properties": {"Name": title("FR-AUTH-001")}})]));

        let registry = Registry::new(source, &databases());
        let entry = registry.get_entry("FR-AUTH-001").unwrap().unwrap();
        assert_eq!(entry.id, "FR-AUTH-001");
    }

    #[test]
    fn auth_failure_is_not_retried() {
        let mut source = MockRegistrySource::new();
        source
            .expect_query()
            .times(1)
            .returning(|_, _| Err(RegistryError::AuthFailed));

        let registry = Registry::new(source, &databases());
        assert_eq!(
            registry.get_entry("FR-AUTH-001").unwrap_err().kind(),
            RegistryErrorKind::AuthFailed
        );
    }

    #[test]
    fn empty_result_is_none() {
        let mut source = MockRegistrySource::new();
        source.expect_query().returning(|_, _| Ok(Vec::new()));
        let registry = Registry::new(source, &databases());
        assert_eq!(registry.get_entry("FEAT-AUTH-001").unwrap(), None);
    }

    #[test]
    fn entries_of_type_parses_every_record() {
        let mut source = MockRegistrySource::new();
        source
            .expect_query()
            .withf(|collection, filter| collection == "db-v" && filter.is_none())
            .returning(|_, _| {
                Ok(vec![
                    json!({"properties": {"ID": title("V-AUTH-001")}}),
                    json!({"properties": {"ID": title("V-AUTH-002")}}),
                ])
            });
        let registry = Registry::new(source, &databases());
        let ids: Vec<_> = registry
            .entries_of_type(RegistryType::Verification)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, ["V-AUTH-001", "V-AUTH-002"]);
    }

    #[test]
    fn missing_feature_stops_the_audit() {
        let mut source = MockRegistrySource::new();
        source.expect_query().times(1).returning(|_, _| Ok(Vec::new()));
        source.expect_get().never();

        let registry = Registry::new(source, &databases());
        let report = registry.validate_chain("FEAT-AUTH-001").unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].code, IssueCode::InvalidId);
        assert_eq!(report.errors[0].message, "FEAT-AUTH-001 not found in Feature Registry");
    }

    #[test]
    fn bare_feature_reports_every_missing_link() {
        let mut source = MockRegistrySource::new();
        source
            .expect_query()
            .returning(|_, _| Ok(vec![json!({"properties": {"ID": title("FEAT-AUTH-001")}})]));

        let registry = Registry::new(source, &databases());
        let report = registry.validate_chain("FEAT-AUTH-001").unwrap();
        let codes: Vec<_> = report.errors.iter().map(|i| i.code).collect();
        assert_eq!(codes, [IssueCode::MissingBr, IssueCode::MissingUr, IssueCode::MissingFr]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, IssueCode::MissingCf);
    }

    #[test]
    fn record_id_links_are_fetched_directly() {
        let mut source = MockRegistrySource::new();
        source.expect_query().returning(|_, _| {
            Ok(vec![json!({"properties": {
                "ID": title("FEAT-AUTH-001"),
                "BR": relation(&["br-page"]),
                "UR": relation(&["ur-page"]),
                "CF": relation(&["cf-page"]),
                "NFR-IDs": relation(&["nfr-page", "gone-page"]),
            }})])
        });
        source.expect_get().returning(|record_id| match record_id {
            "nfr-page" => Ok(json!({"properties": {"ID": title("NFR-AUTH-001")}})),
            other => Err(RegistryError::NotFound(format!("page {other}"))),
        });

        let registry = Registry::new(source, &databases());
        let report = registry.validate_chain("FEAT-AUTH-001").unwrap();
        let rendered: Vec<_> = report.errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "[MISSING_V] NFR-AUTH-001 has no Verification",
                "[INVALID_ID] gone-page not found",
            ]
        );
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn failed_link_lookups_are_recorded_and_audit_continues() {
        let mut source = MockRegistrySource::new();
        source.expect_query().returning(|_, _| {
            Ok(vec![json!({"properties": {
                "ID": title("FEAT-AUTH-001"),
                "BR": relation(&["br-page"]),
                "UR": relation(&["ur-page"]),
                "CF": relation(&["cf-page"]),
                "FR": relation(&["fr-page", "fr-page-2"]),
            }})])
        });
        source.expect_get().returning(|record_id| match record_id {
            "fr-page" => Err(RegistryError::RateLimited),
            "fr-page-2" => Ok(json!({"properties": {
                "ID": title("FR-AUTH-002"),
                "V": relation(&["v-page", "v-page-2"]),
            }})),
            "v-page" => Err(RegistryError::RequestFailed {
                status: Some(500),
                message: "upstream".into(),
            }),
            _ => Ok(json!({"properties": {"ID": title("V-AUTH-002"), "TC": relation(&["tc-page"])}})),
        });

        let registry = Registry::new(source, &databases());
        let report = registry.validate_chain("FEAT-AUTH-001").unwrap();
        let rendered: Vec<_> = report.errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "[INVALID_ID] Error resolving fr-page: registry rate limit exceeded; try again later",
                "[INVALID_ID] Error resolving v-page: registry request failed (500): upstream",
            ]
        );
        assert_eq!(report.errors[0].context.id.as_deref(), Some("fr-page"));
        assert_eq!(report.errors[1].context.id_type.as_deref(), Some("V"));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn feature_lookup_failure_propagates() {
        let mut source = MockRegistrySource::new();
        source.expect_query().returning(|_, _| Err(RegistryError::RateLimited));

        let registry = Registry::new(source, &databases());
        let err = registry.validate_chain("FEAT-AUTH-001").unwrap_err();
        assert_eq!(err.kind(), RegistryErrorKind::RateLimited);
    }
}
