//! Typed registry entries
//!
//! Remote records carry heterogeneous property shapes. Each semantic field
//! is read from an ordered list of candidate properties; the first one that
//! yields a non-empty value wins, and a field with no match is empty.

use gt_core::RegistryType;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Remote property encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropertyShape {
    Title,
    RichText,
    Select,
    Status,
}

impl PropertyShape {
    fn extract(self, property: &Value) -> Option<&str> {
        let text = match self {
            PropertyShape::Title => property.get("title")?.get(0)?.get("plain_text")?,
            PropertyShape::RichText => property.get("rich_text")?.get(0)?.get("plain_text")?,
            PropertyShape::Select => property.get("select")?.get("name")?,
            PropertyShape::Status => property.get("status")?.get("name")?,
        };
        text.as_str().filter(|s| !s.is_empty())
    }
}

const ID_ALIASES: &[(&str, PropertyShape)] = &[("ID", PropertyShape::Title), ("Name", PropertyShape::Title)];

const TITLE_ALIASES: &[(&str, PropertyShape)] = &[
    ("Title", PropertyShape::RichText),
    ("Description", PropertyShape::RichText),
    ("Name", PropertyShape::RichText),
];

const STATUS_ALIASES: &[(&str, PropertyShape)] = &[
    ("Status", PropertyShape::Select),
    ("State", PropertyShape::Select),
    ("Status", PropertyShape::Status),
];

fn first_alias(properties: &Map<String, Value>, aliases: &[(&str, PropertyShape)]) -> String {
    aliases
        .iter()
        .find_map(|(name, shape)| properties.get(*name).and_then(|p| shape.extract(p)))
        .unwrap_or_default()
        .to_string()
}

/// Relation types each registry type is expected to carry
#[must_use]
pub fn expected_relations(registry_type: RegistryType) -> &'static [RegistryType] {
    use RegistryType::{
        BusinessRequirement as BR, CallFlow as CF, ComplianceRequirement as TCR,
        EvidenceArtifact as EA, Feature as FEAT, FunctionalRequirement as FR,
        NonFunctionalRequirement as NFR, TechnicalRequirement as TSR, TestCase as TC,
        UserRequirement as UR, Verification as V,
    };
    match registry_type {
        FEAT => &[BR, UR, FR, NFR, TSR, TCR, CF],
        FR | NFR | TSR | TCR => &[V, FEAT],
        V => &[TC, EA, FR, NFR, TSR, TCR],
        TC => &[EA, V],
        _ => &[],
    }
}

/// Property names tried, in order, for a relation type
#[must_use]
pub fn relation_property_names(relation: RegistryType) -> [String; 3] {
    let tag = relation.as_str();
    [format!("{tag}-IDs"), format!("{tag} IDs"), tag.to_string()]
}

fn relation_ids(property: &Value) -> Vec<String> {
    property
        .get("relation")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(Value::as_str))
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// One remote record with normalized fields
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    pub id: String,
    pub title: String,
    pub status: String,
    pub registry_type: RegistryType,
    /// Raw remote properties
    pub properties: Map<String, Value>,
    /// Linked record ids per expected relation type
    pub related_ids: BTreeMap<RegistryType, Vec<String>>,
}

impl RegistryEntry {
    /// Normalize a raw record of the given type
    #[must_use]
    pub fn parse(record: &Value, registry_type: RegistryType) -> Self {
        let properties = record
            .get("properties")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut related_ids = BTreeMap::new();
        for &relation in expected_relations(registry_type) {
            let found = relation_property_names(relation)
                .iter()
                .filter_map(|name| properties.get(name))
                .map(relation_ids)
                .find(|ids| !ids.is_empty());
            if let Some(ids) = found {
                related_ids.insert(relation, ids);
            }
        }

        Self {
            id: first_alias(&properties, ID_ALIASES),
            title: first_alias(&properties, TITLE_ALIASES),
            status: first_alias(&properties, STATUS_ALIASES),
            registry_type,
            properties,
            related_ids,
        }
    }

    /// Links of one relation type
    #[must_use]
    pub fn links(&self, relation: RegistryType) -> &[String] {
        self.related_ids.get(&relation).map_or(&[], Vec::as_slice)
    }

    /// Whether at least one link of the relation type exists
    #[inline]
    #[must_use]
    pub fn has_links(&self, relation: RegistryType) -> bool {
        !self.links(relation).is_empty()
    }

    /// Whether the status reads `verified`, ignoring case
    #[inline]
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status.eq_ignore_ascii_case("verified")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn relation(ids: &[&str]) -> Value {
        json!({ "relation": ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>() })
    }

    #[test]
    fn parses_primary_aliases() {
        let record = json!({
            "id": "page-1",
            "properties": {
                "ID": {"title": [{"plain_text": "FEAT-AUTH-001"}]},
                "Title": {"rich_text": [{"plain_text": "OAuth login"}]},
                "Status": {"select": {"name": "Approved"}},
                "BR-IDs": relation(&["br-page"]),
                "UR IDs": relation(&["ur-page"]),
                "FR": relation(&["fr-1", "fr-2"]),
            }
        });

        let entry = RegistryEntry::parse(&record, RegistryType::Feature);
        assert_eq!(entry.id, "FEAT-AUTH-001");
        assert_eq!(entry.title, "OAuth login");
        assert_eq!(entry.status, "Approved");
        assert_eq!(entry.links(RegistryType::BusinessRequirement), ["br-page"]);
        assert_eq!(entry.links(RegistryType::UserRequirement), ["ur-page"]);
        assert_eq!(entry.links(RegistryType::FunctionalRequirement), ["fr-1", "fr-2"]);
        assert!(!entry.has_links(RegistryType::CallFlow));
    }

    #[test]
    fn falls_back_through_aliases() {
        let record = json!({
            "properties": {
                "Name": {"title": [{"plain_text": "V-AUTH-001"}]},
                "Description": {"rich_text": [{"plain_text": "login verified"}]},
                "State": {"select": {"name": "Verified"}},
            }
        });

        let entry = RegistryEntry::parse(&record, RegistryType::Verification);
        assert_eq!(entry.id, "V-AUTH-001");
        assert_eq!(entry.title, "login verified");
        assert!(entry.is_verified());
    }

    #[test]
    fn status_property_shape_is_supported() {
        let record = json!({"properties": {"Status": {"status": {"name": "verified"}}}});
        let entry = RegistryEntry::parse(&record, RegistryType::Verification);
        assert_eq!(entry.status, "verified");
        assert!(entry.is_verified());
    }

    #[test]
    fn empty_relation_falls_through_to_next_variant() {
        let record = json!({
            "properties": {
                "V-IDs": relation(&[]),
                "V": relation(&["v-page"]),
            }
        });
        let entry = RegistryEntry::parse(&record, RegistryType::FunctionalRequirement);
        assert_eq!(entry.links(RegistryType::Verification), ["v-page"]);
    }

    #[test]
    fn schema_drift_degrades_to_empty_fields() {
        let record = json!({"properties": {"ID": {"rich_text": "unexpected"}, "Status": null}});
        let entry = RegistryEntry::parse(&record, RegistryType::TestCase);
        assert_eq!(entry.id, "");
        assert_eq!(entry.title, "");
        assert_eq!(entry.status, "");
        assert!(entry.related_ids.is_empty());
    }

    #[test]
    fn only_expected_relations_are_read() {
        let record = json!({"properties": {"TC": relation(&["tc-page"])}});
        let entry = RegistryEntry::parse(&record, RegistryType::Feature);
        assert!(entry.related_ids.is_empty());
    }

    #[test]
    fn relation_table() {
        assert_eq!(
            expected_relations(RegistryType::Verification),
            &[
                RegistryType::TestCase,
                RegistryType::EvidenceArtifact,
                RegistryType::FunctionalRequirement,
                RegistryType::NonFunctionalRequirement,
                RegistryType::TechnicalRequirement,
                RegistryType::ComplianceRequirement,
            ]
        );
        assert!(expected_relations(RegistryType::EvidenceArtifact).is_empty());
    }
}
