//! Manifest model
//!
//! One manifest per service, loaded once per run and read-only afterwards.

use crate::error::ManifestError;
use crate::exclusion::{compile, ExclusionMatcher};
use gt_core::id_type_of;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Code symbol to registry identifier mapping
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SymbolMapping {
    /// Qualified path, `file::Parent.name`
    pub path: String,
    /// Declared symbol kind (`class`, `method`, `endpoint`, ...)
    #[serde(rename = "type")]
    pub kind: String,
    pub ids: Vec<String>,
}

impl SymbolMapping {
    /// File part of the path
    #[must_use]
    pub fn file_path(&self) -> &str {
        self.path.split_once("::").map_or(self.path.as_str(), |(file, _)| file)
    }

    /// Symbol part of the path, empty when the path has no `::`
    #[must_use]
    pub fn symbol_name(&self) -> &str {
        self.path.split_once("::").map_or("", |(_, name)| name)
    }
}

/// Feature-level links
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureMapping {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub business_requirements: Vec<String>,
    #[serde(default)]
    pub user_requirements: Vec<String>,
    #[serde(default)]
    pub call_flows: Vec<String>,
}

/// API / RPC endpoint links
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterfaceMapping {
    pub id: String,
    /// `rest_api`, `graphql`, `grpc`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Test file links
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestMapping {
    pub path: String,
    #[serde(default)]
    pub test_cases: Vec<String>,
    #[serde(default)]
    pub verifications: Vec<String>,
}

/// Paths and symbols left out of coverage
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Exclusions {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// The `traceability` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Traceability {
    #[serde(default)]
    pub features: Vec<FeatureMapping>,
    #[serde(default)]
    pub symbols: Vec<SymbolMapping>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceMapping>,
    #[serde(default)]
    pub tests: Vec<TestMapping>,
}

/// Service traceability manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub service: String,
    #[serde(deserialize_with = "version_string")]
    pub version: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub exclusions: Exclusions,
    #[serde(default)]
    pub traceability: Traceability,
}

/// Accept `version: 1.0` as well as `version: "1.0"`
fn version_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "version must be a string or number, got {other:?}"
        ))),
    }
}

impl Manifest {
    /// Load and validate a manifest file
    ///
    /// # Errors
    /// Returns [`ManifestError`] if the file is missing, unreadable, empty,
    /// not YAML, missing a required field, or has an invalid exclusion glob.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match Self::from_yaml_str(&text) {
            Err(ManifestError::Empty(_)) => Err(ManifestError::Empty(path.to_path_buf())),
            other => other,
        }
    }

    /// Parse and validate manifest text
    ///
    /// # Errors
    /// Same as [`Manifest::load`], minus the file-system cases.
    pub fn from_yaml_str(text: &str) -> Result<Self, ManifestError> {
        let blank = text.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
        if blank {
            return Err(ManifestError::Empty(PathBuf::new()));
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(ManifestError::Syntax)?;
        if value.is_null() {
            return Err(ManifestError::Empty(PathBuf::new()));
        }
        let manifest: Manifest = serde_yaml::from_value(value).map_err(ManifestError::Format)?;

        for pattern in &manifest.exclusions.patterns {
            compile(pattern).map_err(|e| ManifestError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(manifest)
    }

    /// Symbol mappings
    #[inline]
    #[must_use]
    pub fn symbols(&self) -> &[SymbolMapping] {
        &self.traceability.symbols
    }

    /// Feature mappings
    #[inline]
    #[must_use]
    pub fn features(&self) -> &[FeatureMapping] {
        &self.traceability.features
    }

    /// All declared symbol paths
    #[must_use]
    pub fn symbol_paths(&self) -> HashSet<&str> {
        self.symbols().iter().map(|s| s.path.as_str()).collect()
    }

    /// Identifiers mapped to a symbol path (first matching mapping)
    #[must_use]
    pub fn ids_for_symbol(&self, path: &str) -> Vec<&str> {
        self.symbols()
            .iter()
            .find(|s| s.path == path)
            .map(|s| s.ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every identifier referenced anywhere, grouped by type
    ///
    /// Feature links are grouped under the role they are declared in
    /// (`BR`, `UR`, `CF`), test links under `TC` / `V`; everything else
    /// under its own prefix.
    #[must_use]
    pub fn referenced_ids(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut add = |group: &str, id: &str| {
            grouped.entry(group.to_string()).or_default().insert(id.to_string());
        };
        let prefix = |id: &str| id_type_of(id).unwrap_or(id).to_string();

        for symbol in self.symbols() {
            for id in &symbol.ids {
                add(&prefix(id), id);
            }
        }
        for feature in self.features() {
            add(&prefix(&feature.id), &feature.id);
            feature.business_requirements.iter().for_each(|id| add("BR", id));
            feature.user_requirements.iter().for_each(|id| add("UR", id));
            feature.call_flows.iter().for_each(|id| add("CF", id));
        }
        for iface in &self.traceability.interfaces {
            add(&prefix(&iface.id), &iface.id);
            for id in &iface.requirements {
                add(&prefix(id), id);
            }
        }
        for test in &self.traceability.tests {
            test.test_cases.iter().for_each(|id| add("TC", id));
            test.verifications.iter().for_each(|id| add("V", id));
        }
        grouped
    }

    /// Whether a qualified path is explicitly excluded
    #[must_use]
    pub fn is_excluded_symbol(&self, path: &str) -> bool {
        self.exclusions.symbols.iter().any(|s| s == path)
    }

    /// Compiled exclusion matcher
    #[must_use]
    pub fn exclusion_matcher(&self) -> ExclusionMatcher {
        ExclusionMatcher::new(&self.exclusions)
    }
}
