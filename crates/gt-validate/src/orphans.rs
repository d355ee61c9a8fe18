//! Orphan detection with fix-up suggestions

use gt_manifest::{Manifest, MANIFEST_FILENAME};
use gt_symbol::CodeSymbol;
use serde::Serialize;
use std::collections::HashSet;

/// Candidates offered for a misspelled manifest path
pub const MAX_SUGGESTIONS: usize = 3;

/// Minimum similarity ratio for a candidate
pub const SIMILARITY_CUTOFF: f32 = 0.6;

/// Parsed symbol with no manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanCode {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub file: String,
    pub line: usize,
}

/// Manifest entry with no parsed symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrphanManifest {
    pub path: String,
    pub ids: Vec<String>,
}

/// Which side an orphan is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanSide {
    Code,
    Manifest,
}

/// Suggested fix for one orphan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub orphan: String,
    #[serde(rename = "type")]
    pub side: OrphanSide,
    pub suggestion: String,
}

/// Outcome of orphan detection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanResult {
    pub orphan_code: Vec<OrphanCode>,
    pub orphan_manifest: Vec<OrphanManifest>,
    pub suggestions: Vec<Suggestion>,
}

impl OrphanResult {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orphan_code.is_empty() && self.orphan_manifest.is_empty()
    }
}

/// Finds unmatched entries on both sides of the symbol mapping
#[derive(Debug, Clone, Copy)]
pub struct OrphanValidator;

impl OrphanValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Detect orphans and suggest fixes
    #[must_use]
    pub fn detect(&self, manifest: &Manifest, symbols: &[CodeSymbol]) -> OrphanResult {
        let manifest_paths = manifest.symbol_paths();
        let exclusions = manifest.exclusion_matcher();
        let parsed_paths: Vec<String> = symbols.iter().map(CodeSymbol::qualified_path).collect();
        let parsed_set: HashSet<&str> = parsed_paths.iter().map(String::as_str).collect();
        let mut result = OrphanResult::default();

        for (symbol, path) in symbols.iter().zip(&parsed_paths) {
            if manifest_paths.contains(path.as_str())
                || !symbol.is_checkable()
                || exclusions.is_excluded(path, &symbol.file_path)
            {
                continue;
            }
            result.suggestions.push(Suggestion {
                orphan: path.clone(),
                side: OrphanSide::Code,
                suggestion: manifest_snippet(path, symbol.kind.as_str()),
            });
            result.orphan_code.push(OrphanCode {
                path: path.clone(),
                kind: symbol.kind.as_str().to_string(),
                file: symbol.file_path.clone(),
                line: symbol.line_start,
            });
        }

        let candidates: Vec<&str> = parsed_paths.iter().map(String::as_str).collect();
        for mapping in manifest.symbols() {
            if parsed_set.contains(mapping.path.as_str()) {
                continue;
            }
            let similar = similar::get_close_matches(
                mapping.path.as_str(),
                &candidates,
                MAX_SUGGESTIONS,
                SIMILARITY_CUTOFF,
            );
            result.suggestions.push(Suggestion {
                orphan: mapping.path.clone(),
                side: OrphanSide::Manifest,
                suggestion: did_you_mean(&similar),
            });
            result.orphan_manifest.push(OrphanManifest {
                path: mapping.path.clone(),
                ids: mapping.ids.clone(),
            });
        }

        tracing::debug!(
            service = %manifest.service,
            orphan_code = result.orphan_code.len(),
            orphan_manifest = result.orphan_manifest.len(),
            "orphans detected"
        );
        result
    }
}

impl Default for OrphanValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Ready-to-paste manifest entry with placeholder identifiers
#[must_use]
pub fn manifest_snippet(qualified_path: &str, kind: &str) -> String {
    format!(
        "Add to {MANIFEST_FILENAME}:\n\n  - path: \"{qualified_path}\"\n    type: {kind}\n    ids:\n      - FEAT-XXX-001  # Replace with actual feature ID\n      - FR-XXX-001    # Replace with actual requirement ID"
    )
}

fn did_you_mean(candidates: &[&str]) -> String {
    if candidates.is_empty() {
        return "Symbol not found in codebase. Consider removing from manifest or fixing the path.".to_string();
    }
    let lines: Vec<String> = candidates.iter().map(|c| format!("  - {c}")).collect();
    format!("Did you mean one of these?\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_test_utils::{class, function, manifest_with_symbols, method};
    use pretty_assertions::assert_eq;

    #[test]
    fn typo_in_manifest_suggests_the_real_symbol() {
        let manifest = manifest_with_symbols(&["test.py::OAthProvider"]);
        let symbols = vec![class("test.py", "OAuthProvider", 1)];

        let result = OrphanValidator::new().detect(&manifest, &symbols);

        assert_eq!(result.orphan_manifest.len(), 1);
        let manifest_hint = result
            .suggestions
            .iter()
            .find(|s| s.side == OrphanSide::Manifest)
            .unwrap();
        assert_eq!(manifest_hint.orphan, "test.py::OAthProvider");
        assert!(manifest_hint.suggestion.starts_with("Did you mean one of these?"));
        assert!(manifest_hint.suggestion.contains("test.py::OAuthProvider"));
    }

    #[test]
    fn unrelated_manifest_path_suggests_removal() {
        let manifest = manifest_with_symbols(&["billing/invoice.go::Ledger"]);
        let result = OrphanValidator::new().detect(&manifest, &[function("x.py", "run", 1)]);
        assert_eq!(
            result.suggestions.last().unwrap().suggestion,
            "Symbol not found in codebase. Consider removing from manifest or fixing the path."
        );
    }

    #[test]
    fn orphan_code_gets_a_manifest_snippet() {
        let manifest = manifest_with_symbols(&[]);
        let symbols = vec![method("auth/oauth.py", "OAuthProvider", "login", 7)];

        let result = OrphanValidator::new().detect(&manifest, &symbols);

        assert_eq!(
            result.orphan_code,
            [OrphanCode {
                path: "auth/oauth.py::OAuthProvider.login".into(),
                kind: "method".into(),
                file: "auth/oauth.py".into(),
                line: 7,
            }]
        );
        let snippet = &result.suggestions[0].suggestion;
        assert!(snippet.starts_with("Add to .golden-thread.yaml:"));
        assert!(snippet.contains("  - path: \"auth/oauth.py::OAuthProvider.login\"\n    type: method\n"));
        assert!(snippet.contains("FEAT-XXX-001"));
    }

    #[test]
    fn matched_symbols_are_in_neither_list() {
        let manifest = manifest_with_symbols(&["a.py::A"]);
        let result = OrphanValidator::new().detect(&manifest, &[class("a.py", "A", 1)]);
        assert!(result.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn private_symbols_are_never_orphans() {
        let manifest = manifest_with_symbols(&[]);
        let result = OrphanValidator::new().detect(&manifest, &[method("a.py", "A", "_cache", 3)]);
        assert!(result.is_empty());
    }

    #[test]
    fn serializes_with_wire_names() {
        let suggestion = Suggestion {
            orphan: "a.py::A".into(),
            side: OrphanSide::Code,
            suggestion: "s".into(),
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json, serde_json::json!({"orphan": "a.py::A", "type": "code", "suggestion": "s"}));
    }
}
