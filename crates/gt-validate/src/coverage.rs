//! Code ↔ manifest coverage

use gt_core::{Issue, IssueCode};
use gt_manifest::Manifest;
use gt_symbol::CodeSymbol;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Outcome of a coverage pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageResult {
    /// Checkable parsed symbols
    pub total_symbols: usize,
    /// Distinct manifest paths that match a checkable symbol
    pub mapped_symbols: usize,
    /// Qualified paths of unmapped checkable symbols
    pub orphan_symbols: Vec<String>,
    /// Manifest paths with no parsed symbol
    pub invalid_mappings: Vec<String>,
    pub coverage_percentage: f64,
    pub errors: Vec<Issue>,
}

/// Percentage of `mapped` over `total`; 0 when there is nothing to cover
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn coverage_percentage(mapped: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        mapped as f64 / total as f64 * 100.0
    }
}

/// Checks both directions of the symbol mapping
#[derive(Debug, Clone, Copy)]
pub struct CoverageValidator;

impl CoverageValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compare manifest symbol mappings with parsed symbols
    #[must_use]
    pub fn validate(&self, manifest: &Manifest, symbols: &[CodeSymbol]) -> CoverageResult {
        let by_path: HashMap<String, &CodeSymbol> = symbols.iter().map(|s| (s.qualified_path(), s)).collect();
        let mut result = CoverageResult::default();
        let mut mapped: BTreeSet<&str> = BTreeSet::new();

        for mapping in manifest.symbols() {
            match by_path.get(&mapping.path) {
                None => {
                    result.errors.push(
                        Issue::new(
                            IssueCode::OrphanManifest,
                            format!("Manifest entry '{}' has no matching code", mapping.path),
                        )
                        .with_path(&mapping.path)
                        .with_ids(mapping.ids.clone()),
                    );
                    result.invalid_mappings.push(mapping.path.clone());
                }
                Some(symbol) if symbol.is_checkable() => {
                    mapped.insert(mapping.path.as_str());
                }
                Some(_) => {}
            }
        }

        let manifest_paths = manifest.symbol_paths();
        let exclusions = manifest.exclusion_matcher();
        let mut total = 0;
        for symbol in symbols.iter().filter(|s| s.is_checkable()) {
            total += 1;
            let path = symbol.qualified_path();
            if manifest_paths.contains(path.as_str()) || exclusions.is_excluded(&path, &symbol.file_path) {
                continue;
            }
            result.errors.push(
                Issue::new(IssueCode::OrphanCode, format!("Code symbol '{path}' not in manifest"))
                    .with_path(&path)
                    .with_location(&symbol.file_path, symbol.line_start)
                    .with_kind(symbol.kind.as_str()),
            );
            result.orphan_symbols.push(path);
        }

        result.total_symbols = total;
        result.mapped_symbols = mapped.len();
        result.coverage_percentage = coverage_percentage(result.mapped_symbols, total);
        tracing::debug!(
            service = %manifest.service,
            total,
            mapped = result.mapped_symbols,
            "coverage computed"
        );
        result
    }
}

impl Default for CoverageValidator {
    fn default() -> Self {
        Self::new()
    }
}
