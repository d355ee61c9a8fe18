//! Per-service validation result
//!
//! The stable contract between validation and any renderer.

use crate::consistency::ConsistencyResult;
use crate::coverage::{coverage_percentage, CoverageResult};
use gt_core::Issue;
use serde::Serialize;

/// Service name used for combined reports
pub const COMBINED_SERVICE: &str = "all";

/// Validation outcome for one service, or several combined
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceReport {
    pub service: String,
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub coverage_percentage: f64,
    pub total_symbols: usize,
    pub mapped_symbols: usize,
    pub orphan_symbols: Vec<String>,
    pub invalid_mappings: Vec<String>,
}

impl ServiceReport {
    /// Merge coverage and consistency results for a service
    ///
    /// Coverage errors come first; validity is the absence of errors.
    #[must_use]
    pub fn assemble(service: impl Into<String>, coverage: CoverageResult, consistency: ConsistencyResult) -> Self {
        let mut errors = coverage.errors;
        errors.extend(consistency.errors);
        Self {
            service: service.into(),
            valid: errors.is_empty(),
            errors,
            warnings: consistency.warnings,
            coverage_percentage: coverage.coverage_percentage,
            total_symbols: coverage.total_symbols,
            mapped_symbols: coverage.mapped_symbols,
            orphan_symbols: coverage.orphan_symbols,
            invalid_mappings: coverage.invalid_mappings,
        }
    }

    /// Fold several service reports into one
    ///
    /// Coverage is recomputed from the summed symbol counts.
    #[must_use]
    pub fn combine(reports: &[ServiceReport]) -> Self {
        let mut combined = Self {
            service: COMBINED_SERVICE.to_string(),
            valid: reports.iter().all(|r| r.valid),
            ..Self::default()
        };
        for report in reports {
            combined.errors.extend(report.errors.iter().cloned());
            combined.warnings.extend(report.warnings.iter().cloned());
            combined.total_symbols += report.total_symbols;
            combined.mapped_symbols += report.mapped_symbols;
            combined.orphan_symbols.extend(report.orphan_symbols.iter().cloned());
            combined.invalid_mappings.extend(report.invalid_mappings.iter().cloned());
        }
        combined.coverage_percentage = coverage_percentage(combined.mapped_symbols, combined.total_symbols);
        combined
    }

    #[inline]
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether the report passes, optionally treating warnings as failures
    #[inline]
    #[must_use]
    pub fn passes(&self, strict: bool) -> bool {
        self.valid && !(strict && self.has_warnings())
    }
}
