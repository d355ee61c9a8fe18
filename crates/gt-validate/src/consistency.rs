//! Manifest ↔ registry consistency
//!
//! Every identifier the manifest references must be well formed and exist
//! in the registry, and every declared feature must have a complete chain.
//! Registry failures become issues; nothing propagates past
//! [`ConsistencyValidator::validate`].

use gt_core::{validate_format, Issue, IssueCode};
use gt_manifest::Manifest;
use gt_registry::{Registry, RegistrySource};
use serde::Serialize;

/// Outcome of a consistency pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyResult {
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

/// Checks manifest identifiers against the registry
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate identifiers and feature chains
    pub fn validate<S: RegistrySource>(&self, manifest: &Manifest, registry: &Registry<S>) -> ConsistencyResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for (id_type, ids) in manifest.referenced_ids() {
            for id in ids {
                if !validate_format(&id) {
                    errors.push(
                        Issue::new(IssueCode::InvalidFormat, format!("Invalid ID format: {id}"))
                            .with_id(&id)
                            .with_id_type(&id_type),
                    );
                    continue;
                }
                match registry.get_entry(&id) {
                    Ok(Some(_)) => {}
                    Ok(None) => errors.push(
                        Issue::new(IssueCode::InvalidId, format!("ID not found in registry: {id}"))
                            .with_id(&id)
                            .with_id_type(&id_type),
                    ),
                    Err(e) => {
                        tracing::warn!(id = %id, "registry lookup failed: {e}");
                        errors.push(
                            Issue::new(IssueCode::InvalidId, format!("Error checking ID {id}: {e}"))
                                .with_id(&id)
                                .with_id_type(&id_type),
                        );
                    }
                }
            }
        }

        for feature in manifest.features() {
            match registry.validate_chain(&feature.id) {
                Ok(report) => {
                    errors.extend(report.errors.into_iter().map(|i| i.with_feature(&feature.id)));
                    warnings.extend(report.warnings.into_iter().map(|i| i.with_feature(&feature.id)));
                }
                Err(e) => {
                    tracing::warn!(feature = %feature.id, "chain validation failed: {e}");
                    errors.push(
                        Issue::new(
                            IssueCode::ValidationError,
                            format!("Failed to validate traceability chain for {}: {e}", feature.id),
                        )
                        .with_feature(&feature.id),
                    );
                }
            }
        }

        ConsistencyResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

impl Default for ConsistencyValidator {
    fn default() -> Self {
        Self::new()
    }
}
