//! Per-service validation run

use crate::config::Config;
use gt_manifest::{Manifest, ManifestError};
use gt_registry::{Registry, RegistrySource};
use gt_symbol::{
    CodeSymbol, ExtractorSet, GoExtractor, IgnoreSet, KindFilter, Language, PythonExtractor, TypeScriptExtractor,
};
use gt_validate::{ConsistencyValidator, CoverageValidator, OrphanResult, OrphanValidator, ServiceReport};
use std::path::Path;

fn kinds(config: &Config, language: Language) -> KindFilter {
    let settings = config.parser(language);
    if settings.extract.is_empty() {
        KindFilter::from_words(language.default_extract())
    } else {
        KindFilter::from_words(&settings.extract)
    }
}

/// Extractors for every enabled language
#[must_use]
pub fn extractors(config: &Config) -> ExtractorSet {
    let mut set = ExtractorSet::new();
    if config.parser(Language::Python).enabled {
        set.register(PythonExtractor::new(kinds(config, Language::Python)));
    }
    if config.parser(Language::TypeScript).enabled {
        set.register(TypeScriptExtractor::new(kinds(config, Language::TypeScript)));
    }
    if config.parser(Language::Go).enabled {
        set.register(GoExtractor::new(kinds(config, Language::Go)));
    }
    set
}

/// Symbols of every enabled language under a service root
///
/// Files that fail to parse are logged and skipped.
#[must_use]
pub fn parse_service(service_root: &Path, config: &Config) -> Vec<CodeSymbol> {
    let ignore = IgnoreSet::new(&config.validation.ignore_patterns);
    let extraction = extractors(config).extract_all(service_root, &ignore);
    if !extraction.failures.is_empty() {
        tracing::warn!(
            service = %service_root.display(),
            failures = extraction.failures.len(),
            "some files could not be parsed"
        );
    }
    extraction.symbols
}

/// Load the manifest of a service
///
/// # Errors
/// Returns [`ManifestError`] when the manifest is missing or invalid.
pub fn load_manifest(service_root: &Path, config: &Config) -> Result<Manifest, ManifestError> {
    Manifest::load(&service_root.join(&config.services.discovery.manifest_filename))
}

/// Coverage and consistency report for one service
///
/// # Errors
/// Only manifest loading can fail; validation findings are in the report.
pub fn validate_service<S: RegistrySource>(
    service_root: &Path,
    config: &Config,
    registry: &Registry<S>,
) -> Result<ServiceReport, ManifestError> {
    tracing::info!(service = %service_root.display(), "validating service");
    let manifest = load_manifest(service_root, config)?;
    let symbols = parse_service(service_root, config);

    let coverage = CoverageValidator::new().validate(&manifest, &symbols);
    let consistency = ConsistencyValidator::new().validate(&manifest, registry);
    Ok(ServiceReport::assemble(manifest.service.clone(), coverage, consistency))
}

/// Orphans for one service
///
/// # Errors
/// Returns [`ManifestError`] when the manifest is missing or invalid.
pub fn detect_orphans(service_root: &Path, config: &Config) -> Result<OrphanResult, ManifestError> {
    let manifest = load_manifest(service_root, config)?;
    let symbols = parse_service(service_root, config);
    Ok(OrphanValidator::new().detect(&manifest, &symbols))
}
