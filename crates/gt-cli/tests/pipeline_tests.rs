//! Service pipeline tests over real source trees

use gt_cli::{detect_orphans, discover_services, parse_service, validate_service, write_json, Config, JsonReport};
use gt_core::IssueCode;
use gt_test_utils::{complete_chain_source, registry_over};
use gt_validate::ServiceReport;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

const MANIFEST: &str = r#"
service: auth-service
version: "1.0"
traceability:
  features:
    - id: FEAT-AUTH-001
  symbols:
    - path: auth/oauth.py::OAuthProvider
      type: class
      ids: [FEAT-AUTH-001, FR-AUTH-001]
    - path: web/session.ts::SessionStore
      type: class
      ids: [FR-AUTH-001]
"#;

fn config(extra: &str) -> Config {
    let text = format!("registry:\n  api_token: ${{TOKEN}}\n{extra}");
    Config::from_yaml_str(&text, |_| Some("secret".to_string())).unwrap()
}

fn write_service(root: &Path) {
    fs::create_dir_all(root.join("auth")).unwrap();
    fs::create_dir_all(root.join("web")).unwrap();
    fs::create_dir_all(root.join("api")).unwrap();
    fs::write(root.join("auth/oauth.py"), "class OAuthProvider:\n    pass\n").unwrap();
    fs::write(root.join("auth/test_oauth.py"), "def test_login():\n    pass\n\nclass Helper:\n    pass\n").unwrap();
    fs::write(root.join("web/session.ts"), "export class SessionStore {}\n").unwrap();
    fs::write(root.join("api/handler.go"), "package api\n\nfunc Serve() {}\n").unwrap();
    fs::write(root.join(".golden-thread.yaml"), MANIFEST).unwrap();
}

/// Default ignore patterns skip test files; every language is parsed
#[test]
fn parses_enabled_languages_and_honors_ignores() {
    let dir = tempfile::tempdir().unwrap();
    write_service(dir.path());

    let mut paths: Vec<_> = parse_service(dir.path(), &config(""))
        .iter()
        .map(gt_symbol::CodeSymbol::qualified_path)
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        ["api/handler.go::Serve", "auth/oauth.py::OAuthProvider", "web/session.ts::SessionStore"]
    );
}

/// A disabled parser contributes no symbols
#[test]
fn disabled_parsers_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_service(dir.path());

    let config = config("parsers:\n  go:\n    enabled: false\n");
    let symbols = parse_service(dir.path(), &config);
    assert!(symbols.iter().all(|s| !s.file_path.ends_with(".go")));
    assert_eq!(symbols.len(), 2);
}

/// Unmapped Go function is the only finding
#[test]
fn validates_a_service_against_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    write_service(dir.path());

    let registry = registry_over(complete_chain_source());
    let report = validate_service(dir.path(), &config(""), &registry).unwrap();

    assert_eq!(report.service, "auth-service");
    assert_eq!(report.total_symbols, 3);
    assert_eq!(report.mapped_symbols, 2);
    assert_eq!(report.orphan_symbols, ["api/handler.go::Serve"]);
    let codes: Vec<_> = report.errors.iter().map(|i| i.code).collect();
    assert_eq!(codes, [IssueCode::OrphanCode]);
    assert!(!report.passes(false));
}

/// A missing manifest is an error, not an empty report
#[test]
fn missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let registry = registry_over(complete_chain_source());
    assert!(validate_service(dir.path(), &config(""), &registry).is_err());
    assert!(detect_orphans(dir.path(), &config("")).is_err());
}

/// Orphans are reported on the code side with a manifest snippet
#[test]
fn detects_orphans_for_a_service() {
    let dir = tempfile::tempdir().unwrap();
    write_service(dir.path());

    let result = detect_orphans(dir.path(), &config("")).unwrap();
    assert_eq!(result.orphan_code.len(), 1);
    assert_eq!(result.orphan_code[0].path, "api/handler.go::Serve");
    assert!(result.orphan_manifest.is_empty());
}

/// Discovered services validate into one combined JSON report
#[test]
fn combined_report_for_discovered_services() {
    let dir = tempfile::tempdir().unwrap();
    let services = dir.path().join("services");
    write_service(&services.join("auth"));
    write_service(&services.join("billing"));

    let found = discover_services(&[&services], ".golden-thread.yaml");
    assert_eq!(found, [services.join("auth"), services.join("billing")]);

    let registry = registry_over(complete_chain_source());
    let config = config("");
    let reports: Vec<ServiceReport> = found
        .iter()
        .map(|service| validate_service(service, &config, &registry).unwrap())
        .collect();
    let combined = ServiceReport::combine(&reports);

    let out = dir.path().join("reports");
    let path = write_json(&out, "report.json", &JsonReport::new(&combined, chrono::Utc::now())).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(json["metadata"]["service"], "all");
    assert_eq!(json["summary"]["valid"], false);
    assert_eq!(json["summary"]["total_errors"], 2);
    assert_eq!(json["coverage"]["total_symbols"], 6);
    assert_eq!(json["coverage"]["mapped_symbols"], 4);
}
