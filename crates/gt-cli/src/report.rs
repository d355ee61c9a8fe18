//! Console and JSON rendering of validation results

use chrono::{DateTime, SecondsFormat, Utc};
use gt_core::Issue;
use gt_validate::{OrphanResult, ServiceReport};
use serde::Serialize;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// Report schema version
pub const REPORT_VERSION: &str = "1.0";

/// Validation report file name
pub const REPORT_FILENAME: &str = "report.json";

/// Orphan report file name
pub const ORPHANS_FILENAME: &str = "orphans.json";

/// Entries listed per section before the remainder is summarized
const DISPLAY_LIMIT: usize = 10;

/// Suggestions listed in the orphan report
const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub timestamp: String,
    pub version: String,
    pub framework_version: String,
    pub service: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub valid: bool,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub coverage_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSection {
    pub total_symbols: usize,
    pub mapped_symbols: usize,
    pub orphan_symbols: Vec<String>,
    pub invalid_mappings: Vec<String>,
}

/// Machine-readable validation report for CI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonReport {
    pub metadata: ReportMetadata,
    pub summary: ReportSummary,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub coverage: CoverageSection,
}

impl JsonReport {
    /// Build the report for `report` as of `generated_at`
    #[must_use]
    pub fn new(report: &ServiceReport, generated_at: DateTime<Utc>) -> Self {
        Self {
            metadata: ReportMetadata {
                timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                version: REPORT_VERSION.to_string(),
                framework_version: crate::VERSION.to_string(),
                service: report.service.clone(),
            },
            summary: ReportSummary {
                valid: report.valid,
                total_errors: report.errors.len(),
                total_warnings: report.warnings.len(),
                coverage_percentage: report.coverage_percentage,
            },
            errors: report.errors.clone(),
            warnings: report.warnings.clone(),
            coverage: CoverageSection {
                total_symbols: report.total_symbols,
                mapped_symbols: report.mapped_symbols,
                orphan_symbols: report.orphan_symbols.clone(),
                invalid_mappings: report.invalid_mappings.clone(),
            },
        }
    }
}

/// Serialize `value` as pretty JSON to `output_dir/file_name`
///
/// The directory is created if needed. Returns the written path.
///
/// # Errors
/// Returns an I/O error if the directory or file cannot be written.
pub fn write_json<T: Serialize>(output_dir: &Path, file_name: &str, value: &T) -> io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(&path, text)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(path)
}

fn render_issues(out: &mut String, heading: &str, noun: &str, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{heading} ({}):", issues.len());
    for issue in issues.iter().take(DISPLAY_LIMIT) {
        let _ = writeln!(out, "  • {}: {}", issue.code, issue.message);
    }
    if issues.len() > DISPLAY_LIMIT {
        let _ = writeln!(out, "  ... and {} more {noun}", issues.len() - DISPLAY_LIMIT);
    }
}

/// Console rendering of one service report
#[must_use]
pub fn render_service(report: &ServiceReport, strict: bool) -> String {
    let mut out = String::new();
    if report.passes(strict) {
        let _ = writeln!(out, "\n✓ {}: PASS", report.service);
    } else {
        let _ = writeln!(out, "\n✗ {}: FAIL", report.service);
    }
    let _ = writeln!(out, "Coverage: {:.1}%", report.coverage_percentage);
    render_issues(&mut out, "Errors", "errors", &report.errors);
    render_issues(&mut out, "Warnings", "warnings", &report.warnings);
    out
}

fn render_more(out: &mut String, total: usize) {
    if total > DISPLAY_LIMIT {
        let _ = writeln!(out, "  ... and {} more", total - DISPLAY_LIMIT);
    }
}

/// Console rendering of orphan detection
#[must_use]
pub fn render_orphans(result: &OrphanResult) -> String {
    let mut out = String::from("\nOrphan Detection Results\n");

    if !result.orphan_code.is_empty() {
        let _ = writeln!(out, "\nOrphaned Code ({}):", result.orphan_code.len());
        out.push_str("Code symbols without manifest entries:\n\n");
        for orphan in result.orphan_code.iter().take(DISPLAY_LIMIT) {
            let _ = writeln!(out, "  • {} ({}) at {}:{}", orphan.path, orphan.kind, orphan.file, orphan.line);
        }
        render_more(&mut out, result.orphan_code.len());
    }

    if !result.orphan_manifest.is_empty() {
        let _ = writeln!(out, "\nOrphaned Manifest ({}):", result.orphan_manifest.len());
        out.push_str("Manifest entries without matching code:\n\n");
        for orphan in result.orphan_manifest.iter().take(DISPLAY_LIMIT) {
            let _ = writeln!(out, "  • {}", orphan.path);
        }
        render_more(&mut out, result.orphan_manifest.len());
    }

    if !result.suggestions.is_empty() {
        out.push_str("\nSuggestions:\n");
        for suggestion in result.suggestions.iter().take(SUGGESTION_LIMIT) {
            let _ = writeln!(out, "\n{}:\n{}", suggestion.orphan, suggestion.suggestion);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gt_core::IssueCode;
    use gt_validate::{OrphanCode, OrphanManifest, OrphanSide, Suggestion};
    use pretty_assertions::assert_eq;

    fn report_with(errors: usize, warnings: usize) -> ServiceReport {
        ServiceReport {
            service: "auth-service".into(),
            valid: errors == 0,
            errors: (0..errors)
                .map(|i| Issue::new(IssueCode::OrphanCode, format!("orphan {i}")))
                .collect(),
            warnings: (0..warnings)
                .map(|i| Issue::new(IssueCode::MissingCf, format!("cf {i}")))
                .collect(),
            coverage_percentage: 87.5,
            total_symbols: 8,
            mapped_symbols: 7,
            ..ServiceReport::default()
        }
    }

    #[test]
    fn passing_service_renders_pass_header() {
        let text = render_service(&report_with(0, 0), false);
        assert_eq!(text, "\n✓ auth-service: PASS\nCoverage: 87.5%\n");
    }

    #[test]
    fn strict_mode_fails_on_warnings() {
        let text = render_service(&report_with(0, 1), true);
        assert!(text.starts_with("\n✗ auth-service: FAIL\n"));
        assert!(text.contains("Warnings (1):\n  • MISSING_CF: cf 0\n"));
    }

    #[test]
    fn long_issue_lists_are_truncated() {
        let text = render_service(&report_with(12, 0), false);
        assert!(text.contains("Errors (12):"));
        assert!(text.contains("  • ORPHAN_CODE: orphan 9\n"));
        assert!(!text.contains("orphan 10"));
        assert!(text.ends_with("  ... and 2 more errors\n"));
    }

    #[test]
    fn json_report_layout() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(JsonReport::new(&report_with(1, 0), at)).unwrap();

        assert_eq!(json["metadata"]["timestamp"], "2026-03-01T12:00:00.000000Z");
        assert_eq!(json["metadata"]["version"], "1.0");
        assert_eq!(json["metadata"]["service"], "auth-service");
        assert_eq!(
            json["summary"],
            serde_json::json!({"valid": false, "total_errors": 1, "total_warnings": 0, "coverage_percentage": 87.5})
        );
        assert_eq!(json["errors"][0]["code"], "ORPHAN_CODE");
        assert_eq!(json["coverage"]["total_symbols"], 8);
        assert_eq!(json["coverage"]["mapped_symbols"], 7);
    }

    #[test]
    fn write_json_creates_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports/nested");
        let path = write_json(&out, ORPHANS_FILENAME, &OrphanResult::default()).unwrap();

        assert_eq!(path, out.join("orphans.json"));
        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            written,
            serde_json::json!({"orphan_code": [], "orphan_manifest": [], "suggestions": []})
        );
    }

    #[test]
    fn orphan_rendering_lists_both_sides() {
        let result = OrphanResult {
            orphan_code: vec![OrphanCode {
                path: "a.py::A".into(),
                kind: "class".into(),
                file: "a.py".into(),
                line: 3,
            }],
            orphan_manifest: vec![OrphanManifest {
                path: "b.py::B".into(),
                ids: vec!["FR-AUTH-001".into()],
            }],
            suggestions: vec![Suggestion {
                orphan: "b.py::B".into(),
                side: OrphanSide::Manifest,
                suggestion: "Did you mean one of these?\n  - a.py::A".into(),
            }],
        };
        let text = render_orphans(&result);
        assert!(text.contains("Orphaned Code (1):\nCode symbols without manifest entries:\n\n  • a.py::A (class) at a.py:3\n"));
        assert!(text.contains("Orphaned Manifest (1):"));
        assert!(text.contains("  • b.py::B\n"));
        assert!(text.ends_with("\nb.py::B:\nDid you mean one of these?\n  - a.py::A\n"));
    }
}
