//! Reporting contract and output renderers.
//!
//! The engine talks to reporters through the [`Reporter`] trait: one
//! `report_file` call per analyzed file, then exactly one completion call.
//! Base reporters implement `complete`; result-aware reporters override
//! `complete_with` to receive the sealed [`RunResult`] as well (the default
//! implementation delegates, so base reporters need nothing extra).
//! Reporters are read-only consumers; they never mutate findings.
//!
//! Three renderers ship with the tool:
//! - Text: colored terminal output for human readability
//! - JSON: structured output including the metrics document for CI gating
//! - SARIF: Static Analysis Results Interchange Format for IDE integration

use colored::*;
use serde::{Deserialize, Serialize};

use crate::aggregate::RunResult;
use crate::rules::{Finding, RuleCode, Severity};

/// The order in which files are handed to a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOrder {
    /// Files arrive in discovery order.
    Discovery,
    /// Files arrive as their analysis completes, which under parallel
    /// execution is not deterministic.
    Completion,
}

impl ReportOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportOrder::Discovery => "discovery",
            ReportOrder::Completion => "completion",
        }
    }
}

/// Consumer of per-file findings and the run-wide result.
pub trait Reporter {
    /// Called once per analyzed file, in the order announced at construction.
    fn report_file(&mut self, path: &str, findings: &[Finding]);

    /// Called exactly once after the last file.
    fn complete(&mut self);

    /// Result-aware completion. Reporters that want the sealed run result
    /// override this; the default falls back to the base level.
    fn complete_with(&mut self, result: &RunResult) {
        let _ = result;
        self.complete();
    }
}

// =============================================================================
// Text format
// =============================================================================

/// Colored terminal renderer.
pub struct TextReporter {
    files_reported: usize,
    files_with_findings: usize,
}

impl TextReporter {
    pub fn new() -> Self {
        println!();
        print!("  ");
        print!("{}", "doccheck".cyan().bold());
        println!(" v{}", env!("CARGO_PKG_VERSION"));
        println!();
        Self {
            files_reported: 0,
            files_with_findings: 0,
        }
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TextReporter {
    fn report_file(&mut self, path: &str, findings: &[Finding]) {
        self.files_reported += 1;
        if findings.is_empty() {
            return;
        }
        self.files_with_findings += 1;

        println!("  {}", path.blue());
        for f in findings {
            write_severity_tag(&f.severity);
            print!("{:<8}", f.code.as_str().dimmed());
            print!("{}", format!(":{}", f.line).dimmed());
            if f.fixable {
                print!("  {}", "[fixable]".dimmed());
            }
            println!();
            println!("            {}", f.message);
        }
        println!();
    }

    fn complete(&mut self) {
        println!(
            "  {} file(s) checked, {} with findings",
            self.files_reported, self.files_with_findings
        );
    }

    fn complete_with(&mut self, result: &RunResult) {
        self.complete();
        println!();
        println!(
            "  {} SLOC, {} finding(s): {} error(s), {} warning(s), {} suggestion(s)",
            result.sloc,
            result.finding_count,
            result.error_count,
            result.warning_count,
            result.suggestion_count
        );
        println!(
            "  {}",
            format!("{:.1} findings per KLoc", result.findings_per_kloc).dimmed()
        );
        if result.changed_files > 0 {
            println!("  {} file(s) rewritten", result.changed_files);
        }
        if result.incomplete {
            println!("  {}", "run was cancelled; results are partial".yellow());
        }
        println!();
        if result.has_errors() {
            println!("  {}", "FAILED".red());
        } else {
            println!("  {}", "PASSED".green());
        }
        println!();
    }
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Suggestion => print!("    {} ", "HINT ".blue()),
    }
}

// =============================================================================
// JSON format
// =============================================================================

/// Top-level JSON report.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    /// "discovery" or "completion".
    pub order: String,
    pub files: Vec<JsonFileEntry>,
    /// The metrics document, present when the reporter received the sealed
    /// run result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RunResult>,
}

/// Findings for one file.
#[derive(Serialize, Deserialize)]
pub struct JsonFileEntry {
    pub path: String,
    pub findings: Vec<JsonFinding>,
}

/// One finding in JSON form.
#[derive(Serialize, Deserialize, Clone)]
pub struct JsonFinding {
    pub code: String,
    pub severity: String,
    pub file: String,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    pub message: String,
    pub fixable: bool,
}

pub fn finding_to_json(f: &Finding) -> JsonFinding {
    JsonFinding {
        code: f.code.as_str().to_string(),
        severity: f.severity.to_string(),
        file: f.file.clone(),
        line: f.line,
        end_line: f.end_line,
        message: f.message.clone(),
        fixable: f.fixable,
    }
}

/// Machine-readable renderer: one JSON document on completion.
pub struct JsonReporter {
    order: ReportOrder,
    files: Vec<JsonFileEntry>,
}

impl JsonReporter {
    pub fn new(order: ReportOrder) -> Self {
        Self {
            order,
            files: Vec::new(),
        }
    }

    fn render(&self, metrics: Option<RunResult>) -> JsonReport {
        JsonReport {
            version: env!("CARGO_PKG_VERSION").to_string(),
            order: self.order.as_str().to_string(),
            files: self
                .files
                .iter()
                .map(|f| JsonFileEntry {
                    path: f.path.clone(),
                    findings: f.findings.clone(),
                })
                .collect(),
            metrics,
        }
    }

    fn emit(&self, report: &JsonReport) {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error serializing report: {}", e),
        }
    }
}

impl Reporter for JsonReporter {
    fn report_file(&mut self, path: &str, findings: &[Finding]) {
        self.files.push(JsonFileEntry {
            path: path.to_string(),
            findings: findings.iter().map(finding_to_json).collect(),
        });
    }

    fn complete(&mut self) {
        let report = self.render(None);
        self.emit(&report);
    }

    fn complete_with(&mut self, result: &RunResult) {
        let report = self.render(Some(result.clone()));
        self.emit(&report);
    }
}

// =============================================================================
// SARIF format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "doccheck";
const INFO_URI: &str = "https://github.com/zen-systems/doccheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
}

/// Rule metadata for SARIF output.
struct RuleInfo {
    name: &'static str,
    short_description: &'static str,
    default_level: &'static str,
}

fn rule_info(code: RuleCode) -> RuleInfo {
    match code {
        RuleCode::ParseFailure => RuleInfo {
            name: "ParseFailure",
            short_description: "The file could not be parsed into declarations",
            default_level: "error",
        },
        RuleCode::MissingDocumentation => RuleInfo {
            name: "MissingDocumentation",
            short_description: "A public or protected declaration has no documentation comment",
            default_level: "error",
        },
        RuleCode::MissingSummary => RuleInfo {
            name: "MissingSummary",
            short_description: "A documentation comment has no <summary>, or it is empty",
            default_level: "error",
        },
        RuleCode::StructuralMismatch => RuleInfo {
            name: "StructuralMismatch",
            short_description: "Documented parameters or returns contradict the declaration",
            default_level: "warning",
        },
        RuleCode::EmptyStructuralText => RuleInfo {
            name: "EmptyStructuralText",
            short_description: "A <param>, <typeparam>, or <returns> entry has no description",
            default_level: "note",
        },
        RuleCode::DuplicateStructuralTag => RuleInfo {
            name: "DuplicateStructuralTag",
            short_description: "Two documentation entries name the same parameter",
            default_level: "warning",
        },
        RuleCode::MissingStructuralTag => RuleInfo {
            name: "MissingStructuralTag",
            short_description: "A declared parameter has no documentation entry",
            default_level: "warning",
        },
        RuleCode::FixConflict => RuleInfo {
            name: "FixConflict",
            short_description: "An auto-fix was skipped because it overlapped an earlier edit",
            default_level: "note",
        },
    }
}

fn severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Suggestion => "note",
    }
}

/// Build a SARIF report from collected findings.
pub fn sarif_report(findings: &[Finding]) -> SarifReport {
    let mut codes: Vec<RuleCode> = findings.iter().map(|f| f.code).collect();
    codes.sort();
    codes.dedup();

    let rules: Vec<SarifRule> = codes
        .into_iter()
        .map(|code| {
            let info = rule_info(code);
            SarifRule {
                id: code.as_str().to_string(),
                name: info.name.to_string(),
                short_description: SarifMessage {
                    text: info.short_description.to_string(),
                },
                default_config: SarifRuleConfig {
                    level: info.default_level.to_string(),
                },
            }
        })
        .collect();

    let results: Vec<SarifResult> = findings
        .iter()
        .map(|f| SarifResult {
            rule_id: f.code.as_str().to_string(),
            level: severity_to_level(&f.severity).to_string(),
            message: SarifMessage {
                text: f.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: f.file.replace('\\', "/"),
                    },
                    region: SarifRegion {
                        start_line: if f.line > 0 { f.line } else { 1 },
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// SARIF renderer. Findings are buffered and emitted on completion.
pub struct SarifReporter {
    findings: Vec<Finding>,
}

impl SarifReporter {
    pub fn new() -> Self {
        Self {
            findings: Vec::new(),
        }
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for SarifReporter {
    fn report_file(&mut self, _path: &str, findings: &[Finding]) {
        self.findings.extend_from_slice(findings);
    }

    fn complete(&mut self) {
        let report = sarif_report(&self.findings);
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error serializing report: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_finding() -> Finding {
        Finding {
            code: RuleCode::MissingDocumentation,
            severity: Severity::Error,
            file: "Widgets.cs".to_string(),
            line: 12,
            end_line: Some(14),
            message: "type 'Widgets.Counter' is missing a documentation comment".to_string(),
            fixable: true,
        }
    }

    #[test]
    fn test_json_finding_fields() {
        let json = serde_json::to_string(&finding_to_json(&sample_finding())).unwrap();
        for field in ["code", "severity", "file", "line", "end_line", "message", "fixable"] {
            assert!(json.contains(&format!("\"{}\"", field)), "missing {}", field);
        }
        assert!(json.contains("\"DOC100\""));
        assert!(json.contains("\"error\""));
    }

    #[test]
    fn test_sarif_structure() {
        let report = sarif_report(&[sample_finding()]);
        assert_eq!(report.version, "2.1.0");
        assert_eq!(report.runs.len(), 1);
        assert_eq!(report.runs[0].results.len(), 1);
        assert_eq!(report.runs[0].results[0].rule_id, "DOC100");
        assert_eq!(report.runs[0].results[0].level, "error");
        assert_eq!(report.runs[0].tool.driver.rules.len(), 1);

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"$schema\""));
        assert!(json.contains("\"ruleId\""));
        assert!(json.contains("\"startLine\""));
    }

    #[test]
    fn test_sarif_dedups_rules() {
        let findings = vec![sample_finding(), sample_finding()];
        let report = sarif_report(&findings);
        assert_eq!(report.runs[0].tool.driver.rules.len(), 1);
        assert_eq!(report.runs[0].results.len(), 2);
    }

    #[test]
    fn test_suggestion_maps_to_note() {
        assert_eq!(severity_to_level(&Severity::Suggestion), "note");
    }

    #[test]
    fn test_json_reporter_collects_in_order() {
        let mut reporter = JsonReporter::new(ReportOrder::Discovery);
        reporter.report_file("A.cs", &[sample_finding()]);
        reporter.report_file("B.cs", &[]);
        let report = reporter.render(None);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].path, "A.cs");
        assert_eq!(report.files[0].findings.len(), 1);
        assert_eq!(report.order, "discovery");
        assert!(report.metrics.is_none());
    }
}
