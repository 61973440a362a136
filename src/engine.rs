//! Per-file analysis: runs the rule catalog over a declaration sequence.

use crate::analysis::FileDeclarations;
use crate::config::XmlDocOptions;
use crate::rules::{Finding, CATALOG};

/// Analyze one file's declarations and return its findings.
///
/// Findings are ordered by ascending start line, then by rule code, so the
/// output is deterministic regardless of rule evaluation order. A file with
/// a parse-failure signal yields exactly one DOC000 finding; the caller
/// continues with the next file.
///
/// Rules are total functions over the declaration model; a panic inside one
/// indicates a bug and is deliberately not caught here.
pub fn analyze_file(file: &FileDeclarations, options: &XmlDocOptions) -> Vec<Finding> {
    if let Some(error) = &file.parse_error {
        return vec![Finding::parse_failure(&file.path, error)];
    }

    let mut findings = Vec::new();
    for decl in &file.declarations {
        for (code, rule) in CATALOG {
            if let Some(finding) = rule(decl, options) {
                debug_assert_eq!(finding.code, *code);
                findings.push(finding);
            }
        }
    }

    findings.sort_by(|a, b| a.line.cmp(&b.line).then(a.code.cmp(&b.code)));
    findings
}
