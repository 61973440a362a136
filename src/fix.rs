//! Auto-fixing of fixable findings via line-anchored text edits.
//!
//! Detection and correction stay separate: rules only flag findings, and
//! this module turns the fixable ones (DOC100, DOC200) into non-overlapping
//! line edits. Edits are computed against the positions captured at analysis
//! time; after applying them the file is re-analyzed from scratch, so no
//! finding is ever reported from a stale position. Fixing already-fixed
//! content is a no-op.

use crate::analysis::{CSharpAnalyzer, Declaration, FileDeclarations};
use crate::config::XmlDocOptions;
use crate::engine;
use crate::rules::{Finding, RuleCode, Severity};

/// One line-anchored text edit.
///
/// Replaces `line_count` lines starting at `start_line` (1-indexed) with
/// `text`; a `line_count` of zero inserts `text` above `start_line`.
#[derive(Debug, Clone)]
pub struct Edit {
    pub start_line: usize,
    pub line_count: usize,
    pub text: String,
}

impl Edit {
    /// First line after the edited region (exclusive end).
    fn end_line(&self) -> usize {
        self.start_line + self.line_count
    }
}

/// The non-overlapping edits for one file, plus findings for any fixable
/// finding whose edit was dropped by overlap resolution.
#[derive(Debug, Default)]
pub struct EditPlan {
    pub edits: Vec<Edit>,
    pub conflicts: Vec<Finding>,
}

/// Result of fixing one file's content.
#[derive(Debug)]
pub struct FixOutcome {
    /// The (possibly rewritten) file content.
    pub content: String,
    /// Whether the content differs from the input.
    pub changed: bool,
    /// Findings against the final content, including conflict demotions.
    pub findings: Vec<Finding>,
    /// SLOC of the final content.
    pub sloc: usize,
}

/// Compute edits for the fixable findings of one file.
///
/// When two edits would collide, the earlier-starting one wins and the other
/// is demoted to a DOC900 suggestion rather than silently dropped.
pub fn compute_edits(file: &FileDeclarations, findings: &[Finding], content: &str) -> EditPlan {
    let mut candidates: Vec<(Edit, &Finding)> = Vec::new();

    for finding in findings {
        if !finding.fixable {
            continue;
        }
        let decl = match file
            .declarations
            .iter()
            .find(|d| d.span.start_line == finding.line)
        {
            Some(d) => d,
            None => continue,
        };

        let edit = match finding.code {
            RuleCode::MissingDocumentation => {
                let indent = indent_of(content, decl.span.start_line);
                Edit {
                    start_line: decl.span.start_line,
                    line_count: 0,
                    text: stub_block(decl, &indent),
                }
            }
            RuleCode::MissingSummary => {
                let (doc_start, doc_end) = match decl.doc_span {
                    Some(span) => span,
                    None => continue,
                };
                let indent = indent_of(content, decl.span.start_line);
                Edit {
                    start_line: doc_start,
                    line_count: doc_end - doc_start + 1,
                    text: rebuilt_doc_block(decl, content, &indent),
                }
            }
            _ => continue,
        };
        candidates.push((edit, finding));
    }

    candidates.sort_by_key(|(e, _)| (e.start_line, e.line_count));

    let mut plan = EditPlan::default();
    for (edit, finding) in candidates {
        let collides = plan.edits.last().map_or(false, |prev| {
            edit.start_line < prev.end_line()
                || (edit.start_line == prev.start_line
                    && edit.line_count == 0
                    && prev.line_count == 0)
        });
        if collides {
            plan.conflicts.push(conflict_finding(finding));
        } else {
            plan.edits.push(edit);
        }
    }
    plan
}

/// Apply non-overlapping edits to file content.
pub fn apply(content: &str, edits: &[Edit]) -> String {
    if edits.is_empty() {
        return content.to_string();
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by_key(|e| (e.start_line, e.line_count));

    let mut out: Vec<&str> = Vec::new();
    let mut next = 0usize; // 0-based index of the next unconsumed source line
    for edit in sorted {
        let start = (edit.start_line - 1).min(lines.len());
        while next < start {
            out.push(lines[next]);
            next += 1;
        }
        out.extend(edit.text.lines());
        next = next.max(start + edit.line_count).min(lines.len());
    }
    while next < lines.len() {
        out.push(lines[next]);
        next += 1;
    }

    let mut result = out.join("\n");
    if content.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Analyze, fix, and re-analyze one file's content.
///
/// The returned findings are computed against the rewritten content, never
/// carried over from pre-fix positions.
pub fn fix_source(path: &str, content: &str, options: &XmlDocOptions) -> FixOutcome {
    let analyzer = CSharpAnalyzer::new();
    let file = analyzer.declarations_for(path, content);
    let findings = engine::analyze_file(&file, options);
    let plan = compute_edits(&file, &findings, content);

    if plan.edits.is_empty() {
        return FixOutcome {
            content: content.to_string(),
            changed: false,
            findings,
            sloc: file.sloc,
        };
    }

    let fixed = apply(content, &plan.edits);
    let refreshed = analyzer.declarations_for(path, &fixed);
    let mut final_findings = engine::analyze_file(&refreshed, options);
    final_findings.extend(plan.conflicts);
    final_findings.sort_by(|a, b| a.line.cmp(&b.line).then(a.code.cmp(&b.code)));

    FixOutcome {
        content: fixed,
        changed: true,
        findings: final_findings,
        sloc: refreshed.sloc,
    }
}

fn conflict_finding(original: &Finding) -> Finding {
    Finding {
        code: RuleCode::FixConflict,
        severity: Severity::Suggestion,
        file: original.file.clone(),
        line: original.line,
        end_line: None,
        message: format!(
            "fix for {} at line {} not applied: it overlaps an earlier edit",
            original.code, original.line
        ),
        fixable: false,
    }
}

/// A complete stub documentation block for an undocumented declaration.
///
/// The stub documents every declared parameter and type parameter, and the
/// return value when there is one, so a freshly stubbed declaration is clean
/// on re-analysis.
fn stub_block(decl: &Declaration, indent: &str) -> String {
    let mut lines = vec![summary_stub(decl, indent)];
    for tp in &decl.type_params {
        lines.push(format!(
            "{}/// <typeparam name=\"{}\">The {} type parameter.</typeparam>",
            indent, tp, tp
        ));
    }
    for param in &decl.params {
        lines.push(format!(
            "{}/// <param name=\"{}\">The {}.</param>",
            indent, param, param
        ));
    }
    if decl.has_return {
        lines.push(format!("{}/// <returns>The result.</returns>", indent));
    }
    lines.join("\n")
}

fn summary_stub(decl: &Declaration, indent: &str) -> String {
    format!(
        "{}/// <summary>The {} {}.</summary>",
        indent, decl.name, decl.kind
    )
}

/// Replacement text for a doc block whose summary is missing or blank: a
/// stub summary followed by the original block minus its blank `<summary>`
/// element. Unrecognized tags (`<remarks>`, `<exception>`, ...) survive
/// verbatim.
fn rebuilt_doc_block(decl: &Declaration, content: &str, indent: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let (doc_start, doc_end) = decl.doc_span.unwrap_or((decl.span.start_line, decl.span.start_line));
    let block: Vec<&str> = lines
        .get(doc_start - 1..doc_end.min(lines.len()))
        .unwrap_or(&[])
        .to_vec();

    let skip = summary_element_lines(&block);
    let mut out = vec![summary_stub(decl, indent)];
    for (i, line) in block.iter().enumerate() {
        if let Some((from, to)) = skip {
            if i >= from && i <= to {
                continue;
            }
        }
        out.push((*line).to_string());
    }
    out.join("\n")
}

/// Line range (0-indexed, inclusive) of the `<summary>` element within a doc
/// block, if present.
fn summary_element_lines(block: &[&str]) -> Option<(usize, usize)> {
    for (i, line) in block.iter().enumerate() {
        if let Some(pos) = line.find("<summary") {
            let rest = &line[pos..];
            if rest.contains("/>") || rest.contains("</summary") {
                return Some((i, i));
            }
            for (j, later) in block.iter().enumerate().skip(i + 1) {
                if later.contains("</summary") {
                    return Some((i, j));
                }
            }
            return Some((i, block.len() - 1));
        }
    }
    None
}

/// Leading whitespace of the given 1-indexed line.
fn indent_of(content: &str, line: usize) -> String {
    content
        .lines()
        .nth(line.saturating_sub(1))
        .map(|l| l[..l.len() - l.trim_start().len()].to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> XmlDocOptions {
        XmlDocOptions::default()
    }

    #[test]
    fn test_apply_insertion() {
        let content = "one\ntwo\nthree\n";
        let edits = vec![Edit {
            start_line: 2,
            line_count: 0,
            text: "inserted".to_string(),
        }];
        assert_eq!(apply(content, &edits), "one\ninserted\ntwo\nthree\n");
    }

    #[test]
    fn test_apply_replacement() {
        let content = "one\ntwo\nthree\n";
        let edits = vec![Edit {
            start_line: 2,
            line_count: 1,
            text: "2a\n2b".to_string(),
        }];
        assert_eq!(apply(content, &edits), "one\n2a\n2b\nthree\n");
    }

    #[test]
    fn test_apply_preserves_missing_trailing_newline() {
        let content = "one\ntwo";
        let edits = vec![Edit {
            start_line: 1,
            line_count: 0,
            text: "zero".to_string(),
        }];
        assert_eq!(apply(content, &edits), "zero\none\ntwo");
    }

    #[test]
    fn test_fix_undocumented_field() {
        let content = r#"namespace Widgets
{
    /// <summary>A counter.</summary>
    public class Counter
    {
        public int Count;
    }
}
"#;
        // The namespace itself is undocumented too; gate it off to focus
        // the test on the field.
        let opts = XmlDocOptions {
            require_documentation_for_namespaces: false,
            ..options()
        };
        let outcome = fix_source("Counter.cs", content, &opts);
        assert!(outcome.changed);
        assert!(outcome
            .content
            .contains("/// <summary>The Count field.</summary>"));
        // The stub sits immediately above the field, same indentation.
        let lines: Vec<&str> = outcome.content.lines().collect();
        let field_idx = lines
            .iter()
            .position(|l| l.contains("public int Count;"))
            .unwrap();
        assert!(lines[field_idx - 1].contains("</summary>"));
        assert_eq!(
            &lines[field_idx - 1][..8],
            "        ",
            "stub should match the field's indentation"
        );
        // Re-analysis of the fixed content finds nothing.
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_fix_method_stub_covers_signature() {
        let content = r#"/// <summary>A calculator.</summary>
public class Calculator
{
    public int Add(int amount)
    {
        return amount;
    }
}
"#;
        let outcome = fix_source("Calculator.cs", content, &options());
        assert!(outcome.changed);
        assert!(outcome
            .content
            .contains("/// <param name=\"amount\">The amount.</param>"));
        assert!(outcome.content.contains("/// <returns>The result.</returns>"));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_fix_is_idempotent() {
        let content = r#"namespace Widgets
{
    public class Counter
    {
        public int Count;

        public void Reset()
        {
        }
    }
}
"#;
        let first = fix_source("Counter.cs", content, &options());
        assert!(first.changed);
        let second = fix_source("Counter.cs", &first.content, &options());
        assert!(!second.changed);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_fix_missing_summary_preserves_other_tags() {
        let content = r#"/// <summary>   </summary>
/// <remarks>Keep me.</remarks>
public class Counter
{
}
"#;
        let outcome = fix_source("Counter.cs", content, &options());
        assert!(outcome.changed);
        assert!(outcome
            .content
            .contains("/// <summary>The Counter type.</summary>"));
        assert!(outcome.content.contains("<remarks>Keep me.</remarks>"));
        // The blank summary element is gone.
        assert!(!outcome.content.contains("<summary>   </summary>"));
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_mismatch_is_not_fixed() {
        let content = r#"/// <summary>A calculator.</summary>
public class Calculator
{
    /// <summary>Adds.</summary>
    /// <param name="amnt">The amount.</param>
    /// <param name="amount">The amount.</param>
    public void Add(int amount)
    {
    }
}
"#;
        let outcome = fix_source("Calculator.cs", content, &options());
        assert!(!outcome.changed);
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.code == RuleCode::StructuralMismatch));
    }

    #[test]
    fn test_same_anchor_conflict_demoted() {
        let content = "public class Holder\n{\n    public int A; public int B;\n}\n";
        let outcome = fix_source("Holder.cs", content, &options());
        assert!(outcome.changed);
        // One of the two same-line fields got its stub; the other fix was
        // demoted to a DOC900 suggestion instead of silently vanishing.
        assert!(outcome
            .findings
            .iter()
            .any(|f| f.code == RuleCode::FixConflict && f.severity == Severity::Suggestion));
    }

    #[test]
    fn test_clean_file_untouched() {
        let content = r#"/// <summary>A counter.</summary>
public class Counter
{
}
"#;
        let outcome = fix_source("Counter.cs", content, &options());
        assert!(!outcome.changed);
        assert_eq!(outcome.content, content);
        assert!(outcome.findings.is_empty());
    }
}
