//! The documentation rule catalog.
//!
//! Every rule is a pure function of `(declaration, options)` returning at
//! most one finding. Rules share no state and are safe to evaluate in
//! parallel across declarations and files. Detection never produces text
//! edits; the fixer derives those from fixable findings separately.

mod missing_docs;
mod structure;
mod summary;

use serde::{Deserialize, Serialize};

use crate::analysis::Declaration;
use crate::config::XmlDocOptions;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Suggestion => write!(f, "suggestion"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "suggestion" => Ok(Severity::Suggestion),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Codes for the documentation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleCode {
    /// Reserved code for files the front-end could not parse.
    #[serde(rename = "DOC000")]
    ParseFailure,
    #[serde(rename = "DOC100")]
    MissingDocumentation,
    #[serde(rename = "DOC200")]
    MissingSummary,
    #[serde(rename = "DOC210")]
    StructuralMismatch,
    #[serde(rename = "DOC220")]
    EmptyStructuralText,
    #[serde(rename = "DOC230")]
    DuplicateStructuralTag,
    #[serde(rename = "DOC240")]
    MissingStructuralTag,
    /// Reserved code for fixable findings dropped by overlap resolution.
    #[serde(rename = "DOC900")]
    FixConflict,
}

impl RuleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCode::ParseFailure => "DOC000",
            RuleCode::MissingDocumentation => "DOC100",
            RuleCode::MissingSummary => "DOC200",
            RuleCode::StructuralMismatch => "DOC210",
            RuleCode::EmptyStructuralText => "DOC220",
            RuleCode::DuplicateStructuralTag => "DOC230",
            RuleCode::MissingStructuralTag => "DOC240",
            RuleCode::FixConflict => "DOC900",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DOC000" => Some(RuleCode::ParseFailure),
            "DOC100" => Some(RuleCode::MissingDocumentation),
            "DOC200" => Some(RuleCode::MissingSummary),
            "DOC210" => Some(RuleCode::StructuralMismatch),
            "DOC220" => Some(RuleCode::EmptyStructuralText),
            "DOC230" => Some(RuleCode::DuplicateStructuralTag),
            "DOC240" => Some(RuleCode::MissingStructuralTag),
            "DOC900" => Some(RuleCode::FixConflict),
            _ => None,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            RuleCode::ParseFailure => Severity::Error,
            RuleCode::MissingDocumentation => Severity::Error,
            RuleCode::MissingSummary => Severity::Error,
            RuleCode::StructuralMismatch => Severity::Warning,
            RuleCode::EmptyStructuralText => Severity::Suggestion,
            RuleCode::DuplicateStructuralTag => Severity::Warning,
            RuleCode::MissingStructuralTag => Severity::Warning,
            RuleCode::FixConflict => Severity::Suggestion,
        }
    }

    /// Whether a mechanical text edit can resolve findings with this code.
    ///
    /// Structural mismatches require judgment about intent and are never
    /// auto-fixed.
    pub fn is_fixable(&self) -> bool {
        matches!(
            self,
            RuleCode::MissingDocumentation | RuleCode::MissingSummary
        )
    }
}

impl std::fmt::Display for RuleCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reported documentation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub code: RuleCode,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    pub message: String,
    pub fixable: bool,
}

impl Finding {
    /// Create a finding anchored at a declaration's span.
    pub fn for_declaration(code: RuleCode, decl: &Declaration, message: String) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            file: decl.file.clone(),
            line: decl.span.start_line,
            end_line: Some(decl.span.end_line),
            message,
            fixable: code.is_fixable(),
        }
    }

    /// Create the synthetic finding recorded for an unparsable file.
    pub fn parse_failure(path: &str, message: &str) -> Self {
        Self {
            code: RuleCode::ParseFailure,
            severity: Severity::Error,
            file: path.to_string(),
            line: 1,
            end_line: None,
            message: format!("file could not be analyzed: {}", message),
            fixable: false,
        }
    }
}

/// Signature every rule implements.
pub type RuleFn = fn(&Declaration, &XmlDocOptions) -> Option<Finding>;

/// The catalog, in code order. Each entry yields at most one finding per
/// declaration.
pub const CATALOG: &[(RuleCode, RuleFn)] = &[
    (RuleCode::MissingDocumentation, missing_docs::evaluate),
    (RuleCode::MissingSummary, summary::evaluate),
    (RuleCode::StructuralMismatch, structure::evaluate_mismatch),
    (RuleCode::EmptyStructuralText, structure::evaluate_empty_text),
    (RuleCode::DuplicateStructuralTag, structure::evaluate_duplicates),
    (RuleCode::MissingStructuralTag, structure::evaluate_missing_tags),
];

/// Whether DOC100-style presence checking applies to this declaration kind
/// under the given options. Type and Member are always checked; the three
/// remaining kinds are gated by configuration.
pub(crate) fn kind_is_checked(
    kind: crate::analysis::DeclarationKind,
    options: &XmlDocOptions,
) -> bool {
    use crate::analysis::DeclarationKind::*;
    match kind {
        Namespace => options.require_documentation_for_namespaces,
        Type | Member | Field => true,
        EnumMember => options.check_enum_members,
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::analysis::{Declaration, DeclarationKind, Span, Visibility};

    /// Build a declaration for rule tests.
    pub fn decl(kind: DeclarationKind, name: &str, doc: Option<&str>) -> Declaration {
        Declaration {
            name: name.to_string(),
            qualified_name: format!("Widgets.{}", name),
            kind,
            file: "Widgets.cs".to_string(),
            span: Span {
                start_byte: 0,
                end_byte: 10,
                start_line: 7,
                start_col: 5,
                end_line: 9,
                end_col: 6,
            },
            visibility: Visibility::Public,
            doc: doc.map(|d| d.to_string()),
            doc_span: doc.map(|_| (4, 6)),
            params: Vec::new(),
            type_params: Vec::new(),
            has_return: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for code in [
            RuleCode::ParseFailure,
            RuleCode::MissingDocumentation,
            RuleCode::MissingSummary,
            RuleCode::StructuralMismatch,
            RuleCode::EmptyStructuralText,
            RuleCode::DuplicateStructuralTag,
            RuleCode::MissingStructuralTag,
            RuleCode::FixConflict,
        ] {
            assert_eq!(RuleCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(RuleCode::parse("DOC999"), None);
    }

    #[test]
    fn test_fixable_codes() {
        assert!(RuleCode::MissingDocumentation.is_fixable());
        assert!(RuleCode::MissingSummary.is_fixable());
        assert!(!RuleCode::StructuralMismatch.is_fixable());
        assert!(!RuleCode::ParseFailure.is_fixable());
        assert!(!RuleCode::FixConflict.is_fixable());
    }

    #[test]
    fn test_codes_sort_ascending() {
        let mut codes = vec![
            RuleCode::StructuralMismatch,
            RuleCode::MissingDocumentation,
            RuleCode::ParseFailure,
        ];
        codes.sort();
        assert_eq!(
            codes,
            vec![
                RuleCode::ParseFailure,
                RuleCode::MissingDocumentation,
                RuleCode::StructuralMismatch,
            ]
        );
    }

    #[test]
    fn test_severity_serde_names() {
        let json = serde_json::to_string(&Severity::Suggestion).unwrap();
        assert_eq!(json, "\"suggestion\"");
        let json = serde_json::to_string(&RuleCode::MissingSummary).unwrap();
        assert_eq!(json, "\"DOC200\"");
    }
}
