//! DOC200: documentation exists but the `<summary>` is absent or blank.

use crate::analysis::{Declaration, DeclarationKind, DocComment};
use crate::config::XmlDocOptions;

use super::{kind_is_checked, Finding, RuleCode};

/// Fires when a checked declaration carries documentation whose summary
/// section is missing or contains only whitespace.
pub fn evaluate(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    let checked = match decl.kind {
        // Fields have their own gate, independent of presence checking.
        DeclarationKind::Field => options.require_summary_for_fields,
        kind => kind_is_checked(kind, options),
    };
    if !checked || !decl.visibility.is_checked() {
        return None;
    }

    let raw = decl.doc.as_deref().filter(|d| !d.trim().is_empty())?;
    let doc = DocComment::parse(raw);
    if doc.summary_has_content() {
        return None;
    }

    let message = if doc.has_summary() {
        format!(
            "documentation for {} '{}' has an empty <summary>",
            decl.kind, decl.qualified_name
        )
    } else {
        format!(
            "documentation for {} '{}' has no <summary> section",
            decl.kind, decl.qualified_name
        )
    };

    Some(Finding::for_declaration(RuleCode::MissingSummary, decl, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testutil::decl;
    use crate::rules::Severity;

    #[test]
    fn test_fires_for_missing_summary() {
        let d = decl(
            DeclarationKind::Member,
            "Add",
            Some("<remarks>No summary here.</remarks>"),
        );
        let finding = evaluate(&d, &XmlDocOptions::default()).unwrap();
        assert_eq!(finding.code, RuleCode::MissingSummary);
        assert_eq!(finding.severity, Severity::Error);
        assert!(finding.fixable);
        assert!(finding.message.contains("no <summary>"));
    }

    #[test]
    fn test_fires_for_blank_summary() {
        let d = decl(
            DeclarationKind::Member,
            "Add",
            Some("<summary>   </summary>"),
        );
        let finding = evaluate(&d, &XmlDocOptions::default()).unwrap();
        assert!(finding.message.contains("empty <summary>"));
    }

    #[test]
    fn test_silent_without_documentation() {
        // Absence is DOC100's job.
        let d = decl(DeclarationKind::Member, "Add", None);
        assert!(evaluate(&d, &XmlDocOptions::default()).is_none());
    }

    #[test]
    fn test_silent_with_real_summary() {
        let d = decl(
            DeclarationKind::Member,
            "Add",
            Some("<summary>Adds.</summary>"),
        );
        assert!(evaluate(&d, &XmlDocOptions::default()).is_none());
    }

    #[test]
    fn test_field_gate() {
        let d = decl(DeclarationKind::Field, "Count", Some("<remarks>r</remarks>"));
        assert!(evaluate(&d, &XmlDocOptions::default()).is_some());

        let options = XmlDocOptions {
            require_summary_for_fields: false,
            ..XmlDocOptions::default()
        };
        assert!(evaluate(&d, &options).is_none());
    }
}
