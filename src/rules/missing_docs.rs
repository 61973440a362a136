//! DOC100: declarations with no documentation comment at all.

use crate::analysis::Declaration;
use crate::config::XmlDocOptions;

use super::{kind_is_checked, Finding, RuleCode};

/// Fires when a checked, visible declaration has no documentation text.
pub fn evaluate(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    if !kind_is_checked(decl.kind, options) {
        return None;
    }
    if !decl.visibility.is_checked() {
        return None;
    }
    if decl.has_doc() {
        return None;
    }

    Some(Finding::for_declaration(
        RuleCode::MissingDocumentation,
        decl,
        format!(
            "{} '{}' is missing a documentation comment",
            decl.kind, decl.qualified_name
        ),
    ))
}
