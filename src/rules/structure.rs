//! Structural documentation rules: consistency between the documented
//! `<param>`/`<typeparam>`/`<returns>` entries and the declaration
//! signature.
//!
//! - DOC210: an entry contradicts the signature (unknown name, or a
//!   documented return value on a declaration that returns nothing).
//! - DOC220: an entry exists but its description is empty.
//! - DOC230: two entries document the same name.
//! - DOC240: a declared parameter or type parameter has no entry.
//!
//! These apply only to kinds that carry structure (types and members);
//! namespaces, fields, and enum members have no parameters to document.

use std::collections::HashSet;

use crate::analysis::{Declaration, DocComment};
use crate::config::XmlDocOptions;

use super::{Finding, RuleCode};

/// DOC210. Requires an existing documentation comment with a non-empty
/// summary, which makes it mutually exclusive with DOC100 and DOC200.
pub fn evaluate_mismatch(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    let _ = options;
    let doc = structured_doc(decl)?;
    if !doc.summary_has_content() {
        return None;
    }

    for tag in &doc.params {
        if !decl.params.iter().any(|p| p == &tag.name) {
            return Some(Finding::for_declaration(
                RuleCode::StructuralMismatch,
                decl,
                format!(
                    "<param name=\"{}\"> does not match any declared parameter of '{}'",
                    tag.name, decl.qualified_name
                ),
            ));
        }
    }
    for tag in &doc.type_params {
        if !decl.type_params.iter().any(|p| p == &tag.name) {
            return Some(Finding::for_declaration(
                RuleCode::StructuralMismatch,
                decl,
                format!(
                    "<typeparam name=\"{}\"> does not match any declared type parameter of '{}'",
                    tag.name, decl.qualified_name
                ),
            ));
        }
    }
    if doc.has_returns() && !decl.has_return {
        return Some(Finding::for_declaration(
            RuleCode::StructuralMismatch,
            decl,
            format!(
                "'{}' documents a return value but does not return one",
                decl.qualified_name
            ),
        ));
    }

    None
}

/// DOC220. An entry with an empty or whitespace-only description.
pub fn evaluate_empty_text(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    let _ = options;
    let doc = structured_doc(decl)?;

    for tag in doc.params.iter().chain(doc.type_params.iter()) {
        if !tag.has_content() {
            return Some(Finding::for_declaration(
                RuleCode::EmptyStructuralText,
                decl,
                format!(
                    "documentation entry for '{}' on '{}' has an empty description",
                    tag.name, decl.qualified_name
                ),
            ));
        }
    }
    if let Some(returns) = &doc.returns {
        if returns.trim().is_empty() {
            return Some(Finding::for_declaration(
                RuleCode::EmptyStructuralText,
                decl,
                format!(
                    "<returns> documentation on '{}' has an empty description",
                    decl.qualified_name
                ),
            ));
        }
    }

    None
}

/// DOC230. Two entries documenting the same name. Reported once per
/// declaration, naming the first duplicate.
pub fn evaluate_duplicates(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    let _ = options;
    let doc = structured_doc(decl)?;

    for (tags, element) in [(&doc.params, "param"), (&doc.type_params, "typeparam")] {
        let mut seen = HashSet::new();
        for tag in tags.iter() {
            if !seen.insert(tag.name.as_str()) {
                return Some(Finding::for_declaration(
                    RuleCode::DuplicateStructuralTag,
                    decl,
                    format!(
                        "duplicate <{} name=\"{}\"> in documentation for '{}'",
                        element, tag.name, decl.qualified_name
                    ),
                ));
            }
        }
    }

    None
}

/// DOC240. A declared parameter or type parameter without an entry.
/// Reported once per declaration, naming the first undocumented name.
pub fn evaluate_missing_tags(decl: &Declaration, options: &XmlDocOptions) -> Option<Finding> {
    let _ = options;
    let doc = structured_doc(decl)?;

    for param in &decl.params {
        if !doc.params.iter().any(|t| &t.name == param) {
            return Some(Finding::for_declaration(
                RuleCode::MissingStructuralTag,
                decl,
                format!(
                    "parameter '{}' of '{}' has no <param> documentation",
                    param, decl.qualified_name
                ),
            ));
        }
    }
    for tp in &decl.type_params {
        if !doc.type_params.iter().any(|t| &t.name == tp) {
            return Some(Finding::for_declaration(
                RuleCode::MissingStructuralTag,
                decl,
                format!(
                    "type parameter '{}' of '{}' has no <typeparam> documentation",
                    tp, decl.qualified_name
                ),
            ));
        }
    }

    None
}

/// Parsed documentation for declarations the structural rules apply to.
fn structured_doc(decl: &Declaration) -> Option<DocComment> {
    if !decl.kind.has_structure() || !decl.visibility.is_checked() {
        return None;
    }
    let raw = decl.doc.as_deref().filter(|d| !d.trim().is_empty())?;
    Some(DocComment::parse(raw))
}
