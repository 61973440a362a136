//! Structural model of an XML documentation comment.
//!
//! XML doc comments in the wild are frequently not well-formed XML, so the
//! model is extracted with regular expressions over the raw comment text
//! rather than an XML parser. Only the elements the rules reason about are
//! extracted: `<summary>`, `<param>`, `<typeparam>`, and `<returns>`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SUMMARY: Regex =
        Regex::new(r#"(?is)<summary\s*>(.*?)</\s*summary\s*>"#).unwrap();
    static ref SUMMARY_EMPTY: Regex = Regex::new(r#"(?i)<summary\s*/>"#).unwrap();
    static ref PARAM: Regex =
        Regex::new(r#"(?is)<param\s+name\s*=\s*"([^"]*)"\s*>(.*?)</\s*param\s*>"#).unwrap();
    static ref PARAM_EMPTY: Regex =
        Regex::new(r#"(?i)<param\s+name\s*=\s*"([^"]*)"\s*/>"#).unwrap();
    static ref TYPEPARAM: Regex =
        Regex::new(r#"(?is)<typeparam\s+name\s*=\s*"([^"]*)"\s*>(.*?)</\s*typeparam\s*>"#)
            .unwrap();
    static ref TYPEPARAM_EMPTY: Regex =
        Regex::new(r#"(?i)<typeparam\s+name\s*=\s*"([^"]*)"\s*/>"#).unwrap();
    static ref RETURNS: Regex =
        Regex::new(r#"(?is)<returns\s*>(.*?)</\s*returns\s*>"#).unwrap();
    static ref RETURNS_EMPTY: Regex = Regex::new(r#"(?i)<returns\s*/>"#).unwrap();
}

/// A named structural tag (`<param>` or `<typeparam>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Value of the `name` attribute.
    pub name: String,
    /// Inner content, raw.
    pub text: String,
}

impl DocTag {
    /// Whether the tag carries a meaningful description.
    ///
    /// Nested elements such as `<see cref="..."/>` count as content even
    /// though their rendered text may be empty.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The parsed structure of one doc comment.
#[derive(Debug, Clone, Default)]
pub struct DocComment {
    /// Inner text of the first `<summary>` element; `None` when the element
    /// is absent entirely.
    pub summary: Option<String>,
    /// `<param>` entries in document order.
    pub params: Vec<DocTag>,
    /// `<typeparam>` entries in document order.
    pub type_params: Vec<DocTag>,
    /// Inner text of the first `<returns>` element.
    pub returns: Option<String>,
}

impl DocComment {
    /// Extract the structural model from raw doc comment text.
    pub fn parse(raw: &str) -> Self {
        let summary = first_element(raw, &SUMMARY, &SUMMARY_EMPTY);
        let returns = first_element(raw, &RETURNS, &RETURNS_EMPTY);
        Self {
            summary,
            params: named_tags(raw, &PARAM, &PARAM_EMPTY),
            type_params: named_tags(raw, &TYPEPARAM, &TYPEPARAM_EMPTY),
            returns,
        }
    }

    /// Whether a `<summary>` element exists at all.
    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }

    /// Whether the summary exists and contains more than whitespace.
    pub fn summary_has_content(&self) -> bool {
        self.summary
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    /// Whether a `<returns>` element exists.
    pub fn has_returns(&self) -> bool {
        self.returns.is_some()
    }
}

/// Position and text of the first match across the full and self-closing
/// forms of an element.
fn first_element(raw: &str, full: &Regex, self_closing: &Regex) -> Option<String> {
    let full_match = full.captures(raw).map(|c| {
        let m = c.get(0).map(|m| m.start()).unwrap_or(0);
        (m, c.get(1).map(|m| m.as_str().to_string()).unwrap_or_default())
    });
    let empty_match = self_closing.find(raw).map(|m| (m.start(), String::new()));

    match (full_match, empty_match) {
        (Some((fs, ft)), Some((es, _))) if fs <= es => Some(ft),
        (_, Some((_, et))) => Some(et),
        (Some((_, ft)), None) => Some(ft),
        (None, None) => None,
    }
}

/// All named tags across both element forms, in document order.
fn named_tags(raw: &str, full: &Regex, self_closing: &Regex) -> Vec<DocTag> {
    let mut tags: Vec<(usize, DocTag)> = Vec::new();

    for caps in full.captures_iter(raw) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
        let text = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
        tags.push((start, DocTag { name, text }));
    }
    for caps in self_closing.captures_iter(raw) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
        tags.push((
            start,
            DocTag {
                name,
                text: String::new(),
            },
        ));
    }

    tags.sort_by_key(|(start, _)| *start);
    tags.into_iter().map(|(_, tag)| tag).collect()
}
