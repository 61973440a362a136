//! C# front-end built on tree-sitter.
//!
//! Walks a parse tree and produces the flat [`FileDeclarations`] sequence the
//! engine consumes: namespaces, types, members, fields, and enum members,
//! each with its attached XML doc comment (if any), declared accessibility,
//! and signature facts (parameters, type parameters, return presence).
//!
//! The front-end reasons about declaration shape only; it performs no name
//! binding or type resolution.

use std::path::Path;

use once_cell::sync::Lazy;
use tree_sitter::{Language, Node, Parser};

use crate::analysis::{Declaration, DeclarationKind, FileDeclarations, Span, Visibility};

static CSHARP: Lazy<Language> = Lazy::new(|| tree_sitter_c_sharp::LANGUAGE.into());

/// Holds a parsed tree and associated metadata.
///
/// Kept separate from [`FileDeclarations`] so the tree can be reused for
/// multiple passes without re-parsing.
pub struct ParsedFile {
    /// The tree-sitter parse tree.
    pub tree: tree_sitter::Tree,
    /// The original source code (kept for node text extraction).
    pub source: Vec<u8>,
    /// The file path (for error reporting).
    pub path: String,
}

impl ParsedFile {
    /// Get text for a tree-sitter node.
    pub fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

/// C# declaration extractor.
///
/// `tree_sitter::Parser` is not `Sync`, so a parser is created per call;
/// the analyzer itself is freely shareable across threads.
pub struct CSharpAnalyzer;

impl CSharpAnalyzer {
    pub fn new() -> Self {
        Self
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&CSHARP)?;
        Ok(parser)
    }

    /// Parse a source file into a tree.
    pub fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C# source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Extract the declaration sequence from a parsed file.
    ///
    /// A tree containing syntax errors yields a parse-failure marker with an
    /// empty declaration sequence; the caller decides how to report it.
    pub fn extract_declarations(&self, parsed: &ParsedFile) -> FileDeclarations {
        let sloc = count_sloc(std::str::from_utf8(&parsed.source).unwrap_or(""));

        if parsed.tree.root_node().has_error() {
            let mut failed = FileDeclarations::failed(&parsed.path, "source contains syntax errors");
            failed.sloc = sloc;
            return failed;
        }

        let mut declarations = Vec::new();
        let mut scope = Vec::new();
        self.walk(
            parsed.tree.root_node(),
            parsed,
            &mut scope,
            Visibility::PrivateOrInternal,
            &mut declarations,
        );
        declarations.sort_by_key(|d| d.span.start_byte);

        FileDeclarations {
            path: parsed.path.clone(),
            sloc,
            declarations,
            parse_error: None,
        }
    }

    /// Parse and extract in one step, folding every failure into the
    /// file's parse-failure signal so one bad file never aborts a run.
    pub fn declarations_for(&self, path: &str, content: &str) -> FileDeclarations {
        match self.parse(Path::new(path), content.as_bytes()) {
            Ok(parsed) => self.extract_declarations(&parsed),
            Err(e) => {
                let mut failed = FileDeclarations::failed(path, e.to_string());
                failed.sloc = count_sloc(content);
                failed
            }
        }
    }

    fn walk(
        &self,
        node: Node,
        parsed: &ParsedFile,
        scope: &mut Vec<String>,
        default_vis: Visibility,
        out: &mut Vec<Declaration>,
    ) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();

        for child in children {
            match child.kind() {
                "namespace_declaration" | "file_scoped_namespace_declaration" => {
                    let name = match self.declared_name(child, parsed) {
                        Some(n) => n,
                        None => continue,
                    };
                    out.push(self.declaration(
                        child,
                        parsed,
                        DeclarationKind::Namespace,
                        &name,
                        scope,
                        // Namespaces carry no accessibility; always visible.
                        Visibility::Public,
                    ));
                    scope.push(name);
                    self.walk(child, parsed, scope, Visibility::PrivateOrInternal, out);
                    scope.pop();
                }
                "class_declaration"
                | "struct_declaration"
                | "interface_declaration"
                | "record_declaration"
                | "enum_declaration" => {
                    let name = match self.declared_name(child, parsed) {
                        Some(n) => n,
                        None => continue,
                    };
                    let decl = self.declaration(
                        child,
                        parsed,
                        DeclarationKind::Type,
                        &name,
                        scope,
                        default_vis,
                    );
                    // Interface members are implicitly public; enum members
                    // inherit the enum's accessibility.
                    let inner_default = match child.kind() {
                        "interface_declaration" => Visibility::Public,
                        "enum_declaration" => decl.visibility,
                        _ => Visibility::PrivateOrInternal,
                    };
                    out.push(decl);
                    scope.push(name);
                    self.walk(child, parsed, scope, inner_default, out);
                    scope.pop();
                }
                "delegate_declaration" => {
                    if let Some(name) = self.declared_name(child, parsed) {
                        out.push(self.declaration(
                            child,
                            parsed,
                            DeclarationKind::Type,
                            &name,
                            scope,
                            default_vis,
                        ));
                    }
                }
                "method_declaration"
                | "constructor_declaration"
                | "destructor_declaration"
                | "operator_declaration"
                | "conversion_operator_declaration"
                | "property_declaration"
                | "indexer_declaration"
                | "event_declaration"
                | "event_field_declaration" => {
                    if let Some(name) = self.declared_name(child, parsed) {
                        out.push(self.declaration(
                            child,
                            parsed,
                            DeclarationKind::Member,
                            &name,
                            scope,
                            default_vis,
                        ));
                    }
                }
                "field_declaration" => {
                    if let Some(name) = self.declared_name(child, parsed) {
                        out.push(self.declaration(
                            child,
                            parsed,
                            DeclarationKind::Field,
                            &name,
                            scope,
                            default_vis,
                        ));
                    }
                }
                "enum_member_declaration" => {
                    if let Some(name) = self.declared_name(child, parsed) {
                        out.push(self.declaration(
                            child,
                            parsed,
                            DeclarationKind::EnumMember,
                            &name,
                            scope,
                            default_vis,
                        ));
                    }
                }
                _ => {
                    // Containers (declaration lists, global statements, ...)
                    // keep the current scope. Bodies of members are never
                    // reached because members are not recursed into.
                    self.walk(child, parsed, scope, default_vis, out);
                }
            }
        }
    }

    fn declaration(
        &self,
        node: Node,
        parsed: &ParsedFile,
        kind: DeclarationKind,
        name: &str,
        scope: &[String],
        default_vis: Visibility,
    ) -> Declaration {
        let qualified_name = if scope.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", scope.join("."), name)
        };
        let (doc, doc_span) = match self.doc_comment(node, parsed) {
            Some((text, span)) => (Some(text), Some(span)),
            None => (None, None),
        };

        let (params, type_params, has_return) = if kind.has_structure() {
            (
                self.parameter_names(node, parsed),
                self.type_parameter_names(node, parsed),
                self.has_return_value(node, parsed),
            )
        } else {
            (Vec::new(), Vec::new(), false)
        };

        Declaration {
            name: name.to_string(),
            qualified_name,
            kind,
            file: parsed.path.clone(),
            span: Span::from_node(node),
            visibility: self.visibility_of(node, parsed, default_vis),
            doc,
            doc_span,
            params,
            type_params,
            has_return,
        }
    }

    /// The declared identifier for a node, tolerating grammar variations by
    /// falling back from the `name` field to the first identifier child.
    fn declared_name(&self, node: Node, parsed: &ParsedFile) -> Option<String> {
        // Field-like declarations bury the name in a variable declarator.
        if matches!(node.kind(), "field_declaration" | "event_field_declaration") {
            return self.declarator_name(node, parsed);
        }

        if let Some(name) = node.child_by_field_name("name") {
            return Some(parsed.node_text(name).to_string());
        }

        let mut cursor = node.walk();
        let result = node
            .named_children(&mut cursor)
            .find(|c| c.kind() == "identifier" || c.kind() == "qualified_name")
            .map(|c| parsed.node_text(c).to_string());
        result
    }

    /// Name of the first variable declarator inside a (event) field
    /// declaration. Multi-declarator fields yield one declaration named
    /// after the first declarator.
    fn declarator_name(&self, node: Node, parsed: &ParsedFile) -> Option<String> {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if current.kind() == "variable_declarator" {
                if let Some(name) = current.child_by_field_name("name") {
                    return Some(parsed.node_text(name).to_string());
                }
                let mut cursor = current.walk();
                return current
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "identifier")
                    .map(|c| parsed.node_text(c).to_string());
            }
            let mut cursor = current.walk();
            let mut children: Vec<Node> = current.named_children(&mut cursor).collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    fn visibility_of(&self, node: Node, parsed: &ParsedFile, default_vis: Visibility) -> Visibility {
        // Modifiers are wrapped in `modifier` nodes; accept bare keyword
        // tokens as well.
        let mut cursor = node.walk();
        let modifiers: Vec<&str> = node
            .children(&mut cursor)
            .filter(|c| {
                c.kind() == "modifier"
                    || matches!(c.kind(), "public" | "protected" | "private" | "internal")
            })
            .map(|c| parsed.node_text(c))
            .collect();

        if modifiers.iter().any(|m| *m == "public") {
            Visibility::Public
        } else if modifiers.iter().any(|m| *m == "protected") {
            Visibility::Protected
        } else if modifiers
            .iter()
            .any(|m| *m == "private" || *m == "internal")
        {
            Visibility::PrivateOrInternal
        } else {
            default_vis
        }
    }

    /// Collect the XML doc comment directly above a declaration.
    ///
    /// Consecutive `///` comment nodes (or one `/** */` block) are gathered
    /// as long as they sit immediately above the declaration with no blank
    /// line in between; ordinary comments end the chain.
    fn doc_comment(&self, node: Node, parsed: &ParsedFile) -> Option<(String, (usize, usize))> {
        let mut anchor_row = node.start_position().row;
        let mut comments: Vec<Node> = Vec::new();

        let mut sibling = node.prev_sibling();
        while let Some(c) = sibling {
            if c.kind() != "comment" {
                break;
            }
            if c.end_position().row + 1 < anchor_row {
                break; // blank line between comment and declaration
            }
            let text = parsed.node_text(c);
            if !text.starts_with("///") && !text.starts_with("/**") {
                break;
            }
            anchor_row = c.start_position().row;
            comments.push(c);
            sibling = c.prev_sibling();
        }

        if comments.is_empty() {
            return None;
        }
        comments.reverse();

        let first_line = comments[0].start_position().row + 1;
        let last_line = comments[comments.len() - 1].end_position().row + 1;

        let mut text = String::new();
        for comment in &comments {
            strip_doc_markers(parsed.node_text(*comment), &mut text);
        }

        Some((text, (first_line, last_line)))
    }

    fn parameter_names(&self, node: Node, parsed: &ParsedFile) -> Vec<String> {
        let list = node.child_by_field_name("parameters").or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|c| matches!(c.kind(), "parameter_list" | "bracketed_parameter_list"));
            found
        });
        let list = match list {
            Some(l) => l,
            None => return Vec::new(),
        };

        let mut names = Vec::new();
        let mut cursor = list.walk();
        for param in list.named_children(&mut cursor) {
            if param.kind() != "parameter" {
                continue;
            }
            let name = param
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string())
                .or_else(|| {
                    // The name is the last identifier (the type may be one too).
                    let mut inner = param.walk();
                    param
                        .named_children(&mut inner)
                        .filter(|c| c.kind() == "identifier")
                        .last()
                        .map(|c| parsed.node_text(c).to_string())
                });
            if let Some(name) = name {
                if !name.is_empty() {
                    names.push(name);
                }
            }
        }
        names
    }

    fn type_parameter_names(&self, node: Node, parsed: &ParsedFile) -> Vec<String> {
        let list = node.child_by_field_name("type_parameters").or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "type_parameter_list");
            found
        });
        let list = match list {
            Some(l) => l,
            None => return Vec::new(),
        };

        let mut names = Vec::new();
        let mut cursor = list.walk();
        for tp in list.named_children(&mut cursor) {
            if tp.kind() != "type_parameter" {
                continue;
            }
            let name = tp
                .child_by_field_name("name")
                .map(|n| parsed.node_text(n).to_string())
                .or_else(|| {
                    let mut inner = tp.walk();
                    let found = tp
                        .named_children(&mut inner)
                        .find(|c| c.kind() == "identifier")
                        .map(|c| parsed.node_text(c).to_string());
                    found
                });
            if let Some(name) = name {
                names.push(name);
            }
        }
        names
    }

    /// Whether a `<returns>` tag can apply: methods, operators, and
    /// delegates with a non-void return type.
    fn has_return_value(&self, node: Node, parsed: &ParsedFile) -> bool {
        if !matches!(
            node.kind(),
            "method_declaration"
                | "operator_declaration"
                | "conversion_operator_declaration"
                | "delegate_declaration"
        ) {
            return false;
        }
        let return_type = node
            .child_by_field_name("returns")
            .or_else(|| node.child_by_field_name("type"))
            .or_else(|| self.node_before_name(node));
        match return_type {
            Some(t) => parsed.node_text(t).trim() != "void",
            // Conversion operators return their target type.
            None => node.kind() == "conversion_operator_declaration",
        }
    }

    /// The named child directly preceding the declaration's name, skipping
    /// attributes; for methods and delegates that is the return type.
    fn node_before_name<'a>(&self, node: Node<'a>) -> Option<Node<'a>> {
        let name = node.child_by_field_name("name")?;
        let mut cursor = node.walk();
        let mut prev = None;
        for child in node.named_children(&mut cursor) {
            if child.id() == name.id() {
                return prev;
            }
            if !matches!(child.kind(), "attribute_list" | "modifier") {
                prev = Some(child);
            }
        }
        None
    }
}

impl Default for CSharpAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Append one comment node's text with doc markers stripped.
fn strip_doc_markers(comment: &str, out: &mut String) {
    if let Some(rest) = comment.strip_prefix("///") {
        out.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        out.push('\n');
        return;
    }

    // `/** ... */` block form.
    let inner = comment
        .strip_prefix("/**")
        .unwrap_or(comment)
        .strip_suffix("*/")
        .unwrap_or(comment);
    for line in inner.lines() {
        let trimmed = line.trim_start();
        let content = trimmed.strip_prefix('*').unwrap_or(trimmed);
        out.push_str(content.strip_prefix(' ').unwrap_or(content));
        out.push('\n');
    }
}

/// Source lines of code: non-blank lines that are not comment-only.
pub fn count_sloc(content: &str) -> usize {
    let mut count = 0;
    let mut in_block_comment = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if in_block_comment {
            if trimmed.contains("*/") {
                in_block_comment = false;
                let after = trimmed.split("*/").nth(1).unwrap_or("").trim();
                if !after.is_empty() && !after.starts_with("//") {
                    count += 1;
                }
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                in_block_comment = true;
            }
            continue;
        }
        count += 1;
    }

    count
}
