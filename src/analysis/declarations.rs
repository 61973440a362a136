//! Declaration model extracted from parsed C# source.

use std::fmt;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Kind of declaration the documentation rules distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Namespace,
    /// Class, struct, interface, record, enum, or delegate.
    Type,
    /// Method, constructor, operator, property, event, or indexer.
    Member,
    Field,
    EnumMember,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Namespace => "namespace",
            DeclarationKind::Type => "type",
            DeclarationKind::Member => "member",
            DeclarationKind::Field => "field",
            DeclarationKind::EnumMember => "enum member",
        }
    }

    /// Whether structural documentation (params, type params, returns)
    /// is meaningful for this kind.
    pub fn has_structure(&self) -> bool {
        matches!(self, DeclarationKind::Type | DeclarationKind::Member)
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared accessibility, reduced to what the rules care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    /// Private, internal, or no accessibility modifier (the C# defaults).
    PrivateOrInternal,
}

impl Visibility {
    /// Public and protected declarations are part of the documented surface.
    pub fn is_checked(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }
}

/// A declaration extracted from source code.
///
/// Built once per file by the front-end, consumed by the rule catalog,
/// and discarded after findings are produced.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The declaration name.
    pub name: String,
    /// The dotted name including enclosing namespaces and types.
    pub qualified_name: String,
    /// The kind of declaration.
    pub kind: DeclarationKind,
    /// File the declaration lives in (used for reporting).
    pub file: String,
    /// Source span for the entire declaration.
    pub span: Span,
    /// Declared accessibility.
    pub visibility: Visibility,
    /// Raw XML doc comment text with comment markers stripped, if present.
    pub doc: Option<String>,
    /// Line span of the doc comment block (1-indexed, inclusive).
    pub doc_span: Option<(usize, usize)>,
    /// Declared parameter names, in order.
    pub params: Vec<String>,
    /// Declared generic type parameter names, in order.
    pub type_params: Vec<String>,
    /// Whether the declaration produces a value a `<returns>` tag can document.
    pub has_return: bool,
}

impl Declaration {
    /// Whether any documentation text is attached.
    pub fn has_doc(&self) -> bool {
        self.doc
            .as_deref()
            .map(|d| !d.trim().is_empty())
            .unwrap_or(false)
    }
}

/// The declarations extracted from a single file, in source order.
#[derive(Debug, Clone)]
pub struct FileDeclarations {
    /// File path.
    pub path: String,
    /// Source lines of code (non-blank, non-comment-only lines).
    pub sloc: usize,
    /// All declarations in the file, ordered by start position.
    pub declarations: Vec<Declaration>,
    /// Set when the front-end could not produce a usable declaration
    /// sequence; the engine turns this into a single parse-failure finding.
    pub parse_error: Option<String>,
}

impl FileDeclarations {
    /// Create an empty declaration set for a file.
    pub fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            sloc: 0,
            declarations: Vec::new(),
            parse_error: None,
        }
    }

    /// Create a parse-failure marker for a file.
    pub fn failed(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            sloc: 0,
            declarations: Vec::new(),
            parse_error: Some(message.into()),
        }
    }

    /// Find a declaration by qualified name.
    pub fn find(&self, qualified_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualified_name == qualified_name)
    }

    /// Declarations of a given kind.
    pub fn by_kind(&self, kind: DeclarationKind) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.kind == kind)
    }
}
