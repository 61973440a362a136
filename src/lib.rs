//! doccheck - XML documentation compliance engine for C# source trees.
//!
//! doccheck inspects declarations (namespaces, types, members, fields, enum
//! members) for the presence and well-formedness of XML documentation
//! comments, emits a stream of categorized findings, aggregates run-wide
//! density metrics, and can rewrite files to insert missing documentation
//! stubs.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter front-end producing the declaration model
//! - `rules`: the rule catalog, pure functions from declaration to finding
//! - `engine`: per-file analysis with deterministic finding order
//! - `fix`: line-anchored edits that insert documentation stubs
//! - `aggregate`: run-wide sums and per-KLoc densities
//! - `report`: the reporting contract plus text, JSON, and SARIF renderers
//! - `runner`: parallel per-file driver with cooperative cancellation
//!
//! # Adding a New Rule
//!
//! Implement a pure `fn(&Declaration, &XmlDocOptions) -> Option<Finding>`
//! in `src/rules/` and register it in the catalog in `rules/mod.rs`.

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod engine;
pub mod fix;
pub mod report;
pub mod rules;
pub mod runner;

pub use aggregate::{Aggregator, FileOutcome, RunResult};
pub use analysis::{
    CSharpAnalyzer, Declaration, DeclarationKind, DocComment, FileDeclarations, Span, Visibility,
};
pub use config::{Config, XmlDocOptions};
pub use engine::analyze_file;
pub use fix::{apply, compute_edits, fix_source, Edit, EditPlan, FixOutcome};
pub use report::{JsonReporter, ReportOrder, Reporter, SarifReporter, TextReporter};
pub use rules::{Finding, RuleCode, Severity};
pub use runner::Runner;
