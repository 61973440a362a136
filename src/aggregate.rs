//! Run-wide aggregation of per-file outcomes.
//!
//! The aggregator is a two-state machine: it accepts [`FileOutcome`] values
//! while accumulating, then seals into a [`RunResult`] on completion.
//! Totals are plain sums, so accumulation order never affects the result.

use serde::{Deserialize, Serialize};

use crate::rules::{Finding, Severity};

/// The outcome of analyzing (and possibly fixing) one file.
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: String,
    pub sloc: usize,
    pub findings: Vec<Finding>,
    /// Whether fix mode rewrote the file.
    pub changed: bool,
}

impl FileOutcome {
    fn count(&self, severity: Severity) -> u64 {
        self.findings.iter().filter(|f| f.severity == severity).count() as u64
    }
}

/// The sealed, run-wide result. Field names match the machine-readable
/// metrics document consumed by CI gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "Sloc")]
    pub sloc: u64,
    #[serde(rename = "FindingCount")]
    pub finding_count: u64,
    #[serde(rename = "ErrorCount")]
    pub error_count: u64,
    #[serde(rename = "WarningCount")]
    pub warning_count: u64,
    #[serde(rename = "SuggestionCount")]
    pub suggestion_count: u64,
    #[serde(rename = "ChangedFiles")]
    pub changed_files: u64,
    #[serde(rename = "FindingsPerKLoc")]
    pub findings_per_kloc: f64,
    #[serde(rename = "ErrorsPerKLoc")]
    pub errors_per_kloc: f64,
    #[serde(rename = "WarningsPerKLoc")]
    pub warnings_per_kloc: f64,
    #[serde(rename = "SuggestionsPerKLoc")]
    pub suggestions_per_kloc: f64,
    /// Set when the run was cancelled before every file completed.
    #[serde(rename = "Incomplete", default)]
    pub incomplete: bool,
}

impl RunResult {
    /// Whether any Error-severity findings remain.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Accumulates file outcomes into a [`RunResult`].
///
/// Accumulating after `complete()` is a collaborator bug, not recoverable
/// input, and panics immediately rather than producing a silently wrong
/// report.
#[derive(Debug, Default)]
pub struct Aggregator {
    sloc: u64,
    finding_count: u64,
    error_count: u64,
    warning_count: u64,
    suggestion_count: u64,
    changed_files: u64,
    sealed: bool,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's outcome into the running sums.
    ///
    /// # Panics
    ///
    /// Panics if the aggregator has been sealed by `complete()`.
    pub fn accumulate(&mut self, outcome: &FileOutcome) {
        if self.sealed {
            panic!("aggregator is sealed; complete() was already called");
        }
        self.sloc += outcome.sloc as u64;
        self.finding_count += outcome.findings.len() as u64;
        self.error_count += outcome.count(Severity::Error);
        self.warning_count += outcome.count(Severity::Warning);
        self.suggestion_count += outcome.count(Severity::Suggestion);
        if outcome.changed {
            self.changed_files += 1;
        }
    }

    /// Seal the aggregator and produce the run result.
    ///
    /// `incomplete` marks a run that was cancelled before all files were
    /// processed; the sums still cover exactly the accumulated outcomes.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    pub fn complete(&mut self, incomplete: bool) -> RunResult {
        if self.sealed {
            panic!("aggregator is sealed; complete() was already called");
        }
        self.sealed = true;

        RunResult {
            sloc: self.sloc,
            finding_count: self.finding_count,
            error_count: self.error_count,
            warning_count: self.warning_count,
            suggestion_count: self.suggestion_count,
            changed_files: self.changed_files,
            findings_per_kloc: per_kloc(self.finding_count, self.sloc),
            errors_per_kloc: per_kloc(self.error_count, self.sloc),
            warnings_per_kloc: per_kloc(self.warning_count, self.sloc),
            suggestions_per_kloc: per_kloc(self.suggestion_count, self.sloc),
            incomplete,
        }
    }
}

/// Density per thousand lines; defined as 0.0 for an empty run.
fn per_kloc(count: u64, sloc: u64) -> f64 {
    if sloc == 0 {
        0.0
    } else {
        count as f64 / (sloc as f64 / 1000.0)
    }
}
