//! Run driver: parallel per-file analysis, optional fixing, reporting, and
//! aggregation.
//!
//! Files share no mutable state, so analysis fans out across a rayon pool
//! with one task per file. In fix mode the task that analyzes a file is the
//! one that rewrites it, so no two tasks ever write the same path.
//! Cancellation is cooperative: the flag is checked before each file, and a
//! cancelled run still seals and reports the partial result.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use crate::aggregate::{Aggregator, FileOutcome, RunResult};
use crate::analysis::CSharpAnalyzer;
use crate::config::XmlDocOptions;
use crate::engine;
use crate::fix;
use crate::report::Reporter;
use crate::rules::Finding;

/// Executes a check or fix run over a set of files.
pub struct Runner {
    options: XmlDocOptions,
    fix: bool,
    backup: bool,
    verbose: bool,
}

impl Runner {
    /// Create a new runner with the given rule gates.
    pub fn new(options: XmlDocOptions) -> Self {
        Self {
            options,
            fix: false,
            backup: false,
            verbose: false,
        }
    }

    /// Enable fix mode: rewrite files to insert missing documentation stubs.
    pub fn fix(mut self, fix: bool) -> Self {
        self.fix = fix;
        self
    }

    /// Write a `.bak` copy before rewriting a file in fix mode.
    pub fn backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// Log per-file progress to stderr.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Process all files, report per-file findings in discovery order, and
    /// return the sealed run result.
    ///
    /// `cancel` is checked between files; files not yet started when it
    /// flips are skipped, and the result is flagged incomplete.
    pub fn run(
        &self,
        files: &[PathBuf],
        reporter: &mut dyn Reporter,
        cancel: &AtomicBool,
    ) -> anyhow::Result<RunResult> {
        let analyzer = CSharpAnalyzer::new();
        let total = files.len();
        let write_errors: Mutex<Vec<anyhow::Error>> = Mutex::new(Vec::new());

        let outcomes: Vec<Option<FileOutcome>> = files
            .par_iter()
            .enumerate()
            .map(|(index, path)| {
                if cancel.load(Ordering::Relaxed) {
                    return None;
                }
                if self.verbose {
                    eprintln!("[{}/{}] {}", index + 1, total, path.display());
                }
                match self.process_file(&analyzer, path) {
                    Ok(outcome) => Some(outcome),
                    Err(e) => {
                        write_errors.lock().unwrap().push(e);
                        None
                    }
                }
            })
            .collect();

        if let Some(e) = write_errors.into_inner().unwrap().into_iter().next() {
            return Err(e);
        }

        let mut aggregator = Aggregator::new();
        for outcome in outcomes.into_iter().flatten() {
            reporter.report_file(&outcome.path, &outcome.findings);
            aggregator.accumulate(&outcome);
        }

        let result = aggregator.complete(cancel.load(Ordering::Relaxed));
        reporter.complete_with(&result);
        Ok(result)
    }

    /// Analyze (and in fix mode rewrite) one file.
    ///
    /// Unreadable or unparsable files degrade to a single parse-failure
    /// finding; only a failed write aborts the run.
    fn process_file(&self, analyzer: &CSharpAnalyzer, path: &PathBuf) -> anyhow::Result<FileOutcome> {
        let path_str = path.to_string_lossy().to_string();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return Ok(FileOutcome {
                    path: path_str.clone(),
                    sloc: 0,
                    findings: vec![Finding::parse_failure(&path_str, &e.to_string())],
                    changed: false,
                });
            }
        };

        if !self.fix {
            let file = analyzer.declarations_for(&path_str, &content);
            let findings = engine::analyze_file(&file, &self.options);
            return Ok(FileOutcome {
                path: path_str,
                sloc: file.sloc,
                findings,
                changed: false,
            });
        }

        let outcome = fix::fix_source(&path_str, &content, &self.options);
        if outcome.changed {
            if self.backup {
                let backup_path = path.with_extension("cs.bak");
                std::fs::copy(path, &backup_path)
                    .map_err(|e| anyhow::anyhow!("could not write backup for {}: {}", path_str, e))?;
            }
            std::fs::write(path, &outcome.content)
                .map_err(|e| anyhow::anyhow!("could not write {}: {}", path_str, e))?;
        }

        Ok(FileOutcome {
            path: path_str,
            sloc: outcome.sloc,
            findings: outcome.findings,
            changed: outcome.changed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RunResult;
    use crate::report::ReportOrder;
    use std::sync::atomic::AtomicBool;
    use tempfile::TempDir;

    /// Reporter that records the calls it receives.
    #[derive(Default)]
    struct RecordingReporter {
        files: Vec<(String, usize)>,
        completed: bool,
        result: Option<RunResult>,
    }

    impl Reporter for RecordingReporter {
        fn report_file(&mut self, path: &str, findings: &[Finding]) {
            self.files.push((path.to_string(), findings.len()));
        }

        fn complete(&mut self) {
            self.completed = true;
        }

        fn complete_with(&mut self, result: &RunResult) {
            self.complete();
            self.result = Some(result.clone());
        }
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_check_run_reports_in_discovery_order() {
        let temp = TempDir::new().unwrap();
        let a = write_file(&temp, "A.cs", "public class A\n{\n}\n");
        let b = write_file(
            &temp,
            "B.cs",
            "/// <summary>B.</summary>\npublic class B\n{\n}\n",
        );

        let mut reporter = RecordingReporter::default();
        let cancel = AtomicBool::new(false);
        let runner = Runner::new(XmlDocOptions::default());
        let result = runner
            .run(&[a.clone(), b.clone()], &mut reporter, &cancel)
            .unwrap();

        assert_eq!(reporter.files.len(), 2);
        assert_eq!(reporter.files[0].0, a.to_string_lossy());
        assert_eq!(reporter.files[0].1, 1); // DOC100 on A
        assert_eq!(reporter.files[1].1, 0);
        assert!(reporter.completed);
        assert_eq!(result.finding_count, 1);
        assert_eq!(result.error_count, 1);
        assert!(!result.incomplete);
        assert_eq!(reporter.result.unwrap(), result);
    }

    #[test]
    fn test_unreadable_file_degrades_to_finding() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("Missing.cs");

        let mut reporter = RecordingReporter::default();
        let cancel = AtomicBool::new(false);
        let runner = Runner::new(XmlDocOptions::default());
        let result = runner.run(&[missing], &mut reporter, &cancel).unwrap();

        assert_eq!(result.finding_count, 1);
        assert_eq!(result.error_count, 1);
    }

    #[test]
    fn test_cancelled_run_is_partial_but_sealed() {
        let temp = TempDir::new().unwrap();
        let a = write_file(&temp, "A.cs", "public class A\n{\n}\n");

        let mut reporter = RecordingReporter::default();
        let cancel = AtomicBool::new(true); // cancelled before any file
        let runner = Runner::new(XmlDocOptions::default());
        let result = runner.run(&[a], &mut reporter, &cancel).unwrap();

        assert!(reporter.completed, "complete() must run even when cancelled");
        assert!(result.incomplete);
        assert_eq!(result.finding_count, 0);
    }

    #[test]
    fn test_fix_run_rewrites_and_reports_post_fix_state() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            "Counter.cs",
            "/// <summary>NS.</summary>\nnamespace Widgets\n{\n    public class Counter\n    {\n        public int Count;\n    }\n}\n",
        );

        let mut reporter = RecordingReporter::default();
        let cancel = AtomicBool::new(false);
        let runner = Runner::new(XmlDocOptions::default()).fix(true);
        let result = runner.run(&[path.clone()], &mut reporter, &cancel).unwrap();

        assert_eq!(result.changed_files, 1);
        // Post-fix re-analysis is clean.
        assert_eq!(result.error_count, 0);
        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("/// <summary>The Count field.</summary>"));

        // A second fix run changes nothing.
        let mut reporter2 = RecordingReporter::default();
        let runner2 = Runner::new(XmlDocOptions::default()).fix(true);
        let result2 = runner2.run(&[path.clone()], &mut reporter2, &cancel).unwrap();
        assert_eq!(result2.changed_files, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), rewritten);
    }

    #[test]
    fn test_fix_backup_writes_bak() {
        let temp = TempDir::new().unwrap();
        let path = write_file(&temp, "A.cs", "public class A\n{\n}\n");

        let mut reporter = RecordingReporter::default();
        let cancel = AtomicBool::new(false);
        let runner = Runner::new(XmlDocOptions::default()).fix(true).backup(true);
        runner.run(&[path.clone()], &mut reporter, &cancel).unwrap();

        let backup = temp.path().join("A.cs.bak");
        assert!(backup.exists());
        assert_eq!(
            std::fs::read_to_string(&backup).unwrap(),
            "public class A\n{\n}\n"
        );
    }

    #[test]
    fn test_report_order_flag_is_explicit() {
        // The bundled runner reports in discovery order; the flag exists so
        // reporters never have to guess.
        assert_eq!(ReportOrder::Discovery.as_str(), "discovery");
        assert_eq!(ReportOrder::Completion.as_str(), "completion");
    }
}
