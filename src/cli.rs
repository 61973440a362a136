//! Command-line interface for doccheck.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::report::{JsonReporter, ReportOrder, Reporter, SarifReporter, TextReporter};
use crate::runner::Runner;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// XML documentation compliance checker for C# source trees.
///
/// doccheck inspects declarations (namespaces, types, members, fields, enum
/// members) for the presence and well-formedness of XML documentation
/// comments, reports categorized findings with per-KLoc density metrics,
/// and can rewrite files to insert missing documentation stubs.
#[derive(Parser)]
#[command(name = "doccheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check documentation compliance without modifying files
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Insert missing documentation stubs, then re-check
    Fix(FixArgs),
    /// Create a doccheck config file from the default template
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, or sarif
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Log per-file progress to stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    /// Path to fix (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: text, json, or sarif
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Write a .bak copy of each file before rewriting it
    #[arg(long)]
    pub backup: bool,

    /// Log per-file progress to stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "doccheck.yaml")]
    pub output: PathBuf,
}

/// The embedded config template written by `init`.
const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Load the config: explicit path, discovered file, or defaults.
fn load_config(explicit: &Option<PathBuf>) -> anyhow::Result<Config> {
    match explicit {
        Some(path) => Ok(Config::parse_file(path)?),
        None => match config::discover_config() {
            Some(path) => Ok(Config::parse_file(path)?),
            None => Ok(Config::default()),
        },
    }
}

/// Collect the .cs files to analyze, in discovery order.
fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories and build output
            if e.file_type().is_dir()
                && (name.starts_with('.') || name == "bin" || name == "obj")
            {
                return false;
            }
            true
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("cs") {
            continue;
        }
        if config.is_path_excluded(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

fn make_reporter(format: &str) -> Option<Box<dyn Reporter>> {
    // The bundled runner reports in discovery order; tell the reporter so.
    match format {
        "text" => Some(Box::new(TextReporter::new())),
        "json" => Some(Box::new(JsonReporter::new(ReportOrder::Discovery))),
        "sarif" => Some(Box::new(SarifReporter::new())),
        _ => None,
    }
}

fn resolve_files(path: &Path, config: &Config) -> anyhow::Result<Option<Vec<PathBuf>>> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", path, e);
            return Ok(None);
        }
    };

    let files = if metadata.is_dir() {
        collect_files(path, config)?
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        eprintln!("Warning: no files to scan");
    }
    Ok(Some(files))
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let config = match load_config(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let mut reporter = match make_reporter(&args.format) {
        Some(r) => r,
        None => {
            eprintln!(
                "Error: invalid format {:?}, must be 'text', 'json', or 'sarif'",
                args.format
            );
            return Ok(EXIT_ERROR);
        }
    };
    let files = match resolve_files(&args.path, &config)? {
        Some(f) => f,
        None => return Ok(EXIT_ERROR),
    };

    let cancel = AtomicBool::new(false);
    let runner = Runner::new(config.options).verbose(args.verbose);
    let result = runner.run(&files, reporter.as_mut(), &cancel)?;

    if result.has_errors() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the fix command.
///
/// The exit code reflects the post-fix state: rewritten files are
/// informational, never a failure by themselves.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let config = match load_config(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    let mut reporter = match make_reporter(&args.format) {
        Some(r) => r,
        None => {
            eprintln!(
                "Error: invalid format {:?}, must be 'text', 'json', or 'sarif'",
                args.format
            );
            return Ok(EXIT_ERROR);
        }
    };
    let files = match resolve_files(&args.path, &config)? {
        Some(f) => f,
        None => return Ok(EXIT_ERROR),
    };

    let cancel = AtomicBool::new(false);
    let runner = Runner::new(config.options)
        .fix(true)
        .backup(args.backup)
        .verbose(args.verbose);
    let result = runner.run(&files, reporter.as_mut(), &cancel)?;

    if result.has_errors() {
        Ok(EXIT_FINDINGS)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to adjust the rule gates", args.output.display());
    println!("  2. Run: doccheck check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("B.cs"), "").unwrap();
        std::fs::write(temp.path().join("A.cs"), "").unwrap();
        std::fs::write(temp.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(temp.path().join("obj")).unwrap();
        std::fs::write(temp.path().join("obj/Gen.cs"), "").unwrap();

        let files = collect_files(temp.path(), &Config::default()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["A.cs", "B.cs"]);
    }

    #[test]
    fn test_collect_files_honors_excluded_paths() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Generated")).unwrap();
        std::fs::write(temp.path().join("Generated/Api.cs"), "").unwrap();
        std::fs::write(temp.path().join("Api.cs"), "").unwrap();

        let config = Config {
            excluded_paths: vec!["**/Generated/**".to_string()],
            ..Config::default()
        };
        let files = collect_files(temp.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Api.cs"));
    }

    #[test]
    fn test_default_template_parses() {
        let config: Config = serde_yaml::from_str(DEFAULT_TEMPLATE).unwrap();
        assert!(config.options.check_enum_members);
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(make_reporter("xml").is_none());
        assert!(make_reporter("json").is_some());
    }
}
