//! Command-line interface for cyclo.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::reader;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never worth descending into.
const SKIP_DIRS: &[&str] = &["node_modules", "vendor", "target", "dist", "build"];

/// Cyclomatic complexity analyzer for JavaScript, TypeScript, TSX/JSX,
/// and Vue single-file components.
///
/// Cyclo tokenizes source files, recognizes function boundaries without
/// building an AST, and reports per-function complexity, parameter counts,
/// and size metrics.
#[derive(Parser)]
#[command(name = "cyclo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze files or directories
    #[command(visible_alias = "run")]
    Analyze(AnalyzeArgs),
    /// List supported languages and their file extensions
    Languages,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Files or directories to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format: pretty, json, or csv
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Maximum acceptable per-function complexity (exit non-zero if exceeded)
    #[arg(short, long)]
    pub threshold: Option<u32>,

    /// Sort functions within each file: ccn (descending) or source order
    #[arg(long)]
    pub sort_by: Option<String>,
}

/// Collect analyzable files under a directory root.
fn collect_files(root: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden and dependency/output directories
            if e.file_type().is_dir() && e.depth() > 0 {
                if name.starts_with('.') || SKIP_DIRS.contains(&name.as_ref()) {
                    return false;
                }
            }
            true
        })
    {
        let entry = entry?;
        if entry.file_type().is_file() {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if reader::for_extension(ext).is_some() {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    reader::init();

    if args.format != "pretty" && args.format != "json" && args.format != "csv" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty', 'json', or 'csv'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let mut files = Vec::new();
    for path in &args.paths {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: cannot access path {:?}: {}", path, e);
                return Ok(EXIT_ERROR);
            }
        };
        if metadata.is_dir() {
            files.extend(collect_files(path)?);
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        eprintln!("Warning: no files to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let results: Vec<_> = files
        .par_iter()
        .map(|path| crate::analyze_file(path))
        .collect();

    let mut reports = Vec::new();
    let mut errors = 0usize;
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("Error: {}", e);
                errors += 1;
            }
        }
    }
    reports.sort_by(|a, b| a.filename.cmp(&b.filename));
    match args.sort_by.as_deref() {
        None => {}
        Some("ccn") => {
            for report in &mut reports {
                report
                    .functions
                    .sort_by(|a, b| b.cyclomatic_complexity.cmp(&a.cyclomatic_complexity));
            }
        }
        Some(other) => {
            eprintln!("Error: invalid sort key {:?}, must be 'ccn'", other);
            return Ok(EXIT_ERROR);
        }
    }

    match args.format.as_str() {
        "json" => report::write_json(&reports)?,
        "csv" => report::write_csv(&reports),
        _ => report::write_pretty(&reports, args.threshold),
    }

    if reports.is_empty() && errors > 0 {
        return Ok(EXIT_ERROR);
    }
    if let Some(threshold) = args.threshold {
        if report::exceeds_threshold(&reports, threshold) {
            return Ok(EXIT_FAILED);
        }
    }
    Ok(EXIT_SUCCESS)
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    reader::init();

    let mut by_language: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for ext in reader::supported_extensions() {
        if let Some(r) = reader::for_extension(&ext) {
            by_language
                .entry(r.language().to_string())
                .or_default()
                .push(ext);
        }
    }
    for (language, mut exts) in by_language {
        exts.sort();
        println!("{}: {}", language, exts.join(", "));
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collect_files_filters_by_extension_and_directory() {
        reader::init();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "function f(){}").unwrap();
        fs::write(dir.path().join("b.rs"), "fn main(){}").unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/c.js"), "x").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/d.tsx"), "x").unwrap();

        let files = collect_files(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.js", "d.tsx"]);
    }

    #[test]
    fn threshold_drives_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.js");
        fs::write(&file, "function f(x){ if (x) { return 1; } }").unwrap();

        let args = AnalyzeArgs {
            paths: vec![file.clone()],
            format: "csv".to_string(),
            threshold: Some(1),
            sort_by: None,
        };
        assert_eq!(run_analyze(&args).unwrap(), EXIT_FAILED);

        let args = AnalyzeArgs {
            paths: vec![file],
            format: "csv".to_string(),
            threshold: Some(10),
            sort_by: None,
        };
        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);
    }

    #[test]
    fn invalid_format_is_an_error() {
        let args = AnalyzeArgs {
            paths: vec![PathBuf::from(".")],
            format: "xml".to_string(),
            threshold: None,
            sort_by: None,
        };
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);
    }
}
