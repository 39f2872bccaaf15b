//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - CSV: one row per function for spreadsheets and diff tools

use colored::*;
use serde::Serialize;

use crate::analysis::FileReport;

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub version: &'a str,
    pub files: &'a [FileReport],
    pub summary: JsonSummary,
}

/// Aggregate numbers across every analyzed file.
#[derive(Serialize)]
pub struct JsonSummary {
    pub file_count: usize,
    pub function_count: usize,
    pub total_nloc: u64,
    pub average_complexity: f64,
    pub max_complexity: u32,
}

pub fn summarize(files: &[FileReport]) -> JsonSummary {
    let function_count: usize = files.iter().map(|f| f.functions.len()).sum();
    let total_nloc: u64 = files
        .iter()
        .map(|f| {
            f.nloc as u64 + f.functions.iter().map(|x| x.nloc as u64).sum::<u64>()
        })
        .sum();
    let complexity_sum: u64 = files
        .iter()
        .flat_map(|f| f.functions.iter())
        .map(|x| x.cyclomatic_complexity as u64)
        .sum();
    let average_complexity = if function_count == 0 {
        0.0
    } else {
        complexity_sum as f64 / function_count as f64
    };
    JsonSummary {
        file_count: files.len(),
        function_count,
        total_nloc,
        average_complexity,
        max_complexity: files.iter().map(|f| f.max_complexity()).max().unwrap_or(0),
    }
}

/// Write results in JSON format.
pub fn write_json(files: &[FileReport]) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        files,
        summary: summarize(files),
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// CSV Format
// =============================================================================

/// Write one row per function: metrics first, then location and names.
pub fn write_csv(files: &[FileReport]) {
    println!("nloc,ccn,tokens,params,start_line,end_line,name,file");
    for file in files {
        for func in &file.functions {
            println!(
                "{},{},{},{},{},{},{},{}",
                func.nloc,
                func.cyclomatic_complexity,
                func.token_count,
                func.parameter_count,
                func.start_line,
                func.end_line,
                csv_escape(&func.name),
                csv_escape(&file.filename),
            );
        }
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write colored human-readable output.
pub fn write_pretty(files: &[FileReport], threshold: Option<u32>) {
    println!();
    print!("  ");
    print!("{}", "cyclo".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    for file in files {
        println!("  {}", file.filename.bold());
        if file.functions.is_empty() {
            println!("    {}", "no functions".dimmed());
            println!();
            continue;
        }
        println!(
            "    {:>6} {:>6} {:>7} {:>7}  {:<11} {}",
            "NLOC".dimmed(),
            "CCN".dimmed(),
            "tokens".dimmed(),
            "params".dimmed(),
            "lines".dimmed(),
            "function".dimmed()
        );
        for func in &file.functions {
            let ccn = func.cyclomatic_complexity;
            let ccn_cell = format!("{:>6}", ccn);
            let ccn_cell = match threshold {
                Some(t) if ccn > t => ccn_cell.red().bold().to_string(),
                _ => ccn_cell,
            };
            println!(
                "    {:>6} {} {:>7} {:>7}  {:<11} {}",
                func.nloc,
                ccn_cell,
                func.token_count,
                func.parameter_count,
                format!("{}-{}", func.start_line, func.end_line),
                func.name
            );
        }
        println!();
    }

    let summary = summarize(files);
    println!(
        "  {} {} file(s), {} function(s), avg CCN {:.1}, max CCN {}",
        "Summary:".dimmed(),
        summary.file_count,
        summary.function_count,
        summary.average_complexity,
        summary.max_complexity
    );
    if let Some(t) = threshold {
        let over: usize = files
            .iter()
            .flat_map(|f| f.functions.iter())
            .filter(|x| x.cyclomatic_complexity > t)
            .count();
        if over > 0 {
            println!(
                "  {}",
                format!("{} function(s) exceed CCN threshold {}", over, t)
                    .red()
                    .bold()
            );
        } else {
            println!("  {}", format!("all functions within CCN {}", t).green());
        }
    }
    println!();
}

/// True if any function in any file exceeds the threshold.
pub fn exceeds_threshold(files: &[FileReport], threshold: u32) -> bool {
    files
        .iter()
        .flat_map(|f| f.functions.iter())
        .any(|x| x.cyclomatic_complexity > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::FunctionInfo;

    fn sample() -> Vec<FileReport> {
        vec![FileReport {
            filename: "a.js".to_string(),
            language: "javascript".to_string(),
            functions: vec![
                FunctionInfo {
                    name: "foo".to_string(),
                    is_anonymous: false,
                    start_line: 1,
                    end_line: 3,
                    parent: None,
                    cyclomatic_complexity: 4,
                    parameter_count: 2,
                    token_count: 20,
                    nloc: 3,
                },
                FunctionInfo {
                    name: "(anonymous)".to_string(),
                    is_anonymous: true,
                    start_line: 5,
                    end_line: 5,
                    parent: Some("foo".to_string()),
                    cyclomatic_complexity: 2,
                    parameter_count: 0,
                    token_count: 6,
                    nloc: 1,
                },
            ],
            file_complexity: 1,
            token_count: 8,
            nloc: 2,
        }]
    }

    #[test]
    fn summary_math() {
        let files = sample();
        let summary = summarize(&files);
        assert_eq!(summary.file_count, 1);
        assert_eq!(summary.function_count, 2);
        assert_eq!(summary.total_nloc, 6);
        assert!((summary.average_complexity - 3.0).abs() < 1e-9);
        assert_eq!(summary.max_complexity, 4);
    }

    #[test]
    fn json_shape() {
        let files = sample();
        let report = JsonReport {
            version: "0.0.0",
            files: &files,
            summary: summarize(&files),
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["files"][0]["filename"], "a.js");
        assert_eq!(value["files"][0]["functions"][0]["cyclomatic_complexity"], 4);
        // parent is omitted when absent
        assert!(value["files"][0]["functions"][0].get("parent").is_none());
        assert_eq!(value["files"][0]["functions"][1]["parent"], "foo");
        assert_eq!(value["summary"]["function_count"], 2);
    }

    #[test]
    fn csv_escaping() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn threshold_check() {
        let files = sample();
        assert!(exceeds_threshold(&files, 3));
        assert!(!exceeds_threshold(&files, 4));
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.function_count, 0);
        assert_eq!(summary.average_complexity, 0.0);
        assert_eq!(summary.max_complexity, 0);
    }
}
