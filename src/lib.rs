//! Cyclo - cyclomatic complexity analyzer for the JavaScript language family.
//!
//! Cyclo tokenizes JavaScript, TypeScript, TSX/JSX, and Vue single-file
//! components, recognizes function boundaries without building an AST, and
//! counts decision points per function.
//!
//! # Architecture
//!
//! - `lexer`: regex-driven base tokenizer plus the speculative markup-tag
//!   machine for JSX-capable languages
//! - `reader`: per-language wiring (lexical profile, decision-point set,
//!   extension registry) and the Vue component splitter
//! - `analysis`: the function recognizer and complexity counter shared by
//!   every language
//! - `report`: output formatting (pretty, JSON, CSV)
//! - `cli`: command-line entry points
//!
//! # Adding a New Language
//!
//! Implement the `Reader` trait and register a factory in
//! `reader::init()`; see `reader/typescript.rs` for a small example.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod analysis;
pub mod cli;
pub mod lexer;
pub mod reader;
pub mod report;

pub use analysis::{FileReport, FunctionInfo};
pub use reader::{for_extension, init as init_readers, supported_extensions, Reader};

/// Errors surfaced when analyzing a single file.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Initialize all subsystems.
///
/// Call this once at startup.
pub fn init() {
    init_readers();
}

/// Analyze in-memory source, picking the language from `filename`'s extension.
pub fn analyze_source(filename: &str, source: &str) -> Result<FileReport, AnalyzeError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let reader = reader::for_extension(ext)
        .ok_or_else(|| AnalyzeError::UnsupportedExtension(ext.to_string()))?;
    Ok(reader.analyze(filename, source))
}

/// Read and analyze one file from disk.
pub fn analyze_file(path: &Path) -> Result<FileReport, AnalyzeError> {
    let source = std::fs::read_to_string(path).map_err(|source| AnalyzeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    analyze_source(&path.to_string_lossy(), &source)
}
