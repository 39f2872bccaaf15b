//! Language readers: per-language tokenization wired to the shared analyzer.
//!
//! This module provides:
//! - `Reader` trait: extension matching plus token generation for one language
//! - a factory-based reader lookup by file extension
//! - readers for JavaScript, TypeScript, TSX/JSX, and Vue single-file components

use std::collections::HashMap;
use std::sync::RwLock;

use crate::analysis::{self, FileReport};
use crate::lexer::Token;

pub mod javascript;
pub mod split;
pub mod tsx;
pub mod typescript;
pub mod vue;

/// One supported language: knows its extensions, its decision-point
/// vocabulary, and how to turn source text into tokens.
pub trait Reader: Send + Sync {
    /// Language name as reported in output (e.g. "javascript").
    fn language(&self) -> &str;

    /// File extensions this reader claims, without the dot.
    fn extensions(&self) -> &[&str];

    /// Tokens that count as decision points for this language.
    fn conditions(&self) -> &'static phf::Set<&'static str>;

    /// Produce the full token stream for a source file.
    fn generate_tokens<'s>(&self, source: &'s str) -> Box<dyn Iterator<Item = Token> + 's>;

    /// Tokenize and analyze one file.
    fn analyze(&self, filename: &str, source: &str) -> FileReport {
        analysis::run(
            self.generate_tokens(source),
            self.conditions(),
            filename,
            self.language(),
        )
    }
}

/// Factory function type for creating reader instances.
pub type ReaderFactory = fn() -> Box<dyn Reader>;

lazy_static::lazy_static! {
    /// Global reader registry mapping file extensions to reader factories.
    static ref REGISTRY: RwLock<HashMap<String, ReaderFactory>> = RwLock::new(HashMap::new());
}

/// Register a reader factory for a file extension (no dot, lowercase).
pub fn register(ext: &str, factory: ReaderFactory) {
    let mut registry = REGISTRY.write().unwrap();
    registry.insert(ext.to_string(), factory);
}

/// Get a reader for the given file extension.
/// Returns None if no reader is registered for the extension.
pub fn for_extension(ext: &str) -> Option<Box<dyn Reader>> {
    let registry = REGISTRY.read().unwrap();
    registry.get(&ext.to_ascii_lowercase()).map(|factory| factory())
}

/// Return all registered file extensions, sorted.
pub fn supported_extensions() -> Vec<String> {
    let registry = REGISTRY.read().unwrap();
    let mut exts: Vec<String> = registry.keys().cloned().collect();
    exts.sort();
    exts
}

/// Initialize the reader registry with all built-in languages.
/// Call this once at startup before resolving readers.
pub fn init() {
    register("js", || Box::new(javascript::JavaScriptReader));
    register("mjs", || Box::new(javascript::JavaScriptReader));
    register("cjs", || Box::new(javascript::JavaScriptReader));
    register("ts", || Box::new(typescript::TypeScriptReader));
    register("jsx", || Box::new(tsx::TsxReader));
    register("tsx", || Box::new(tsx::TsxReader));
    register("vue", || Box::new(vue::VueReader));
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockReader;

    impl Reader for MockReader {
        fn language(&self) -> &str {
            "mock"
        }

        fn extensions(&self) -> &[&str] {
            &["mock"]
        }

        fn conditions(&self) -> &'static phf::Set<&'static str> {
            &crate::analysis::JS_CONDITIONS
        }

        fn generate_tokens<'s>(&self, _source: &'s str) -> Box<dyn Iterator<Item = Token> + 's> {
            Box::new(std::iter::empty())
        }
    }

    #[test]
    fn register_and_lookup() {
        register("mock", || Box::new(MockReader));
        let reader = for_extension("mock").expect("mock reader registered");
        assert_eq!(reader.language(), "mock");
        assert!(for_extension("nope").is_none());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        init();
        assert!(for_extension("TSX").is_some());
    }

    #[test]
    fn init_registers_all_languages() {
        init();
        let exts = supported_extensions();
        for ext in ["js", "ts", "jsx", "tsx", "vue"] {
            assert!(exts.iter().any(|e| e == ext), "missing {ext}");
        }
    }

    #[test]
    fn default_analyze_reports_language() {
        let report = MockReader.analyze("x.mock", "");
        assert_eq!(report.language, "mock");
        assert!(report.functions.is_empty());
    }
}
