//! Function extraction and complexity metrics over a token stream.
//!
//! The recognizer in [`states`] consumes one merged, position-ordered token
//! stream per file and produces [`FunctionInfo`] records in the order each
//! function's closing boundary is reached (children before parents), plus
//! file-level metrics for tokens outside any function.

use serde::Serialize;

use crate::lexer::Token;

pub mod states;

pub use states::{JsStyleStates, JS_CONDITIONS};

/// One recognized function, finalized when its closing boundary is reached.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionInfo {
    /// Declared or assignment-derived name, or `(anonymous)`.
    pub name: String,
    pub is_anonymous: bool,
    pub start_line: usize,
    pub end_line: usize,
    /// Name of the enclosing function, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub cyclomatic_complexity: u32,
    pub parameter_count: u32,
    pub token_count: u32,
    /// Source lines holding at least one significant token of this function.
    pub nloc: u32,
}

/// Analysis result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub language: String,
    /// Functions in closing order (innermost first within a nesting chain).
    pub functions: Vec<FunctionInfo>,
    /// Decision points encountered outside any function.
    pub file_complexity: u32,
    pub token_count: u32,
    pub nloc: u32,
}

impl FileReport {
    /// Highest per-function complexity, 0 for a file with no functions.
    pub fn max_complexity(&self) -> u32 {
        self.functions
            .iter()
            .map(|f| f.cyclomatic_complexity)
            .max()
            .unwrap_or(0)
    }
}

/// Run the joint recognizer/counter pass over a token stream.
pub fn run(
    tokens: impl Iterator<Item = Token>,
    conditions: &'static phf::Set<&'static str>,
    filename: &str,
    language: &str,
) -> FileReport {
    let mut states = JsStyleStates::new(conditions);
    for tok in tokens {
        states.feed(&tok);
    }
    states.into_report(filename, language)
}
