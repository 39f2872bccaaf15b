//! TSX/JSX reader: TypeScript shapes plus markup handling.
//!
//! Attribute-free tags (`<div>`, `</Nav.Item>`) lex as single opaque tokens.
//! Everything else starting from a bare `<` goes through the speculative
//! tag machine, which either collapses confirmed markup or rolls the tokens
//! back so comparison operators survive.

use crate::analysis::JS_CONDITIONS;
use crate::lexer::js::JsTokenFilter;
use crate::lexer::{LexProfile, Lexer, Token};

use super::Reader;

static TSX_PROFILE: LexProfile = LexProfile {
    additions: &[
        r"<[A-Za-z][A-Za-z0-9]*(?:\.[A-Za-z][A-Za-z0-9]*)*>",
        r"</[A-Za-z][A-Za-z0-9]*(?:\.[A-Za-z][A-Za-z0-9]*)*>",
        r"</\w+>",
        r"\$\w+",
        r"\w+\?",
        r"`(?s:.*?)`",
        r"`(?s:.*)\z",
    ],
    regex_literals: true,
};

lazy_static::lazy_static! {
    static ref LEXER: Lexer = Lexer::new(&TSX_PROFILE);
}

pub struct TsxReader;

impl Reader for TsxReader {
    fn language(&self) -> &str {
        "tsx"
    }

    fn extensions(&self) -> &[&str] {
        &["tsx", "jsx"]
    }

    fn conditions(&self) -> &'static phf::Set<&'static str> {
        &JS_CONDITIONS
    }

    fn generate_tokens<'s>(&self, source: &'s str) -> Box<dyn Iterator<Item = Token> + 's> {
        Box::new(JsTokenFilter::new(LEXER.tokenize(source, 1), true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_with_markup_return() {
        let report = TsxReader.analyze(
            "a.tsx",
            "const MyComponent: React.FC = () => {\n  return <div>Hello</div>;\n};",
        );
        assert_eq!(report.functions.len(), 1);
        assert_eq!(report.functions[0].name, "MyComponent");
        assert!(!report.functions[0].is_anonymous);
        assert_eq!(report.functions[0].cyclomatic_complexity, 1);
    }

    #[test]
    fn markup_text_never_adds_complexity() {
        let report = TsxReader.analyze(
            "a.tsx",
            "function render() { return <p class=\"x\">if this && that ? maybe : no</p>; }",
        );
        assert_eq!(report.functions.len(), 1);
        assert_eq!(report.functions[0].cyclomatic_complexity, 1);
    }

    #[test]
    fn callbacks_in_attributes_become_functions() {
        let report = TsxReader.analyze(
            "a.tsx",
            "const Grid = () => {\n  return <Grid getRowId={(model) => model.id} />;\n};",
        );
        let names: Vec<&str> = report.functions.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"Grid"));
        assert!(names.contains(&"(anonymous)"));
    }

    #[test]
    fn comparison_is_not_markup() {
        let report = TsxReader.analyze("a.tsx", "function f(a, b) { return a < b && b > 0; }");
        assert_eq!(report.functions.len(), 1);
        assert_eq!(report.functions[0].name, "f");
        assert_eq!(report.functions[0].cyclomatic_complexity, 2);
        assert_eq!(report.functions[0].parameter_count, 2);
    }
}
