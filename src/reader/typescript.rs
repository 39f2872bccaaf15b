//! TypeScript reader.

use crate::analysis::JS_CONDITIONS;
use crate::lexer::js::JsTokenFilter;
use crate::lexer::{LexProfile, Lexer, Token};

use super::Reader;

/// JavaScript shapes plus `name?` optional markers, lexed as one word so
/// `age?: number` never contributes a ternary decision point.
static TS_PROFILE: LexProfile = LexProfile {
    additions: &[r"\$\w+", r"\w+\?", r"`(?s:.*?)`", r"`(?s:.*)\z"],
    regex_literals: true,
};

lazy_static::lazy_static! {
    static ref LEXER: Lexer = Lexer::new(&TS_PROFILE);
}

/// Shared with the Vue reader for `<script lang="ts">` blocks.
pub(crate) fn lexer() -> &'static Lexer {
    &LEXER
}

pub struct TypeScriptReader;

impl Reader for TypeScriptReader {
    fn language(&self) -> &str {
        "typescript"
    }

    fn extensions(&self) -> &[&str] {
        &["ts"]
    }

    fn conditions(&self) -> &'static phf::Set<&'static str> {
        &JS_CONDITIONS
    }

    fn generate_tokens<'s>(&self, source: &'s str) -> Box<dyn Iterator<Item = Token> + 's> {
        Box::new(JsTokenFilter::new(LEXER.tokenize(source, 1), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_type_annotation_does_not_hide_the_body() {
        let report = TypeScriptReader.analyze(
            "a.ts",
            "function x(config: Partial<Config>): {color: string; area: number} {\n  if (config.color) { return config; }\n}",
        );
        assert_eq!(report.functions.len(), 1);
        assert_eq!(report.functions[0].name, "x");
        assert_eq!(report.functions[0].cyclomatic_complexity, 2);
    }

    #[test]
    fn ambient_declaration_has_no_body() {
        let report = TypeScriptReader.analyze("a.ts", "declare function create(o: object): void;");
        assert!(report.functions.is_empty());
    }

    #[test]
    fn optional_member_is_one_token() {
        let report = TypeScriptReader.analyze(
            "a.ts",
            "interface UserProps { name: string; age?: number; }\nfunction greet(u: UserProps) { return u.name; }",
        );
        assert_eq!(report.functions.len(), 1);
        assert_eq!(report.functions[0].name, "greet");
        assert_eq!(report.functions[0].cyclomatic_complexity, 1);
    }

    #[test]
    fn nullish_coalescing_counts() {
        let report =
            TypeScriptReader.analyze("a.ts", "function f(x?: number) { return x ?? 0; }");
        assert_eq!(report.functions[0].cyclomatic_complexity, 2);
    }
}
