//! JavaScript reader.

use crate::analysis::JS_CONDITIONS;
use crate::lexer::js::JsTokenFilter;
use crate::lexer::{LexProfile, Lexer, Token};

use super::Reader;

/// `$`-prefixed identifiers and template literals, including an
/// unterminated template running to end of input.
static JS_PROFILE: LexProfile = LexProfile {
    additions: &[r"\$\w+", r"`(?s:.*?)`", r"`(?s:.*)\z"],
    regex_literals: true,
};

lazy_static::lazy_static! {
    static ref LEXER: Lexer = Lexer::new(&JS_PROFILE);
}

/// Shared with the Vue reader for plain `<script>` blocks.
pub(crate) fn lexer() -> &'static Lexer {
    &LEXER
}

pub struct JavaScriptReader;

impl Reader for JavaScriptReader {
    fn language(&self) -> &str {
        "javascript"
    }

    fn extensions(&self) -> &[&str] {
        &["js", "mjs", "cjs"]
    }

    fn conditions(&self) -> &'static phf::Set<&'static str> {
        &JS_CONDITIONS
    }

    fn generate_tokens<'s>(&self, source: &'s str) -> Box<dyn Iterator<Item = Token> + 's> {
        Box::new(JsTokenFilter::new(LEXER.tokenize(source, 1), false))
    }
}
