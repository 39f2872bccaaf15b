//! Language-agnostic tokenization.
//!
//! Each language builds a [`Lexer`] from a [`LexProfile`]: a master regex
//! whose alternations cover comments, string literals, the language's extra
//! token shapes, words, multi-character operators, and whitespace, with a
//! single-character fallback so every byte of input lands in exactly one
//! token. Concatenating the emitted token texts reproduces the source.
//!
//! Tokenization is lazy: [`TokenStream`] is a pull-based iterator, so a
//! consumer can stop early on pathological input.

use lazy_static::lazy_static;
use regex::Regex;

pub mod js;

/// Coarse token classification.
///
/// Downstream passes mostly match on token text; the kind is used to skip
/// trivia, keep literals opaque, and recognize markup tokens produced by the
/// tag machinery in [`js`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier, keyword, or number.
    Word,
    /// Punctuation or (possibly multi-character) operator.
    Operator,
    /// String, template, or regex literal; never re-tokenized.
    StringLit,
    /// Line or block comment.
    Comment,
    /// Horizontal whitespace.
    Space,
    /// Newline or line continuation.
    Newline,
    /// A whole opening tag, e.g. `<div>`.
    TagOpen,
    /// A whole closing tag, e.g. `</div>`.
    TagClose,
    /// A self-contained tag, e.g. `<br />`.
    TagSelfClose,
    /// Collapsed opaque markup (tag with literal attributes and content).
    Markup,
}

/// An immutable (text, kind, position) triple. Produced once, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// 1-based source line of the token's first character.
    pub line: usize,
}

impl Token {
    pub fn new(text: &str, kind: TokenKind, line: usize) -> Self {
        Token {
            text: text.to_string(),
            kind,
            line,
        }
    }

    /// Whitespace tokens separate other tokens but carry no meaning.
    pub fn is_space(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Newline)
    }

    /// Tokens that count toward token/line metrics and drive recognition.
    pub fn is_significant(&self) -> bool {
        !matches!(
            self.kind,
            TokenKind::Space | TokenKind::Newline | TokenKind::Comment
        )
    }
}

/// Per-language lexical configuration.
pub struct LexProfile {
    /// Extra alternations spliced in ahead of the word pattern,
    /// e.g. `\$\w+` or whole-tag shapes.
    pub additions: &'static [&'static str],
    /// Enable JS-style `/regex/` literals with the trailing-word
    /// division fallback.
    pub regex_literals: bool,
}

const BLOCK_COMMENT: &str = r"/\*(?s:.*?)\*/";
const BLOCK_COMMENT_OPEN: &str = r"/\*(?s:.*)\z";
const LINE_COMMENT: &str = r"//(?:\\\n|[^\n])*";
const DQ_STRING: &str = r#""(?:\\(?s:.)|[^"\\])*""#;
const SQ_STRING: &str = r"'(?:\\(?s:.)|[^'\\])*'";
const DQ_STRING_OPEN: &str = r#""(?:\\(?s:.)|[^"\\])*\z"#;
const SQ_STRING_OPEN: &str = r"'(?:\\(?s:.)|[^'\\])*\z";
const REGEX_LITERAL: &str = r"/(?:\\.|[^/\\\n])+/[a-z]*";
const WORD: &str = r"\w+";
const LINE_CONTINUATION: &str = r"\\\n";
const NEWLINE: &str = r"\n";
const HSPACE: &str = r"[^\S\n]+";
const ANY_CHAR: &str = r"(?s:.)";

/// Multi-character operators, longest first so alternation order is safe.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "===", "!==", "...", "**", "=>", "->", "<<", ">>", "<=",
    ">=", "==", "!=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=",
    "/=", "^=", "&=", "|=", "::", ":=",
];

fn build_pattern(profile: &LexProfile, with_regex_literals: bool) -> String {
    let mut alts: Vec<String> = vec![
        BLOCK_COMMENT.to_string(),
        BLOCK_COMMENT_OPEN.to_string(),
        LINE_COMMENT.to_string(),
        DQ_STRING.to_string(),
        SQ_STRING.to_string(),
        DQ_STRING_OPEN.to_string(),
        SQ_STRING_OPEN.to_string(),
    ];
    alts.extend(profile.additions.iter().map(|s| s.to_string()));
    if with_regex_literals {
        alts.push(REGEX_LITERAL.to_string());
    }
    alts.push(WORD.to_string());
    alts.extend(OPERATORS.iter().map(|s| regex::escape(s)));
    alts.push(LINE_CONTINUATION.to_string());
    alts.push(NEWLINE.to_string());
    alts.push(HSPACE.to_string());
    alts.push(ANY_CHAR.to_string());
    format!("(?:{})", alts.join("|"))
}

lazy_static! {
    static ref TAG_OPEN_SHAPE: Regex =
        Regex::new(r"^<[A-Za-z][A-Za-z0-9]*(?:\.[A-Za-z][A-Za-z0-9]*)*>$").unwrap();
    static ref TAG_CLOSE_SHAPE: Regex = Regex::new(r"^</\w+(?:\.\w+)*\s*>$").unwrap();
    static ref REGEX_LIT_SHAPE: Regex =
        Regex::new(r"^/(?:\\.|[^/\\\n])+/[a-z]*$").unwrap();
    static ref WORD_SHAPE: Regex = Regex::new(r"^\w+$").unwrap();
}

/// Classify a matched slice by shape.
fn classify(text: &str) -> TokenKind {
    let first = match text.chars().next() {
        Some(c) => c,
        None => return TokenKind::Space,
    };
    if text.starts_with("//") || text.starts_with("/*") {
        return TokenKind::Comment;
    }
    if matches!(first, '"' | '\'' | '`') {
        return TokenKind::StringLit;
    }
    if first.is_whitespace() || text == "\\\n" {
        return if text.contains('\n') {
            TokenKind::Newline
        } else {
            TokenKind::Space
        };
    }
    if first.is_alphanumeric() || first == '_' || first == '$' {
        return TokenKind::Word;
    }
    if first == '<' && text.len() > 2 {
        if TAG_CLOSE_SHAPE.is_match(text) {
            return TokenKind::TagClose;
        }
        if TAG_OPEN_SHAPE.is_match(text) {
            return TokenKind::TagOpen;
        }
    }
    if first == '/' && REGEX_LIT_SHAPE.is_match(text) {
        return TokenKind::StringLit;
    }
    TokenKind::Operator
}

/// A compiled per-language tokenizer. Stateless between files; every call to
/// [`Lexer::tokenize`] gets fresh stream state.
pub struct Lexer {
    re: Regex,
    /// Same alternation without the regex-literal branch, used to re-lex a
    /// span that turned out to be division rather than a regex literal.
    plain: Option<Regex>,
}

impl Lexer {
    pub fn new(profile: &LexProfile) -> Lexer {
        let re = Regex::new(&build_pattern(profile, profile.regex_literals))
            .expect("lexer pattern must compile");
        let plain = if profile.regex_literals {
            Some(
                Regex::new(&build_pattern(profile, false))
                    .expect("lexer pattern must compile"),
            )
        } else {
            None
        };
        Lexer { re, plain }
    }

    /// Lazily tokenize `source`, numbering lines from `start_line`.
    pub fn tokenize<'r, 's>(&'r self, source: &'s str, start_line: usize) -> TokenStream<'r, 's> {
        TokenStream {
            matches: self.re.find_iter(source),
            plain: self.plain.as_ref(),
            relexed: Vec::new().into_iter(),
            line: start_line,
            prev_word_like: false,
        }
    }
}

/// Pull-based token iterator over one source text.
pub struct TokenStream<'r, 's> {
    matches: regex::Matches<'r, 's>,
    plain: Option<&'r Regex>,
    relexed: std::vec::IntoIter<Token>,
    line: usize,
    prev_word_like: bool,
}

impl TokenStream<'_, '_> {
    fn note(&mut self, text: &str, kind: TokenKind) {
        if !matches!(kind, TokenKind::Space | TokenKind::Newline | TokenKind::Comment) {
            self.prev_word_like = WORD_SHAPE.is_match(text);
        }
    }
}

impl Iterator for TokenStream<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(tok) = self.relexed.next() {
            return Some(tok);
        }
        let m = self.matches.next()?;
        let text = m.as_str();
        let tok_line = self.line;
        self.line += text.matches('\n').count();

        // A "/regex/" right after a word-like token is division, not a
        // literal. Re-lex the span without the regex-literal branch.
        if self.prev_word_like && REGEX_LIT_SHAPE.is_match(text) {
            if let Some(plain) = self.plain {
                let mut pieces = Vec::new();
                let mut line = tok_line;
                for sub in plain.find_iter(text) {
                    let kind = classify(sub.as_str());
                    self.note(sub.as_str(), kind);
                    pieces.push(Token::new(sub.as_str(), kind, line));
                    line += sub.as_str().matches('\n').count();
                }
                self.relexed = pieces.into_iter();
                return self.relexed.next();
            }
        }

        let kind = classify(text);
        self.note(text, kind);
        Some(Token::new(text, kind, tok_line))
    }
}

/// True for tokens that could be a tag name (used by the tag machine).
pub fn is_identifier(token: &Token) -> bool {
    token.kind == TokenKind::Word
        && token
            .text
            .chars()
            .next()
            .map(|c| c.is_alphabetic() || c == '_' || c == '$')
            .unwrap_or(false)
}
