//! Code-mode token filtering and speculative markup-tag recognition.
//!
//! [`JsLexer`] is the Code lexical mode: it passes code tokens through and,
//! for JSX-capable languages, intercepts a bare `<` to start a [`TagLexer`].
//! The tag machine is speculative: it buffers everything it consumes and
//! either commits (emitting tag tokens, possibly collapsed to one opaque
//! markup token) or rolls back, re-emitting the buffered tokens unchanged so
//! `a < b` style expressions survive intact. It never partially commits and
//! never fails; malformed markup degrades, it does not abort the file.
//!
//! Mode nesting is expressed by ownership: a `TagLexer` inside a `JsLexer`
//! is Markup mode, a nested `JsLexer` inside a `TagLexer` is an
//! embedded-expression excursion, and so on recursively.

use std::collections::VecDeque;

use super::{is_identifier, Token, TokenKind};

/// Code mode. `depth` tracks `{`/`}` so a nested instance embedded in markup
/// ends at the brace that closes its excursion; the root instance never ends.
pub struct JsLexer {
    jsx: bool,
    root: bool,
    depth: i64,
    ended: bool,
    sub: Option<Box<TagLexer>>,
}

impl JsLexer {
    pub fn new(jsx: bool) -> JsLexer {
        JsLexer {
            jsx,
            root: true,
            depth: 1,
            ended: false,
            sub: None,
        }
    }

    /// An embedded-expression excursion: ends at its matching `}`.
    fn nested() -> JsLexer {
        JsLexer {
            jsx: true,
            root: false,
            depth: 1,
            ended: false,
            sub: None,
        }
    }

    pub fn feed(&mut self, tok: Token, out: &mut Vec<Token>) {
        if let Some(sub) = self.sub.as_mut() {
            sub.feed(tok, out);
            if sub.ended {
                self.sub = None;
            }
            return;
        }
        if self.jsx && tok.text == "<" {
            self.sub = Some(Box::new(TagLexer::new(tok)));
            return;
        }
        if tok.text == "{" {
            self.depth += 1;
        } else if tok.text == "}" {
            self.depth -= 1;
            if !self.root && self.depth == 0 {
                self.ended = true;
                return;
            }
        }
        out.push(tok);
    }

    pub fn finish(&mut self, out: &mut Vec<Token>) {
        if let Some(sub) = self.sub.as_mut() {
            sub.finish(out);
            self.sub = None;
        }
        self.ended = true;
    }
}

#[derive(Clone, Copy)]
enum TagState {
    /// Right after `<`: the next token must be a plausible tag name.
    TagName,
    /// Tag name seen; expecting `>`, `/`, or an attribute name.
    AfterTag,
    /// Seen `/`; only `>` completes a standalone tag.
    SelfClosing,
    /// Attribute name seen; only `=` continues the tag hypothesis.
    ExpectEq,
    /// After `attr=`: a quoted literal or a braced expression.
    ExpectValue,
    /// Inside `attr={...}` markup; inner code went to a nested excursion.
    Expression,
    /// Between `>` and the closing tag; content accumulates opaquely.
    Body,
}

/// Markup mode, entered speculatively from a bare `<`.
pub struct TagLexer {
    state: TagState,
    /// Everything consumed since `<`, kept verbatim for rollback/collapse.
    cache: Vec<Token>,
    /// Brace depth inside an `attr={...}` region, tracked independently so
    /// object literals in the expression do not close it early.
    brace_depth: i64,
    /// Set once the input can no longer be ordinary code (body reached or an
    /// embedded expression opened). Decides rollback vs. collapse at EOF.
    confirmed: bool,
    ended: bool,
    sub: Option<SubLexer>,
}

/// What a tag delegates to: a nested tag in its body, or an
/// embedded-expression excursion.
enum SubLexer {
    Tag(Box<TagLexer>),
    Code(Box<JsLexer>),
}

impl TagLexer {
    fn new(open: Token) -> TagLexer {
        TagLexer {
            state: TagState::TagName,
            cache: vec![open],
            brace_depth: 0,
            confirmed: false,
            ended: false,
            sub: None,
        }
    }

    fn feed(&mut self, tok: Token, out: &mut Vec<Token>) {
        if let Some(sub) = self.sub.as_mut() {
            let done = match sub {
                SubLexer::Tag(t) => {
                    t.feed(tok, out);
                    t.ended
                }
                SubLexer::Code(c) => {
                    c.feed(tok, out);
                    c.ended
                }
            };
            if done {
                self.sub = None;
            }
            return;
        }

        let is_space = tok.is_space();
        let is_ident = is_identifier(&tok);
        let kind = tok.kind;
        let line = tok.line;
        let text = tok.text.clone();
        self.cache.push(tok);

        match self.state {
            TagState::TagName => {
                // Whitespace directly after `<` kills the hypothesis.
                if is_space || !is_ident {
                    self.abort(out);
                } else {
                    self.state = TagState::AfterTag;
                }
            }
            TagState::AfterTag => {
                if is_space {
                } else if text == ">" {
                    self.confirmed = true;
                    self.state = TagState::Body;
                } else if text == "/" {
                    self.state = TagState::SelfClosing;
                } else if is_ident {
                    self.state = TagState::ExpectEq;
                } else {
                    self.abort(out);
                }
            }
            TagState::SelfClosing => {
                if is_space {
                } else if text == ">" {
                    self.ended = true;
                    self.flush(out, TokenKind::TagSelfClose);
                } else {
                    self.abort(out);
                }
            }
            TagState::ExpectEq => {
                if is_space {
                } else if text == "=" {
                    self.state = TagState::ExpectValue;
                } else {
                    self.abort(out);
                }
            }
            TagState::ExpectValue => {
                if is_space {
                } else if kind == TokenKind::StringLit && text.starts_with(['"', '\'']) {
                    self.state = TagState::AfterTag;
                } else if text == "{" {
                    // Embedded expression: from here the markup can only be
                    // collapsed, never rolled back.
                    self.confirmed = true;
                    self.brace_depth = 1;
                    self.state = TagState::Expression;
                    self.sub = Some(SubLexer::Code(Box::new(JsLexer::nested())));
                }
                // Anything else: keep consuming; an unresolved hypothesis is
                // rolled back at end of input.
            }
            TagState::Expression => {
                if is_space {
                } else if text == "{" {
                    self.brace_depth += 1;
                } else if text == "}" {
                    self.brace_depth -= 1;
                    if self.brace_depth == 0 {
                        self.state = TagState::AfterTag;
                    }
                } else if text == "=>" {
                    // Callbacks in attribute values must stay visible to the
                    // function recognizer even when the markup collapses.
                    out.push(Token { text, kind, line });
                }
            }
            TagState::Body => {
                if is_space {
                } else if text == "<" {
                    // Nested tag: emit what we have, hand the `<` to a fresh
                    // speculative machine.
                    let open = self.cache.pop().expect("just pushed");
                    self.flush(out, TokenKind::Markup);
                    self.sub = Some(SubLexer::Tag(Box::new(TagLexer::new(open))));
                } else if kind == TokenKind::TagClose {
                    self.ended = true;
                    self.flush(out, TokenKind::Markup);
                } else if text == "{" {
                    self.flush(out, TokenKind::Markup);
                    self.sub = Some(SubLexer::Code(Box::new(JsLexer::nested())));
                }
                // Plain content accumulates until the close tag.
            }
        }
    }

    /// Rollback: the `<` was an ordinary operator after all. Re-emit the
    /// buffered tokens exactly as they were consumed.
    fn abort(&mut self, out: &mut Vec<Token>) {
        self.ended = true;
        out.append(&mut self.cache);
    }

    /// Commit: collapse the buffer into one opaque token.
    fn flush(&mut self, out: &mut Vec<Token>, kind: TokenKind) {
        if self.cache.is_empty() {
            return;
        }
        let line = self.cache[0].line;
        let text: String = self.cache.drain(..).map(|t| t.text).collect();
        out.push(Token { text, kind, line });
    }

    fn finish(&mut self, out: &mut Vec<Token>) {
        if let Some(sub) = self.sub.as_mut() {
            match sub {
                SubLexer::Tag(t) => t.finish(out),
                SubLexer::Code(c) => c.finish(out),
            }
            self.sub = None;
        }
        if !self.confirmed {
            self.abort(out);
        } else {
            // Confirmed but unterminated markup collapses away.
            self.cache.clear();
            self.ended = true;
        }
    }
}

/// Iterator adapter running a token stream through a [`JsLexer`].
pub struct JsTokenFilter<I: Iterator<Item = Token>> {
    inner: I,
    lexer: JsLexer,
    queue: VecDeque<Token>,
    done: bool,
}

impl<I: Iterator<Item = Token>> JsTokenFilter<I> {
    pub fn new(inner: I, jsx: bool) -> Self {
        JsTokenFilter {
            inner,
            lexer: JsLexer::new(jsx),
            queue: VecDeque::new(),
            done: false,
        }
    }
}

impl<I: Iterator<Item = Token>> Iterator for JsTokenFilter<I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(tok) = self.queue.pop_front() {
                return Some(tok);
            }
            if self.done {
                return None;
            }
            let mut out = Vec::new();
            match self.inner.next() {
                Some(tok) => self.lexer.feed(tok, &mut out),
                None => {
                    self.lexer.finish(&mut out);
                    self.done = true;
                }
            }
            self.queue.extend(out);
        }
    }
}
