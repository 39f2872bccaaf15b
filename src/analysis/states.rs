//! Joint function recognizer and complexity counter for JS-style languages.
//!
//! One pass over the token stream tracks three kinds of structure at once:
//!
//! - assignment targets and property keys, so a function expression can be
//!   named from the nearest `name =` / `name:` to its left;
//! - parenthesized groups, so a `(...)` only becomes a parameter list when
//!   a `{` body or `=>` confirms it;
//! - brace nesting, so each function closes exactly when the depth returns
//!   to its opener's baseline, children finalizing before parents.
//!
//! Decision tokens increment the innermost open function; outside any
//! function they accrue to the file scope. Nothing here ever fails:
//! unbalanced input simply closes whatever is still open at end of input.

use phf::phf_set;

use super::{FileReport, FunctionInfo};
use crate::lexer::{Token, TokenKind};

pub const ANONYMOUS: &str = "(anonymous)";

/// Decision points for the JS family: conditional keywords, loop keywords,
/// ternary, and short-circuit operators.
pub static JS_CONDITIONS: phf::Set<&'static str> = phf_set! {
    "if", "for", "while", "case", "catch", "?", "&&", "||", "??",
};

/// Words that can never name a function or a shorthand method.
static RESERVED: phf::Set<&'static str> = phf_set! {
    "if", "else", "for", "while", "do", "switch", "case", "default",
    "break", "continue", "return", "function", "var", "let", "const",
    "new", "delete", "typeof", "instanceof", "in", "of", "this", "class",
    "extends", "super", "import", "export", "from", "try", "catch",
    "finally", "throw", "yield", "async", "await", "declare", "interface",
    "type", "enum", "implements", "static", "get", "set", "void",
    "public", "private", "protected", "readonly",
};

/// Keywords whose following `{` is a statement block, not an object literal.
static BLOCK_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "else", "try", "do", "finally",
};

/// What a `{` opened. Shorthand methods (`name() {}`) are only recognized
/// inside object/class bodies or at the top level, never inside statement
/// blocks, so `f (a < b) {}` in a function body stays a call plus block.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BraceCtx {
    Object,
    Block,
    FunctionBody,
}

/// How an open function will close.
#[derive(Clone, Copy)]
enum BodyKind {
    /// Arrow seen, body shape not yet known.
    Pending,
    /// Closes when brace depth returns to `baseline`.
    Block { baseline: i64 },
    /// Expression-bodied arrow: closes at the first separator at its own
    /// nesting level, or when either depth drops below its baseline.
    Expression { paren_baseline: i64, brace_baseline: i64 },
}

struct OpenFunction {
    name: String,
    is_anonymous: bool,
    start_line: usize,
    parent: Option<String>,
    complexity: u32,
    params: u32,
    token_count: u32,
    nloc: u32,
    last_line: usize,
    kind: BodyKind,
}

/// A parenthesized group, kept until `{`, `=>`, or a type annotation decides
/// whether it was a parameter list.
struct ParenGroup {
    commas: u32,
    has_item: bool,
    paren_level: i64,
    brace_level: i64,
    bracket_level: i64,
    /// Set when the group follows a `function` keyword; the inner option is
    /// the resolved declaration/assignment name.
    fn_name: Option<Option<String>>,
    /// Word immediately before `(`: shorthand-method candidate.
    prefix: Option<(String, usize)>,
    line: usize,
}

impl ParenGroup {
    fn params(&self) -> u32 {
        if self.has_item {
            self.commas + 1
        } else {
            0
        }
    }
}

enum State {
    Global,
    /// After the `function` keyword, collecting the optional name.
    FunctionKeyword { name: Option<String> },
    /// After a `)`: `{`, `=>`, or `:` keeps the group alive.
    AfterParams,
    /// After `): `, skipping a return-type annotation. `seen` flips once a
    /// type token was consumed, so `: {a: b} {` can tell the object type
    /// from the body brace.
    TypeAnnotation { obj_depth: i64, seen: bool },
    /// Right after `=>`: the next token decides block vs. expression body.
    ArrowBody,
}

pub struct JsStyleStates {
    conditions: &'static phf::Set<&'static str>,
    functions: Vec<FunctionInfo>,
    stack: Vec<OpenFunction>,
    groups: Vec<ParenGroup>,
    last_group: Option<ParenGroup>,
    contexts: Vec<BraceCtx>,
    state: State,
    /// Dotted word chain to the left of the cursor, e.g. `a.b.c`.
    chain: String,
    prev_dot: bool,
    prev_was_word: bool,
    prev_block_keyword: bool,
    /// Nearest assignment target or property key, candidate function name.
    pending_name: Option<String>,
    last_word: Option<(String, usize)>,
    paren_depth: i64,
    brace_depth: i64,
    bracket_depth: i64,
    file_complexity: u32,
    file_tokens: u32,
    file_nloc: u32,
    file_last_line: usize,
    last_line: usize,
}

impl JsStyleStates {
    pub fn new(conditions: &'static phf::Set<&'static str>) -> Self {
        JsStyleStates {
            conditions,
            functions: Vec::new(),
            stack: Vec::new(),
            groups: Vec::new(),
            last_group: None,
            contexts: Vec::new(),
            state: State::Global,
            chain: String::new(),
            prev_dot: false,
            prev_was_word: false,
            prev_block_keyword: false,
            pending_name: None,
            last_word: None,
            paren_depth: 0,
            brace_depth: 0,
            bracket_depth: 0,
            file_complexity: 0,
            file_tokens: 0,
            file_nloc: 0,
            file_last_line: 0,
            last_line: 1,
        }
    }

    pub fn feed(&mut self, tok: &Token) {
        if !tok.is_significant() {
            return;
        }
        self.last_line = tok.line;
        self.count_metrics(tok);
        if self.conditions.contains(tok.text.as_str()) {
            self.bump_condition();
        }
        if let Some(group) = self.groups.last_mut() {
            if tok.text != ")" {
                group.has_item = true;
            }
        }
        let state = std::mem::replace(&mut self.state, State::Global);
        match state {
            State::Global => self.global(tok),
            State::FunctionKeyword { name } => self.function_keyword(name, tok),
            State::AfterParams => self.after_params(tok),
            State::TypeAnnotation { obj_depth, seen } => {
                self.type_annotation(obj_depth, seen, tok)
            }
            State::ArrowBody => self.arrow_body(tok),
        }
    }

    /// Seal everything still open, innermost first, and build the report.
    pub fn into_report(mut self, filename: &str, language: &str) -> FileReport {
        while !self.stack.is_empty() {
            self.finalize_top(self.last_line);
        }
        FileReport {
            filename: filename.to_string(),
            language: language.to_string(),
            functions: self.functions,
            file_complexity: self.file_complexity,
            token_count: self.file_tokens,
            nloc: self.file_nloc,
        }
    }

    // ------------------------------------------------------------------
    // States
    // ------------------------------------------------------------------

    fn global(&mut self, tok: &Token) {
        let text = tok.text.as_str();
        match text {
            "function" => {
                self.state = State::FunctionKeyword { name: None };
                self.reset_word_state();
                return;
            }
            "=>" => {
                self.open_arrow(tok.line, None);
                self.state = State::ArrowBody;
                self.reset_word_state();
                return;
            }
            "(" => {
                self.open_group(tok.line, None);
                return;
            }
            ")" => {
                self.close_paren();
                return;
            }
            "{" => {
                let ctx = if self.prev_block_keyword {
                    BraceCtx::Block
                } else {
                    BraceCtx::Object
                };
                self.open_brace(ctx);
                return;
            }
            "}" => {
                self.close_brace();
                return;
            }
            "[" => {
                self.bracket_depth += 1;
                self.reset_word_state();
                return;
            }
            "]" => {
                self.bracket_depth -= 1;
                self.reset_word_state();
                return;
            }
            ";" | "," => {
                self.statement_separator(text == ",");
                return;
            }
            "=" | ":" => {
                if self.paren_depth == 0
                    && self.pending_name.is_none()
                    && !self.chain.is_empty()
                {
                    self.pending_name = Some(self.chain.clone());
                }
                self.reset_word_state();
                return;
            }
            "." => {
                self.prev_dot = self.prev_was_word;
                self.prev_was_word = false;
                self.prev_block_keyword = false;
                return;
            }
            _ => {}
        }

        if tok.kind == TokenKind::Word {
            if RESERVED.contains(text) {
                self.chain.clear();
                self.prev_was_word = false;
                self.last_word = None;
                self.prev_block_keyword = BLOCK_KEYWORDS.contains(text);
            } else {
                if self.prev_dot {
                    self.chain.push('.');
                    self.chain.push_str(text);
                } else {
                    self.chain = text.to_string();
                }
                self.last_word = Some((text.to_string(), tok.line));
                self.prev_was_word = true;
                self.prev_block_keyword = false;
            }
            self.prev_dot = false;
        } else {
            self.reset_word_state();
        }
    }

    fn function_keyword(&mut self, name: Option<String>, tok: &Token) {
        let text = tok.text.as_str();
        if text == "(" {
            let resolved = name.or_else(|| self.pending_name.take());
            self.open_group(tok.line, Some(resolved));
            return;
        }
        if text == "*" {
            self.state = State::FunctionKeyword { name };
            return;
        }
        if tok.kind == TokenKind::Word && name.is_none() && !RESERVED.contains(text) {
            self.state = State::FunctionKeyword {
                name: Some(text.to_string()),
            };
            return;
        }
        // Not a function header after all.
        self.global(tok);
    }

    fn after_params(&mut self, tok: &Token) {
        match tok.text.as_str() {
            "{" => self.open_body_from_group(),
            "=>" => {
                let group = self.last_group.take();
                self.open_arrow(tok.line, group);
                self.state = State::ArrowBody;
                self.reset_word_state();
            }
            ":" => {
                self.state = State::TypeAnnotation {
                    obj_depth: 0,
                    seen: false,
                };
            }
            _ => {
                self.last_group = None;
                self.global(tok);
            }
        }
    }

    fn type_annotation(&mut self, mut obj_depth: i64, mut seen: bool, tok: &Token) {
        let text = tok.text.as_str();
        if obj_depth > 0 {
            match text {
                "{" => obj_depth += 1,
                "}" => {
                    obj_depth -= 1;
                    if obj_depth == 0 {
                        seen = true;
                    }
                }
                _ => {}
            }
            self.state = State::TypeAnnotation { obj_depth, seen };
            return;
        }
        match text {
            "{" if !seen => {
                self.state = State::TypeAnnotation {
                    obj_depth: 1,
                    seen,
                };
            }
            "{" => self.open_body_from_group(),
            "=>" => {
                let group = self.last_group.take();
                self.open_arrow(tok.line, group);
                self.state = State::ArrowBody;
                self.reset_word_state();
            }
            ";" | "," | ")" | "}" | "=" | "(" => {
                // Declaration without a body, or not a function at all.
                self.last_group = None;
                self.global(tok);
            }
            _ => {
                self.state = State::TypeAnnotation {
                    obj_depth,
                    seen: true,
                };
            }
        }
    }

    fn arrow_body(&mut self, tok: &Token) {
        if tok.text == "{" {
            if let Some(top) = self.stack.last_mut() {
                top.kind = BodyKind::Block {
                    baseline: self.brace_depth,
                };
            }
            self.open_brace(BraceCtx::FunctionBody);
        } else {
            if let Some(top) = self.stack.last_mut() {
                top.kind = BodyKind::Expression {
                    paren_baseline: self.paren_depth,
                    brace_baseline: self.brace_depth,
                };
            }
            self.global(tok);
        }
    }

    // ------------------------------------------------------------------
    // Structure helpers
    // ------------------------------------------------------------------

    fn open_group(&mut self, line: usize, fn_name: Option<Option<String>>) {
        self.paren_depth += 1;
        let prefix = if self.prev_was_word {
            self.last_word.clone()
        } else {
            None
        };
        self.groups.push(ParenGroup {
            commas: 0,
            has_item: false,
            paren_level: self.paren_depth,
            brace_level: self.brace_depth,
            bracket_level: self.bracket_depth,
            fn_name,
            prefix,
            line,
        });
        self.reset_word_state();
    }

    fn close_paren(&mut self) {
        self.paren_depth -= 1;
        self.close_expression_arrows();
        if let Some(group) = self.groups.pop() {
            self.last_group = Some(group);
            self.state = State::AfterParams;
        }
        self.prev_was_word = false;
        self.prev_dot = false;
        self.prev_block_keyword = false;
    }

    /// A `{` following a completed group: function body, or a plain block.
    fn open_body_from_group(&mut self) {
        let group = self.last_group.take();
        let shorthand_ok = matches!(self.contexts.last(), None | Some(BraceCtx::Object));
        if let Some(group) = group {
            let params = group.params();
            if let Some(resolved) = group.fn_name {
                let (name, anon) = match resolved {
                    Some(n) => (n, false),
                    None => (ANONYMOUS.to_string(), true),
                };
                self.push_function(
                    name,
                    anon,
                    group.line,
                    params,
                    BodyKind::Block {
                        baseline: self.brace_depth,
                    },
                );
                self.open_brace(BraceCtx::FunctionBody);
                return;
            }
            if shorthand_ok {
                if let Some((prefix, prefix_line)) = group.prefix {
                    self.push_function(
                        prefix,
                        false,
                        prefix_line,
                        params,
                        BodyKind::Block {
                            baseline: self.brace_depth,
                        },
                    );
                    self.open_brace(BraceCtx::FunctionBody);
                    return;
                }
            }
        }
        self.open_brace(BraceCtx::Block);
    }

    fn open_arrow(&mut self, line: usize, group: Option<ParenGroup>) {
        let (name, anon) = match self.pending_name.take() {
            Some(n) => (n, false),
            None => (ANONYMOUS.to_string(), true),
        };
        let (params, start_line) = match group {
            Some(g) => (g.params(), g.line),
            None => {
                if self.prev_was_word {
                    let (_, word_line) = self.last_word.clone().unwrap_or((String::new(), line));
                    (1, word_line)
                } else {
                    (0, line)
                }
            }
        };
        self.push_function(name, anon, start_line, params, BodyKind::Pending);
    }

    fn open_brace(&mut self, ctx: BraceCtx) {
        self.brace_depth += 1;
        self.contexts.push(ctx);
        self.pending_name = None;
        self.chain.clear();
        self.reset_word_state();
    }

    fn close_brace(&mut self) {
        self.brace_depth -= 1;
        self.contexts.pop();
        self.close_expression_arrows();
        while let Some(top) = self.stack.last() {
            match top.kind {
                BodyKind::Block { baseline } if baseline == self.brace_depth => {
                    self.finalize_top(self.last_line);
                }
                _ => break,
            }
        }
        self.pending_name = None;
        self.chain.clear();
        self.reset_word_state();
    }

    fn statement_separator(&mut self, comma: bool) {
        // Expression-bodied arrows at this level end here.
        while let Some(top) = self.stack.last() {
            match top.kind {
                BodyKind::Expression {
                    paren_baseline,
                    brace_baseline,
                } if paren_baseline >= self.paren_depth
                    && brace_baseline >= self.brace_depth =>
                {
                    self.finalize_top(self.last_line);
                }
                _ => break,
            }
        }
        if comma {
            if let Some(group) = self.groups.last_mut() {
                if group.paren_level == self.paren_depth
                    && group.brace_level == self.brace_depth
                    && group.bracket_level == self.bracket_depth
                {
                    group.commas += 1;
                }
            }
        }
        self.pending_name = None;
        self.chain.clear();
        self.reset_word_state();
    }

    /// Close expression-bodied arrows whose nesting level no longer exists.
    fn close_expression_arrows(&mut self) {
        while let Some(top) = self.stack.last() {
            match top.kind {
                BodyKind::Expression {
                    paren_baseline,
                    brace_baseline,
                } if paren_baseline > self.paren_depth
                    || brace_baseline > self.brace_depth =>
                {
                    self.finalize_top(self.last_line);
                }
                _ => break,
            }
        }
    }

    fn push_function(
        &mut self,
        name: String,
        is_anonymous: bool,
        start_line: usize,
        params: u32,
        kind: BodyKind,
    ) {
        let parent = self.stack.last().map(|f| f.name.clone());
        self.stack.push(OpenFunction {
            name,
            is_anonymous,
            start_line,
            parent,
            complexity: 1,
            params,
            token_count: 0,
            nloc: 0,
            last_line: 0,
            kind,
        });
    }

    fn finalize_top(&mut self, end_line: usize) {
        if let Some(f) = self.stack.pop() {
            self.functions.push(FunctionInfo {
                name: f.name,
                is_anonymous: f.is_anonymous,
                start_line: f.start_line,
                end_line,
                parent: f.parent,
                cyclomatic_complexity: f.complexity,
                parameter_count: f.params,
                token_count: f.token_count,
                nloc: f.nloc,
            });
        }
    }

    fn bump_condition(&mut self) {
        match self.stack.last_mut() {
            Some(f) => f.complexity += 1,
            None => self.file_complexity += 1,
        }
    }

    fn count_metrics(&mut self, tok: &Token) {
        match self.stack.last_mut() {
            Some(f) => {
                f.token_count += 1;
                if f.last_line != tok.line {
                    f.last_line = tok.line;
                    f.nloc += 1;
                }
            }
            None => {
                self.file_tokens += 1;
                if self.file_last_line != tok.line {
                    self.file_last_line = tok.line;
                    self.file_nloc += 1;
                }
            }
        }
    }

    fn reset_word_state(&mut self) {
        self.prev_was_word = false;
        self.prev_dot = false;
        self.prev_block_keyword = false;
        self.last_word = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{Lexer, LexProfile};

    const JS: LexProfile = LexProfile {
        additions: &[r"\$\w+", r"`(?s:.*?)`", r"`(?s:.*)\z"],
        regex_literals: true,
    };

    fn functions(source: &str) -> Vec<FunctionInfo> {
        let lexer = Lexer::new(&JS);
        super::super::run(lexer.tokenize(source, 1), &JS_CONDITIONS, "a.js", "javascript")
            .functions
    }

    #[test]
    fn named_declaration() {
        let fns = functions("function foo(){}");
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].name, "foo");
        assert!(!fns[0].is_anonymous);
    }

    #[test]
    fn parameter_count() {
        let fns = functions("function foo(a, b){}");
        assert_eq!(fns[0].parameter_count, 2);
        let fns = functions("function foo(){}");
        assert_eq!(fns[0].parameter_count, 0);
    }

    #[test]
    fn assignment_target_names_the_function() {
        let fns = functions("a = function (a, b){}");
        assert_eq!(fns[0].name, "a");
        let fns = functions("a.b.c = function (a, b){}");
        assert_eq!(fns[0].name, "a.b.c");
    }

    #[test]
    fn stale_assignment_target_does_not_leak() {
        let fns = functions("abc=3; function (a, b){}");
        assert_eq!(fns[0].name, "(anonymous)");
        assert!(fns[0].is_anonymous);
    }

    #[test]
    fn object_literal_value() {
        let fns = functions("var App={a:function(){};}");
        assert_eq!(fns[0].name, "a");
    }

    #[test]
    fn nested_functions_close_inner_first() {
        let fns = functions("function a(){function b(){}}");
        assert_eq!(fns[0].name, "b");
        assert_eq!(fns[1].name, "a");
        assert_eq!(fns[0].parent.as_deref(), Some("a"));
        assert!(fns[1].parent.is_none());
    }

    #[test]
    fn complexity_counts_branches_in_the_right_function() {
        let fns = functions("function foo(){m;if(a);}");
        assert_eq!(fns[0].cyclomatic_complexity, 2);
    }

    #[test]
    fn sibling_does_not_inherit_complexity() {
        let fns = functions(
            "function plain() { return helper(); } function branchy(x) { if (x) { return 1; } }",
        );
        assert_eq!(fns[0].name, "plain");
        assert_eq!(fns[0].cyclomatic_complexity, 1);
        assert_eq!(fns[1].name, "branchy");
        assert_eq!(fns[1].cyclomatic_complexity, 2);
    }

    #[test]
    fn bare_arrow_is_anonymous() {
        let fns = functions("x=>x");
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].name, "(anonymous)");
        assert_eq!(fns[0].parameter_count, 1);
    }

    #[test]
    fn call_plus_block_inside_body_is_not_a_function() {
        let fns = functions(
            "function a () {f (a < b) {} } function b () { return (dispatch, getState) => {} }",
        );
        let names: Vec<&str> = fns.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "(anonymous)", "b"]);
        assert_eq!(fns[1].parameter_count, 2);
    }

    #[test]
    fn shorthand_method_at_object_level() {
        let fns = functions("hello() { return \"world\" }");
        assert_eq!(fns[0].name, "hello");
        assert_eq!(fns[0].cyclomatic_complexity, 1);
    }

    #[test]
    fn empty_input_yields_no_functions() {
        assert!(functions("").is_empty());
        assert!(functions("{}").is_empty());
    }

    #[test]
    fn file_scope_collects_unattached_branches() {
        let lexer = Lexer::new(&JS);
        let report = super::super::run(
            lexer.tokenize("if (a && b) { c; }", 1),
            &JS_CONDITIONS,
            "a.js",
            "javascript",
        );
        assert!(report.functions.is_empty());
        assert_eq!(report.file_complexity, 2);
    }

    #[test]
    fn spans_nest_and_do_not_overlap() {
        let src = "function a() {\n  function b() {\n    x;\n  }\n  y;\n}\nfunction c() {\n  z;\n}\n";
        let fns = functions(src);
        let a = fns.iter().find(|f| f.name == "a").unwrap();
        let b = fns.iter().find(|f| f.name == "b").unwrap();
        let c = fns.iter().find(|f| f.name == "c").unwrap();
        assert!(b.start_line >= a.start_line && b.end_line <= a.end_line);
        assert!(c.start_line > a.end_line);
    }
}
