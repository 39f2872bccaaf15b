//! Single-file-component splitting for Vue sources.
//!
//! A `.vue` file is a flat sequence of top-level blocks. Only `<script>`
//! blocks carry analyzable code; everything else is kept as inert regions
//! so line numbers stay faithful to the original file.

use regex::Regex;

lazy_static::lazy_static! {
    static ref OPEN_RE: Regex =
        Regex::new(r"(?i)<(template|script|style)\b([^>]*)>").unwrap();
    static ref CLOSE_TEMPLATE: Regex = Regex::new(r"(?i)</\s*template\s*>").unwrap();
    static ref CLOSE_SCRIPT: Regex = Regex::new(r"(?i)</\s*script\s*>").unwrap();
    static ref CLOSE_STYLE: Regex = Regex::new(r"(?i)</\s*style\s*>").unwrap();
    static ref LANG_RE: Regex =
        Regex::new(r#"(?i)\blang\s*=\s*["']?([A-Za-z0-9_+-]+)"#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Template,
    Script,
    Style,
    /// Text between recognized blocks (comments, custom blocks).
    Other,
}

/// One top-level block of a single-file component.
#[derive(Debug)]
pub struct Region<'s> {
    pub kind: RegionKind,
    /// Lowercased `lang` attribute value, if present on the open tag.
    pub lang: Option<String>,
    /// Block content, open/close tags excluded.
    pub text: &'s str,
    /// 1-based source line the content starts on.
    pub start_line: usize,
}

/// Split a single-file component into its top-level regions.
///
/// An unterminated block runs to end of input. Nothing here fails:
/// arbitrary text yields at most one `Other` region.
pub fn split(source: &str) -> Vec<Region<'_>> {
    let mut regions = Vec::new();
    let mut pos = 0;
    let mut line = 1;

    while let Some(caps) = OPEN_RE.captures(&source[pos..]) {
        let whole = caps.get(0).expect("whole match");
        let name = caps.get(1).expect("tag name").as_str().to_ascii_lowercase();
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let open_start = pos + whole.start();
        let content_start = pos + whole.end();

        if open_start > pos {
            regions.push(Region {
                kind: RegionKind::Other,
                lang: None,
                text: &source[pos..open_start],
                start_line: line,
            });
        }
        line += newlines(&source[pos..content_start]);

        let (kind, close_re) = match name.as_str() {
            "template" => (RegionKind::Template, &*CLOSE_TEMPLATE),
            "script" => (RegionKind::Script, &*CLOSE_SCRIPT),
            _ => (RegionKind::Style, &*CLOSE_STYLE),
        };
        let rest = &source[content_start..];
        let (text, next_pos) = if attrs.trim_end().ends_with('/') {
            // Self-closing opening tag: empty region.
            ("", content_start)
        } else {
            match close_re.find(rest) {
                Some(close) => (&rest[..close.start()], content_start + close.end()),
                None => (rest, source.len()),
            }
        };
        regions.push(Region {
            kind,
            lang: LANG_RE
                .captures(attrs)
                .map(|c| c[1].to_ascii_lowercase()),
            text,
            start_line: line,
        });
        line += newlines(&source[content_start..next_pos]);
        pos = next_pos;
    }

    if pos < source.len() {
        regions.push(Region {
            kind: RegionKind::Other,
            lang: None,
            text: &source[pos..],
            start_line: line,
        });
    }
    regions
}

fn newlines(s: &str) -> usize {
    s.matches('\n').count()
}
