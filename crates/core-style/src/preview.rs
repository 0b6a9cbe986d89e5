//! Plain-text previews for note lists and search results.

use core_line::{classify, marker_split, unescaped_pipes, LineKind};
use regex::Regex;
use std::sync::OnceLock;

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("link pattern"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("italic pattern"))
}

fn code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("code pattern"))
}

/// Flatten note content into a one-line plain-text preview of at most
/// `max_len` characters. Structural markers and inline delimiters are dropped,
/// link display text is kept, lines collapse onto one space.
pub fn plain_preview(content: &str, max_len: usize) -> String {
    let mut out = String::new();
    for line in content.lines() {
        let stripped = strip_line(line);
        let stripped = stripped.trim();
        if stripped.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(stripped);
    }
    truncate_chars(&out, max_len)
}

fn strip_line(line: &str) -> String {
    let body = match classify(line) {
        LineKind::Rule => return String::new(),
        LineKind::Blockquote => &line["> ".len()..],
        LineKind::TableRow => {
            let mut cells = line.to_string();
            for p in unescaped_pipes(line) {
                cells.replace_range(p..p + 1, " ");
            }
            return strip_inline(&cells);
        }
        LineKind::Header { .. }
        | LineKind::Bullet { .. }
        | LineKind::Ordered { .. }
        | LineKind::Checkbox { .. } => match marker_split(line) {
            Some(split) => &line[split.prefix..],
            None => line,
        },
        LineKind::Plain => line,
    };
    strip_inline(body)
}

fn strip_inline(text: &str) -> String {
    let s = link_re().replace_all(text, "$1");
    let s = bold_re().replace_all(&s, "$1");
    let s = italic_re().replace_all(&s, "$1");
    let s = code_re().replace_all(&s, "$1");
    s.into_owned()
}

fn truncate_chars(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_len).collect();
    format!("{}...", cut.trim_end())
}
