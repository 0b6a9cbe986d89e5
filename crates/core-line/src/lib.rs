//! Line classification for the styling engine and mutation operations.
//!
//! A line's structural kind is recomputed from its text on every use and is
//! never stored, so it cannot desynchronize from the buffer. Classification is
//! total: every string maps to exactly one [`LineKind`], defaulting to
//! [`LineKind::Plain`].

use regex::Regex;
use std::sync::OnceLock;

pub mod locate;

pub use locate::{clamp_to_boundary, line_bounds, line_at};

/// Structural classification of a single line.
///
/// Precedence when several patterns could match (highest first):
/// Header > Checkbox > Bullet > Ordered > Blockquote > TableRow > Rule > Plain.
/// Marker patterns are anchored at line start and mutually exclusive; table
/// detection comes after them because a pipe can appear incidentally inside
/// any of the others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    Header { level: u8 },
    Bullet { indent: usize, marker: char },
    Ordered { indent: usize, number: u64 },
    Checkbox { indent: usize, checked: bool },
    Blockquote,
    TableRow,
    Rule,
}

/// Byte lengths of a classified line's structural pieces.
///
/// `prefix` covers indent plus the marker text including its trailing space
/// (`"- [ ] "` is 6 bytes); the remainder of the line is content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSplit {
    pub indent: usize,
    pub prefix: usize,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6}) ").expect("header pattern"))
}

fn checkbox_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(?:[-*+] )?\[( |x|X)\] ").expect("checkbox pattern"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([-*+]) ").expect("bullet pattern"))
}

fn ordered_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\d+)\. ").expect("ordered pattern"))
}

fn blockquote_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^> ").expect("blockquote pattern"))
}

fn rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^---+\s*$").expect("rule pattern"))
}

/// Byte offset of the first unescaped `|` in `line`, if any.
pub fn first_unescaped_pipe(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'|' && (i == 0 || bytes[i - 1] != b'\\') {
            return Some(i);
        }
    }
    None
}

/// Byte offsets of every unescaped `|` in `line`, in order.
pub fn unescaped_pipes(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'|' && (i == 0 || bytes[i - 1] != b'\\') {
            out.push(i);
        }
    }
    out
}

/// Classify a single line (no trailing newline expected; one is tolerated).
pub fn classify(line: &str) -> LineKind {
    let line = line.strip_suffix('\n').unwrap_or(line);

    if let Some(c) = header_re().captures(line) {
        return LineKind::Header {
            level: c[1].len() as u8,
        };
    }
    if let Some(c) = checkbox_re().captures(line) {
        return LineKind::Checkbox {
            indent: c[1].len(),
            checked: &c[2] != " ",
        };
    }
    if let Some(c) = bullet_re().captures(line) {
        return LineKind::Bullet {
            indent: c[1].len(),
            marker: c[2].chars().next().unwrap_or('-'),
        };
    }
    if let Some(c) = ordered_re().captures(line) {
        // Numbers too large for u64 are not a list marker; fall through.
        if let Ok(number) = c[2].parse::<u64>() {
            return LineKind::Ordered {
                indent: c[1].len(),
                number,
            };
        }
    }
    if blockquote_re().is_match(line) {
        return LineKind::Blockquote;
    }
    if first_unescaped_pipe(line).is_some() {
        return LineKind::TableRow;
    }
    if rule_re().is_match(line) {
        return LineKind::Rule;
    }
    LineKind::Plain
}

/// Split a list-shaped line into indent/prefix lengths.
///
/// Returns `None` for kinds without a leading marker (plain, table, rule,
/// blockquote is handled by its fixed two-byte prefix at the call site).
pub fn marker_split(line: &str) -> Option<MarkerSplit> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    match classify(line) {
        LineKind::Header { .. } => {
            let m = header_re().find(line)?;
            Some(MarkerSplit {
                indent: 0,
                prefix: m.end(),
            })
        }
        LineKind::Checkbox { indent, .. } => {
            let m = checkbox_re().find(line)?;
            Some(MarkerSplit {
                indent,
                prefix: m.end(),
            })
        }
        LineKind::Bullet { indent, .. } => {
            let m = bullet_re().find(line)?;
            Some(MarkerSplit {
                indent,
                prefix: m.end(),
            })
        }
        LineKind::Ordered { indent, .. } => {
            let m = ordered_re().find(line)?;
            Some(MarkerSplit {
                indent,
                prefix: m.end(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_by_level() {
        assert_eq!(classify("# Title"), LineKind::Header { level: 1 });
        assert_eq!(classify("### sub"), LineKind::Header { level: 3 });
        assert_eq!(classify("###### deep"), LineKind::Header { level: 6 });
        // Seven hashes exceed the header range.
        assert_eq!(classify("####### nope"), LineKind::Plain);
        // No space after the hashes: hashtag-ish, not a header.
        assert_eq!(classify("#tag"), LineKind::Plain);
    }

    #[test]
    fn checkbox_outranks_bullet() {
        assert_eq!(
            classify("- [ ] task"),
            LineKind::Checkbox {
                indent: 0,
                checked: false
            }
        );
        assert_eq!(
            classify("  - [x] done"),
            LineKind::Checkbox {
                indent: 2,
                checked: true
            }
        );
        assert_eq!(
            classify("[ ] bare"),
            LineKind::Checkbox {
                indent: 0,
                checked: false
            }
        );
    }

    #[test]
    fn bullets_and_ordered() {
        assert_eq!(
            classify("* item"),
            LineKind::Bullet {
                indent: 0,
                marker: '*'
            }
        );
        assert_eq!(
            classify("   + item"),
            LineKind::Bullet {
                indent: 3,
                marker: '+'
            }
        );
        assert_eq!(
            classify("12. item"),
            LineKind::Ordered {
                indent: 0,
                number: 12
            }
        );
    }

    #[test]
    fn table_detection_is_last_structural() {
        assert_eq!(classify("| a | b |"), LineKind::TableRow);
        // A pipe inside a bullet stays a bullet.
        assert_eq!(
            classify("- a | b"),
            LineKind::Bullet {
                indent: 0,
                marker: '-'
            }
        );
        // Escaped pipes do not make a table row.
        assert_eq!(classify(r"a \| b"), LineKind::Plain);
    }

    #[test]
    fn rule_and_blockquote() {
        assert_eq!(classify("---"), LineKind::Rule);
        assert_eq!(classify("-----   "), LineKind::Rule);
        assert_eq!(classify("--"), LineKind::Plain);
        assert_eq!(classify("> quoted"), LineKind::Blockquote);
    }

    #[test]
    fn whitespace_only_is_plain() {
        assert_eq!(classify(""), LineKind::Plain);
        assert_eq!(classify("   "), LineKind::Plain);
    }

    #[test]
    fn classify_is_total_on_odd_input() {
        // Control bytes and invalid-markdown fragments must never panic.
        for line in ["\u{0}\u{1}\u{2}", "[broken](", "**", "`", "\t\t|"] {
            let a = classify(line);
            let b = classify(line);
            assert_eq!(a, b, "classification must be deterministic");
        }
    }

    #[test]
    fn marker_split_covers_prefix() {
        let s = marker_split("- [ ] task").unwrap();
        assert_eq!(s.indent, 0);
        assert_eq!(s.prefix, "- [ ] ".len());
        let s = marker_split("  3. abc").unwrap();
        assert_eq!(s.indent, 2);
        assert_eq!(s.prefix, "  3. ".len());
        assert!(marker_split("plain text").is_none());
    }

    #[test]
    fn unescaped_pipe_offsets() {
        assert_eq!(unescaped_pipes("| a | b |"), vec![0, 4, 8]);
        assert_eq!(unescaped_pipes(r"a \| b | c"), vec![7]);
    }
}
