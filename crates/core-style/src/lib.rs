//! Column-preserving Markdown styling engine.
//!
//! The editing surface overlays a styled rendering on top of a plain-text
//! input layer, so the styled output must stay character-for-character aligned
//! with the source: syntax markers are tagged (dimmed) rather than removed.
//! The concrete invariant is that the spans of a [`StyledLine`] tile its
//! source line exactly — every byte of the line belongs to exactly one span,
//! in order — which is what keeps a caret at plain-text offset N pointing at
//! the N-th visible character.
//!
//! Rendering is line-independent by design: no span ever depends on a
//! neighboring line. That trades true block-level table styling for O(1)
//! per-line re-render and cursor stability.

use core_line::{classify, unescaped_pipes, LineKind};
use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;

mod claims;
pub mod preview;

use claims::Claims;
pub use preview::plain_preview;

/// Visual role of one span. Delimiters and markers are the original syntax
/// characters, kept in the output and rendered dimmed by the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanStyle {
    /// Unstyled source text.
    Text,
    /// Inline syntax characters (`**`, `*`, backticks, link brackets + url).
    Delimiter,
    /// Structural prefix or table pipes (`# `, `- [ ] `, `> `, `|`, rules).
    Marker,
    Bold,
    Italic,
    Code,
    /// Link display text; `url` is the activation target.
    Link { url: String },
    /// A `#tag` occurrence; `tag` excludes the hash.
    Hashtag { tag: String },
}

/// What a modified click (Ctrl/Cmd+Click) on a span should do. A plain click
/// must never activate anything — it is an ordinary caret placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    OpenUrl(String),
    FilterTag(String),
}

impl SpanStyle {
    pub fn activation(&self) -> Option<Activation> {
        match self {
            SpanStyle::Link { url } => Some(Activation::OpenUrl(url.clone())),
            SpanStyle::Hashtag { tag } => Some(Activation::FilterTag(tag.clone())),
            _ => None,
        }
    }
}

/// Half-open byte range of the source line plus its style. Non-owning: ranges
/// index into the line the span was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub style: SpanStyle,
}

impl Span {
    fn new(start: usize, end: usize, style: SpanStyle) -> Self {
        Self { start, end, style }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One styled line: recomputed kind plus spans tiling the source exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub kind: LineKind,
    pub spans: Vec<Span>,
}

impl StyledLine {
    /// Span containing byte `offset`, if any (used by click handling to find
    /// an activation target under the pointer).
    pub fn span_at(&self, offset: usize) -> Option<&Span> {
        self.spans
            .iter()
            .find(|s| s.start <= offset && offset < s.end)
    }
}

/// Styled rendering of a whole document, one entry per source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledDocument {
    pub lines: Vec<StyledLine>,
}

fn link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern"))
}

fn hashtag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#\w+").expect("hashtag pattern"))
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

/// Rewrite one line into styled spans. Total: malformed constructs simply do
/// not match and remain [`SpanStyle::Text`]; nothing here can fail.
///
/// Inline pattern order matters because constructs can collide: links first,
/// then hashtags (a `#` inside an already-claimed link stays part of the
/// link), bold before italic (the claimed `**` bytes are what keeps the
/// italic pass off bold delimiters — the regex engine has no lookaround),
/// then inline code.
pub fn transform(line: &str) -> StyledLine {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let kind = classify(line);
    let mut claims = Claims::new(line.len());
    let mut spans: Vec<Span> = Vec::new();

    claim_structural(line, &kind, &mut claims, &mut spans);

    // (1) Links: [text](url)
    scan(line, link_re(), &mut claims, false, |c, claims, _| {
        let whole = c.get(0).expect("whole match");
        claims.claim(whole.start(), whole.end());
        let text = c.get(1).expect("link text");
        let url = c.get(2).expect("link url");
        spans.push(Span::new(whole.start(), text.start(), SpanStyle::Delimiter));
        spans.push(Span::new(
            text.start(),
            text.end(),
            SpanStyle::Link {
                url: url.as_str().to_string(),
            },
        ));
        spans.push(Span::new(text.end(), whole.end(), SpanStyle::Delimiter));
    });

    // (2) Hashtags: #word (skipped when the bytes already belong to a link).
    scan(line, hashtag_re(), &mut claims, false, |c, claims, line| {
        let m = c.get(0).expect("whole match");
        claims.claim(m.start(), m.end());
        spans.push(Span::new(
            m.start(),
            m.end(),
            SpanStyle::Hashtag {
                tag: line[m.start() + 1..m.end()].to_string(),
            },
        ));
    });

    // (3) Bold: **text**
    scan(line, bold_re(), &mut claims, false, |c, claims, _| {
        emit_delimited(c, SpanStyle::Bold, claims, &mut spans);
    });

    // (4) Italic: *text*, not adjacent to another '*' (that would be a bold
    // remnant) and not overlapping claimed bold bytes.
    scan(line, italic_re(), &mut claims, true, |c, claims, _| {
        emit_delimited(c, SpanStyle::Italic, claims, &mut spans);
    });

    // (5) Inline code: `text`
    scan(line, code_re(), &mut claims, false, |c, claims, _| {
        emit_delimited(c, SpanStyle::Code, claims, &mut spans);
    });

    // Fill the gaps with plain text spans and order everything by position.
    for (start, end) in claims.free_ranges() {
        spans.push(Span::new(start, end, SpanStyle::Text));
    }
    spans.sort_by_key(|s| s.start);
    spans.retain(|s| !s.is_empty());

    debug_assert_eq!(
        spans.iter().map(Span::len).sum::<usize>(),
        line.len(),
        "spans must tile the source line"
    );

    StyledLine { kind, spans }
}

/// Walk one pattern over the line, handing accepted matches to `emit` (which
/// must claim what it styles). A candidate is rejected when it overlaps
/// already-claimed bytes or, with `star_guard`, when it abuts another `*`.
/// Rejection only invalidates the candidate's own opener, so the search
/// resumes one byte past it: a real match may still start inside the
/// rejected span (e.g. an italic whose opener sits right after a bold).
fn scan<F>(line: &str, re: &Regex, claims: &mut Claims, star_guard: bool, mut emit: F)
where
    F: FnMut(&regex::Captures<'_>, &mut Claims, &str),
{
    let mut search_from = 0;
    while let Some(c) = re.captures_at(line, search_from) {
        let whole = c.get(0).expect("whole match");
        let adjacent_star = star_guard
            && ((whole.start() > 0 && line.as_bytes()[whole.start() - 1] == b'*')
                || (whole.end() < line.len() && line.as_bytes()[whole.end()] == b'*'));
        if !claims.is_free(whole.start(), whole.end()) || adjacent_star {
            search_from = whole.start() + 1;
            continue;
        }
        emit(&c, claims, line);
        search_from = whole.end();
    }
}

/// Claim and emit the delimiter/inner/delimiter triple of a `x(inner)x`
/// shaped match.
fn emit_delimited(
    c: &regex::Captures<'_>,
    style: SpanStyle,
    claims: &mut Claims,
    spans: &mut Vec<Span>,
) {
    let whole = c.get(0).expect("whole match");
    claims.claim(whole.start(), whole.end());
    let inner = c.get(1).expect("inner match");
    spans.push(Span::new(whole.start(), inner.start(), SpanStyle::Delimiter));
    spans.push(Span::new(inner.start(), inner.end(), style));
    spans.push(Span::new(inner.end(), whole.end(), SpanStyle::Delimiter));
}

/// Claim the structural bytes of a classified line up front so inline passes
/// cannot restyle them.
fn claim_structural(line: &str, kind: &LineKind, claims: &mut Claims, spans: &mut Vec<Span>) {
    match kind {
        LineKind::Header { .. }
        | LineKind::Bullet { .. }
        | LineKind::Ordered { .. }
        | LineKind::Checkbox { .. } => {
            if let Some(split) = core_line::marker_split(line) {
                claims.claim(0, split.prefix);
                spans.push(Span::new(0, split.prefix, SpanStyle::Marker));
            }
        }
        LineKind::Blockquote => {
            let prefix = "> ".len();
            claims.claim(0, prefix);
            spans.push(Span::new(0, prefix, SpanStyle::Marker));
        }
        LineKind::TableRow => {
            for p in unescaped_pipes(line) {
                claims.claim(p, p + 1);
                spans.push(Span::new(p, p + 1, SpanStyle::Marker));
            }
        }
        LineKind::Rule => {
            claims.claim(0, line.len());
            spans.push(Span::new(0, line.len(), SpanStyle::Marker));
        }
        LineKind::Plain => {}
    }
}

/// Render a whole document. Pure: equal input yields equal output, each line
/// styled independently of its neighbors, empty input yields empty output.
pub fn render(document: &str) -> StyledDocument {
    if document.is_empty() {
        return StyledDocument { lines: Vec::new() };
    }
    let lines: Vec<StyledLine> = document.split('\n').map(transform).collect();
    trace!(target: "style.render", lines = lines.len(), bytes = document.len(), "render");
    StyledDocument { lines }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styles(line: &str) -> Vec<(String, SpanStyle)> {
        transform(line)
            .spans
            .iter()
            .map(|s| (line[s.start..s.end].to_string(), s.style.clone()))
            .collect()
    }

    fn tiling_holds(line: &str) -> bool {
        let styled = transform(line);
        let mut cursor = 0;
        for s in &styled.spans {
            if s.start != cursor {
                return false;
            }
            cursor = s.end;
        }
        cursor == line.len()
    }

    #[test]
    fn bold_keeps_delimiters_as_spans() {
        let got = styles("**hi**");
        assert_eq!(
            got,
            vec![
                ("**".into(), SpanStyle::Delimiter),
                ("hi".into(), SpanStyle::Bold),
                ("**".into(), SpanStyle::Delimiter),
            ]
        );
    }

    #[test]
    fn italic_does_not_eat_bold_delimiters() {
        let got = styles("**b** and *i*");
        assert!(got.contains(&("b".into(), SpanStyle::Bold)));
        assert!(got.contains(&("i".into(), SpanStyle::Italic)));
        // The bold `**` must not have been re-matched as italic.
        assert!(!got.iter().any(|(t, s)| t == "*" && *s == SpanStyle::Italic));
    }

    #[test]
    fn italic_opening_inside_a_rejected_candidate_still_styles() {
        // The first italic candidate here spans from the bold's trailing
        // star to the real opener; rejecting it must not swallow `*i*`.
        let styled = transform("**b** and *i*");
        let italic = styled
            .spans
            .iter()
            .find(|s| s.style == SpanStyle::Italic)
            .expect("italic span");
        assert_eq!((italic.start, italic.end), (11, 12));
    }

    #[test]
    fn link_splits_into_bracket_text_url() {
        let got = styles("see [docs](https://example.com) now");
        assert_eq!(
            got,
            vec![
                ("see ".into(), SpanStyle::Text),
                ("[".into(), SpanStyle::Delimiter),
                (
                    "docs".into(),
                    SpanStyle::Link {
                        url: "https://example.com".into()
                    }
                ),
                ("](https://example.com)".into(), SpanStyle::Delimiter),
                (" now".into(), SpanStyle::Text),
            ]
        );
    }

    #[test]
    fn hashtag_inside_link_stays_link() {
        let got = styles("[#123](https://issues/123)");
        assert!(!got
            .iter()
            .any(|(_, s)| matches!(s, SpanStyle::Hashtag { .. })));
    }

    #[test]
    fn hashtag_standalone() {
        let got = styles("tagged #work today");
        assert!(got.contains(&(
            "#work".into(),
            SpanStyle::Hashtag { tag: "work".into() }
        )));
    }

    #[test]
    fn malformed_constructs_degrade_to_text() {
        for line in ["[broken](", "**unterminated", "`open", "*"] {
            let styled = transform(line);
            assert!(tiling_holds(line));
            assert!(styled
                .spans
                .iter()
                .all(|s| matches!(s.style, SpanStyle::Text)));
        }
    }

    #[test]
    fn header_prefix_is_marker() {
        let got = styles("## Title");
        assert_eq!(got[0], ("## ".into(), SpanStyle::Marker));
        assert_eq!(got[1], ("Title".into(), SpanStyle::Text));
    }

    #[test]
    fn checkbox_prefix_is_single_marker() {
        let got = styles("- [ ] buy milk");
        assert_eq!(got[0], ("- [ ] ".into(), SpanStyle::Marker));
    }

    #[test]
    fn table_row_pipes_are_markers_and_cells_style_inline() {
        let got = styles("| **a** | b |");
        let pipes = got
            .iter()
            .filter(|(t, s)| t == "|" && *s == SpanStyle::Marker)
            .count();
        assert_eq!(pipes, 3);
        assert!(got.contains(&("a".into(), SpanStyle::Bold)));
    }

    #[test]
    fn escaped_pipe_is_not_a_marker() {
        let got = styles(r"a \| b");
        assert!(!got.iter().any(|(_, s)| *s == SpanStyle::Marker));
    }

    #[test]
    fn rule_is_one_marker_span() {
        let got = styles("-----");
        assert_eq!(got, vec![("-----".into(), SpanStyle::Marker)]);
    }

    #[test]
    fn spans_tile_source_for_arbitrary_input() {
        let cases = [
            "",
            "plain",
            "# h1 with **bold** and *it* and `c` and [l](u) and #t",
            "| a | **b** | [x](y) |",
            "\u{0}\u{1}control\u{7f}",
            "**[link](url)** mixed `code` *i*",
            "> quoted **deep**",
            "🦀 unicode **🎉** text",
        ];
        for line in cases {
            assert!(tiling_holds(line), "tiling failed for {line:?}");
        }
    }

    #[test]
    fn transform_is_deterministic_and_idempotent_over_source() {
        let line = "- [x] done **now** #tag";
        assert_eq!(transform(line), transform(line));
    }

    #[test]
    fn activation_only_on_links_and_hashtags() {
        let styled = transform("[a](b) #t plain");
        let activations: Vec<_> = styled
            .spans
            .iter()
            .filter_map(|s| s.style.activation())
            .collect();
        assert_eq!(
            activations,
            vec![
                Activation::OpenUrl("b".into()),
                Activation::FilterTag("t".into())
            ]
        );
    }

    #[test]
    fn render_is_pure_and_handles_empty() {
        assert!(render("").lines.is_empty());
        let doc = "# Title\n- [ ] task\n";
        assert_eq!(render(doc), render(doc));
        // Trailing newline yields a final empty line, mirroring split('\n').
        assert_eq!(render(doc).lines.len(), 3);
    }

    #[test]
    fn span_at_finds_covering_span() {
        let styled = transform("ab **c**");
        let span = styled.span_at(4).expect("span under offset");
        assert_eq!(span.style, SpanStyle::Delimiter);
        assert!(styled.span_at(100).is_none());
    }
}
