//! Offset arithmetic over a flat text buffer.
//!
//! Mutation operations receive the whole note as one `&str` plus a caret byte
//! offset; these helpers find the line around that offset without allocating.

use unicode_segmentation::UnicodeSegmentation;

/// Half-open byte range `[start, end)` of the line containing `offset`,
/// excluding the trailing newline. `offset` is clamped into the buffer; an
/// offset equal to `text.len()` addresses the final (possibly empty) line.
pub fn line_bounds(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    (start, end)
}

/// The line containing `offset` (no trailing newline).
pub fn line_at(text: &str, offset: usize) -> &str {
    let (start, end) = line_bounds(text, offset);
    &text[start..end]
}

/// Clamp an externally supplied offset onto the nearest grapheme boundary at
/// or before it. Offsets produced by the mutation operations are always on
/// boundaries already; this guards offsets arriving from UI adapters.
pub fn clamp_to_boundary(text: &str, offset: usize) -> usize {
    if offset >= text.len() {
        return text.len();
    }
    if text.is_char_boundary(offset) {
        // Char boundary is necessary but not sufficient; verify against
        // grapheme segmentation so combining sequences stay intact.
        let mut last = 0;
        for (idx, _) in text.grapheme_indices(true) {
            if idx == offset {
                return offset;
            }
            if idx > offset {
                break;
            }
            last = idx;
        }
        return last;
    }
    let mut last = 0;
    for (idx, _) in text.grapheme_indices(true) {
        if idx > offset {
            break;
        }
        last = idx;
    }
    last
}
