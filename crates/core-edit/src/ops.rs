//! The non-table mutation operations.
//!
//! Each returns `Some(Edit)` when its precondition holds, `None` otherwise.
//! Offsets are byte offsets into the current buffer; resulting selections
//! index the post-splice buffer.

use crate::{Edit, Selection};
use core_line::{classify, line_bounds, marker_split, LineKind};

/// List/checkbox continuation on Enter.
///
/// On a list or checkbox line with content, splits at the caret and opens the
/// next line with the same marker (ordered numbers increment, checkboxes
/// continue unchecked). On a marker-only line the marker is removed instead,
/// which is how a trailing empty item exits list mode. Any other line kind
/// returns `None` and the keystroke inserts a plain newline.
pub fn continue_on_enter(text: &str, caret: usize) -> Option<Edit> {
    let caret = caret.min(text.len());
    let (line_start, line_end) = line_bounds(text, caret);
    let line = &text[line_start..line_end];
    let kind = classify(line);

    let split = match kind {
        LineKind::Bullet { .. } | LineKind::Ordered { .. } | LineKind::Checkbox { .. } => {
            marker_split(line)?
        }
        _ => return None,
    };

    if line[split.prefix..].trim().is_empty() {
        // Empty item: drop the marker but keep the indent, caret at the end
        // of the indent. The leftover whitespace line reads as plain text.
        let cut = line_start + split.indent;
        return Some(Edit {
            start: cut,
            end: line_end,
            replacement: String::new(),
            selection: Selection::caret(cut),
        });
    }

    let marker = match kind {
        LineKind::Ordered { indent, number } => {
            format!("{}{}. ", &line[..indent], number.saturating_add(1))
        }
        LineKind::Checkbox { .. } => {
            // Same prefix shape, always unchecked.
            let mut prefix = line[..split.prefix].to_string();
            if let Some(open) = prefix.find('[') {
                prefix.replace_range(open + 1..open + 2, " ");
            }
            prefix
        }
        _ => line[..split.prefix].to_string(),
    };

    let replacement = format!("\n{marker}");
    let new_caret = caret + replacement.len();
    Some(Edit {
        start: caret,
        end: caret,
        replacement,
        selection: Selection::caret(new_caret),
    })
}

/// Surround the selection with `prefix`/`suffix`.
///
/// A collapsed selection becomes a caret sitting between the delimiters,
/// ready to type into. A non-empty selection stays selected together with its
/// new delimiters.
pub fn wrap_selection(text: &str, selection: Selection, prefix: &str, suffix: &str) -> Edit {
    let start = selection.start.min(text.len());
    let end = selection.end.min(text.len());
    let selected = &text[start..end];
    let replacement = format!("{prefix}{selected}{suffix}");

    let selection = if start == end {
        Selection::caret(start + prefix.len())
    } else {
        Selection::new(start, start + replacement.len())
    };
    Edit {
        start,
        end,
        replacement,
        selection,
    }
}

/// Marker auto-format on Space.
///
/// A line that is exactly `-` or `[ ]` with the caret at its end turns into
/// the marker plus one trailing space, consuming the keystroke. Anything else
/// returns `None` and the space is inserted literally.
pub fn auto_format_on_space(text: &str, caret: usize) -> Option<Edit> {
    let caret = caret.min(text.len());
    let (line_start, line_end) = line_bounds(text, caret);
    if caret != line_end {
        return None;
    }
    let line = &text[line_start..line_end];
    let formatted = match line {
        "-" => "- ",
        "[ ]" => "[ ] ",
        _ => return None,
    };
    Some(Edit {
        start: line_start,
        end: line_end,
        replacement: formatted.to_string(),
        selection: Selection::caret(line_start + formatted.len()),
    })
}
