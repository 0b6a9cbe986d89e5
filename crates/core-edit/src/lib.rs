//! Caret-preserving mutation operations and their command dispatch.
//!
//! Every operation is a pure function over `(text, selection)` returning an
//! [`Edit`] splice, or `None` when its precondition does not hold. A `None` is
//! a silent no-op: the caller falls back to the keystroke's default behavior
//! (insert the newline, insert the space, move focus). Nothing in here
//! performs I/O; persistence happens after the edit is applied, on the
//! caller's side.

use tracing::debug;

pub mod keys;
pub mod ops;

pub use core_table::{Axis, Direction};
pub use keys::{KeyCode, KeyPress, Modifiers};

/// A caret or a normalized text selection (`start <= end`, byte offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Collapsed selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }
}

/// A single splice of the plain-text buffer: replace `start..end` with
/// `replacement`, then select `selection` (offsets into the spliced buffer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    pub selection: Selection,
}

impl Edit {
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(
            text.len() - (self.end - self.start) + self.replacement.len(),
        );
        out.push_str(&text[..self.start]);
        out.push_str(&self.replacement);
        out.push_str(&text[self.end..]);
        out
    }
}

impl From<core_table::BlockEdit> for Edit {
    fn from(b: core_table::BlockEdit) -> Self {
        Self {
            start: b.start,
            end: b.end,
            replacement: b.replacement,
            selection: Selection::caret(b.caret),
        }
    }
}

/// The tagged union of editing inputs the mutation layer accepts. Keyboard
/// adapters translate raw key events into these via [`keys::translate`];
/// tests and non-UI callers construct them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Enter: list/checkbox continuation.
    Enter,
    /// Space: marker auto-format trigger.
    Space,
    /// Tab or Shift+Tab: table cell navigation.
    Tab { shift: bool },
    /// Surround the selection with a delimiter pair.
    Wrap { prefix: String, suffix: String },
    /// Swap the caret's row or column with its neighbor.
    TableMove { axis: Axis, direction: Direction },
    /// Insert a blank row below or a blank column after the caret.
    TableInsert { axis: Axis },
    /// Delete the caret's row or column.
    TableDelete { axis: Axis },
}

/// Route one command to its operation. `None` means the precondition failed
/// and the keystroke should fall through to its default behavior.
pub fn dispatch(text: &str, selection: Selection, command: &Command) -> Option<Edit> {
    let edit = match command {
        Command::Enter => ops::continue_on_enter(text, selection.end),
        Command::Space => ops::auto_format_on_space(text, selection.end),
        Command::Wrap { prefix, suffix } => Some(ops::wrap_selection(text, selection, prefix, suffix)),
        Command::Tab { shift } => {
            let grid = core_table::TableGrid::locate(text, selection.end)?;
            if *shift {
                grid.tab_prev().map(Edit::from)
            } else {
                Some(grid.tab_next().into())
            }
        }
        Command::TableMove { axis, direction } => {
            let grid = core_table::TableGrid::locate(text, selection.end)?;
            match axis {
                Axis::Row => grid.move_row(*direction).map(Edit::from),
                Axis::Column => grid.move_column(*direction).map(Edit::from),
            }
        }
        Command::TableInsert { axis } => {
            let grid = core_table::TableGrid::locate(text, selection.end)?;
            match axis {
                Axis::Row => Some(grid.insert_row().into()),
                Axis::Column => Some(grid.insert_column().into()),
            }
        }
        Command::TableDelete { axis } => {
            let grid = core_table::TableGrid::locate(text, selection.end)?;
            match axis {
                Axis::Row => grid.delete_row().map(Edit::from),
                Axis::Column => grid.delete_column().map(Edit::from),
            }
        }
    };
    if edit.is_none() {
        debug!(target: "edit.dispatch", ?command, "precondition failed, no-op");
    }
    edit
}
