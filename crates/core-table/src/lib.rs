//! Transient rows-by-columns view over a contiguous run of pipe lines.
//!
//! A [`TableGrid`] is built on demand for exactly one navigation or structural
//! edit and then discarded. It is never cached across edits because any
//! intervening keystroke may have mutated the underlying lines.
//!
//! Every operation returns a [`BlockEdit`] describing a splice of the source
//! buffer plus the caret offset after the splice; pure caret moves are a
//! zero-length splice. Precondition failures (caret outside a cell, deleting
//! the only row or column, moving past an edge) return `None` and the caller
//! treats that as a silent no-op.

use core_line::{classify, line_bounds, unescaped_pipes, LineKind};
use tracing::debug;

/// Which dimension of the grid a structural command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

/// Forward is down for rows and right for columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// A splice of the plain-text buffer: replace `start..end` with `replacement`
/// and place the caret at `caret` (an offset into the post-splice buffer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEdit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
    pub caret: usize,
}

fn caret_move(pos: usize) -> BlockEdit {
    BlockEdit {
        start: pos,
        end: pos,
        replacement: String::new(),
        caret: pos,
    }
}

struct GridRow {
    /// Absolute byte offset of the line's first byte.
    start: usize,
    text: String,
    /// Unescaped pipe offsets relative to `start`.
    pipes: Vec<usize>,
}

/// Rows-by-columns view anchored at a caret position.
///
/// Column indexing follows pipe counting: the caret's column is the number of
/// unescaped pipes before it on its line, which doubles as the index of the
/// cell segment holding the caret. Segment 0 (before the first pipe) and the
/// segment after the trailing pipe are the table border, not cells.
pub struct TableGrid {
    /// Absolute range of the whole block, excluding the trailing newline.
    start: usize,
    end: usize,
    rows: Vec<GridRow>,
    caret_row: usize,
    /// Caret offset relative to the caret row's first byte.
    caret_rel: usize,
}

impl TableGrid {
    /// Build the grid for the contiguous pipe-line block around `caret`.
    /// Returns `None` when the caret line is not a table row.
    pub fn locate(text: &str, caret: usize) -> Option<Self> {
        let caret = caret.min(text.len());
        let (line_start, line_end) = line_bounds(text, caret);
        if classify(&text[line_start..line_end]) != LineKind::TableRow {
            return None;
        }

        let mut start = line_start;
        while start > 0 {
            let (prev_start, prev_end) = line_bounds(text, start - 1);
            if classify(&text[prev_start..prev_end]) != LineKind::TableRow {
                break;
            }
            start = prev_start;
        }
        let mut end = line_end;
        while end < text.len() {
            let (next_start, next_end) = line_bounds(text, end + 1);
            if next_start <= end || classify(&text[next_start..next_end]) != LineKind::TableRow {
                break;
            }
            end = next_end;
        }

        let mut rows = Vec::new();
        let mut caret_row = 0;
        let mut offset = start;
        for line in text[start..end].split('\n') {
            if offset == line_start {
                caret_row = rows.len();
            }
            rows.push(GridRow {
                start: offset,
                pipes: unescaped_pipes(line),
                text: line.to_string(),
            });
            offset += line.len() + 1;
        }
        debug!(target: "table.grid", rows = rows.len(), caret_row, "grid located");

        Some(Self {
            start,
            end,
            rows,
            caret_row,
            caret_rel: caret - line_start,
        })
    }

    fn caret_abs(&self) -> usize {
        self.rows[self.caret_row].start + self.caret_rel
    }

    /// The caret's column: unescaped pipes before it on its line.
    fn column(&self) -> usize {
        self.rows[self.caret_row]
            .pipes
            .iter()
            .filter(|&&p| p < self.caret_rel)
            .count()
    }

    fn block_edit(&self, lines: Vec<String>, caret_row: usize, caret_rel: usize) -> BlockEdit {
        let mut line_offset = 0;
        for line in &lines[..caret_row] {
            line_offset += line.len() + 1;
        }
        let caret_rel = caret_rel.min(lines[caret_row].len());
        BlockEdit {
            start: self.start,
            end: self.end,
            caret: self.start + line_offset + caret_rel,
            replacement: lines.join("\n"),
        }
    }

    fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.text.clone()).collect()
    }

    /// Move the caret to the start of the next cell, skipping the cell's
    /// leading padding. Past the last cell of the last row a fresh blank row
    /// is appended instead.
    pub fn tab_next(&self) -> BlockEdit {
        let caret_abs = self.caret_abs();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for &p in &row.pipes {
                if row.start + p < caret_abs {
                    continue;
                }
                match cell_entry(&row.text, p) {
                    Some(rel) => return caret_move(row.start + rel),
                    // Trailing border pipe: the next candidate is the first
                    // pipe of the next row, if there is one.
                    None if row_idx == self.rows.len() - 1 => return self.insert_row(),
                    None => {}
                }
            }
        }
        self.insert_row()
    }

    /// Move the caret to the start of the previous cell. `None` when already
    /// in the first cell of the first row.
    pub fn tab_prev(&self) -> Option<BlockEdit> {
        let caret_abs = self.caret_abs();
        let mut before: Vec<(usize, usize)> = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            for &p in &row.pipes {
                if row.start + p < caret_abs {
                    before.push((row_idx, p));
                }
            }
        }
        // The nearest preceding pipe opens the caret's own cell.
        before.pop()?;
        while let Some((row_idx, p)) = before.pop() {
            let row = &self.rows[row_idx];
            if let Some(rel) = cell_entry(&row.text, p) {
                return Some(caret_move(row.start + rel));
            }
        }
        None
    }

    /// Append a blank row (same pipe structure as the caret row) below the
    /// caret row, caret one space into its first cell.
    pub fn insert_row(&self) -> BlockEdit {
        let template = &self.rows[self.caret_row];
        let blank = blank_row(&template.text);
        let first_pipe = unescaped_pipes(&blank).first().copied().unwrap_or(0);
        let caret_rel = (first_pipe + 2).min(blank.len());

        let mut lines = self.lines();
        lines.insert(self.caret_row + 1, blank);
        self.block_edit(lines, self.caret_row + 1, caret_rel)
    }

    /// Delete the caret row; caret lands at the start of the line that takes
    /// its place. Deleting the only row is a no-op.
    pub fn delete_row(&self) -> Option<BlockEdit> {
        if self.rows.len() == 1 {
            return None;
        }
        let mut lines = self.lines();
        lines.remove(self.caret_row);
        let caret_row = self.caret_row.min(lines.len() - 1);
        Some(self.block_edit(lines, caret_row, 0))
    }

    /// Swap the caret row with its neighbor; the caret keeps its line-relative
    /// offset and travels with the row. Moving past either edge is a no-op.
    pub fn move_row(&self, direction: Direction) -> Option<BlockEdit> {
        let target = match direction {
            Direction::Backward => self.caret_row.checked_sub(1)?,
            Direction::Forward => self.caret_row + 1,
        };
        if target >= self.rows.len() {
            return None;
        }
        let mut lines = self.lines();
        lines.swap(self.caret_row, target);
        Some(self.block_edit(lines, target, self.caret_rel))
    }

    /// Insert a blank cell after the caret's column in every row, caret one
    /// space into the new cell.
    pub fn insert_column(&self) -> BlockEdit {
        let at = self.column() + 1;
        let mut lines = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut cells = split_cells(&row.text);
            let at = at.clamp(1, cells.len() - 1);
            cells.insert(at, "  ".to_string());
            lines.push(cells.join("|"));
        }
        let cells = split_cells(&lines[self.caret_row]);
        let at = at.clamp(1, cells.len().saturating_sub(2));
        let caret_rel = cell_offset(&cells, at) + 1;
        self.block_edit(lines, self.caret_row, caret_rel)
    }

    /// Delete the caret's column from every row. Refused when the caret is on
    /// the border or when any row would be left without a cell.
    pub fn delete_column(&self) -> Option<BlockEdit> {
        let col = self.column();
        if col == 0 {
            return None;
        }
        let caret_cells = split_cells(&self.rows[self.caret_row].text);
        if col >= caret_cells.len() - 1 {
            return None;
        }
        // A bordered single-cell row has exactly two pipes; deleting its
        // column would leave a bare `||` or worse.
        if self.rows.iter().any(|r| r.pipes.len() <= 2) {
            return None;
        }

        let mut lines = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut cells = split_cells(&row.text);
            if col <= cells.len() - 2 {
                cells.remove(col);
            }
            lines.push(cells.join("|"));
        }
        let cells = split_cells(&lines[self.caret_row]);
        let landing = col.min(cells.len().saturating_sub(2)).max(1);
        let caret_rel = cell_offset(&cells, landing) + 1;
        Some(self.block_edit(lines, self.caret_row, caret_rel))
    }

    /// Swap the caret's column with its neighbor in every row; the caret keeps
    /// its offset within the moved cell. Border columns and edge moves no-op.
    pub fn move_column(&self, direction: Direction) -> Option<BlockEdit> {
        let col = self.column();
        let caret_cells = split_cells(&self.rows[self.caret_row].text);
        if col == 0 || col >= caret_cells.len() - 1 {
            return None;
        }
        let target = match direction {
            Direction::Backward => col.checked_sub(1)?,
            Direction::Forward => col + 1,
        };
        if target == 0 || target >= caret_cells.len() - 1 {
            return None;
        }
        let offset_in_cell = self.caret_rel - cell_offset(&caret_cells, col);

        let mut lines = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut cells = split_cells(&row.text);
            let last_cell = cells.len().saturating_sub(2);
            if col >= 1 && col <= last_cell && target >= 1 && target <= last_cell {
                cells.swap(col, target);
            }
            lines.push(cells.join("|"));
        }
        let cells = split_cells(&lines[self.caret_row]);
        let caret_rel = cell_offset(&cells, target) + offset_in_cell.min(cells[target].len());
        Some(self.block_edit(lines, self.caret_row, caret_rel))
    }
}

/// Where the caret should land when entering the cell opened by the pipe at
/// `pipe` (relative offset): just past the pipe, past any space padding.
/// `None` when the pipe is a trailing border with nothing after it.
fn cell_entry(line: &str, pipe: usize) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut t = pipe + 1;
    while t < bytes.len() && bytes[t] == b' ' {
        t += 1;
    }
    if t >= bytes.len() {
        return None;
    }
    Some(t)
}

/// Split a row into segments between unescaped pipes. Segment 0 precedes the
/// first pipe; the last segment follows the trailing pipe. Joining the
/// segments back with `|` reproduces the row byte for byte.
fn split_cells(line: &str) -> Vec<String> {
    let pipes = unescaped_pipes(line);
    let mut cells = Vec::with_capacity(pipes.len() + 1);
    let mut prev = 0;
    for &p in &pipes {
        cells.push(line[prev..p].to_string());
        prev = p + 1;
    }
    cells.push(line[prev..].to_string());
    cells
}

/// Byte offset of segment `idx` within the rejoined row.
fn cell_offset(cells: &[String], idx: usize) -> usize {
    cells[..idx].iter().map(String::len).sum::<usize>() + idx
}

/// A row with the same pipe structure as `template` but blank cells. The
/// border segments (indent before the first pipe, trailer after the last) are
/// kept verbatim.
fn blank_row(template: &str) -> String {
    let cells = split_cells(template);
    let last = cells.len() - 1;
    let blanked: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 || i == last {
                c.clone()
            } else {
                "  ".to_string()
            }
        })
        .collect();
    blanked.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(text: &str, edit: &BlockEdit) -> String {
        let mut out = text.to_string();
        out.replace_range(edit.start..edit.end, &edit.replacement);
        out
    }

    #[test]
    fn locate_requires_a_table_line() {
        assert!(TableGrid::locate("plain text", 3).is_none());
        assert!(TableGrid::locate("| a |", 2).is_some());
    }

    #[test]
    fn locate_spans_the_contiguous_block_only() {
        let text = "intro\n| a |\n| b |\noutro";
        let grid = TableGrid::locate(text, 8).unwrap();
        assert_eq!(grid.start, 6);
        assert_eq!(grid.end, 17);
        assert_eq!(grid.rows.len(), 2);
    }

    #[test]
    fn tab_next_lands_on_next_cell_content() {
        let text = "| a | b |";
        let grid = TableGrid::locate(text, 2).unwrap();
        let edit = grid.tab_next();
        assert_eq!(edit.caret, 6);
        assert_eq!(apply(text, &edit), text);
    }

    #[test]
    fn tab_next_crosses_rows() {
        let text = "| a | b |\n| c | d |";
        let grid = TableGrid::locate(text, 6).unwrap();
        let edit = grid.tab_next();
        // Lands on "c" in the second row.
        assert_eq!(edit.caret, 12);
    }

    #[test]
    fn tab_next_past_last_cell_appends_a_row() {
        let text = "| a | b |";
        let grid = TableGrid::locate(text, 6).unwrap();
        let edit = grid.tab_next();
        assert_eq!(apply(text, &edit), "| a | b |\n|  |  |");
        // Caret one space into the new first cell.
        assert_eq!(edit.caret, 12);
    }

    #[test]
    fn tab_prev_moves_back_and_stops_at_first_cell() {
        let text = "| a | b |";
        let grid = TableGrid::locate(text, 6).unwrap();
        let edit = grid.tab_prev().unwrap();
        assert_eq!(edit.caret, 2);

        let grid = TableGrid::locate(text, 2).unwrap();
        assert!(grid.tab_prev().is_none());
    }

    #[test]
    fn tab_prev_crosses_rows_to_last_cell() {
        let text = "| a | b |\n| c | d |";
        let grid = TableGrid::locate(text, 12).unwrap();
        let edit = grid.tab_prev().unwrap();
        // Lands on "b" in the first row.
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn insert_row_copies_pipe_structure() {
        let text = "| one | two |";
        let grid = TableGrid::locate(text, 3).unwrap();
        let edit = grid.insert_row();
        assert_eq!(apply(text, &edit), "| one | two |\n|  |  |");
        assert_eq!(edit.caret, 16);
    }

    #[test]
    fn delete_row_refuses_on_only_row() {
        let grid = TableGrid::locate("| a | b |", 2).unwrap();
        assert!(grid.delete_row().is_none());
    }

    #[test]
    fn delete_row_lands_on_replacement_line() {
        let text = "| a |\n| b |\n| c |";
        let grid = TableGrid::locate(text, 8).unwrap();
        let edit = grid.delete_row().unwrap();
        assert_eq!(apply(text, &edit), "| a |\n| c |");
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn delete_last_row_lands_on_new_last_line() {
        let text = "| a |\n| b |";
        let grid = TableGrid::locate(text, 8).unwrap();
        let edit = grid.delete_row().unwrap();
        assert_eq!(apply(text, &edit), "| a |");
        assert_eq!(edit.caret, 0);
    }

    #[test]
    fn move_row_swaps_lines_and_keeps_relative_caret() {
        let text = "| a |\n| b |";
        let grid = TableGrid::locate(text, 8).unwrap(); // "b", rel offset 2
        let edit = grid.move_row(Direction::Backward).unwrap();
        assert_eq!(apply(text, &edit), "| b |\n| a |");
        assert_eq!(edit.caret, 2);
    }

    #[test]
    fn move_row_at_edge_is_noop() {
        let text = "| a |\n| b |";
        let grid = TableGrid::locate(text, 2).unwrap();
        assert!(grid.move_row(Direction::Backward).is_none());
        let grid = TableGrid::locate(text, 8).unwrap();
        assert!(grid.move_row(Direction::Forward).is_none());
    }

    #[test]
    fn insert_column_adds_a_cell_to_every_row() {
        let text = "| a | b |\n| c | d |";
        let grid = TableGrid::locate(text, 2).unwrap();
        let edit = grid.insert_column();
        assert_eq!(apply(text, &edit), "| a |  | b |\n| c |  | d |");
        // One space into the new cell, just past its opening pipe.
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn delete_column_removes_caret_cell_everywhere() {
        let text = "| a | b |\n| c | d |";
        let grid = TableGrid::locate(text, 2).unwrap();
        let edit = grid.delete_column().unwrap();
        assert_eq!(apply(text, &edit), "| b |\n| d |");
        assert_eq!(edit.caret, 2);
    }

    #[test]
    fn delete_column_refuses_last_column() {
        let grid = TableGrid::locate("| a |\n| b |", 2).unwrap();
        assert!(grid.delete_column().is_none());
    }

    #[test]
    fn delete_column_refuses_on_border() {
        let grid = TableGrid::locate("| a | b |", 0).unwrap();
        assert!(grid.delete_column().is_none());
    }

    #[test]
    fn move_column_swaps_cells_and_carries_caret() {
        let text = "| a | b |";
        let grid = TableGrid::locate(text, 2).unwrap(); // inside "a"
        let edit = grid.move_column(Direction::Forward).unwrap();
        assert_eq!(apply(text, &edit), "| b | a |");
        // Caret keeps its one-byte offset inside the moved "a" cell.
        assert_eq!(edit.caret, 6);
    }

    #[test]
    fn move_column_at_edge_is_noop() {
        let text = "| a | b |";
        let grid = TableGrid::locate(text, 2).unwrap();
        assert!(grid.move_column(Direction::Backward).is_none());
        let grid = TableGrid::locate(text, 6).unwrap();
        assert!(grid.move_column(Direction::Forward).is_none());
    }
}
