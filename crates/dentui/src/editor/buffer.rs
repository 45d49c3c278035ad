//! The entry-line cell grid.
//!
//! Cells are stored row-major in a flat vector. A blank cell (`' '`) both
//! separates words and marks unused space, so text flows from the end of
//! one row straight into the start of the next.

pub const BLANK: char = ' ';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditBuffer {
    cells: Vec<char>,
    rows: usize,
    cols: usize,
    row: usize,
    col: usize,
}

impl EditBuffer {
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            cells: vec![BLANK; rows * cols],
            rows,
            cols,
            row: 0,
            col: 0,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn cell(&self, row: usize, col: usize) -> char {
        self.cells
            .get(self.index(row, col))
            .copied()
            .unwrap_or(BLANK)
    }

    pub fn row_text(&self, row: usize) -> String {
        let start = self.index(row.min(self.maxrow()), 0);
        self.cells[start..start + self.cols].iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == BLANK)
    }

    fn maxrow(&self) -> usize {
        self.rows - 1
    }

    fn maxcol(&self) -> usize {
        self.cols - 1
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn cursor_index(&self) -> usize {
        self.index(self.row, self.col)
    }

    fn set_cursor_index(&mut self, index: usize) {
        let index = index.min(self.cells.len() - 1);
        self.row = index / self.cols;
        self.col = index % self.cols;
    }

    pub fn move_to(&mut self, row: usize, col: usize) {
        self.row = row.min(self.maxrow());
        self.col = col.min(self.maxcol());
    }

    /// True when inserting would push text off the end of the last row.
    fn would_overflow(&self) -> bool {
        self.cell(self.maxrow(), self.maxcol()) != BLANK
    }

    fn has_text_after(&self, row: usize) -> bool {
        let start = self.index(row + 1, 0).min(self.cells.len());
        self.cells[start..].iter().any(|&c| c != BLANK)
    }

    /// Shift the row right from `col`. The last cell moves to the start of
    /// the next row whenever it is text, or a blank that later text depends on.
    fn insert_cell(&mut self, row: usize, col: usize, ch: char) {
        let last = self.cell(row, self.maxcol());
        if row < self.maxrow() && (last != BLANK || self.has_text_after(row)) {
            self.insert_cell(row + 1, 0, last);
        }
        let start = self.index(row, col);
        let end = self.index(row, self.maxcol());
        self.cells.copy_within(start..end, start + 1);
        self.cells[start] = ch;
    }

    /// Insert at the cursor and advance it. Returns false (buffer
    /// untouched) when there is no room left.
    pub fn insert(&mut self, ch: char) -> bool {
        if self.would_overflow() {
            return false;
        }
        self.insert_cell(self.row, self.col, ch);
        if self.col < self.maxcol() {
            self.col += 1;
        } else if self.row < self.maxrow() {
            self.row += 1;
            self.col = 0;
        }
        true
    }

    pub fn insert_str(&mut self, text: &str) -> bool {
        text.chars().all(|ch| self.insert(ch))
    }

    /// Remove the cell under the cursor, pulling every later cell back one.
    pub fn delete(&mut self) {
        let start = self.cursor_index();
        self.cells.remove(start);
        self.cells.push(BLANK);
    }

    pub fn backspace(&mut self) {
        if self.row == 0 && self.col == 0 {
            return;
        }
        self.move_left();
        self.delete();
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.maxcol();
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.maxcol() {
            self.col += 1;
        } else if self.row < self.maxrow() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        self.row = (self.row + 1).min(self.maxrow());
    }

    pub fn home(&mut self) {
        self.row = 0;
        self.col = 0;
    }

    /// Column just past the last non-blank cell of `row`, capped at maxcol.
    fn end_of_row(&self, row: usize) -> usize {
        let text = self.row_text(row);
        let used = text.trim_end_matches(BLANK).chars().count();
        used.min(self.maxcol())
    }

    /// Move to the end of the text: the last row before an empty one.
    pub fn end(&mut self) {
        for row in 0..self.rows {
            if row == self.maxrow() || self.end_of_row(row + 1) == 0 {
                self.move_to(row, self.end_of_row(row));
                return;
            }
        }
    }

    /// Delete back to the start of the cursor's row.
    pub fn delete_to_row_start(&mut self) {
        let count = self.col;
        self.col = 0;
        for _ in 0..count {
            self.delete();
        }
    }

    /// Delete blanks immediately before the cursor, then the word before
    /// them. Crosses row boundaries.
    pub fn delete_word_back(&mut self) {
        let mut index = self.cursor_index();
        let mut only_blanks = true;
        while index > 0 {
            index -= 1;
            if self.cells[index] != BLANK {
                only_blanks = false;
            } else if !only_blanks {
                self.set_cursor_index(index + 1);
                return;
            }
            self.set_cursor_index(index);
            self.delete();
        }
    }

    /// The non-blank run ending at the cursor.
    pub fn token_before_cursor(&self) -> String {
        let end = self.cursor_index();
        let start = self.cells[..end]
            .iter()
            .rposition(|&c| c == BLANK)
            .map_or(0, |pos| pos + 1);
        self.cells[start..end].iter().collect()
    }

    /// Remove `count` cells before the cursor and insert `replacement`.
    pub fn replace_before_cursor(&mut self, count: usize, replacement: &str) -> bool {
        let index = self.cursor_index().saturating_sub(count);
        self.set_cursor_index(index);
        for _ in 0..count {
            self.delete();
        }
        self.insert_str(replacement)
    }

    /// Words joined by single spaces.
    pub fn gather(&self) -> String {
        let text: String = self.cells.iter().collect();
        text.split(BLANK)
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Cells used: up to the last non-blank cell or the cursor, whichever
    /// is further.
    pub fn count(&self) -> usize {
        let content_end = self
            .cells
            .iter()
            .rposition(|&c| c != BLANK)
            .map_or(0, |pos| pos + 1);
        content_end.max(self.cursor_index())
    }

    pub fn clear(&mut self) {
        self.cells.fill(BLANK);
        self.home();
    }

    /// Rebuild with new dimensions, keeping the gathered text.
    pub fn reshape(&mut self, rows: usize, cols: usize) {
        let text = self.gather();
        *self = Self::new(rows, cols);
        self.insert_str(&text);
    }
}
