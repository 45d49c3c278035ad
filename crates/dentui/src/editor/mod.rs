//! Entry-line editor.
//!
//! `EditBuffer` is the cell grid; `LineEditor` applies decoded keys to it,
//! runs tab completion and reports progress through a callback so the
//! caller owns the status line.

mod buffer;
pub mod complete;

#[cfg(test)]
mod tests;

pub use buffer::EditBuffer;
pub use complete::{CompletionContext, CompletionMode, Source};

use crate::input::Key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Count(usize),
    Candidates(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Submit(String),
    Abort,
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    buffer: EditBuffer,
    mode: CompletionMode,
}

impl LineEditor {
    pub fn new(rows: usize, cols: usize, mode: CompletionMode) -> Self {
        Self {
            buffer: EditBuffer::new(rows, cols),
            mode,
        }
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn set_mode(&mut self, mode: CompletionMode) {
        self.mode = mode;
    }

    /// Start a fresh edit, optionally seeded with text.
    pub fn start(&mut self, initial: &str) -> usize {
        self.buffer.clear();
        for ch in initial.chars() {
            self.buffer.insert(ch);
        }
        self.buffer.count()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows != self.buffer.rows() || cols != self.buffer.cols() {
            self.buffer.reshape(rows, cols);
        }
    }

    pub fn handle_key(
        &mut self,
        key: Key,
        ctx: &mut dyn CompletionContext,
        progress: &mut dyn FnMut(Progress),
    ) -> EditOutcome {
        match key {
            Key::Enter => {
                let text = self.buffer.gather();
                self.buffer.clear();
                return EditOutcome::Submit(text);
            }
            Key::Esc => {
                self.buffer.clear();
                return EditOutcome::Abort;
            }
            Key::Tab => {
                if let Some(candidates) = self.complete(ctx) {
                    progress(Progress::Candidates(candidates));
                    return EditOutcome::Continue;
                }
            }
            Key::Char(ch) => {
                self.buffer.insert(ch);
            }
            Key::Backspace => self.buffer.backspace(),
            Key::Delete | Key::Ctrl('d') => self.buffer.delete(),
            Key::Ctrl('u') => self.buffer.delete_to_row_start(),
            Key::Ctrl('w') => self.buffer.delete_word_back(),
            Key::Ctrl('a') | Key::Home => self.buffer.home(),
            Key::Ctrl('e') | Key::End => self.buffer.end(),
            Key::Left | Key::Ctrl('b') => self.buffer.move_left(),
            Key::Right | Key::Ctrl('f') => self.buffer.move_right(),
            Key::Up => self.buffer.move_up(),
            Key::Down => self.buffer.move_down(),
            _ => {}
        }
        progress(Progress::Count(self.buffer.count()));
        EditOutcome::Continue
    }

    /// Returns the candidate list when completion was ambiguous.
    fn complete(&mut self, ctx: &mut dyn CompletionContext) -> Option<Vec<String>> {
        let token = self.buffer.token_before_cursor();
        if token.is_empty() {
            return None;
        }
        if complete::is_url(&token) {
            if let Some(short) = ctx.shorten_url(&token) {
                self.buffer
                    .replace_before_cursor(token.chars().count(), &short);
            }
            return None;
        }

        let (source, word) = complete::split_sigil(&token);
        let candidates = ctx.candidates(source)?;
        let plan = complete::plan(word, &candidates, self.mode);
        if plan.remove > 0 {
            self.buffer.replace_before_cursor(plan.remove, &plan.insert);
        } else if !plan.insert.is_empty() {
            self.buffer.insert_str(&plan.insert);
        }
        if plan.candidates.is_empty() {
            None
        } else {
            Some(plan.candidates)
        }
    }
}
