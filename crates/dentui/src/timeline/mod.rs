//! Tab content: notice timelines and the help page.
//!
//! A `Timeline` owns the notices loaded for one view, the chosen-notice
//! cursor, pause state, paging and its rendered line buffer. Fetching is
//! driven from outside (see `refresh`); results come back through
//! `apply_update`.

mod buffer;
mod filter;
mod help;
mod kind;
mod render;

pub use buffer::{LineBuffer, RenderedLine, Role};
pub use filter::Filters;
pub use help::HelpView;
pub use kind::ViewKind;
pub use render::{NoticeSpan, RenderOptions};

use std::collections::HashSet;

use crate::api::Notice;

#[derive(Debug, Clone)]
pub struct Timeline {
    kind: ViewKind,
    notices: Vec<Notice>,
    chosen: Option<usize>,
    paused: bool,
    page: u32,
    unread: usize,
    spans: Vec<NoticeSpan>,
    buffer: LineBuffer,
}

impl Timeline {
    pub fn new(kind: ViewKind) -> Self {
        Self {
            kind,
            notices: Vec::new(),
            chosen: None,
            paused: false,
            page: 1,
            unread: 0,
            spans: Vec::new(),
            buffer: LineBuffer::default(),
        }
    }

    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Notice by its 1-based display index.
    pub fn notice(&self, index: usize) -> Option<&Notice> {
        index.checked_sub(1).and_then(|i| self.notices.get(i))
    }

    pub fn chosen(&self) -> Option<usize> {
        self.chosen
    }

    pub fn chosen_notice(&self) -> Option<&Notice> {
        self.chosen.and_then(|i| self.notices.get(i))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn mark_read(&mut self) {
        self.unread = 0;
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut LineBuffer {
        &mut self.buffer
    }

    /// Replace the loaded notices with a fetch result. Returns how many
    /// notices were not present before.
    pub fn apply_update(&mut self, notices: Vec<Notice>) -> usize {
        let known: HashSet<u64> = self.notices.iter().map(|n| n.id).collect();
        let fresh = if self.notices.is_empty() {
            0
        } else {
            notices.iter().filter(|n| !known.contains(&n.id)).count()
        };
        let chosen_id = self.chosen_notice().map(|n| n.id);
        self.notices = notices;
        self.chosen = chosen_id
            .map(|id| self.notices.iter().position(|n| n.id == id).unwrap_or(0))
            .filter(|_| !self.notices.is_empty());
        self.unread += fresh;
        fresh
    }

    /// Put a freshly posted notice at the top.
    pub fn insert_front(&mut self, notice: Notice) {
        if self.notices.iter().any(|n| n.id == notice.id) {
            return;
        }
        self.notices.insert(0, notice);
        if let Some(chosen) = self.chosen.as_mut() {
            *chosen += 1;
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let Some(pos) = self.notices.iter().position(|n| n.id == id) else {
            return false;
        };
        self.notices.remove(pos);
        self.chosen = match self.chosen {
            Some(_) if self.notices.is_empty() => None,
            Some(chosen) if chosen > pos || chosen >= self.notices.len() => {
                Some(chosen.saturating_sub(1))
            }
            other => other,
        };
        true
    }

    /// Re-render the notices into the line buffer at `width` columns.
    pub fn update_buffer(&mut self, width: usize, options: &RenderOptions) {
        let (lines, spans) = render::render_notices(&self.notices, self.chosen, width, options);
        self.spans = spans;
        self.buffer.set_lines(lines);
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.buffer.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.buffer.scroll_down(lines);
    }

    pub fn scroll_to(&mut self, line: usize) {
        self.buffer.scroll_to(line);
    }

    /// Go to page 1. Returns whether the page changed.
    pub fn first_page(&mut self) -> bool {
        if self.page == 1 {
            return false;
        }
        self.page = 1;
        self.reset_position();
        true
    }

    /// Newer notices. Returns whether the page changed.
    pub fn prev_page(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        self.reset_position();
        true
    }

    /// Older notices. Always possible; an empty page just shows nothing.
    pub fn next_page(&mut self) -> bool {
        if matches!(self.kind, ViewKind::Context { .. } | ViewKind::Help) {
            return false;
        }
        self.page += 1;
        self.reset_position();
        true
    }

    fn reset_position(&mut self) {
        self.chosen = None;
        self.buffer.scroll_top();
        self.buffer.set_highlight(None);
    }

    fn choose(&mut self, index: usize) -> bool {
        if self.notices.is_empty() {
            return false;
        }
        let index = index.min(self.notices.len() - 1);
        let changed = self.chosen != Some(index);
        self.chosen = Some(index);
        changed
    }

    pub fn choose_next(&mut self) -> bool {
        let next = self.chosen.map_or(0, |i| i + 1);
        self.choose(next)
    }

    pub fn choose_prev(&mut self) -> bool {
        let prev = self.chosen.map_or(0, |i| i.saturating_sub(1));
        self.choose(prev)
    }

    pub fn choose_first(&mut self) -> bool {
        self.choose(0)
    }

    pub fn choose_last(&mut self) -> bool {
        self.choose(self.notices.len().saturating_sub(1))
    }

    /// Scroll so the chosen notice is visible. Call after `update_buffer`.
    pub fn reveal_chosen(&mut self) {
        if let Some(span) = self.chosen.and_then(|i| self.spans.get(i)) {
            self.buffer.reveal(span.first, span.last);
        }
    }

    /// Scroll so the chosen notice starts at the top of the view.
    pub fn jump_to_chosen(&mut self) {
        if let Some(span) = self.chosen.and_then(|i| self.spans.get(i)) {
            self.buffer.scroll_to(span.first);
        }
    }
}
