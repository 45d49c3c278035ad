//! Rendered, scrollable line buffer shared by timeline and help views.

/// What a span of rendered text represents; the theme maps it to a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Plain,
    Index,
    Selector,
    Username,
    Group,
    Tag,
    Link,
    Time,
    Source,
    Notice,
    Heading,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLine {
    pub spans: Vec<Span>,
}

impl RenderedLine {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>, role: Role) {
        let text = text.into();
        if !text.is_empty() {
            self.spans.push(Span { text, role });
        }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.chars().count()).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    lines: Vec<RenderedLine>,
    scroll: usize,
    height: usize,
    highlight: Option<usize>,
}

impl LineBuffer {
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(RenderedLine::text).collect()
    }

    pub fn set_lines(&mut self, lines: Vec<RenderedLine>) {
        self.lines = lines;
        if self.highlight.is_some_and(|line| line >= self.lines.len()) {
            self.highlight = None;
        }
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn set_highlight(&mut self, line: Option<usize>) {
        self.highlight = line;
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.height.max(1))
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = (self.scroll + lines).min(self.max_scroll());
    }

    pub fn scroll_to(&mut self, line: usize) {
        self.scroll = line.min(self.max_scroll());
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Scroll the least amount that brings `first..=last` into view.
    pub fn reveal(&mut self, first: usize, last: usize) {
        let height = self.height.max(1);
        if first < self.scroll {
            self.scroll_to(first);
        } else if last >= self.scroll + height {
            self.scroll_to((last + 1).saturating_sub(height).min(first));
        }
    }

    pub fn visible(&self) -> &[RenderedLine] {
        let start = self.scroll.min(self.lines.len());
        let end = (start + self.height).min(self.lines.len());
        &self.lines[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: usize, height: usize) -> LineBuffer {
        let mut buffer = LineBuffer::default();
        buffer.set_height(height);
        buffer.set_lines(
            (0..lines)
                .map(|n| {
                    let mut line = RenderedLine::blank();
                    line.push(format!("line {n}"), Role::Plain);
                    line
                })
                .collect(),
        );
        buffer
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut buffer = buffer(10, 4);
        buffer.scroll_down(100);
        assert_eq!(buffer.scroll(), 6);
        assert_eq!(buffer.visible().len(), 4);
        buffer.scroll_up(100);
        assert_eq!(buffer.scroll(), 0);
        buffer.scroll_to(8);
        assert_eq!(buffer.scroll(), 6);
    }

    #[test]
    fn reveal_scrolls_minimally() {
        let mut buffer = buffer(20, 5);
        buffer.reveal(6, 7);
        assert_eq!(buffer.scroll(), 3);
        buffer.reveal(1, 2);
        assert_eq!(buffer.scroll(), 1);
    }

    #[test]
    fn shrinking_content_drops_stale_highlight() {
        let mut buffer = buffer(10, 4);
        buffer.set_highlight(Some(9));
        buffer.set_lines(Vec::new());
        assert_eq!(buffer.highlight(), None);
        assert_eq!(buffer.scroll(), 0);
    }
}
