use super::buffer::{LineBuffer, RenderedLine, Role};

/// Static help page: headings and `term  description` entries wrapped to
/// the current width.
#[derive(Debug, Clone, Default)]
pub struct HelpView {
    entries: Vec<HelpEntry>,
    buffer: LineBuffer,
}

#[derive(Debug, Clone)]
enum HelpEntry {
    Heading(String),
    Item { term: String, description: String },
    Blank,
}

impl HelpView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        if !self.entries.is_empty() {
            self.entries.push(HelpEntry::Blank);
        }
        self.entries.push(HelpEntry::Heading(text.into()));
    }

    pub fn item(&mut self, term: impl Into<String>, description: impl Into<String>) {
        self.entries.push(HelpEntry::Item {
            term: term.into(),
            description: description.into(),
        });
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut LineBuffer {
        &mut self.buffer
    }

    pub fn update_buffer(&mut self, width: usize) {
        let term_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                HelpEntry::Item { term, .. } => Some(term.chars().count()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            .min(width / 2);
        let indent = term_width + 5;

        let mut lines = Vec::new();
        for entry in &self.entries {
            match entry {
                HelpEntry::Blank => lines.push(RenderedLine::blank()),
                HelpEntry::Heading(text) => {
                    let mut line = RenderedLine::blank();
                    line.push(text.clone(), Role::Heading);
                    lines.push(line);
                }
                HelpEntry::Item { term, description } => {
                    let mut line = RenderedLine::blank();
                    line.push("  ", Role::Plain);
                    line.push(term.clone(), Role::Username);
                    let pad = indent.saturating_sub(term.chars().count() + 2).max(1);
                    line.push(" ".repeat(pad), Role::Plain);
                    let mut used = line.width();
                    for word in description.split_whitespace() {
                        let len = word.chars().count();
                        if used + len + 1 > width && used > indent {
                            lines.push(std::mem::take(&mut line));
                            line.push(" ".repeat(indent), Role::Plain);
                            used = indent;
                        } else if used > indent {
                            line.push(" ", Role::Plain);
                            used += 1;
                        }
                        line.push(word, Role::Notice);
                        used += len;
                    }
                    lines.push(line);
                }
            }
        }
        self.buffer.set_lines(lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_wrap_under_description_column() {
        let mut help = HelpView::new();
        help.heading("Commands");
        help.item("/home", "open the home timeline in a new tab");
        help.update_buffer(30);
        let text: Vec<String> = help.buffer().plain_lines();
        assert_eq!(text[0], "Commands");
        assert!(text[1].starts_with("  /home   open"));
        assert!(text.len() > 2);
        assert!(text[2].starts_with("         "));
    }
}
