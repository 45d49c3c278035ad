//! Notice-to-lines rendering with word wrapping and entity markup.

use std::sync::OnceLock;

use regex::Regex;

use super::buffer::{RenderedLine, Role};
use crate::api::Notice;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub compact: bool,
    pub show_source: bool,
    pub show_links: bool,
    /// Site root used to build notice links.
    pub site: String,
}

/// A rendered notice's place in the line buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoticeSpan {
    pub first: usize,
    pub last: usize,
}

fn entity_role(word: &str) -> Role {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    let is_url = URL
        .get_or_init(|| Regex::new(r"^(?i)(https?|ftp)://").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(word));
    if is_url {
        return Role::Link;
    }
    match word.chars().next() {
        Some('@') if word.len() > 1 => Role::Username,
        Some('!') if word.len() > 1 => Role::Group,
        Some('#') if word.len() > 1 => Role::Tag,
        _ => Role::Notice,
    }
}

/// Short form of a service timestamp like "Tue Mar 13 00:12:41 +0000 2012".
pub fn short_time(created_at: &str) -> String {
    let parts: Vec<&str> = created_at.split_whitespace().collect();
    match parts.as_slice() {
        [_, month, day, time, ..] => {
            let hhmm: String = time.chars().take(5).collect();
            format!("{month} {day} {hhmm}")
        }
        _ => created_at.to_string(),
    }
}

/// Wrap `words` into lines no wider than `width`, continuing `first`.
fn wrap_words(first: RenderedLine, text: &str, width: usize, indent: usize) -> Vec<RenderedLine> {
    let width = width.max(indent + 1);
    let mut lines = Vec::new();
    let mut line = first;
    let mut used = line.width();

    for word in text.split_whitespace() {
        let role = entity_role(word);
        let mut chars: Vec<char> = word.chars().collect();
        let needed = chars.len() + usize::from(used > indent);
        if used + needed > width && used > indent {
            lines.push(std::mem::take(&mut line));
            line.push(" ".repeat(indent), Role::Plain);
            used = indent;
        }
        if used > indent {
            line.push(" ", Role::Plain);
            used += 1;
        }
        // Words longer than a line are split hard.
        while used + chars.len() > width {
            let room = width - used;
            let head: String = chars.drain(..room).collect();
            line.push(head, role);
            lines.push(std::mem::take(&mut line));
            line.push(" ".repeat(indent), Role::Plain);
            used = indent;
        }
        used += chars.len();
        line.push(chars.into_iter().collect::<String>(), role);
    }
    lines.push(line);
    lines
}

pub fn render_notice(
    index: usize,
    notice: &Notice,
    chosen: bool,
    width: usize,
    options: &RenderOptions,
) -> Vec<RenderedLine> {
    let shown = notice.original();
    let mut header = RenderedLine::blank();
    header.push(if chosen { "> " } else { "  " }, Role::Selector);
    header.push(format!("{}.", index + 1), Role::Index);
    header.push(" ", Role::Plain);
    header.push(shown.author(), Role::Username);

    if options.compact {
        header.push(":", Role::Plain);
        return wrap_words(header, &shown.text, width, 4);
    }

    if notice.is_repeat() {
        header.push(" [repeated by ", Role::Plain);
        header.push(notice.author(), Role::Username);
        header.push("]", Role::Plain);
    }
    if let Some(recipient) = &notice.recipient {
        header.push(" to ", Role::Plain);
        header.push(recipient.screen_name.clone(), Role::Username);
    }
    if let Some(name) = &shown.in_reply_to_screen_name {
        header.push(" in reply to ", Role::Plain);
        header.push(name.clone(), Role::Username);
    }
    if !shown.created_at.is_empty() {
        header.push("  ", Role::Plain);
        header.push(short_time(&shown.created_at), Role::Time);
    }
    if options.show_source && !shown.source.is_empty() {
        header.push(" from ", Role::Plain);
        header.push(strip_tags(&shown.source), Role::Source);
    }

    let mut lines = vec![header];
    if options.show_links {
        let mut link = RenderedLine::blank();
        link.push("    ", Role::Plain);
        link.push(
            format!("{}/notice/{}", options.site.trim_end_matches('/'), shown.id),
            Role::Link,
        );
        lines.push(link);
    }
    let mut body = RenderedLine::blank();
    body.push("    ", Role::Plain);
    lines.extend(wrap_words(body, &shown.text, width, 4));
    lines.push(RenderedLine::blank());
    lines
}

/// Render every notice, returning the lines and each notice's line range.
pub fn render_notices(
    notices: &[Notice],
    chosen: Option<usize>,
    width: usize,
    options: &RenderOptions,
) -> (Vec<RenderedLine>, Vec<NoticeSpan>) {
    let mut lines = Vec::new();
    let mut spans = Vec::with_capacity(notices.len());
    for (index, notice) in notices.iter().enumerate() {
        let rendered = render_notice(index, notice, chosen == Some(index), width, options);
        let first = lines.len();
        lines.extend(rendered);
        spans.push(NoticeSpan {
            first,
            last: lines.len().saturating_sub(1),
        });
    }
    (lines, spans)
}

/// Sources arrive as HTML anchors; keep the link text.
fn strip_tags(source: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for ch in source.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            ch if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}
