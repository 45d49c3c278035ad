//! Reusable widget rendering functions.
//!
//! Pure functions that produce ratatui widgets from data.
//! No state mutation happens here.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::theme::Theme;
use crate::editor::EditBuffer;
use crate::timeline::RenderedLine;

/// Render a dashed separator line.
pub fn render_separator(frame: &mut Frame, area: Rect, theme: &Theme) {
    let pattern = "- ";
    let width = usize::from(area.width);
    let line = if width == 0 {
        String::new()
    } else {
        pattern.repeat(width / pattern.len() + 1)[..width].to_string()
    };
    let separator = Paragraph::new(Line::raw(line))
        .style(theme.field("timelines").add_modifier(Modifier::DIM));
    frame.render_widget(separator, area);
}

pub fn render_border(frame: &mut Frame, area: Rect, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.field("timelines"));
    frame.render_widget(block, area);
}

/// First tab to draw so the active tab fits in `width` columns.
pub fn first_visible_tab(labels: &[String], active: usize, width: usize) -> usize {
    let widths: Vec<usize> = labels.iter().map(|label| label.chars().count() + 2).collect();
    let mut start = 0;
    while start < active && widths[start..=active].iter().sum::<usize>() > width {
        start += 1;
    }
    start
}

pub fn render_tab_strip(
    frame: &mut Frame,
    area: Rect,
    names: &[String],
    active: usize,
    theme: &Theme,
) {
    let active = active.min(names.len().saturating_sub(1));
    let start = first_visible_tab(names, active, usize::from(area.width));
    let spans: Vec<Span> = names
        .iter()
        .enumerate()
        .skip(start)
        .map(|(index, name)| {
            let style = if index == active {
                theme.tabbar_active()
            } else {
                theme.tabbar()
            };
            Span::styled(format!(" {name} "), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.tabbar()), area);
}

pub fn render_status(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let line = Line::from(Span::styled(format!(" {text}"), style));
    frame.render_widget(Paragraph::new(line).style(style), area);
}

/// Draw the edit grid; the terminal cursor is placed only while editing.
pub fn render_entry(frame: &mut Frame, area: Rect, buffer: &EditBuffer, editing: bool) {
    let rows = buffer.rows().min(usize::from(area.height));
    let lines: Vec<Line> = (0..rows).map(|row| Line::raw(buffer.row_text(row))).collect();
    frame.render_widget(Paragraph::new(lines), area);
    if editing {
        let (row, col) = buffer.cursor();
        let x = area.x + (col as u16).min(area.width.saturating_sub(1));
        let y = area.y + (row as u16).min(area.height.saturating_sub(1));
        frame.set_cursor_position((x, y));
    }
}

pub fn styled_line(line: &RenderedLine, theme: &Theme) -> Line<'static> {
    Line::from(
        line.spans
            .iter()
            .map(|span| Span::styled(span.text.clone(), theme.role(span.role, &span.text)))
            .collect::<Vec<_>>(),
    )
}

/// Draw visible timeline lines; `highlight` is relative to the first one.
pub fn render_lines(
    frame: &mut Frame,
    area: Rect,
    lines: &[RenderedLine],
    highlight: Option<usize>,
    theme: &Theme,
) {
    let text: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            if highlight == Some(index) {
                Line::styled(line.text(), theme.search_highlight())
            } else {
                styled_line(line, theme)
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(text), area);
}
