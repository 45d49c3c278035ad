//! UI rendering methods.
//!
//! Draws each region of the computed layout: border, dividers, the
//! active tab's visible lines, status line, entry line and tab strip.

use ratatui::layout::Alignment;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::timeline::Timeline;
use crate::ui::{
    render_border, render_entry, render_lines, render_separator, render_status, render_tab_strip,
};

use super::state::App;

/// Main render entry point. Called each frame by the event loop.
pub fn render(app: &App, frame: &mut Frame) {
    let Some(layout) = app.layout.as_ref() else {
        let message = app
            .layout_error
            .as_deref()
            .unwrap_or("Terminal too small");
        frame.render_widget(
            Paragraph::new(message).alignment(Alignment::Center),
            frame.area(),
        );
        return;
    };

    if let Some(border) = layout.border {
        render_border(frame, border, &app.theme);
    }
    for divider in &layout.dividers {
        render_separator(frame, *divider, &app.theme);
    }

    let buffer = app.tabs.current().view().buffer();
    let highlight = buffer
        .highlight()
        .and_then(|line| line.checked_sub(buffer.scroll()));
    render_lines(frame, layout.notices, buffer.visible(), highlight, &app.theme);

    let paused = app
        .tabs
        .current()
        .view()
        .timeline()
        .is_some_and(Timeline::is_paused);
    let (text, style) = if app.status.is_warning() {
        (app.status.text(), app.theme.warning())
    } else if paused && app.status.text().is_empty() {
        ("Paused", app.theme.pause_line())
    } else {
        (app.status.text(), app.theme.statusbar())
    };
    render_status(frame, layout.statusbar, text, style);

    render_entry(frame, layout.entry, app.editor.buffer(), app.is_editing());

    let names = app.tabs.names(app.config().enumerate_tabs);
    render_tab_strip(
        frame,
        layout.tabbar,
        &names,
        app.tabs.current_index(),
        &app.theme,
    );
}
