use crate::app::state::App;
use crate::search::SearchStep;

pub(super) fn submit_search(app: &mut App, query: &str) {
    let tab = app.tabs.current().id();
    let lines = app.tabs.current().view().buffer().plain_lines();
    let case_sensitive = app.config().case_sensitive_search();
    let step = app.search.submit(query, tab, &lines, case_sensitive);
    apply_step(app, step);
}

pub(super) fn search_next(app: &mut App) {
    let step = app.search.next();
    apply_step(app, step);
}

pub(super) fn search_prev(app: &mut App) {
    let step = app.search.prev();
    apply_step(app, step);
}

fn apply_step(app: &mut App, step: SearchStep) {
    let buffer = app.tabs.current_mut().view_mut().buffer_mut();
    buffer.set_highlight(step.line);
    if let Some(line) = step.line {
        buffer.scroll_to(line);
    }
    if step.message.is_empty() {
        app.status.clear();
    } else {
        app.status.timed(step.message);
    }
}

/// The active tab changed; a search streak does not survive that.
pub(super) fn tab_switched(app: &mut App) {
    let tab = app.tabs.current().id();
    app.search.tab_switched(tab);
    if !app.search.is_active() {
        clear_highlights(app);
    }
}

pub(super) fn clear_search(app: &mut App) {
    app.search.reset();
    clear_highlights(app);
}

fn clear_highlights(app: &mut App) {
    for tab in app.tabs.iter_mut() {
        tab.view_mut().buffer_mut().set_highlight(None);
    }
}
