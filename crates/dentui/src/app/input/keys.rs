//! Browse-mode keys: one action per bound key, then digit hotkeys.

use tracing::debug;

use crate::input::Key;
use crate::keymap::Action;

use super::command::{open_view, run_named};
use super::edit::begin_edit;
use super::refresh::{fetch_tab, refresh_now};
use super::search::{search_next, search_prev, tab_switched};
use crate::app::state::{App, EditPurpose};
use crate::tabs::TabManager;
use crate::timeline::{LineBuffer, Timeline, ViewKind};

pub(super) fn handle_browse_key(app: &mut App, key: Key) {
    if app.awaiting_qreply {
        app.awaiting_qreply = false;
        app.status.clear();
        if let Key::Char(digit @ '1'..='8') = key {
            begin_edit(app, EditPurpose::Input, &format!("/reply {digit} "));
        }
        return;
    }

    if let Some(action) = app.keys.action_for(key) {
        debug!(action = action.name(), "key action");
        run_action(app, action);
        return;
    }

    match key {
        Key::Char(digit @ '1'..='9') => {
            if let Some(digit) = digit.to_digit(10) {
                if app.tabs.hotkey(digit) {
                    tab_changed(app);
                }
            }
        }
        Key::Ctrl('l') => app.redraw_requested = true,
        _ => {}
    }
}

fn run_action(app: &mut App, action: Action) {
    match action {
        Action::FirstPage => change_page(app, Timeline::first_page),
        Action::NewerPage => change_page(app, Timeline::prev_page),
        Action::OlderPage => change_page(app, Timeline::next_page),
        Action::Refresh => refresh_now(app),
        Action::Input => begin_edit(app, EditPurpose::Input, ""),
        Action::CommandInput => begin_edit(app, EditPurpose::Input, "/"),
        Action::Search => begin_edit(app, EditPurpose::Search, ""),
        Action::Quit => app.should_quit = true,
        Action::CloseTab => {
            if app.tabs.close_current().is_some() {
                tab_changed(app);
            } else {
                app.status.timed("Cannot close the last tab.");
            }
        }
        Action::Help => open_view(app, ViewKind::Help),
        Action::NextTab => switch(app, |tabs| tabs.next()),
        Action::PrevTab => switch(app, |tabs| tabs.prev()),
        Action::NextTabCycle => switch(app, |tabs| tabs.next_cycle()),
        Action::PrevTabCycle => switch(app, |tabs| tabs.prev_cycle()),
        Action::TabSwapLeft => switch(app, |tabs| tabs.swap_left()),
        Action::TabSwapRight => switch(app, |tabs| tabs.swap_right()),
        Action::QuickReply => {
            app.awaiting_qreply = true;
            app.status.set("Reply to which notice? (1-8)");
        }
        Action::ChosenReply => {
            if let Some(number) = chosen_number(app) {
                begin_edit(app, EditPurpose::Input, &format!("/reply {number} "));
            }
        }
        Action::ChosenReplyMode => on_chosen(app, "/reply"),
        Action::ChosenFavourite => on_chosen(app, "/favourite"),
        Action::ChosenUnfavourite => on_chosen(app, "/unfavourite"),
        Action::ChosenContext => on_chosen(app, "/context"),
        Action::ChosenUser => on_chosen(app, "/user"),
        Action::ChosenRepeat => on_chosen(app, "/repeat"),
        Action::ChosenQuote => on_chosen(app, "/quote"),
        Action::ChosenDelete => on_chosen(app, "/delete"),
        Action::Mute => on_chosen(app, "/mute"),
        Action::Unmute => on_chosen(app, "/unmute"),
        Action::ChosenNext => choose(app, Timeline::choose_next),
        Action::ChosenPrev => choose(app, Timeline::choose_prev),
        Action::ChosenFirst => choose(app, Timeline::choose_first),
        Action::ChosenLast => choose(app, Timeline::choose_last),
        Action::NextMatch => search_next(app),
        Action::PrevMatch => search_prev(app),
        Action::PauseToggle => {
            if let Some(timeline) = app.tabs.current_mut().view_mut().timeline_mut() {
                let paused = !timeline.is_paused();
                timeline.set_paused(paused);
            }
        }
        Action::PauseToggleAll => {
            let any_running = app
                .tabs
                .iter()
                .filter_map(|tab| tab.view().timeline())
                .any(|timeline| !timeline.is_paused());
            for tab in app.tabs.iter_mut() {
                if let Some(timeline) = tab.view_mut().timeline_mut() {
                    timeline.set_paused(any_running);
                }
            }
        }
        Action::ScrollUp => scroll(app, |buffer, _| buffer.scroll_up(1)),
        Action::ScrollDown => scroll(app, |buffer, _| buffer.scroll_down(1)),
        Action::PageUp => scroll(app, |buffer, height| buffer.scroll_up(height)),
        Action::PageDown => scroll(app, |buffer, height| buffer.scroll_down(height)),
        Action::ScrollTop => scroll(app, |buffer, _| buffer.scroll_top()),
        Action::ScrollBottom => scroll(app, |buffer, _| buffer.scroll_bottom()),
        Action::ToggleNoticeLinks => {
            app.render_options.show_links = !app.render_options.show_links;
            app.rerender_all();
        }
    }
}

/// After any change of the active tab.
fn tab_changed(app: &mut App) {
    tab_switched(app);
    app.status.clear();
}

fn switch(app: &mut App, op: impl FnOnce(&mut TabManager) -> bool) {
    if op(&mut app.tabs) {
        tab_changed(app);
    }
}

fn change_page(app: &mut App, op: fn(&mut Timeline) -> bool) {
    let changed = app
        .tabs
        .current_mut()
        .view_mut()
        .timeline_mut()
        .is_some_and(op);
    if changed {
        let index = app.tabs.current_index();
        app.rerender_current();
        fetch_tab(app, index);
    }
}

fn choose(app: &mut App, op: fn(&mut Timeline) -> bool) {
    let smooth = app.config().smooth_cscroll;
    let changed = app
        .tabs
        .current_mut()
        .view_mut()
        .timeline_mut()
        .is_some_and(op);
    if !changed {
        return;
    }
    app.rerender_current();
    if let Some(timeline) = app.tabs.current_mut().view_mut().timeline_mut() {
        if smooth {
            timeline.reveal_chosen();
        } else {
            timeline.jump_to_chosen();
        }
    }
}

fn scroll(app: &mut App, op: impl FnOnce(&mut LineBuffer, usize)) {
    let buffer = app.tabs.current_mut().view_mut().buffer_mut();
    let height = buffer.height().max(1);
    op(buffer, height);
}

/// 1-based number of the chosen notice, for commands.
fn chosen_number(app: &mut App) -> Option<usize> {
    let chosen = app
        .tabs
        .current()
        .view()
        .timeline()
        .and_then(Timeline::chosen);
    if chosen.is_none() {
        app.status.timed("No notice chosen.");
    }
    chosen.map(|index| index + 1)
}

fn on_chosen(app: &mut App, command: &str) {
    if let Some(number) = chosen_number(app) {
        run_named(app, command, &[number.to_string()]);
    }
}
