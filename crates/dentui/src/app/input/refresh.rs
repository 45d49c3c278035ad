//! Timeline refresh: starting fetch cycles and applying their results.
//!
//! A cycle fetches every unpaused timeline tab on a worker thread. Only
//! one cycle runs at a time; the timer is re-armed after the frame that
//! shows its results is drawn. Page changes and newly opened tabs fetch
//! just that tab outside the cycle.

use tracing::{debug, info};

use crate::api::Notice;
use crate::config::NotifyStyle;
use crate::refresh::{spawn_fetch, FetchRequest, FetchResult};

use super::search::clear_search;
use crate::app::state::App;

fn request_for(app: &App, index: usize) -> Option<FetchRequest> {
    let tab = app.tabs.get(index)?;
    let timeline = tab.view().timeline()?;
    Some(FetchRequest {
        tab_id: tab.id(),
        kind: timeline.kind().clone(),
        page: timeline.page(),
        count: app.config().notice_limit,
    })
}

/// Start a full refresh cycle unless one is already running.
pub fn start_cycle(app: &mut App) {
    if app.refresh_in_flight {
        debug!("refresh cycle already running");
        return;
    }
    let requests: Vec<FetchRequest> = (0..app.tabs.len())
        .filter(|&index| {
            app.tabs
                .get(index)
                .and_then(|tab| tab.view().timeline())
                .is_some_and(|timeline| !timeline.is_paused())
        })
        .filter_map(|index| request_for(app, index))
        .collect();
    if requests.is_empty() {
        app.reschedule_pending = true;
        return;
    }
    debug!(tabs = requests.len(), "refresh cycle started");
    app.refresh_in_flight = true;
    spawn_fetch(app.api.clone(), requests, true, app.event_tx.clone());
}

pub(super) fn on_refresh_due(app: &mut App) {
    if app.is_editing() {
        debug!("refresh skipped while editing");
        app.scheduler.schedule(app.update_interval());
        return;
    }
    start_cycle(app);
}

/// Manual refresh: drop the pending deadline and fetch now.
pub(super) fn refresh_now(app: &mut App) {
    app.scheduler.cancel();
    if app.refresh_in_flight {
        app.status.timed("Refresh already in progress.");
        return;
    }
    start_cycle(app);
}

/// Fetch one tab outside the cycle.
pub(super) fn fetch_tab(app: &mut App, index: usize) {
    if let Some(request) = request_for(app, index) {
        spawn_fetch(app.api.clone(), vec![request], false, app.event_tx.clone());
    }
}

pub(super) fn apply_results(app: &mut App, results: Vec<FetchResult>, scheduled: bool) {
    if scheduled {
        app.refresh_in_flight = false;
        app.reschedule_pending = true;
    }
    let current = app.tabs.current().id();

    for FetchResult {
        tab_id,
        page,
        result,
    } in results
    {
        let Some(index) = app.tabs.iter().position(|tab| tab.id() == tab_id) else {
            debug!(tab_id, "dropping results for a closed tab");
            continue;
        };
        let title = app.tabs.iter().nth(index).map(|tab| tab.kind().title());
        let title = title.unwrap_or_default();
        let notices = match result {
            Ok(notices) => notices,
            Err(err) => {
                app.status
                    .warn(format!("Could not refresh {title}: {}", err.message));
                continue;
            }
        };
        app.session.learn_from(&notices);
        let visible: Vec<Notice> = notices
            .into_iter()
            .filter(|notice| !app.filters.hides(notice) && !app.session.is_muted(notice))
            .collect();

        let Some(timeline) = app
            .tabs
            .iter_mut()
            .nth(index)
            .and_then(|tab| tab.view_mut().timeline_mut())
        else {
            continue;
        };
        if timeline.page() != page {
            debug!(tab_id, page, "dropping results for a page no longer shown");
            continue;
        }
        if scheduled && timeline.is_paused() {
            continue;
        }
        let notifies = timeline.kind().notifies();
        let fresh = timeline.apply_update(visible);
        if tab_id == current {
            timeline.mark_read();
        }
        app.rerender_tab(index);
        if tab_id == current && app.search.is_active() {
            clear_search(app);
        }
        if fresh > 0 {
            info!(tab = %title, fresh, "new notices");
            if notifies {
                notify(app, &title, fresh);
            }
        }
    }
}

fn notify(app: &mut App, title: &str, fresh: usize) {
    let style = app.config().notify;
    match style {
        NotifyStyle::Beep => app.pending_bell = true,
        NotifyStyle::Flash => app.status.timed(format!("{fresh} new in {title}")),
        NotifyStyle::Off => {}
    }
}

/// Called once the frame is on screen.
pub fn after_draw(app: &mut App) -> bool {
    if app.reschedule_pending {
        app.reschedule_pending = false;
        if !app.is_editing() {
            app.scheduler.schedule(app.update_interval());
        }
    }
    std::mem::take(&mut app.pending_bell)
}
