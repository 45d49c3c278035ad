use std::time::Instant;

use tracing::warn;

use crate::events::AppEvent;
use crate::input::{Decoded, Key, FLUSH_TIMEOUT};

use super::command::on_command_done;
use super::edit::handle_edit_key;
use super::keys::handle_browse_key;
use super::refresh::{apply_results, on_refresh_due};
use crate::app::state::{App, Mode};

/// Main event dispatcher.
pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::RawInput(bytes) => {
            app.last_input = Instant::now();
            let decoded = app.decoder.feed(&bytes);
            handle_decoded(app, decoded);
        }
        AppEvent::InputClosed => {
            warn!("terminal input closed");
            app.should_quit = true;
        }
        AppEvent::RefreshDue => on_refresh_due(app),
        AppEvent::RefreshComplete { results, scheduled } => {
            apply_results(app, results, scheduled)
        }
        AppEvent::CommandDone { label, result } => on_command_done(app, &label, result),
    }
}

/// Periodic housekeeping when no event arrived. Returns whether anything
/// visible changed.
pub fn tick(app: &mut App, now: Instant) -> bool {
    let mut changed = false;
    if app.decoder.has_pending() && now.duration_since(app.last_input) >= FLUSH_TIMEOUT {
        let decoded = app.decoder.flush();
        handle_decoded(app, decoded);
        changed = true;
    }
    changed | app.status.expire(now)
}

fn handle_decoded(app: &mut App, decoded: Vec<Decoded>) {
    for item in decoded {
        match item {
            Ok(key) => handle_key(app, key),
            Err(err) => {
                warn!(%err, "discarding malformed input");
                app.status.warn(format!("Ignored input: {err}"));
            }
        }
        if app.should_quit {
            break;
        }
    }
}

pub fn handle_key(app: &mut App, key: Key) {
    if key == Key::Ctrl('l') {
        app.redraw_requested = true;
        return;
    }
    if app.is_editing() {
        handle_edit_key(app, key);
    } else {
        handle_browse_key(app, key);
    }
}
