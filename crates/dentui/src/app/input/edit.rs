//! Entry-line editing.
//!
//! Opening the editor cancels the refresh timer and leaving it arms a
//! fresh one, so no refresh lands while the user is typing. The submitted
//! line is routed by what the edit was started for.

use tracing::warn;

use crate::api::LinkShortener;
use crate::commands::compose_job;
use crate::editor::{CompletionContext, EditOutcome, Progress, Source};
use crate::input::Key;
use crate::session::Session;

use super::command::{run_job, submit_input};
use super::search::submit_search;
use crate::app::state::{App, EditPurpose, Mode};

/// Completion over what the session has learned, plus link shortening.
struct Completion<'a> {
    session: &'a Session,
    shortener: &'a dyn LinkShortener,
    failure: Option<String>,
}

impl CompletionContext for Completion<'_> {
    fn candidates(&self, source: Source) -> Option<Vec<String>> {
        self.session.candidates(source)
    }

    fn shorten_url(&mut self, url: &str) -> Option<String> {
        match self.shortener.shorten(url) {
            Ok(short) => Some(short),
            Err(err) => {
                warn!(%err, url, "link shortening failed");
                self.failure = Some(format!("Could not shorten link: {}", err.message));
                None
            }
        }
    }
}

pub(super) fn begin_edit(app: &mut App, purpose: EditPurpose, initial: &str) {
    app.scheduler.cancel();
    let count = app.editor.start(initial);
    let status = edit_status(app, &purpose, count);
    app.status.set(status);
    app.mode = Mode::Edit(purpose);
}

fn edit_status(app: &App, purpose: &EditPurpose, count: usize) -> String {
    let count = match app.length_limit() {
        0 => count.to_string(),
        limit => format!("{count}/{limit}"),
    };
    match purpose {
        EditPurpose::Input => count,
        EditPurpose::Search => "Search".to_string(),
        EditPurpose::Compose { status, .. } => format!("{status}: {count}"),
    }
}

pub(super) fn handle_edit_key(app: &mut App, key: Key) {
    let mut progress = None;
    let (outcome, failure) = {
        let mut completion = Completion {
            session: &app.session,
            shortener: app.shortener.as_ref(),
            failure: None,
        };
        let outcome = app.editor.handle_key(key, &mut completion, &mut |update: Progress| {
            progress = Some(update)
        });
        (outcome, completion.failure)
    };

    match outcome {
        EditOutcome::Continue => {
            if let Some(failure) = failure {
                app.status.warn(failure);
            } else if let Some(update) = progress {
                show_progress(app, update);
            }
        }
        EditOutcome::Abort => {
            end_edit(app);
            app.status.clear();
        }
        EditOutcome::Submit(text) => {
            let purpose = end_edit(app);
            app.status.clear();
            submit(app, purpose, text);
        }
    }
}

fn show_progress(app: &mut App, update: Progress) {
    let text = match update {
        Progress::Count(count) => {
            let Mode::Edit(purpose) = &app.mode else {
                return;
            };
            edit_status(app, purpose, count)
        }
        Progress::Candidates(candidates) => candidates.join(" "),
    };
    app.status.set(text);
}

/// Leave edit mode and hand back what the edit was for.
fn end_edit(app: &mut App) -> EditPurpose {
    let mode = std::mem::replace(&mut app.mode, Mode::Browse);
    app.editor.clear();
    app.scheduler.schedule(app.update_interval());
    match mode {
        Mode::Edit(purpose) => purpose,
        Mode::Browse => EditPurpose::Input,
    }
}

fn submit(app: &mut App, purpose: EditPurpose, text: String) {
    match purpose {
        EditPurpose::Input => submit_input(app, &text),
        EditPurpose::Search => submit_search(app, text.trim()),
        EditPurpose::Compose {
            status,
            in_reply_to,
            dup_first_word,
        } => {
            if text.trim().is_empty() {
                return;
            }
            let job = compose_job(text, in_reply_to, dup_first_word, app.policy());
            run_job(app, status, job);
        }
    }
}
