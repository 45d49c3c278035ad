use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::commands::{
    parse_input, plan, plan_post, Job, LocalCommand, Outcome, ParseContext, Parsed, Plan,
};
use crate::events::AppEvent;
use crate::tabs::TabView;
use crate::timeline::{Timeline, ViewKind};

use super::edit::begin_edit;
use super::refresh::fetch_tab;
use super::search::tab_switched;
use crate::app::state::{App, EditPurpose};

/// Route a line submitted from the entry: a command or a notice.
pub(super) fn submit_input(app: &mut App, input: &str) {
    let parsed = {
        let ctx = ParseContext {
            aliases: &app.config().aliases,
            direct_view: app.tabs.current().kind().is_direct(),
        };
        parse_input(input, &ctx)
    };
    let planned = match parsed {
        Parsed::Empty => return,
        Parsed::Command { name, args } => {
            debug!(%name, args = args.len(), "running command");
            plan(&name, &args, &app.command_context())
        }
        Parsed::Post(text) => plan_post(&text, &app.command_context()),
    };
    execute_plan(app, planned);
}

/// Run a command as if typed, for key actions on the chosen notice.
pub(super) fn run_named(app: &mut App, name: &str, args: &[String]) {
    let planned = plan(name, args, &app.command_context());
    execute_plan(app, planned);
}

pub(super) fn execute_plan(app: &mut App, planned: Plan) {
    match planned {
        Plan::Run { status, job } => run_job(app, status, job),
        Plan::Open { status, kind } => {
            debug!(status, "opening tab");
            open_view(app, kind);
        }
        Plan::Compose {
            status,
            initial,
            in_reply_to,
            dup_first_word,
        } => begin_edit(
            app,
            EditPurpose::Compose {
                status,
                in_reply_to,
                dup_first_word,
            },
            &initial,
        ),
        Plan::Local(local) => run_local(app, local),
        Plan::Message(message) => app.status.timed(message),
    }
}

/// Hand a job to a worker thread; the result comes back as `CommandDone`.
pub(super) fn run_job(app: &mut App, status: &'static str, job: Job) {
    app.status.set(format!("{status}..."));
    let api = app.api.clone();
    let tx = app.event_tx.clone();
    std::thread::spawn(move || {
        let result = job(api.as_ref());
        let _ = tx.send(AppEvent::CommandDone {
            label: status.to_string(),
            result,
        });
    });
}

pub(super) fn on_command_done(app: &mut App, label: &str, result: Result<Outcome, ApiError>) {
    match result {
        Ok(outcome) => {
            info!(label, "command finished");
            apply_outcome(app, outcome);
        }
        Err(err) => {
            warn!(label, %err, "command failed");
            let message = if err.message.is_empty() {
                err.to_string()
            } else {
                err.message
            };
            app.status.warn(message);
        }
    }
}

fn apply_outcome(app: &mut App, outcome: Outcome) {
    match outcome {
        Outcome::Done => app.status.clear(),
        Outcome::Message(message) => app.status.timed(message),
        Outcome::Posted(notices) => {
            app.session.learn_from(&notices);
            let current = app.tabs.current_index();
            let mut touched = Vec::new();
            for (index, tab) in app.tabs.iter_mut().enumerate() {
                let Some(timeline) = tab.view_mut().timeline_mut() else {
                    continue;
                };
                let shows_posts = match timeline.kind() {
                    ViewKind::Home | ViewKind::Public => timeline.page() == 1,
                    ViewKind::Context { .. } => index == current,
                    _ => false,
                };
                if !shows_posts {
                    continue;
                }
                // Newest first, so insert oldest first.
                for notice in notices.iter().rev() {
                    timeline.insert_front(notice.clone());
                }
                touched.push(index);
            }
            for index in touched {
                app.rerender_tab(index);
            }
            app.status.clear();
        }
        Outcome::Deleted(id) => {
            let mut touched = Vec::new();
            for (index, tab) in app.tabs.iter_mut().enumerate() {
                if let Some(timeline) = tab.view_mut().timeline_mut() {
                    if timeline.remove(id) {
                        touched.push(index);
                    }
                }
            }
            for index in touched {
                app.rerender_tab(index);
            }
            app.status.timed("Notice deleted.");
        }
        Outcome::OpenTab(kind) => open_view(app, kind),
    }
}

/// Open a tab for `kind` and fetch it. Singleton kinds already open are
/// left where they are.
pub(super) fn open_view(app: &mut App, kind: ViewKind) {
    let title = kind.title();
    let view = match kind {
        ViewKind::Help => TabView::Help(app.help_view()),
        kind => TabView::Timeline(Timeline::new(kind)),
    };
    match app.tabs.open(view) {
        Some(index) => {
            app.rerender_tab(index);
            tab_switched(app);
            fetch_tab(app, index);
            app.status.clear();
        }
        None => app.status.timed(format!("{title} is already open.")),
    }
}

fn run_local(app: &mut App, local: LocalCommand) {
    match local {
        LocalCommand::Config { key, value } => match app.store.set(&key, &value) {
            Ok(()) => {
                app.reload_config();
                app.status.timed(format!("Set {key}."));
            }
            Err(err) => app.status.warn(err.to_string()),
        },
        LocalCommand::Alias { name, expansion } => {
            match app.store.set_alias(&name, &expansion) {
                Ok(()) => {
                    app.reload_config();
                    app.status.timed(format!("Alias {name} added."));
                }
                Err(err) => app.status.warn(err.to_string()),
            }
        }
        LocalCommand::Link { urls } => {
            let browser = app.config().browser.clone();
            for url in &urls {
                if let Err(err) = open_link(&browser, url) {
                    warn!(%err, url, "could not start browser");
                    app.status.warn(format!("Could not open {url}: {err}"));
                    return;
                }
            }
            app.status.clear();
        }
        LocalCommand::Mute(conversation) => {
            if app.session.mute(conversation) {
                hide_muted(app);
                app.status.timed("Conversation muted.");
            } else {
                app.status.timed("This conversation is already muted.");
            }
        }
        LocalCommand::Unmute(conversation) => {
            if app.session.unmute(conversation) {
                app.status.timed("Conversation unmuted.");
                let current = app.tabs.current_index();
                fetch_tab(app, current);
            } else {
                app.status.timed("This conversation wasn't muted.");
            }
        }
        LocalCommand::Help => open_view(app, ViewKind::Help),
        LocalCommand::Quit => app.should_quit = true,
    }
}

/// Drop notices of newly muted conversations from the loaded pages.
fn hide_muted(app: &mut App) {
    let mut touched = Vec::new();
    for (index, tab) in app.tabs.iter_mut().enumerate() {
        let Some(timeline) = tab.view_mut().timeline_mut() else {
            continue;
        };
        let muted: Vec<u64> = timeline
            .notices()
            .iter()
            .filter(|notice| app.session.is_muted(notice))
            .map(|notice| notice.id)
            .collect();
        for id in &muted {
            timeline.remove(*id);
        }
        if !muted.is_empty() {
            touched.push(index);
        }
    }
    for index in touched {
        app.rerender_tab(index);
    }
}

/// Start the configured browser command with `%s` replaced by the URL.
fn open_link(template: &str, url: &str) -> std::io::Result<()> {
    let quoted = shell_quote(url);
    let command = if template.contains("%s") {
        template.replace("%s", &quoted)
    } else {
        format!("{template} {quoted}")
    };
    debug!(%command, "opening link");
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

/// URLs come from other people's notices; keep them one shell word.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_single_quoted_for_the_shell() {
        assert_eq!(shell_quote("http://a.b/c"), "'http://a.b/c'");
        assert_eq!(shell_quote("http://x/';rm"), "'http://x/'\\'';rm'");
    }
}
