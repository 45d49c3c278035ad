mod api;
mod app;
mod commands;
mod config;
mod editor;
mod events;
mod input;
mod keymap;
mod refresh;
mod search;
mod session;
mod tabs;
#[cfg(test)]
mod test_utils;
mod timeline;
mod ui;

use std::process::ExitCode;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use config::ConfigStore;

const LOG_ENV: &str = "DENTUI_LOG";

/// Log to a file in the config directory; the terminal belongs to the UI.
fn init_logging(store: &ConfigStore) -> Option<WorkerGuard> {
    let path = store.log_path();
    let dir = path.parent()?;
    let name = path.file_name()?;
    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()
        .map(|()| guard)
}

fn main() -> ExitCode {
    let store = match ConfigStore::load() {
        Ok(store) => store,
        Err(err) => {
            eprintln!("dentui: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = init_logging(&store);
    if store.was_created() {
        eprintln!(
            "dentui: wrote a default configuration to {}",
            store.dir().display()
        );
    }

    match app::run(store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "exiting");
            eprintln!("dentui: {err}");
            ExitCode::FAILURE
        }
    }
}
