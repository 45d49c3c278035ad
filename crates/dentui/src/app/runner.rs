//! Application runner and event loop.
//!
//! Handles startup checks, terminal setup/teardown and the main event
//! loop. Events are read from an mpsc channel and dispatched to handlers;
//! a receive timeout doubles as the tick that flushes a pending escape
//! and expires status messages.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Instant;

use crossterm::terminal::{
    self as term, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use crate::api::{Api, HttpApi, IsGd};
use crate::config::{ConfigError, ConfigStore, AUTH_FILE, CONFIG_FILE};
use crate::events::AppEvent;
use crate::input::FLUSH_TIMEOUT;
use crate::ui::{compute, LayoutError, TermSize};

use super::input::{after_draw, handle_event, start_cycle, tick};
use super::state::App;
use super::AppError;

/// Entry point: check the config, connect, set up the terminal and run
/// the event loop.
pub fn run(store: ConfigStore) -> Result<(), AppError> {
    let api = connect(&store)?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, store, api);

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Everything that can fail before the screen is taken over.
fn connect(store: &ConfigStore) -> Result<Arc<dyn Api>, AppError> {
    let config = store.config();
    if config.use_oauth {
        return Err(ConfigError::Unsupported("OAuth login".to_string()).into());
    }
    if config.api_path.trim().is_empty() {
        return Err(ConfigError::Invalid(format!(
            "api_path is not set; edit {}",
            store.dir().join(CONFIG_FILE).display()
        ))
        .into());
    }
    let credentials = store.credentials();
    if credentials.username.is_empty() || credentials.password.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "username and password are not set; edit {}",
            store.dir().join(AUTH_FILE).display()
        ))
        .into());
    }
    let api = HttpApi::connect(
        &config.api_path,
        &credentials.username,
        &credentials.password,
    )?;
    Ok(Arc::new(api))
}

fn probe() -> io::Result<TermSize> {
    term::size().map(|(cols, rows)| TermSize { cols, rows })
}

fn relayout(app: &mut App) {
    app.layout_dirty = false;
    match compute(probe, &app.layout_input()) {
        Ok(layout) => app.apply_layout(layout),
        Err(err) => {
            if !matches!(err, LayoutError::TooSmall { .. }) {
                warn!(%err, "layout failed");
            }
            app.layout = None;
            app.layout_error = Some(err.to_string());
        }
    }
}

/// Main event loop: process events until quit.
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: ConfigStore,
    api: Arc<dyn Api>,
) -> Result<(), AppError> {
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    spawn_input_thread(event_tx.clone());

    let mut app = App::new(store, api, Arc::new(IsGd::new()), event_tx);
    relayout(&mut app);
    let mut last_size = probe().ok();
    start_cycle(&mut app);
    info!(tabs = app.tabs.len(), "started");

    terminal.clear()?;
    terminal.draw(|frame| super::render::render(&app, frame))?;

    while !app.should_quit {
        let mut dirty = match event_rx.recv_timeout(FLUSH_TIMEOUT) {
            Ok(event) => {
                handle_event(&mut app, event);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        // Drain any pending events before redraw
        while let Ok(event) = event_rx.try_recv() {
            handle_event(&mut app, event);
            dirty = true;
        }
        dirty |= tick(&mut app, Instant::now());

        let size = probe().ok();
        if size != last_size || app.layout_dirty {
            last_size = size;
            relayout(&mut app);
            dirty = true;
        }

        if app.redraw_requested {
            terminal.clear()?;
            app.redraw_requested = false;
            dirty = true;
        }
        if !dirty {
            continue;
        }

        terminal.draw(|frame| super::render::render(&app, frame))?;
        if after_draw(&mut app) {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            backend.flush()?;
        }
    }

    app.scheduler.shutdown();
    Ok(())
}

/// Spawn a thread forwarding raw terminal bytes.
fn spawn_input_thread(sender: Sender<AppEvent>) {
    std::thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 1024];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => {
                    let _ = sender.send(AppEvent::InputClosed);
                    break;
                }
                Ok(n) => {
                    if sender.send(AppEvent::RawInput(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(%err, "terminal read failed");
                    let _ = sender.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    });
}
