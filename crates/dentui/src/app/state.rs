//! Application state types and core data structures.
//!
//! Defines the App struct which holds all mutable application state,
//! plus the edit modes and the status line.

use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::api::{Api, LinkShortener};
use crate::commands::{command_help_lines, command_names, CommandContext, PostPolicy};
use crate::config::{Config, ConfigStore, FilterMode};
use crate::editor::LineEditor;
use crate::events::AppEvent;
use crate::input::KeyDecoder;
use crate::keymap::{key_label, KeyBindings};
use crate::refresh::RefreshScheduler;
use crate::search::SearchState;
use crate::session::Session;
use crate::tabs::{TabManager, TabView};
use crate::timeline::{Filters, HelpView, RenderOptions, Timeline, ViewKind};
use crate::ui::{LayoutInput, ScreenLayout, Theme};

/// How long a timed status message stays up.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// What a submitted edit line is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPurpose {
    /// Free text or a slash command.
    Input,
    Search,
    /// A notice being written for a reply or quote.
    Compose {
        status: &'static str,
        in_reply_to: Option<u64>,
        dup_first_word: bool,
    },
}

/// UI mode determines whether keys drive the tabs or the entry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Edit(EditPurpose),
}

/// The one-line status region.
#[derive(Debug, Default)]
pub struct StatusLine {
    text: String,
    expires: Option<Instant>,
    warning: bool,
}

impl StatusLine {
    /// Show text until something replaces it.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.expires = None;
        self.warning = false;
    }

    /// Show text for `STATUS_TIMEOUT`.
    pub fn timed(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.expires = Some(Instant::now() + STATUS_TIMEOUT);
        self.warning = false;
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.timed(text);
        self.warning = true;
    }

    pub fn clear(&mut self) {
        self.set(String::new());
    }

    /// Clear an expired timed message. Returns true when something changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.expires {
            Some(at) if now >= at => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_warning(&self) -> bool {
        self.warning
    }
}

/// Main application state container.
pub struct App {
    pub mode: Mode,
    pub store: ConfigStore,
    pub keys: KeyBindings,
    pub theme: Theme,
    pub render_options: RenderOptions,
    pub filters: Filters,
    pub tabs: TabManager,
    pub editor: LineEditor,
    pub search: SearchState,
    pub session: Session,
    pub status: StatusLine,
    pub api: Arc<dyn Api>,
    pub shortener: Arc<dyn LinkShortener>,
    pub event_tx: Sender<AppEvent>,
    pub scheduler: RefreshScheduler,
    pub decoder: KeyDecoder,
    /// When raw input last arrived; a lone escape is flushed after a pause.
    pub last_input: Instant,
    pub layout: Option<ScreenLayout>,
    /// Why there is no layout (terminal too small and so on).
    pub layout_error: Option<String>,
    /// Set when something the layout depends on changed.
    pub layout_dirty: bool,
    /// A timer-driven refresh cycle is running.
    pub refresh_in_flight: bool,
    /// A scheduled cycle finished; arm the timer after the next draw.
    pub reschedule_pending: bool,
    /// `qreply` was pressed and the next key picks the notice.
    pub awaiting_qreply: bool,
    pub pending_bell: bool,
    pub redraw_requested: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        store: ConfigStore,
        api: Arc<dyn Api>,
        shortener: Arc<dyn LinkShortener>,
        event_tx: Sender<AppEvent>,
    ) -> Self {
        let config = store.config().clone();
        let keys = KeyBindings::build(&config.keys);
        let views = initial_views(&config.initial_tabs, &keys);
        let mut session = Session::new();
        session.set_commands(command_names(), config.aliases.keys());

        Self {
            mode: Mode::Browse,
            keys,
            theme: Theme::from_config(&config),
            render_options: render_options(&config),
            filters: build_filters(&config),
            tabs: TabManager::new(views),
            editor: LineEditor::new(1, 80, config.tab_complete_mode),
            search: SearchState::default(),
            session,
            status: StatusLine::default(),
            api,
            shortener,
            scheduler: RefreshScheduler::spawn(event_tx.clone()),
            event_tx,
            decoder: KeyDecoder::new(),
            last_input: Instant::now(),
            layout: None,
            layout_error: None,
            layout_dirty: true,
            refresh_in_flight: false,
            reschedule_pending: false,
            awaiting_qreply: false,
            pending_bell: false,
            redraw_requested: false,
            should_quit: false,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        self.store.config()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Edit(_))
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.config().update_interval.max(1))
    }

    pub fn policy(&self) -> PostPolicy {
        let config = self.config();
        PostPolicy {
            long_dent: config.long_dent,
            length_override: config.length_override,
        }
    }

    /// Length limit in effect for the entry line.
    pub fn length_limit(&self) -> usize {
        match self.config().length_override {
            0 => self.api.length_limit(),
            limit => limit,
        }
    }

    pub fn layout_input(&self) -> LayoutInput {
        let config = self.config();
        LayoutInput {
            bordered: config.border,
            order: config.ui_order.clone(),
            notice_length: self.length_limit(),
        }
    }

    /// Context for planning a command against the active tab.
    pub fn command_context(&self) -> CommandContext<'_> {
        let kind = self.tabs.current().kind();
        CommandContext {
            notices: self
                .tabs
                .current()
                .view()
                .timeline()
                .map_or(&[][..], Timeline::notices),
            direct_view: kind.is_direct(),
            new_reply_mode: self.config().new_reply_mode,
            policy: self.policy(),
        }
    }

    /// Rebuild everything derived from the config after `/config` or
    /// `/alias` changed it.
    pub fn reload_config(&mut self) {
        let config = self.store.config().clone();
        self.keys = KeyBindings::build(&config.keys);
        self.theme = Theme::from_config(&config);
        self.render_options = render_options(&config);
        self.filters = build_filters(&config);
        self.editor.set_mode(config.tab_complete_mode);
        self.session
            .set_commands(command_names(), config.aliases.keys());
        for tab in self.tabs.iter_mut() {
            if let TabView::Help(help) = tab.view_mut() {
                *help = build_help(&self.keys);
            }
        }
        self.layout_dirty = true;
        self.rerender_all();
    }

    /// Take a freshly computed layout: size the editor and every buffer.
    pub fn apply_layout(&mut self, layout: ScreenLayout) {
        self.editor.resize(
            usize::from(layout.entry.height),
            usize::from(layout.entry.width),
        );
        self.layout = Some(layout);
        self.layout_error = None;
        self.rerender_all();
    }

    pub fn notice_width(&self) -> usize {
        self.layout
            .as_ref()
            .map_or(80, |layout| usize::from(layout.notices.width))
    }

    fn notice_height(&self) -> usize {
        self.layout
            .as_ref()
            .map_or(24, |layout| usize::from(layout.notices.height))
    }

    pub fn rerender_all(&mut self) {
        for index in 0..self.tabs.len() {
            self.rerender_tab(index);
        }
    }

    pub fn rerender_current(&mut self) {
        self.rerender_tab(self.tabs.current_index());
    }

    pub fn rerender_tab(&mut self, index: usize) {
        let width = self.notice_width();
        let height = self.notice_height();
        let options = &self.render_options;
        let Some(tab) = self.tabs.iter_mut().nth(index) else {
            return;
        };
        match tab.view_mut() {
            TabView::Timeline(timeline) => timeline.update_buffer(width, options),
            TabView::Help(help) => help.update_buffer(width),
        }
        tab.view_mut().buffer_mut().set_height(height);
    }

    pub fn help_view(&self) -> HelpView {
        build_help(&self.keys)
    }
}

fn render_options(config: &Config) -> RenderOptions {
    RenderOptions {
        compact: config.compact_notices,
        show_source: config.show_source,
        show_links: config.show_notice_links,
        site: site_root(&config.api_path),
    }
}

fn build_filters(config: &Config) -> Filters {
    Filters::new(&config.filters, config.filter_mode == FilterMode::Regex)
}

/// The site's web root, for notice links: the API path without `/api`.
pub fn site_root(api_path: &str) -> String {
    let trimmed = api_path.trim_end_matches('/');
    trimmed
        .strip_suffix("/api")
        .unwrap_or(trimmed)
        .to_string()
}

fn initial_views(list: &str, keys: &KeyBindings) -> Vec<TabView> {
    let mut views: Vec<TabView> = list
        .split('|')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| match ViewKind::parse_initial(entry) {
            Some(ViewKind::Help) => Some(TabView::Help(build_help(keys))),
            Some(kind) => Some(TabView::Timeline(Timeline::new(kind))),
            None => {
                warn!(entry, "ignoring unknown initial tab");
                None
            }
        })
        .collect();
    if views.is_empty() {
        views.push(TabView::Help(build_help(keys)));
    }
    views
}

/// Help page listing every command and the current key bindings.
pub fn build_help(keys: &KeyBindings) -> HelpView {
    let mut help = HelpView::new();
    help.heading("Commands");
    for (usage, description) in command_help_lines() {
        help.item(usage, description);
    }
    help.heading("Keys");
    for (action, bound) in keys.iter() {
        if bound.is_empty() {
            continue;
        }
        let labels: Vec<String> = bound.iter().map(|key| key_label(*key)).collect();
        help.item(labels.join(", "), action.name());
    }
    help
}
