//! Key names and the action keybinding table.
//!
//! Parses key names like "j", "pagedown" or "ctrl+l" from config and
//! builds the table mapping each logical action to the keys that trigger
//! it. User overrides come first; defaults fill in afterwards, skipping
//! any key the user already assigned elsewhere.

use std::collections::{BTreeMap, HashSet};

use tracing::warn;

use crate::input::Key;

macro_rules! actions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Action {
            $($variant),+
        }

        impl Action {
            /// Every action, in lookup order.
            pub const ALL: &'static [Action] = &[$(Action::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Action::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Action> {
                match name {
                    $($name => Some(Action::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

actions! {
    FirstPage => "firstpage",
    NewerPage => "newerpage",
    OlderPage => "olderpage",
    Refresh => "refresh",
    Input => "input",
    CommandInput => "commandinput",
    Search => "search",
    Quit => "quit",
    CloseTab => "closetab",
    Help => "help",
    NextTab => "nexttab",
    PrevTab => "prevtab",
    NextTabCycle => "nexttabcycle",
    PrevTabCycle => "prevtabcycle",
    TabSwapLeft => "tabswapleft",
    TabSwapRight => "tabswapright",
    QuickReply => "qreply",
    ChosenReply => "creply",
    ChosenReplyMode => "creplymode",
    ChosenFavourite => "cfav",
    ChosenUnfavourite => "cunfav",
    ChosenContext => "ccontext",
    ChosenUser => "cuser",
    ChosenRepeat => "crepeat",
    ChosenQuote => "cquote",
    ChosenDelete => "cdelete",
    ChosenNext => "cnext",
    ChosenPrev => "cprev",
    ChosenFirst => "cfirst",
    ChosenLast => "clast",
    NextMatch => "nextmatch",
    PrevMatch => "prevmatch",
    PauseToggle => "pausetoggle",
    PauseToggleAll => "pausetoggleall",
    ScrollUp => "scrollup",
    ScrollTop => "scrolltop",
    PageUp => "pageup",
    PageDown => "pagedown",
    ScrollDown => "scrolldown",
    ScrollBottom => "scrollbottom",
    ToggleNoticeLinks => "togglenoticelinks",
    Mute => "mute",
    Unmute => "unmute",
}

fn default_keys(action: Action) -> &'static [&'static str] {
    match action {
        Action::FirstPage => &["="],
        Action::NewerPage => &["left"],
        Action::OlderPage => &["right"],
        Action::Refresh => &["r"],
        Action::Input => &["i"],
        Action::CommandInput => &[":"],
        Action::Search => &["/"],
        Action::Quit => &["q"],
        Action::CloseTab => &["x"],
        Action::Help => &["h"],
        Action::NextTab => &[">"],
        Action::PrevTab => &["<"],
        Action::NextTabCycle => &["tab", "+"],
        Action::PrevTabCycle => &["backtab", "-"],
        Action::TabSwapLeft => &[","],
        Action::TabSwapRight => &["."],
        Action::QuickReply => &["l"],
        Action::ChosenReply => &["D"],
        Action::ChosenReplyMode => &["d"],
        Action::ChosenFavourite => &["f"],
        Action::ChosenUnfavourite => &["F"],
        Action::ChosenContext => &["c"],
        Action::ChosenUser => &["v"],
        Action::ChosenRepeat => &["e"],
        Action::ChosenQuote => &["E"],
        Action::ChosenDelete => &["#"],
        Action::ChosenNext => &["s"],
        Action::ChosenPrev => &["a"],
        Action::ChosenFirst => &["z"],
        Action::ChosenLast => &["Z"],
        Action::NextMatch => &["n"],
        Action::PrevMatch => &["N"],
        Action::PauseToggle => &["p"],
        Action::PauseToggleAll => &["P"],
        Action::ScrollUp => &["up", "k"],
        Action::ScrollTop => &["home", "g"],
        Action::PageUp => &["pageup", "b"],
        Action::PageDown => &["pagedown", "space"],
        Action::ScrollDown => &["down", "j"],
        Action::ScrollBottom => &["end", "G"],
        Action::ToggleNoticeLinks => &["L"],
        Action::Mute => &["m"],
        Action::Unmute => &["M"],
    }
}

/// Parse a key name from config into a `Key`.
///
/// Single characters map to themselves (case-sensitive). Named keys and
/// `ctrl+` chords are case-insensitive; curses-style `KEY_` prefixes and
/// caret notation (`^L`) are accepted too.
pub fn parse_key(input: &str) -> Option<Key> {
    let mut chars = input.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return match ch {
            '\t' => Some(Key::Tab),
            '\n' | '\r' => Some(Key::Enter),
            ch if ch.is_control() => None,
            ch => Some(Key::Char(ch)),
        };
    }

    let trimmed = input.trim().to_lowercase();
    if let Some(rest) = trimmed.strip_prefix('^') {
        return ctrl_key(rest);
    }
    let trimmed = trimmed.strip_prefix("key_").unwrap_or(&trimmed);

    let parts: Vec<&str> = trimmed
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    match parts.as_slice() {
        ["ctrl" | "control", key] => ctrl_key(key),
        ["shift", "tab"] => Some(Key::BackTab),
        [key] => named_key(key),
        _ => None,
    }
}

fn named_key(key: &str) -> Option<Key> {
    match key {
        "esc" | "escape" => Some(Key::Esc),
        "enter" | "return" => Some(Key::Enter),
        "tab" => Some(Key::Tab),
        "backtab" | "btab" => Some(Key::BackTab),
        "space" | "spacebar" => Some(Key::Char(' ')),
        "backspace" => Some(Key::Backspace),
        "delete" | "del" | "dc" => Some(Key::Delete),
        "insert" | "ic" => Some(Key::Insert),
        "up" => Some(Key::Up),
        "down" => Some(Key::Down),
        "left" => Some(Key::Left),
        "right" => Some(Key::Right),
        "home" => Some(Key::Home),
        "end" => Some(Key::End),
        "pageup" | "ppage" => Some(Key::PageUp),
        "pagedown" | "npage" => Some(Key::PageDown),
        _ => None,
    }
}

fn ctrl_key(key: &str) -> Option<Key> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return match key {
            "space" => Some(Key::Ctrl('@')),
            _ => None,
        };
    }
    match ch {
        'h' => Some(Key::Backspace),
        'i' => Some(Key::Tab),
        'j' | 'm' => Some(Key::Enter),
        '[' => Some(Key::Esc),
        '?' => Some(Key::Backspace),
        'a'..='z' | '@' | '\\' | ']' | '^' | '_' => Some(Key::Ctrl(ch)),
        _ => None,
    }
}

/// Human-readable label for help output.
pub fn key_label(key: Key) -> String {
    match key {
        Key::Char(' ') => "space".to_string(),
        Key::Char(ch) => ch.to_string(),
        Key::Ctrl(ch) => format!("ctrl+{ch}"),
        Key::Enter => "enter".to_string(),
        Key::Tab => "tab".to_string(),
        Key::BackTab => "shift+tab".to_string(),
        Key::Esc => "esc".to_string(),
        Key::Backspace => "backspace".to_string(),
        Key::Delete => "delete".to_string(),
        Key::Insert => "insert".to_string(),
        Key::Up => "up".to_string(),
        Key::Down => "down".to_string(),
        Key::Left => "left".to_string(),
        Key::Right => "right".to_string(),
        Key::Home => "home".to_string(),
        Key::End => "end".to_string(),
        Key::PageUp => "pageup".to_string(),
        Key::PageDown => "pagedown".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    bindings: Vec<(Action, Vec<Key>)>,
}

impl KeyBindings {
    pub fn defaults() -> Self {
        Self::build(&BTreeMap::new())
    }

    /// Merge user overrides (action name to key names) with the defaults.
    pub fn build(overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for name in overrides.keys() {
            if Action::from_name(name).is_none() {
                warn!(action = %name, "ignoring keybinding for unknown action");
            }
        }

        let mut bindings: Vec<(Action, Vec<Key>)> =
            Action::ALL.iter().map(|&action| (action, Vec::new())).collect();
        let mut assigned = HashSet::new();

        for (action, keys) in bindings.iter_mut() {
            let Some(names) = overrides.get(action.name()) else {
                continue;
            };
            for name in names {
                match parse_key(name) {
                    Some(key) => {
                        if !keys.contains(&key) {
                            keys.push(key);
                        }
                        assigned.insert(key);
                    }
                    None => warn!(action = action.name(), key = %name, "unrecognised key name"),
                }
            }
        }

        for (action, keys) in bindings.iter_mut() {
            for name in default_keys(*action) {
                let Some(key) = parse_key(name) else {
                    continue;
                };
                if assigned.contains(&key) || keys.contains(&key) {
                    continue;
                }
                keys.push(key);
            }
        }

        Self { bindings }
    }

    /// First action, in declaration order, bound to `key`.
    pub fn action_for(&self, key: Key) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }

    pub fn keys_for(&self, action: Action) -> &[Key] {
        self.bindings
            .iter()
            .find(|(candidate, _)| *candidate == action)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, &[Key])> {
        self.bindings
            .iter()
            .map(|(action, keys)| (*action, keys.as_slice()))
    }
}
