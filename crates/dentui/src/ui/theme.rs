//! Colour scheme resolution.
//!
//! Config colour fields name a foreground and background ("cyan",
//! "brown", "none"...). The theme turns them into ratatui styles once at
//! startup; with colours disabled everything is plain except the few
//! places that need reverse video to stay readable.

use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

use crate::config::Config;
use crate::timeline::Role;

const RAINBOW: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Blue,
    Color::Magenta,
    Color::Cyan,
];

#[derive(Debug, Clone, Default)]
pub struct Theme {
    enabled: bool,
    styles: HashMap<String, Style>,
    user_rainbow: bool,
    group_rainbow: bool,
    tag_rainbow: bool,
}

/// Map a colour name to a terminal colour; `None` keeps the terminal default.
pub fn parse_colour(name: &str) -> Option<Color> {
    let colour = match name.trim().to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "brown" | "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Gray,
        "light_red" => Color::LightRed,
        "light_green" => Color::LightGreen,
        "light_yellow" => Color::LightYellow,
        "light_blue" => Color::LightBlue,
        "light_magenta" => Color::LightMagenta,
        "light_cyan" => Color::LightCyan,
        _ => return None,
    };
    Some(colour)
}

/// Stable colour for an entity name, ignoring its sigil and case.
pub fn rainbow_colour(text: &str) -> Color {
    let name = text.trim_start_matches(['@', '!', '#']).to_lowercase();
    let sum = name.bytes().fold(0usize, |acc, byte| acc.wrapping_add(usize::from(byte)));
    RAINBOW[sum % RAINBOW.len()]
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        let styles = config
            .colours
            .iter()
            .map(|(field, pair)| {
                let mut style = Style::default();
                if let Some(fg) = parse_colour(&pair.fg) {
                    style = style.fg(fg);
                }
                if let Some(bg) = parse_colour(&pair.bg) {
                    style = style.bg(bg);
                }
                (field.clone(), style)
            })
            .collect();
        Self {
            enabled: config.enable_colours,
            styles,
            user_rainbow: config.user_rainbow,
            group_rainbow: config.group_rainbow,
            tag_rainbow: config.tag_rainbow,
        }
    }

    pub fn field(&self, name: &str) -> Style {
        if !self.enabled {
            return Style::default();
        }
        self.styles.get(name).copied().unwrap_or_default()
    }

    /// Style for a field that must stand out even without colours.
    fn marked(&self, name: &str) -> Style {
        if self.enabled {
            self.field(name)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        }
    }

    pub fn statusbar(&self) -> Style {
        self.marked("statusbar")
    }

    pub fn warning(&self) -> Style {
        self.marked("warning")
    }

    pub fn tabbar(&self) -> Style {
        self.field("tabbar")
    }

    pub fn tabbar_active(&self) -> Style {
        self.marked("tabbar_active").add_modifier(Modifier::BOLD)
    }

    pub fn search_highlight(&self) -> Style {
        self.marked("search_highlight")
    }

    pub fn pause_line(&self) -> Style {
        self.marked("pause_line")
    }

    pub fn role(&self, role: Role, text: &str) -> Style {
        let rainbow = match role {
            Role::Username => self.user_rainbow,
            Role::Group => self.group_rainbow,
            Role::Tag => self.tag_rainbow,
            _ => false,
        };
        if self.enabled && rainbow {
            return Style::default().fg(rainbow_colour(text));
        }
        let field = match role {
            Role::Plain => "none",
            Role::Index => "notice_count",
            Role::Selector => "selector",
            Role::Username => "username",
            Role::Group => "group",
            Role::Tag => "tag",
            Role::Link => "notice_link",
            Role::Time => "time",
            Role::Source => "source",
            Role::Notice => "notice",
            Role::Heading => "profile_title",
        };
        self.field(field)
    }
}
