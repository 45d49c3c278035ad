//! Per-run session context.
//!
//! Owns what the client learns while running: user, group and tag names
//! seen in timelines (for completion), muted conversations and the list
//! of command names. Created once at startup, before the first refresh,
//! and passed explicitly to whoever needs it.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::api::Notice;
use crate::editor::Source;

#[derive(Debug, Clone, Default)]
pub struct Session {
    users: BTreeSet<String>,
    groups: BTreeSet<String>,
    tags: BTreeSet<String>,
    muted: BTreeSet<u64>,
    commands: Vec<String>,
}

fn entity_patterns() -> &'static [(char, Option<Regex>); 3] {
    static PATTERNS: OnceLock<[(char, Option<Regex>); 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            ('@', Regex::new(r"(?:^|\W)@(\w+)").ok()),
            ('!', Regex::new(r"(?:^|\W)!(\w+)").ok()),
            ('#', Regex::new(r"(?:^|\W)#(\w+)").ok()),
        ]
    })
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the command list from known commands plus configured aliases.
    pub fn set_commands<'a, 'b>(
        &mut self,
        known: impl IntoIterator<Item = &'a str>,
        aliases: impl IntoIterator<Item = &'b String>,
    ) {
        let mut commands: Vec<String> = known.into_iter().map(str::to_string).collect();
        for alias in aliases {
            if !commands.contains(alias) {
                commands.push(alias.clone());
            }
        }
        self.commands = commands;
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Record authors, mentions, groups and tags from fetched notices.
    pub fn learn_from(&mut self, notices: &[Notice]) {
        for notice in notices {
            for item in [notice, notice.original()] {
                let author = item.author();
                if !author.is_empty() {
                    self.users.insert(author.to_string());
                }
                if let Some(name) = item.in_reply_to_screen_name.as_deref() {
                    self.users.insert(name.to_string());
                }
                for (sigil, pattern) in entity_patterns() {
                    let Some(pattern) = pattern else { continue };
                    let target = match *sigil {
                        '@' => &mut self.users,
                        '!' => &mut self.groups,
                        _ => &mut self.tags,
                    };
                    for capture in pattern.captures_iter(&item.text) {
                        if let Some(name) = capture.get(1) {
                            target.insert(name.as_str().to_string());
                        }
                    }
                }
            }
        }
    }

    fn listed(set: &BTreeSet<String>) -> Option<Vec<String>> {
        (!set.is_empty()).then(|| set.iter().cloned().collect())
    }

    /// Completion candidates, `None` when nothing has been learned yet.
    pub fn candidates(&self, source: Source) -> Option<Vec<String>> {
        match source {
            Source::Users => Self::listed(&self.users),
            Source::Groups => Self::listed(&self.groups),
            Source::Tags => Self::listed(&self.tags),
            Source::Commands => (!self.commands.is_empty()).then(|| self.commands.clone()),
        }
    }

    /// Mute a conversation. False when it already was.
    pub fn mute(&mut self, conversation: u64) -> bool {
        self.muted.insert(conversation)
    }

    /// Unmute a conversation. False when it was not muted.
    pub fn unmute(&mut self, conversation: u64) -> bool {
        self.muted.remove(&conversation)
    }

    pub fn is_muted(&self, notice: &Notice) -> bool {
        notice
            .original()
            .statusnet_conversation_id
            .or(notice.statusnet_conversation_id)
            .is_some_and(|id| self.muted.contains(&id))
    }
}
