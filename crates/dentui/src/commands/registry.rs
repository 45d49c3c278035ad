//! Command registry and metadata.
//!
//! Every slash command with its usage, arity and the status shown while
//! it runs. Used for parsing, arity validation, completion and the help
//! tab.

/// Specification for a single command.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub min_args: usize,
    /// `None` when trailing arguments are joined into free text.
    pub max_args: Option<usize>,
    /// Shown on the status line while the command runs.
    pub status: &'static str,
}

impl CommandSpec {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

macro_rules! command {
    ($name:literal, $usage:literal, $min:expr, $max:expr, $status:literal, $description:literal) => {
        CommandSpec {
            name: $name,
            usage: $usage,
            description: $description,
            min_args: $min,
            max_args: $max,
            status: $status,
        }
    };
}

pub const COMMANDS: &[CommandSpec] = &[
    command!("/reply", "/reply <n|user> [text]", 1, None, "Posting reply",
        "Reply to notice n (or mention a user). Without text the editor opens prefilled."),
    command!("/favourite", "/favourite <n>", 1, Some(1), "Favouriting notice",
        "Mark notice n as a favourite."),
    command!("/unfavourite", "/unfavourite <n>", 1, Some(1), "Unfavouriting notice",
        "Remove notice n from your favourites."),
    command!("/repeat", "/repeat <n>", 1, Some(1), "Repeating notice",
        "Repeat notice n to your subscribers."),
    command!("/direct", "/direct <n|user> <text>", 2, None, "Sending direct message",
        "Send a direct message to a user or the author of notice n."),
    command!("/delete", "/delete <n>", 1, Some(1), "Deleting notice",
        "Delete notice n (or your repeat of it)."),
    command!("/block", "/block <n|user>...", 1, None, "Blocking user",
        "Block one or more users."),
    command!("/unblock", "/unblock <n|user>...", 1, None, "Unblocking user",
        "Unblock one or more users."),
    command!("/user", "/user <n|user>", 1, Some(1), "Loading user timeline",
        "Open a user's timeline in a new tab."),
    command!("/context", "/context <n>", 1, Some(1), "Loading context",
        "Open the conversation notice n belongs to."),
    command!("/subscribe", "/subscribe <n|user>", 1, Some(1), "Subscribing to user",
        "Subscribe to a user."),
    command!("/unsubscribe", "/unsubscribe <n|user>", 1, Some(1), "Unsubscribing from user",
        "Unsubscribe from a user."),
    command!("/group", "/group <name>", 1, Some(1), "Loading group timeline",
        "Open a group's timeline in a new tab."),
    command!("/groupjoin", "/groupjoin <name>", 1, Some(1), "Joining group",
        "Join a group."),
    command!("/groupleave", "/groupleave <name>", 1, Some(1), "Leaving group",
        "Leave a group."),
    command!("/groupmember", "/groupmember <name>", 1, Some(1), "Checking group membership",
        "Check whether you are a member of a group."),
    command!("/tag", "/tag <name>", 1, Some(1), "Loading tag timeline",
        "Open a tag's timeline in a new tab."),
    command!("/sentdirects", "/sentdirects", 0, Some(0), "Loading sent direct messages",
        "Open the direct messages you sent."),
    command!("/favourites", "/favourites", 0, Some(0), "Loading favourites",
        "Open your favourites."),
    command!("/search", "/search <query>", 1, None, "Searching",
        "Open a tab with site search results."),
    command!("/home", "/home", 0, Some(0), "Loading home timeline",
        "Open the home timeline."),
    command!("/mentions", "/mentions", 0, Some(0), "Loading mentions",
        "Open your mentions."),
    command!("/directs", "/directs", 0, Some(0), "Loading direct messages",
        "Open received direct messages."),
    command!("/public", "/public", 0, Some(0), "Loading public timeline",
        "Open the public timeline."),
    command!("/config", "/config <key> <value>", 2, None, "Changing config",
        "Set a config option (key or key.subkey) and save it."),
    command!("/alias", "/alias <name> <expansion>", 2, None, "Aliasing command",
        "Define a command alias and save it."),
    command!("/link", "/link <n> [m|*]", 1, Some(2), "Opening link(s)",
        "Open link m (default 1, * for all) of notice n in the browser."),
    command!("/quote", "/quote <n>", 1, Some(1), "Quoting notice",
        "Open the editor with notice n quoted."),
    command!("/mute", "/mute <n>", 1, Some(1), "Muting conversation",
        "Hide the conversation notice n belongs to."),
    command!("/unmute", "/unmute <n>", 1, Some(1), "Unmuting conversation",
        "Show a muted conversation again."),
    command!("/help", "/help", 0, Some(0), "Opening help",
        "Show commands and key bindings."),
    command!("/quit", "/quit", 0, Some(0), "Quitting",
        "Exit dentui."),
];

pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

pub fn is_command(name: &str) -> bool {
    find(name).is_some()
}

pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|spec| spec.name)
}

/// `(usage, description)` pairs for the help tab.
pub fn command_help_lines() -> Vec<(&'static str, &'static str)> {
    COMMANDS
        .iter()
        .map(|spec| (spec.usage, spec.description))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_slashed() {
        let mut names: Vec<&str> = command_names().collect();
        assert!(names.iter().all(|name| name.starts_with('/')));
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn arity_bounds() {
        let reply = find("/reply").expect("reply");
        assert!(!reply.accepts(0));
        assert!(reply.accepts(1));
        assert!(reply.accepts(12));
        let link = find("/link").expect("link");
        assert!(link.accepts(2));
        assert!(!link.accepts(3));
        assert!(find("/home").expect("home").accepts(0));
        assert!(!find("/home").expect("home").accepts(1));
    }
}
