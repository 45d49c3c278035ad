//! Turning a submitted entry line into a command or a post.
//!
//! The grammar is forgiving on purpose: a stray leading `i` from a
//! quick-reply keypress is dropped, `/r1` is read as `/r 1`, `/Reply` as
//! `/reply`, aliases expand one level, and on a direct-message tab
//! `/reply` means `/direct`. Anything that still is not a command is
//! posted as a notice.

use std::collections::BTreeMap;

use super::registry::{command_names, is_command};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Command { name: String, args: Vec<String> },
    Post(String),
    Empty,
}

pub struct ParseContext<'a> {
    pub aliases: &'a BTreeMap<String, String>,
    /// The active tab shows direct messages.
    pub direct_view: bool,
}

impl ParseContext<'_> {
    fn is_alias(&self, token: &str) -> bool {
        self.aliases.contains_key(token)
    }

    fn is_known(&self, token: &str) -> bool {
        is_command(token) || self.is_alias(token)
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        command_names()
            .map(|name| -> &str { name })
            .chain(self.aliases.keys().map(String::as_str))
    }
}

/// An alias that is also the start of a command the token goes on to
/// spell (`/f` inside `/favoriteX`) is not a split point.
fn shadows_command(alias: &str, token: &str) -> bool {
    let Some(next) = token[alias.len()..].chars().next() else {
        return false;
    };
    let reach = alias.len() + next.len_utf8();
    command_names().any(|name| name.len() > alias.len() && name.starts_with(&token[..reach]))
}

/// Split `/favourite1` into `/favourite` and `1`, choosing the longest
/// known name the token starts with. Exact names are left alone so
/// `/directs` never becomes `/direct s`.
fn split_truncated(token: &str, ctx: &ParseContext) -> Option<(String, String)> {
    if ctx.is_known(token) {
        return None;
    }
    ctx.names()
        .filter(|name| token.len() > name.len() && token.starts_with(name))
        .filter(|name| is_command(name) || !shadows_command(name, token))
        .max_by_key(|name| name.len())
        .map(|name| (name.to_string(), token[name.len()..].to_string()))
}

/// Fix the case of a command or alias when exactly one name matches
/// case-insensitively.
fn correct_case(token: &str, ctx: &ParseContext) -> Option<String> {
    if ctx.is_known(token) {
        return None;
    }
    let lower = token.to_lowercase();
    let mut matches = ctx.names().filter(|name| name.to_lowercase() == lower);
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.to_string())
}

pub fn parse_input(input: &str, ctx: &ParseContext) -> Parsed {
    let trimmed = input.trim();
    let mut tokens: Vec<String> = trimmed
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    if tokens.is_empty() {
        return Parsed::Empty;
    }

    if let Some(rest) = tokens[0].strip_prefix('i') {
        if ctx.is_known(rest) {
            tokens[0] = rest.to_string();
        }
    }

    if let Some((name, remainder)) = split_truncated(&tokens[0], ctx) {
        tokens.splice(0..1, [name, remainder]);
    }
    if let Some(name) = correct_case(&tokens[0], ctx) {
        tokens[0] = name;
    }

    let mut expanded = false;
    if let Some(expansion) = ctx.aliases.get(&tokens[0]) {
        let mut replaced: Vec<String> = expansion
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        replaced.extend(tokens.drain(1..));
        tokens = replaced;
        expanded = true;
    }
    if tokens.is_empty() {
        return Parsed::Empty;
    }

    if ctx.direct_view && tokens[0] == "/reply" {
        tokens[0] = "/direct".to_string();
    }

    if is_command(&tokens[0]) {
        let name = tokens.remove(0);
        return Parsed::Command { name, args: tokens };
    }
    if expanded {
        Parsed::Post(tokens.join(" "))
    } else {
        Parsed::Post(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn aliases() -> BTreeMap<String, String> {
        [
            ("/r", "/reply"),
            ("/f", "/favourite"),
            ("/rt", "/repeat"),
            ("/hi", "hello there"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn parse(input: &str) -> Parsed {
        parse_in(input, false)
    }

    fn parse_in(input: &str, direct_view: bool) -> Parsed {
        let aliases = aliases();
        parse_input(
            input,
            &ParseContext {
                aliases: &aliases,
                direct_view,
            },
        )
    }

    fn command(name: &str, args: &[&str]) -> Parsed {
        Parsed::Command {
            name: name.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    #[test]
    fn plain_text_is_a_post() {
        assert_eq!(
            parse("  hello   world "),
            Parsed::Post("hello   world".to_string())
        );
        assert_eq!(parse("   "), Parsed::Empty);
    }

    #[test]
    fn commands_split_on_spaces() {
        assert_eq!(
            parse("/reply  3 nice   one"),
            command("/reply", &["3", "nice", "one"])
        );
        assert_eq!(parse("/home"), command("/home", &[]));
    }

    #[test]
    fn truncated_number_is_split_off() {
        assert_eq!(parse("/favourite1"), command("/favourite", &["1"]));
        assert_eq!(parse("/favoriteX"), Parsed::Post("/favoriteX".to_string()));
    }

    #[test]
    fn misspelt_command_is_posted_with_default_config() {
        let config = Config::default();
        let ctx = ParseContext {
            aliases: &config.aliases,
            direct_view: false,
        };
        assert_eq!(
            parse_input("/favoriteX", &ctx),
            Parsed::Post("/favoriteX".to_string())
        );
        assert_eq!(parse_input("/favourite1", &ctx), command("/favourite", &["1"]));
    }

    #[test]
    fn alias_is_not_split_inside_a_command_spelling() {
        assert_eq!(parse("/fav 3"), Parsed::Post("/fav 3".to_string()));
        assert_eq!(parse("/f4"), command("/favourite", &["4"]));
    }

    #[test]
    fn exact_names_are_not_split() {
        assert_eq!(parse("/directs"), command("/directs", &[]));
        assert_eq!(parse("/favourites"), command("/favourites", &[]));
    }

    #[test]
    fn aliases_split_and_expand() {
        assert_eq!(parse("/r1 thanks"), command("/reply", &["1", "thanks"]));
        assert_eq!(parse("/rt2"), command("/repeat", &["2"]));
        assert_eq!(parse("/f 4"), command("/favourite", &["4"]));
        assert_eq!(parse("/hi  all"), Parsed::Post("hello there all".to_string()));
    }

    #[test]
    fn leading_i_is_dropped_before_commands() {
        assert_eq!(parse("i/reply 2 ok"), command("/reply", &["2", "ok"]));
        assert_eq!(parse("i/r 2 ok"), command("/reply", &["2", "ok"]));
        assert_eq!(parse("is it on"), Parsed::Post("is it on".to_string()));
    }

    #[test]
    fn case_is_corrected() {
        assert_eq!(parse("/Home"), command("/home", &[]));
        assert_eq!(parse("/FAVOURITE 3"), command("/favourite", &["3"]));
    }

    #[test]
    fn reply_on_direct_tab_becomes_direct() {
        assert_eq!(
            parse_in("/reply 2 hi", true),
            command("/direct", &["2", "hi"])
        );
        assert_eq!(parse_in("/r 2 hi", true), command("/direct", &["2", "hi"]));
        assert_eq!(parse_in("/reply 2 hi", false), command("/reply", &["2", "hi"]));
    }
}
