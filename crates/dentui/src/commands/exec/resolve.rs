//! Argument resolution against the active tab's notices.

use super::CommandContext;
use crate::api::Notice;

/// Look up a 1-based notice number on the current page.
pub(super) fn resolve_notice<'a>(ctx: &CommandContext<'a>, token: &str) -> Result<&'a Notice, String> {
    let number: usize = token
        .parse()
        .map_err(|_| format!("'{token}' is not a notice number."))?;
    number
        .checked_sub(1)
        .and_then(|index| ctx.notices.get(index))
        .ok_or_else(|| format!("There is no notice {number} on this page."))
}

/// A user name, or the author of notice `n` when the token is a number.
/// On a direct-message tab that is the sender; elsewhere repeats resolve
/// to the original author.
pub(super) fn resolve_user(ctx: &CommandContext, token: &str) -> Result<String, String> {
    if token.parse::<usize>().is_ok() {
        let notice = resolve_notice(ctx, token)?;
        let author = if ctx.direct_view {
            notice.author()
        } else {
            notice.original().author()
        };
        if author.is_empty() {
            return Err(format!("Notice {token} has no author."));
        }
        return Ok(author.to_string());
    }
    strip_sigil(token, '@', "user")
}

pub(super) fn group_name(token: &str) -> Result<String, String> {
    strip_sigil(token, '!', "group")
}

pub(super) fn tag_name(token: &str) -> Result<String, String> {
    strip_sigil(token, '#', "tag")
}

fn strip_sigil(token: &str, sigil: char, what: &str) -> Result<String, String> {
    let name = token.strip_prefix(sigil).unwrap_or(token);
    if name.is_empty() {
        return Err(format!("Missing {what} name."));
    }
    Ok(name.to_string())
}
