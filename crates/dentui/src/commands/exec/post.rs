use std::mem;

use super::{Outcome, PostPolicy};
use crate::api::{Api, ApiResult};
use crate::config::LongDent;

/// Fit `text` into notices of at most `limit` chars.
///
/// `Split` breaks on spaces, hard-splitting words longer than a notice.
/// With `dup_first_word` a leading `@mention` starts every continuation
/// so each part still reaches the same user. A limit of 0 means the
/// server accepts any length.
pub fn split_long_notice(
    text: &str,
    limit: usize,
    mode: LongDent,
    dup_first_word: bool,
) -> Vec<String> {
    if limit == 0 || text.chars().count() <= limit {
        return vec![text.to_string()];
    }
    match mode {
        LongDent::AsIs => vec![text.to_string()],
        LongDent::Truncate => vec![text.chars().take(limit).collect()],
        LongDent::Split => split_words(text, limit, dup_first_word),
    }
}

fn split_words(text: &str, limit: usize, dup_first_word: bool) -> Vec<String> {
    let words: Vec<&str> = text.split(' ').filter(|word| !word.is_empty()).collect();
    let continuation = words
        .first()
        .filter(|word| dup_first_word && word.starts_with('@'))
        .map(|word| format!("{word} "))
        .filter(|prefix| prefix.chars().count() < limit)
        .unwrap_or_default();

    let mut parts = Vec::new();
    let mut current = String::new();
    // Nothing but the continuation prefix has been added to `current`.
    let mut blank = true;

    for word in words {
        let mut rest: Vec<char> = word.chars().collect();
        while !rest.is_empty() {
            let used = current.chars().count();
            let sep = usize::from(!current.is_empty() && !current.ends_with(' '));
            if used + sep + rest.len() <= limit {
                if sep == 1 {
                    current.push(' ');
                }
                current.extend(rest.drain(..));
                blank = false;
            } else if !blank {
                parts.push(mem::replace(&mut current, continuation.clone()));
                blank = true;
            } else {
                let room = limit - used - sep;
                if sep == 1 {
                    current.push(' ');
                }
                current.extend(rest.drain(..room));
                parts.push(mem::replace(&mut current, continuation.clone()));
            }
        }
    }
    if !blank {
        parts.push(current);
    }
    parts
}

pub(super) fn post_job(
    api: &dyn Api,
    text: &str,
    in_reply_to: Option<u64>,
    dup_first_word: bool,
    policy: PostPolicy,
) -> ApiResult<Outcome> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Outcome::Done);
    }
    let limit = policy.limit(api);
    let mut posted = Vec::new();
    for part in split_long_notice(text, limit, policy.long_dent, dup_first_word) {
        posted.push(api.post(&part, in_reply_to)?);
    }
    posted.reverse();
    Ok(Outcome::Posted(posted))
}
