//! Command execution.
//!
//! `plan` turns a parsed command into something the app can run: a job
//! for a worker thread, a tab to open, an editor session to start, a
//! local action, or a message for the status line. Argument resolution
//! (notice numbers, user names, repeats) happens here, against the
//! notices loaded in the active tab, so the app never inspects raw
//! arguments itself.
//!
//! Jobs only touch the `Api`. Their `Outcome` tells the app what to do
//! with the result (insert posted notices, drop a deleted one, open a
//! tab) so the same handling applies to every command.

mod post;
mod resolve;


use regex::Regex;
use std::sync::OnceLock;

use crate::api::{Api, ApiResult, Notice};
use crate::config::LongDent;
use crate::timeline::ViewKind;

use super::registry::find;
pub use post::split_long_notice;
use resolve::{group_name, resolve_notice, resolve_user, tag_name};

/// What a finished job asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Message(String),
    /// Newly created notices, newest first.
    Posted(Vec<Notice>),
    Deleted(u64),
    OpenTab(ViewKind),
}

pub type Job = Box<dyn FnOnce(&dyn Api) -> ApiResult<Outcome> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostPolicy {
    pub long_dent: LongDent,
    /// Overrides the server's length limit when non-zero.
    pub length_override: usize,
}

impl PostPolicy {
    fn limit(&self, api: &dyn Api) -> usize {
        if self.length_override > 0 {
            self.length_override
        } else {
            api.length_limit()
        }
    }
}

pub struct CommandContext<'a> {
    /// Notices on the active tab's current page.
    pub notices: &'a [Notice],
    pub direct_view: bool,
    pub new_reply_mode: bool,
    pub policy: PostPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChoice {
    Nth(usize),
    All,
}

/// Commands the app carries out itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Config { key: String, value: String },
    Alias { name: String, expansion: String },
    Link { urls: Vec<String> },
    Mute(u64),
    Unmute(u64),
    Help,
    Quit,
}

pub enum Plan {
    Run { status: &'static str, job: Job },
    Open { status: &'static str, kind: ViewKind },
    /// Start the editor; the submitted text is posted with these settings.
    Compose {
        status: &'static str,
        initial: String,
        in_reply_to: Option<u64>,
        dup_first_word: bool,
    },
    Local(LocalCommand),
    Message(String),
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Run { status, .. } => f.debug_struct("Run").field("status", status).finish(),
            Plan::Open { status, kind } => f
                .debug_struct("Open")
                .field("status", status)
                .field("kind", kind)
                .finish(),
            Plan::Compose {
                status,
                initial,
                in_reply_to,
                dup_first_word,
            } => f
                .debug_struct("Compose")
                .field("status", status)
                .field("initial", initial)
                .field("in_reply_to", in_reply_to)
                .field("dup_first_word", dup_first_word)
                .finish(),
            Plan::Local(local) => f.debug_tuple("Local").field(local).finish(),
            Plan::Message(message) => f.debug_tuple("Message").field(message).finish(),
        }
    }
}

fn run<F>(status: &'static str, job: F) -> Plan
where
    F: FnOnce(&dyn Api) -> ApiResult<Outcome> + Send + 'static,
{
    Plan::Run {
        status,
        job: Box::new(job),
    }
}

/// Plan posting free text typed into the entry line.
pub fn plan_post(text: &str, ctx: &CommandContext) -> Plan {
    let text = text.trim().to_string();
    if text.is_empty() {
        return Plan::Message("Nothing to post.".to_string());
    }
    let policy = ctx.policy;
    run("Posting notice", move |api| {
        post::post_job(api, &text, None, false, policy)
    })
}

/// Job posting text submitted from a `Plan::Compose` editor session.
pub fn compose_job(
    text: String,
    in_reply_to: Option<u64>,
    dup_first_word: bool,
    policy: PostPolicy,
) -> Job {
    Box::new(move |api| post::post_job(api, &text, in_reply_to, dup_first_word, policy))
}

pub fn plan(name: &str, args: &[String], ctx: &CommandContext) -> Plan {
    let Some(spec) = find(name) else {
        return Plan::Message(format!("Unknown command: {name}"));
    };
    if !spec.accepts(args.len()) {
        return Plan::Message(format!("Usage: {}", spec.usage));
    }
    match plan_command(name, args, ctx, spec.status) {
        Ok(plan) => plan,
        Err(message) => Plan::Message(message),
    }
}

fn plan_command(
    name: &str,
    args: &[String],
    ctx: &CommandContext,
    status: &'static str,
) -> Result<Plan, String> {
    let open = |kind: ViewKind| Ok(Plan::Open { status, kind });
    let rest = |from: usize| args[from..].join(" ");
    let plan = match name {
        "/reply" => return plan_reply(args, ctx, status),
        "/favourite" => {
            let id = resolve_notice(ctx, &args[0])?.original().id;
            run(status, move |api| api.favourite(id).map(|()| Outcome::Done))
        }
        "/unfavourite" => {
            let id = resolve_notice(ctx, &args[0])?.original().id;
            run(status, move |api| api.unfavourite(id).map(|()| Outcome::Done))
        }
        "/repeat" => {
            let id = resolve_notice(ctx, &args[0])?.original().id;
            run(status, move |api| {
                api.repeat(id).map(|notice| Outcome::Posted(vec![notice]))
            })
        }
        "/direct" => {
            let user = resolve_user(ctx, &args[0])?;
            let text = rest(1);
            run(status, move |api| {
                api.send_direct(&user, &text)
                    .map(|()| Outcome::Message(format!("Direct message sent to @{user}.")))
            })
        }
        "/delete" => {
            let target = resolve_notice(ctx, &args[0])?.clone();
            run(status, move |api| delete_job(api, &target))
        }
        "/block" | "/unblock" => {
            let users = args
                .iter()
                .map(|arg| resolve_user(ctx, arg))
                .collect::<Result<Vec<_>, _>>()?;
            let blocking = name == "/block";
            run(status, move |api| {
                for user in &users {
                    if blocking {
                        api.block(user)?;
                    } else {
                        api.unblock(user)?;
                    }
                }
                Ok(Outcome::Done)
            })
        }
        "/user" => {
            let user = resolve_user(ctx, &args[0])?;
            run(status, move |api| {
                let profile = api.user(&user)?;
                Ok(Outcome::OpenTab(ViewKind::User {
                    screen_name: profile.screen_name,
                    user_id: Some(profile.id),
                }))
            })
        }
        "/context" => {
            let notice = resolve_notice(ctx, &args[0])?.original();
            return open(ViewKind::Context {
                conversation_id: notice.statusnet_conversation_id,
                notice_id: notice.id,
            });
        }
        "/subscribe" => {
            let user = resolve_user(ctx, &args[0])?;
            run(status, move |api| api.subscribe(&user).map(|()| Outcome::Done))
        }
        "/unsubscribe" => {
            let user = resolve_user(ctx, &args[0])?;
            run(status, move |api| api.unsubscribe(&user).map(|()| Outcome::Done))
        }
        "/group" => {
            let nickname = group_name(&args[0])?;
            run(status, move |api| {
                let group = api.group(&nickname)?;
                Ok(Outcome::OpenTab(ViewKind::Group {
                    nickname: group.nickname,
                    group_id: Some(group.id),
                }))
            })
        }
        "/groupjoin" => {
            let nickname = group_name(&args[0])?;
            run(status, move |api| api.join_group(&nickname).map(|()| Outcome::Done))
        }
        "/groupleave" => {
            let nickname = group_name(&args[0])?;
            run(status, move |api| api.leave_group(&nickname).map(|()| Outcome::Done))
        }
        "/groupmember" => {
            let nickname = group_name(&args[0])?;
            run(status, move |api| {
                let message = if api.is_group_member(&nickname)? {
                    format!("You are a member of !{nickname}.")
                } else {
                    format!("You are not a member of !{nickname}.")
                };
                Ok(Outcome::Message(message))
            })
        }
        "/tag" => return open(ViewKind::Tag { tag: tag_name(&args[0])? }),
        "/sentdirects" => return open(ViewKind::SentDirect),
        "/favourites" => return open(ViewKind::Favourites),
        "/search" => return open(ViewKind::Search { query: rest(0) }),
        "/home" => return open(ViewKind::Home),
        "/mentions" => return open(ViewKind::Mentions),
        "/directs" => return open(ViewKind::Direct),
        "/public" => return open(ViewKind::Public),
        "/quote" => {
            let notice = resolve_notice(ctx, &args[0])?.original();
            Plan::Compose {
                status,
                initial: quote_text(notice),
                in_reply_to: Some(notice.id),
                dup_first_word: false,
            }
        }
        "/config" => Plan::Local(LocalCommand::Config {
            key: args[0].clone(),
            value: rest(1),
        }),
        "/alias" => Plan::Local(LocalCommand::Alias {
            name: args[0].clone(),
            expansion: rest(1),
        }),
        "/link" => {
            let notice = resolve_notice(ctx, &args[0])?.original();
            let choice = match args.get(1).map(String::as_str) {
                None => LinkChoice::Nth(1),
                Some("*") => LinkChoice::All,
                Some(token) => match token.parse::<usize>() {
                    Ok(n) if n > 0 => LinkChoice::Nth(n),
                    _ => return Err("Usage: /link <n> [m|*]".to_string()),
                },
            };
            let urls = select_links(&notice.text, choice);
            if urls.is_empty() {
                return Err("No matching link(s) found.".to_string());
            }
            Plan::Local(LocalCommand::Link { urls })
        }
        "/mute" | "/unmute" => {
            let notice = resolve_notice(ctx, &args[0])?.original();
            let Some(conversation) = notice.statusnet_conversation_id else {
                return Err("This site does not report conversation ids.".to_string());
            };
            if name == "/mute" {
                Plan::Local(LocalCommand::Mute(conversation))
            } else {
                Plan::Local(LocalCommand::Unmute(conversation))
            }
        }
        "/help" => Plan::Local(LocalCommand::Help),
        "/quit" => Plan::Local(LocalCommand::Quit),
        other => return Err(format!("Unknown command: {other}")),
    };
    Ok(plan)
}

fn plan_reply(args: &[String], ctx: &CommandContext, status: &'static str) -> Result<Plan, String> {
    let target = &args[0];
    let text = args[1..].join(" ");
    let policy = ctx.policy;

    if target.parse::<usize>().is_err() {
        // Replying to a user name is a mention.
        let user = resolve_user(ctx, target)?;
        if text.is_empty() {
            return Ok(Plan::Compose {
                status,
                initial: format!("@{user} "),
                in_reply_to: None,
                dup_first_word: true,
            });
        }
        let status_text = format!("@{user} {text}");
        return Ok(run(status, move |api| {
            post::post_job(api, &status_text, None, true, policy)
        }));
    }

    let notice = resolve_notice(ctx, target)?.original();
    let author = notice.author().to_string();
    let id = notice.id;
    let dup_first_word = !ctx.new_reply_mode;
    if text.is_empty() {
        let initial = if ctx.new_reply_mode {
            String::new()
        } else {
            format!("@{author} ")
        };
        return Ok(Plan::Compose {
            status,
            initial,
            in_reply_to: Some(id),
            dup_first_word,
        });
    }
    let status_text = if ctx.new_reply_mode {
        text
    } else {
        format!("@{author} {text}")
    };
    Ok(run(status, move |api| {
        post::post_job(api, &status_text, Some(id), dup_first_word, policy)
    }))
}

/// Delete `target`, falling back to the repeated notice when the
/// service refuses to delete a repeat the user does not own.
///
/// Some GNU social servers only honour a delete on the second request,
/// so the destroy is always issued once more and its result ignored.
fn delete_job(api: &dyn Api, target: &Notice) -> ApiResult<Outcome> {
    let outcome = match api.destroy(target.id) {
        Ok(()) => Outcome::Deleted(target.id),
        Err(err) if err.is_forbidden() => {
            if target.is_repeat() {
                api.destroy(target.original().id)?;
                Outcome::Deleted(target.id)
            } else {
                Outcome::Message("You cannot delete others' notices.".to_string())
            }
        }
        Err(err) => return Err(err),
    };
    if let Err(err) = api.destroy(target.id) {
        tracing::debug!(id = target.id, %err, "second destroy failed");
    }
    Ok(outcome)
}

fn group_to_tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(^|\W)!(\w+)").ok())
        .as_ref()
}

/// "RD @author text", with group references turned into tags so the
/// quote is not delivered to the groups again.
pub fn quote_text(notice: &Notice) -> String {
    let base = format!("RD @{} {}", notice.author(), notice.text);
    match group_to_tag_pattern() {
        Some(pattern) => pattern.replace_all(&base, "${1}#${2}").into_owned(),
        None => base,
    }
}

fn link_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"(?i)\b(?:https?|ftp)://[^\s<>"]+"#).ok())
        .as_ref()
}

pub fn links_in(text: &str) -> Vec<String> {
    link_pattern()
        .map(|pattern| {
            pattern
                .find_iter(text)
                .map(|found| found.as_str().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn select_links(text: &str, choice: LinkChoice) -> Vec<String> {
    let links = links_in(text);
    match choice {
        LinkChoice::All => {
            let mut unique: Vec<String> = Vec::new();
            for link in links {
                if !unique.contains(&link) {
                    unique.push(link);
                }
            }
            unique
        }
        LinkChoice::Nth(n) => links.into_iter().nth(n - 1).into_iter().collect(),
    }
}
