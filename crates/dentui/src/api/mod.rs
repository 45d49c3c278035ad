//! Microblogging service access.
//!
//! `Api` is the seam between the client and the network: the HTTP
//! implementation talks to a StatusNet/GNU social compatible REST API,
//! tests use an in-memory fake. Calls are blocking and run on worker
//! threads.

mod http;
mod notice;
mod shorten;

#[cfg(test)]
pub mod fake;

pub use http::HttpApi;
pub use notice::{Notice, UserRef};
pub use shorten::{IsGd, LinkShortener};

use thiserror::Error;

use crate::timeline::ViewKind;

/// Remote call failure. Transport failures use code 0.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {code}: {message}")]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(0, message)
    }

    pub fn is_forbidden(&self) -> bool {
        self.code == 403
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: u64,
    pub screen_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: u64,
    pub nickname: String,
}

pub trait Api: Send + Sync {
    /// Maximum notice length reported by the server; 0 means unlimited.
    fn length_limit(&self) -> usize;

    fn timeline(&self, kind: &ViewKind, page: u32, count: u32) -> ApiResult<Vec<Notice>>;

    fn post(&self, text: &str, in_reply_to: Option<u64>) -> ApiResult<Notice>;
    fn destroy(&self, id: u64) -> ApiResult<()>;
    fn repeat(&self, id: u64) -> ApiResult<Notice>;
    fn favourite(&self, id: u64) -> ApiResult<()>;
    fn unfavourite(&self, id: u64) -> ApiResult<()>;

    fn send_direct(&self, screen_name: &str, text: &str) -> ApiResult<()>;

    fn user(&self, screen_name: &str) -> ApiResult<Profile>;
    fn subscribe(&self, screen_name: &str) -> ApiResult<()>;
    fn unsubscribe(&self, screen_name: &str) -> ApiResult<()>;
    fn block(&self, screen_name: &str) -> ApiResult<()>;
    fn unblock(&self, screen_name: &str) -> ApiResult<()>;

    fn group(&self, nickname: &str) -> ApiResult<Group>;
    fn join_group(&self, nickname: &str) -> ApiResult<()>;
    fn leave_group(&self, nickname: &str) -> ApiResult<()>;
    fn is_group_member(&self, nickname: &str) -> ApiResult<bool>;
}
