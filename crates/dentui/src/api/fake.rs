//! In-memory `Api` used by tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Api, ApiError, ApiResult, Group, Notice, Profile};
use crate::timeline::ViewKind;

#[derive(Default)]
pub struct FakeApi {
    pub limit: usize,
    pub timelines: Mutex<HashMap<String, Vec<Notice>>>,
    /// Ids whose destroy call fails with 403.
    pub forbidden: Mutex<Vec<u64>>,
    pub calls: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(1000),
            ..Self::default()
        }
    }

    pub fn with_timeline(self, kind: &ViewKind, notices: Vec<Notice>) -> Self {
        self.timelines
            .lock()
            .expect("lock")
            .insert(kind.title(), notices);
        self
    }

    pub fn forbid(&self, id: u64) {
        self.forbidden.lock().expect("lock").push(id);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("lock").push(call);
    }
}

impl Api for FakeApi {
    fn length_limit(&self) -> usize {
        self.limit
    }

    fn timeline(&self, kind: &ViewKind, page: u32, _count: u32) -> ApiResult<Vec<Notice>> {
        self.record(format!("timeline {} {page}", kind.title()));
        Ok(self
            .timelines
            .lock()
            .expect("lock")
            .get(&kind.title())
            .cloned()
            .unwrap_or_default())
    }

    fn post(&self, text: &str, in_reply_to: Option<u64>) -> ApiResult<Notice> {
        self.record(format!("post {text:?} {in_reply_to:?}"));
        let mut next_id = self.next_id.lock().expect("lock");
        *next_id += 1;
        Ok(Notice::fixture(*next_id, "me", text))
    }

    fn destroy(&self, id: u64) -> ApiResult<()> {
        self.record(format!("destroy {id}"));
        if self.forbidden.lock().expect("lock").contains(&id) {
            return Err(ApiError::new(403, "Forbidden"));
        }
        Ok(())
    }

    fn repeat(&self, id: u64) -> ApiResult<Notice> {
        self.record(format!("repeat {id}"));
        Ok(Notice::fixture(id + 1, "me", "repeat"))
    }

    fn favourite(&self, id: u64) -> ApiResult<()> {
        self.record(format!("favourite {id}"));
        Ok(())
    }

    fn unfavourite(&self, id: u64) -> ApiResult<()> {
        self.record(format!("unfavourite {id}"));
        Ok(())
    }

    fn send_direct(&self, screen_name: &str, text: &str) -> ApiResult<()> {
        self.record(format!("direct {screen_name} {text:?}"));
        Ok(())
    }

    fn user(&self, screen_name: &str) -> ApiResult<Profile> {
        self.record(format!("user {screen_name}"));
        if screen_name == "ghost" {
            return Err(ApiError::new(404, "User not found."));
        }
        Ok(Profile {
            id: 42,
            screen_name: screen_name.to_string(),
        })
    }

    fn subscribe(&self, screen_name: &str) -> ApiResult<()> {
        self.record(format!("subscribe {screen_name}"));
        Ok(())
    }

    fn unsubscribe(&self, screen_name: &str) -> ApiResult<()> {
        self.record(format!("unsubscribe {screen_name}"));
        Ok(())
    }

    fn block(&self, screen_name: &str) -> ApiResult<()> {
        self.record(format!("block {screen_name}"));
        Ok(())
    }

    fn unblock(&self, screen_name: &str) -> ApiResult<()> {
        self.record(format!("unblock {screen_name}"));
        Ok(())
    }

    fn group(&self, nickname: &str) -> ApiResult<Group> {
        self.record(format!("group {nickname}"));
        Ok(Group {
            id: 9,
            nickname: nickname.to_string(),
        })
    }

    fn join_group(&self, nickname: &str) -> ApiResult<()> {
        self.record(format!("join {nickname}"));
        Ok(())
    }

    fn leave_group(&self, nickname: &str) -> ApiResult<()> {
        self.record(format!("leave {nickname}"));
        Ok(())
    }

    fn is_group_member(&self, nickname: &str) -> ApiResult<bool> {
        self.record(format!("member {nickname}"));
        Ok(nickname == "rust")
    }
}
