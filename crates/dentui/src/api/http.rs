use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{Api, ApiError, ApiResult, Group, Notice, Profile, UserRef};
use crate::timeline::ViewKind;

const SOURCE: &str = "dentui";
const CONTEXT_HOPS: usize = 20;

/// Blocking client for the Twitter-compatible StatusNet REST API.
pub struct HttpApi {
    client: Client,
    base: String,
    username: String,
    password: String,
    user_id: u64,
    length_limit: usize,
}

#[derive(Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    from_user: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    source: String,
}

impl From<SearchHit> for Notice {
    fn from(hit: SearchHit) -> Self {
        Notice {
            id: hit.id,
            text: hit.text,
            user: Some(UserRef {
                screen_name: hit.from_user,
                id: None,
            }),
            sender: None,
            recipient: None,
            retweeted_status: None,
            statusnet_conversation_id: None,
            in_reply_to_status_id: None,
            in_reply_to_screen_name: None,
            created_at: hit.created_at,
            source: hit.source,
            favorited: false,
        }
    }
}

impl HttpApi {
    /// Verify credentials and read the server's notice length limit.
    pub fn connect(api_path: &str, username: &str, password: &str) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("dentui/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::transport(err.to_string()))?;
        let mut api = Self {
            client,
            base: api_path.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            user_id: 0,
            length_limit: 0,
        };

        let me = api.get("account/verify_credentials.json", &[])?;
        api.user_id = me.get("id").and_then(as_u64).unwrap_or(0);

        // Older servers lack the config endpoint; treat that as unlimited.
        if let Ok(config) = api.get("statusnet/config.json", &[]) {
            api.length_limit = config
                .pointer("/site/textlimit")
                .and_then(as_u64)
                .unwrap_or(0) as usize;
        }
        info!(
            base = %api.base,
            user = %api.username,
            length_limit = api.length_limit,
            "connected"
        );
        Ok(api)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Value> {
        debug!(path, "GET");
        self.send(self.client.get(self.url(path)).query(query))
    }

    fn post_form(&self, path: &str, form: &[(&str, String)]) -> ApiResult<Value> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).form(form))
    }

    fn send(&self, request: RequestBuilder) -> ApiResult<Value> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .map_err(|err| ApiError::transport(err.to_string()))?;
        let status = response.status();
        let body: Value = response.json().unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".to_string());
        Err(ApiError::new(status.as_u16(), message))
    }

    fn notices(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Vec<Notice>> {
        let value = self.get(path, query)?;
        parse(value)
    }

    fn conversation(&self, notice_id: u64) -> ApiResult<Vec<Notice>> {
        let mut chain = Vec::new();
        let mut next = Some(notice_id);
        while let Some(id) = next {
            if chain.len() >= CONTEXT_HOPS {
                break;
            }
            let notice: Notice = parse(self.get(&format!("statuses/show/{id}.json"), &[])?)?;
            next = notice.in_reply_to_status_id;
            chain.push(notice);
        }
        Ok(chain)
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|text| text.parse().ok()))
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|err| ApiError::transport(format!("unexpected response: {err}")))
}

impl Api for HttpApi {
    fn length_limit(&self) -> usize {
        self.length_limit
    }

    fn timeline(&self, kind: &ViewKind, page: u32, count: u32) -> ApiResult<Vec<Notice>> {
        let paging = vec![("page", page.to_string()), ("count", count.to_string())];
        match kind {
            ViewKind::Home => self.notices("statuses/home_timeline.json", &paging),
            ViewKind::Mentions => self.notices("statuses/mentions.json", &paging),
            ViewKind::Direct => self.notices("direct_messages.json", &paging),
            ViewKind::SentDirect => self.notices("direct_messages/sent.json", &paging),
            ViewKind::Public => self.notices("statuses/public_timeline.json", &paging),
            ViewKind::Favourites => self.notices("favorites.json", &[("page", page.to_string())]),
            ViewKind::User { screen_name, .. } => {
                let mut query = paging;
                query.push(("screen_name", screen_name.clone()));
                self.notices("statuses/user_timeline.json", &query)
            }
            ViewKind::Group { nickname, .. } => {
                self.notices(&format!("statusnet/groups/timeline/{nickname}.json"), &paging)
            }
            ViewKind::Tag { tag } => {
                self.notices(&format!("statusnet/tags/timeline/{tag}.json"), &paging)
            }
            ViewKind::Search { query } => {
                let params = [
                    ("q", query.clone()),
                    ("page", page.to_string()),
                    ("rpp", count.to_string()),
                ];
                let results: SearchResults = parse(self.get("search.json", &params)?)?;
                Ok(results.results.into_iter().map(Notice::from).collect())
            }
            ViewKind::Context {
                conversation_id: Some(conversation),
                ..
            } => self.notices(&format!("statusnet/conversation/{conversation}.json"), &paging),
            ViewKind::Context {
                conversation_id: None,
                notice_id,
            } => self.conversation(*notice_id),
            ViewKind::Help => Ok(Vec::new()),
        }
    }

    fn post(&self, text: &str, in_reply_to: Option<u64>) -> ApiResult<Notice> {
        let mut form = vec![("status", text.to_string()), ("source", SOURCE.to_string())];
        if let Some(id) = in_reply_to {
            form.push(("in_reply_to_status_id", id.to_string()));
        }
        parse(self.post_form("statuses/update.json", &form)?)
    }

    fn destroy(&self, id: u64) -> ApiResult<()> {
        self.post_form(&format!("statuses/destroy/{id}.json"), &[])?;
        Ok(())
    }

    fn repeat(&self, id: u64) -> ApiResult<Notice> {
        parse(self.post_form(
            &format!("statuses/retweet/{id}.json"),
            &[("source", SOURCE.to_string())],
        )?)
    }

    fn favourite(&self, id: u64) -> ApiResult<()> {
        self.post_form(&format!("favorites/create/{id}.json"), &[])?;
        Ok(())
    }

    fn unfavourite(&self, id: u64) -> ApiResult<()> {
        self.post_form(&format!("favorites/destroy/{id}.json"), &[])?;
        Ok(())
    }

    fn send_direct(&self, screen_name: &str, text: &str) -> ApiResult<()> {
        self.post_form(
            "direct_messages/new.json",
            &[
                ("screen_name", screen_name.to_string()),
                ("text", text.to_string()),
                ("source", SOURCE.to_string()),
            ],
        )?;
        Ok(())
    }

    fn user(&self, screen_name: &str) -> ApiResult<Profile> {
        let value = self.get(
            "users/show.json",
            &[("screen_name", screen_name.to_string())],
        )?;
        let id = value
            .get("id")
            .and_then(as_u64)
            .ok_or_else(|| ApiError::new(404, format!("no such user: {screen_name}")))?;
        let screen_name = value
            .get("screen_name")
            .and_then(Value::as_str)
            .unwrap_or(screen_name)
            .to_string();
        Ok(Profile { id, screen_name })
    }

    fn subscribe(&self, screen_name: &str) -> ApiResult<()> {
        self.post_form(
            "friendships/create.json",
            &[("screen_name", screen_name.to_string())],
        )?;
        Ok(())
    }

    fn unsubscribe(&self, screen_name: &str) -> ApiResult<()> {
        self.post_form(
            "friendships/destroy.json",
            &[("screen_name", screen_name.to_string())],
        )?;
        Ok(())
    }

    fn block(&self, screen_name: &str) -> ApiResult<()> {
        self.post_form(
            "blocks/create.json",
            &[("screen_name", screen_name.to_string())],
        )?;
        Ok(())
    }

    fn unblock(&self, screen_name: &str) -> ApiResult<()> {
        self.post_form(
            "blocks/destroy.json",
            &[("screen_name", screen_name.to_string())],
        )?;
        Ok(())
    }

    fn group(&self, nickname: &str) -> ApiResult<Group> {
        let value = self.get(
            "statusnet/groups/show.json",
            &[("id", nickname.to_string())],
        )?;
        let id = value
            .get("id")
            .and_then(as_u64)
            .ok_or_else(|| ApiError::new(404, format!("no such group: {nickname}")))?;
        let nickname = value
            .get("nickname")
            .and_then(Value::as_str)
            .unwrap_or(nickname)
            .to_string();
        Ok(Group { id, nickname })
    }

    fn join_group(&self, nickname: &str) -> ApiResult<()> {
        self.post_form("statusnet/groups/join.json", &[("id", nickname.to_string())])?;
        Ok(())
    }

    fn leave_group(&self, nickname: &str) -> ApiResult<()> {
        self.post_form(
            "statusnet/groups/leave.json",
            &[("id", nickname.to_string())],
        )?;
        Ok(())
    }

    fn is_group_member(&self, nickname: &str) -> ApiResult<bool> {
        let group = self.group(nickname)?;
        let value = self.get(
            "statusnet/groups/is_member.json",
            &[
                ("user_id", self.user_id.to_string()),
                ("group_id", group.id.to_string()),
            ],
        )?;
        Ok(value
            .get("is_member")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}
