use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    pub screen_name: String,
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<u64>,
}

/// A notice or direct message as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Notice {
    #[serde(deserialize_with = "required_id")]
    pub id: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    /// Direct messages carry `sender` instead of `user`.
    #[serde(default)]
    pub sender: Option<UserRef>,
    #[serde(default)]
    pub recipient: Option<UserRef>,
    #[serde(default)]
    pub retweeted_status: Option<Box<Notice>>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub statusnet_conversation_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub in_reply_to_status_id: Option<u64>,
    #[serde(default)]
    pub in_reply_to_screen_name: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub favorited: bool,
}

impl Notice {
    /// The repeated notice for a repeat, otherwise the notice itself.
    pub fn original(&self) -> &Notice {
        self.retweeted_status.as_deref().unwrap_or(self)
    }

    pub fn is_repeat(&self) -> bool {
        self.retweeted_status.is_some()
    }

    pub fn author(&self) -> &str {
        self.user
            .as_ref()
            .or(self.sender.as_ref())
            .map(|user| user.screen_name.as_str())
            .unwrap_or("")
    }

    pub fn is_direct(&self) -> bool {
        self.sender.is_some()
    }

    #[cfg(test)]
    pub fn fixture(id: u64, author: &str, text: &str) -> Notice {
        Notice {
            id,
            text: text.to_string(),
            user: Some(UserRef {
                screen_name: author.to_string(),
                id: None,
            }),
            sender: None,
            recipient: None,
            retweeted_status: None,
            statusnet_conversation_id: Some(id),
            in_reply_to_status_id: None,
            in_reply_to_screen_name: None,
            created_at: String::new(),
            source: String::new(),
            favorited: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn value(self) -> Option<u64> {
        match self {
            RawId::Number(value) => Some(value),
            RawId::Text(text) => text.trim().parse().ok(),
        }
    }
}

/// Ids arrive as numbers, numeric strings or null depending on server version.
fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.and_then(RawId::value))
}

fn required_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    RawId::deserialize(deserializer)?
        .value()
        .ok_or_else(|| serde::de::Error::custom("notice id is not numeric"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeat_with_string_ids() {
        let notice: Notice = serde_json::from_str(
            r#"{
                "id": "12",
                "text": "RT @bob hi",
                "user": {"screen_name": "alice", "id": 1},
                "statusnet_conversation_id": null,
                "retweeted_status": {
                    "id": 7,
                    "text": "hi",
                    "user": {"screen_name": "bob"}
                }
            }"#,
        )
        .expect("parse");
        assert_eq!(notice.id, 12);
        assert!(notice.is_repeat());
        assert_eq!(notice.original().id, 7);
        assert_eq!(notice.original().author(), "bob");
        assert_eq!(notice.statusnet_conversation_id, None);
    }

    #[test]
    fn direct_message_author_is_sender() {
        let notice: Notice = serde_json::from_str(
            r#"{"id": 3, "text": "psst", "sender": {"screen_name": "carol"},
                "recipient": {"screen_name": "me"}}"#,
        )
        .expect("parse");
        assert!(notice.is_direct());
        assert_eq!(notice.author(), "carol");
    }
}
