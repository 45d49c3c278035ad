use std::mem::discriminant;

/// What a tab shows, with the parameters its fetch needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Mentions,
    Direct,
    SentDirect,
    Public,
    Favourites,
    User {
        screen_name: String,
        user_id: Option<u64>,
    },
    Group {
        nickname: String,
        group_id: Option<u64>,
    },
    Tag {
        tag: String,
    },
    Search {
        query: String,
    },
    Context {
        conversation_id: Option<u64>,
        notice_id: u64,
    },
    Help,
}

impl ViewKind {
    /// Kinds that may only be open once.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            ViewKind::Home
                | ViewKind::Mentions
                | ViewKind::Direct
                | ViewKind::SentDirect
                | ViewKind::Favourites
        )
    }

    pub fn same_kind(&self, other: &ViewKind) -> bool {
        discriminant(self) == discriminant(other)
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, ViewKind::Direct | ViewKind::SentDirect)
    }

    /// Whether a refresh bringing new notices here deserves a notification.
    pub fn notifies(&self) -> bool {
        matches!(self, ViewKind::Mentions | ViewKind::Direct)
    }

    pub fn title(&self) -> String {
        match self {
            ViewKind::Home => "Home".to_string(),
            ViewKind::Mentions => "Mentions".to_string(),
            ViewKind::Direct => "Directs".to_string(),
            ViewKind::SentDirect => "Sent Directs".to_string(),
            ViewKind::Public => "Public".to_string(),
            ViewKind::Favourites => "Favourites".to_string(),
            ViewKind::User { screen_name, .. } => format!("@{screen_name}"),
            ViewKind::Group { nickname, .. } => format!("!{nickname}"),
            ViewKind::Tag { tag } => format!("#{tag}"),
            ViewKind::Search { query } => format!("Search: {query}"),
            ViewKind::Context { .. } => "Context".to_string(),
            ViewKind::Help => "Help".to_string(),
        }
    }

    /// Parse one `initial_tabs` entry: "home", "@user", "!group", "#tag",
    /// "?query", "context:ID" and so on.
    pub fn parse_initial(entry: &str) -> Option<ViewKind> {
        let entry = entry.trim();
        if let Some(name) = entry.strip_prefix('@') {
            return (!name.is_empty()).then(|| ViewKind::User {
                screen_name: name.to_string(),
                user_id: None,
            });
        }
        if let Some(name) = entry.strip_prefix('!') {
            return (!name.is_empty()).then(|| ViewKind::Group {
                nickname: name.to_string(),
                group_id: None,
            });
        }
        if let Some(tag) = entry.strip_prefix('#') {
            return (!tag.is_empty()).then(|| ViewKind::Tag {
                tag: tag.to_string(),
            });
        }
        if let Some(query) = entry.strip_prefix('?') {
            return (!query.is_empty()).then(|| ViewKind::Search {
                query: query.to_string(),
            });
        }
        if let Some(id) = entry.strip_prefix("context:") {
            let notice_id = id.trim().parse().ok()?;
            return Some(ViewKind::Context {
                conversation_id: None,
                notice_id,
            });
        }
        match entry.to_lowercase().as_str() {
            "home" => Some(ViewKind::Home),
            "mentions" => Some(ViewKind::Mentions),
            "direct" | "directs" => Some(ViewKind::Direct),
            "sentdirect" | "sentdirects" => Some(ViewKind::SentDirect),
            "public" => Some(ViewKind::Public),
            "favourites" | "favorites" => Some(ViewKind::Favourites),
            "help" => Some(ViewKind::Help),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_initial_tab_specs() {
        assert_eq!(ViewKind::parse_initial("home"), Some(ViewKind::Home));
        assert_eq!(
            ViewKind::parse_initial("@bob"),
            Some(ViewKind::User {
                screen_name: "bob".to_string(),
                user_id: None
            })
        );
        assert_eq!(
            ViewKind::parse_initial("?rust lang"),
            Some(ViewKind::Search {
                query: "rust lang".to_string()
            })
        );
        assert_eq!(
            ViewKind::parse_initial("context:77"),
            Some(ViewKind::Context {
                conversation_id: None,
                notice_id: 77
            })
        );
        assert_eq!(ViewKind::parse_initial("@"), None);
        assert_eq!(ViewKind::parse_initial("nonsense"), None);
    }

    #[test]
    fn public_is_not_a_singleton() {
        assert!(ViewKind::Home.is_singleton());
        assert!(ViewKind::SentDirect.is_singleton());
        assert!(!ViewKind::Public.is_singleton());
        assert!(!ViewKind::Help.is_singleton());
    }
}
