//! Tab completion over users, groups, tags and commands.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    #[default]
    Exact,
    Fuzzy,
}

impl CompletionMode {
    pub fn from_config(value: &str) -> Self {
        match value {
            "fuzzy" => CompletionMode::Fuzzy,
            _ => CompletionMode::Exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Users,
    Groups,
    Tags,
    Commands,
}

/// Supplies completion candidates and link shortening to the editor.
pub trait CompletionContext {
    /// `None` when the source has never been populated.
    fn candidates(&self, source: Source) -> Option<Vec<String>>;
    fn shorten_url(&mut self, url: &str) -> Option<String>;
}

/// Split a token into its completion source and the word to match.
///
/// Commands keep their `/` since command names include it.
pub fn split_sigil(token: &str) -> (Source, &str) {
    match token.chars().next() {
        Some('@') => (Source::Users, &token[1..]),
        Some('!') => (Source::Groups, &token[1..]),
        Some('#') => (Source::Tags, &token[1..]),
        Some('/') => (Source::Commands, token),
        _ => (Source::Users, token),
    }
}

pub fn is_url(token: &str) -> bool {
    static URL: OnceLock<Option<Regex>> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"^(?i)(https?|ftp)://[^\s/$.?#].\S*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(token))
}

pub fn longest_common_prefix(values: &[String]) -> String {
    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix: Vec<char> = first.chars().collect();
    for value in iter {
        let common = prefix
            .iter()
            .zip(value.chars())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(common);
        if prefix.is_empty() {
            break;
        }
    }
    prefix.into_iter().collect()
}

/// True when every char of `word` appears in `candidate`, in order.
pub fn fuzzy_matches(word: &str, candidate: &str) -> bool {
    let mut rest = candidate.chars();
    word.chars().all(|ch| rest.any(|c| c == ch))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionPlan {
    /// Chars of the typed word to remove before inserting `insert`.
    pub remove: usize,
    pub insert: String,
    /// Candidates to report when completion was ambiguous.
    pub candidates: Vec<String>,
}

impl CompletionPlan {
    pub fn is_noop(&self) -> bool {
        self.remove == 0 && self.insert.is_empty() && self.candidates.is_empty()
    }
}

pub fn plan(word: &str, candidates: &[String], mode: CompletionMode) -> CompletionPlan {
    match mode {
        CompletionMode::Exact => plan_exact(word, candidates),
        CompletionMode::Fuzzy => plan_fuzzy(word, candidates),
    }
}

fn plan_exact(word: &str, candidates: &[String]) -> CompletionPlan {
    let possible: Vec<String> = candidates
        .iter()
        .filter(|candidate| candidate.starts_with(word))
        .cloned()
        .collect();
    let common = longest_common_prefix(&possible);
    let typed = word.chars().count();
    let mut plan = CompletionPlan::default();
    if common.chars().count() > typed {
        plan.insert = common.chars().skip(typed).collect();
    } else if possible.len() > 1 {
        plan.candidates = possible;
    }
    plan
}

fn plan_fuzzy(word: &str, candidates: &[String]) -> CompletionPlan {
    let possible: Vec<String> = candidates
        .iter()
        .filter(|candidate| fuzzy_matches(word, candidate))
        .cloned()
        .collect();
    let common = longest_common_prefix(&possible);
    let mut plan = CompletionPlan::default();
    if !common.is_empty() && common != word && fuzzy_matches(word, &common) {
        plan.remove = word.chars().count();
        plan.insert = common;
    }
    if possible.len() > 1 {
        plan.candidates = possible;
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn sigils_pick_sources() {
        assert_eq!(split_sigil("@bob"), (Source::Users, "bob"));
        assert_eq!(split_sigil("!rust"), (Source::Groups, "rust"));
        assert_eq!(split_sigil("#tag"), (Source::Tags, "tag"));
        assert_eq!(split_sigil("/fav"), (Source::Commands, "/fav"));
        assert_eq!(split_sigil("bob"), (Source::Users, "bob"));
    }

    #[test]
    fn url_detection() {
        assert!(is_url("http://example.com/a?b=c"));
        assert!(is_url("HTTPS://example.org"));
        assert!(!is_url("example.com"));
        assert!(!is_url("@http"));
    }

    #[test]
    fn exact_extends_to_common_prefix() {
        let plan = plan("al", &names(&["alice", "alicia", "bob"]), CompletionMode::Exact);
        assert_eq!(plan.remove, 0);
        assert_eq!(plan.insert, "ic");
        assert!(plan.candidates.is_empty());
    }

    #[test]
    fn exact_reports_candidates_when_stuck() {
        let plan = plan("alic", &names(&["alice", "alicia"]), CompletionMode::Exact);
        assert!(plan.insert.is_empty());
        assert_eq!(plan.candidates, names(&["alice", "alicia"]));
    }

    #[test]
    fn exact_is_case_sensitive() {
        let plan = plan("Al", &names(&["alice"]), CompletionMode::Exact);
        assert!(plan.is_noop());
    }

    #[test]
    fn fuzzy_replaces_only_with_matching_prefix() {
        let plan = plan("ae", &names(&["alexander", "alexis"]), CompletionMode::Fuzzy);
        assert_eq!(plan.remove, 2);
        assert_eq!(plan.insert, "alex");
        assert!(fuzzy_matches("ae", &plan.insert));
        assert_eq!(plan.candidates, names(&["alexander", "alexis"]));
    }

    #[test]
    fn fuzzy_keeps_token_when_prefix_loses_match() {
        let plan = plan("ns", &names(&["anna_s", "annis"]), CompletionMode::Fuzzy);
        // Common prefix "ann" lacks the 's'.
        assert_eq!(plan.remove, 0);
        assert!(plan.insert.is_empty());
        assert_eq!(plan.candidates.len(), 2);
    }

    #[test]
    fn fuzzy_single_match_completes_fully() {
        let plan = plan("bb", &names(&["bobby", "carol"]), CompletionMode::Fuzzy);
        assert_eq!(plan.insert, "bobby");
        assert!(plan.candidates.is_empty());
    }
}
