//! In-page search over the active tab's rendered lines.
//!
//! The state remembers the last query, the matching line indices and
//! which match is being viewed. Re-submitting the same query on the same
//! tab advances through the matches; anything that ends the streak resets
//! it and clears the highlight.

use crate::tabs::TabId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    query: String,
    occurrences: Vec<usize>,
    viewing: usize,
    tab: Option<TabId>,
}

/// Where to scroll and what to tell the user after a search step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStep {
    pub line: Option<usize>,
    pub message: String,
}

pub fn find_occurrences(query: &str, lines: &[String], case_sensitive: bool) -> Vec<usize> {
    if case_sensitive {
        return lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(query))
            .map(|(i, _)| i)
            .collect();
    }
    let needle = query.to_lowercase();
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| line.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

impl SearchState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn occurrences(&self) -> &[usize] {
        &self.occurrences
    }

    pub fn viewing(&self) -> usize {
        self.viewing
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reset when the streak belongs to another tab.
    pub fn tab_switched(&mut self, tab: TabId) {
        if self.tab.is_some_and(|owner| owner != tab) {
            self.reset();
        }
    }

    fn current(&self) -> usize {
        self.occurrences[self.viewing]
    }

    fn viewing_message(&self) -> String {
        format!(
            "Match {} of {} for '{}'",
            self.viewing + 1,
            self.occurrences.len(),
            self.query
        )
    }

    /// Handle a submitted search line.
    pub fn submit(
        &mut self,
        query: &str,
        tab: TabId,
        lines: &[String],
        case_sensitive: bool,
    ) -> SearchStep {
        if query.is_empty() {
            self.reset();
            return SearchStep {
                line: None,
                message: String::new(),
            };
        }
        if self.is_active() && self.query == query && self.tab == Some(tab) {
            return self.next();
        }

        let occurrences = find_occurrences(query, lines, case_sensitive);
        if occurrences.is_empty() {
            self.reset();
            return SearchStep {
                line: None,
                message: format!("No matches for '{query}'"),
            };
        }
        self.query = query.to_string();
        self.occurrences = occurrences;
        self.viewing = 0;
        self.tab = Some(tab);
        SearchStep {
            line: Some(self.current()),
            message: self.viewing_message(),
        }
    }

    pub fn next(&mut self) -> SearchStep {
        if !self.is_active() {
            return SearchStep {
                line: None,
                message: "No search in progress".to_string(),
            };
        }
        if self.viewing + 1 < self.occurrences.len() {
            self.viewing += 1;
            return SearchStep {
                line: Some(self.current()),
                message: self.viewing_message(),
            };
        }
        self.viewing = 0;
        SearchStep {
            line: Some(self.current()),
            message: format!(
                "No more matches for '{}', back to the first",
                self.query
            ),
        }
    }

    pub fn prev(&mut self) -> SearchStep {
        if !self.is_active() {
            return SearchStep {
                line: None,
                message: "No search in progress".to_string(),
            };
        }
        if self.viewing > 0 {
            self.viewing -= 1;
            return SearchStep {
                line: Some(self.current()),
                message: self.viewing_message(),
            };
        }
        self.viewing = self.occurrences.len() - 1;
        SearchStep {
            line: Some(self.current()),
            message: format!("Back to the last match for '{}'", self.query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn page() -> Vec<String> {
        let mut out = vec![String::new(); 14];
        out[3] = "rust is neat".to_string();
        out[7] = "more Rust here".to_string();
        out[12] = "rust again".to_string();
        out
    }

    #[test]
    fn case_policy_controls_matching() {
        let text = lines(&["Rust", "rust", "crust"]);
        assert_eq!(find_occurrences("rust", &text, true), vec![1, 2]);
        assert_eq!(find_occurrences("rust", &text, false), vec![0, 1, 2]);
    }

    #[test]
    fn new_query_views_first_match() {
        let mut search = SearchState::default();
        let step = search.submit("rust", 1, &page(), false);
        assert_eq!(search.occurrences(), &[3, 7, 12]);
        assert_eq!(search.viewing(), 0);
        assert_eq!(step.line, Some(3));
    }

    #[test]
    fn next_advances_and_wraps() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        let step = search.next();
        assert_eq!((search.viewing(), step.line), (1, Some(7)));
        search.next();
        assert_eq!(search.viewing(), 2);
        let wrapped = search.next();
        assert_eq!((search.viewing(), wrapped.line), (0, Some(3)));
        assert!(wrapped.message.starts_with("No more matches"));
    }

    #[test]
    fn prev_wraps_to_last() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        let step = search.prev();
        assert_eq!((search.viewing(), step.line), (2, Some(12)));
    }

    #[test]
    fn resubmitting_same_query_advances() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        let step = search.submit("rust", 1, &page(), false);
        assert_eq!(step.line, Some(7));
    }

    #[test]
    fn same_query_on_other_tab_starts_over() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        search.next();
        let step = search.submit("rust", 2, &page(), false);
        assert_eq!(step.line, Some(3));
        assert_eq!(search.viewing(), 0);
    }

    #[test]
    fn no_matches_resets_state() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        let step = search.submit("python", 1, &page(), false);
        assert_eq!(step.line, None);
        assert_eq!(search, SearchState::default());
    }

    #[test]
    fn empty_query_and_tab_switch_reset() {
        let mut search = SearchState::default();
        search.submit("rust", 1, &page(), false);
        search.submit("", 1, &page(), false);
        assert!(!search.is_active());

        search.submit("rust", 1, &page(), false);
        search.tab_switched(1);
        assert!(search.is_active());
        search.tab_switched(2);
        assert_eq!(search, SearchState::default());
    }
}
