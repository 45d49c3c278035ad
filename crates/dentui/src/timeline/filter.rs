use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::api::Notice;

/// Configured notice filters. Plain filters match case-insensitively as
/// substrings; regex filters use the pattern as written.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    plain: Vec<String>,
    patterns: Vec<Regex>,
}

impl Filters {
    pub fn new(filters: &[String], regex_mode: bool) -> Self {
        let mut out = Self::default();
        for filter in filters.iter().filter(|f| !f.is_empty()) {
            if regex_mode {
                match RegexBuilder::new(filter).build() {
                    Ok(re) => out.patterns.push(re),
                    Err(err) => warn!(filter = %filter, %err, "skipping invalid filter"),
                }
            } else {
                out.plain.push(filter.to_lowercase());
            }
        }
        out
    }

    pub fn hides(&self, notice: &Notice) -> bool {
        let text = &notice.original().text;
        if self.patterns.iter().any(|re| re.is_match(text)) {
            return true;
        }
        if self.plain.is_empty() {
            return false;
        }
        let lower = text.to_lowercase();
        self.plain.iter().any(|filter| lower.contains(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(text: &str) -> Notice {
        Notice::fixture(1, "a", text)
    }

    #[test]
    fn plain_filters_ignore_case() {
        let filters = Filters::new(&["Spoiler".to_string()], false);
        assert!(filters.hides(&notice("big SPOILER ahead")));
        assert!(!filters.hides(&notice("nothing to see")));
    }

    #[test]
    fn regex_filters_and_bad_patterns() {
        let filters = Filters::new(&[r"^RT\b".to_string(), "(".to_string()], true);
        assert!(filters.hides(&notice("RT @x hello")));
        assert!(!filters.hides(&notice("ART show")));
    }
}
