//! Fuzzy search over the loaded site list.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

const MAX_RESULTS: usize = 10;

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub site: String,
    /// Match score for sorting.
    pub score: i64,
}

/// Search overlay state. Works only on sites already on screen.
#[derive(Debug, Default)]
pub struct SiteSearch {
    query: String,
    hits: Vec<SearchHit>,
    selected: usize,
}

impl SiteSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_site(&self) -> Option<&str> {
        self.hits.get(self.selected).map(|hit| hit.site.as_str())
    }

    pub fn push_char(&mut self, c: char, sites: &[String]) {
        self.query.push(c);
        self.rank(sites);
    }

    pub fn pop_char(&mut self, sites: &[String]) {
        self.query.pop();
        self.rank(sites);
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.hits.len() {
            self.selected += 1;
        }
    }

    /// Re-rank `sites` against the current query.
    pub fn rank(&mut self, sites: &[String]) {
        self.hits.clear();
        self.selected = 0;

        if self.query.trim().is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<_> = sites
            .iter()
            .filter_map(|site| {
                matcher
                    .fuzzy_match(site, &self.query)
                    .map(|score| SearchHit {
                        site: site.clone(),
                        score,
                    })
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(MAX_RESULTS);
        self.hits = scored;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Vec<String> {
        ["github.com", "gitlab.com", "google.com", "mail.proton.me"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn empty_query_has_no_hits() {
        let mut search = SiteSearch::new();
        search.rank(&sites());
        assert!(search.hits().is_empty());
        assert_eq!(search.selected_site(), None);
    }

    #[test]
    fn ranks_matching_sites() {
        let sites = sites();
        let mut search = SiteSearch::new();
        for c in "proton".chars() {
            search.push_char(c, &sites);
        }
        assert_eq!(search.selected_site(), Some("mail.proton.me"));
        assert_eq!(search.hits().len(), 1);
    }

    #[test]
    fn backspace_widens_results() {
        let sites = sites();
        let mut search = SiteSearch::new();
        for c in "gith".chars() {
            search.push_char(c, &sites);
        }
        let narrow = search.hits().len();
        search.pop_char(&sites);
        search.pop_char(&sites);
        assert!(search.hits().len() > narrow);
        assert_eq!(search.query(), "gi");
    }
}
