//! Site list view state.

use crate::models::Notice;
use crate::Result;

/// What activating the selected row leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Open the detail flow for this site.
    Open(String),
    /// Nothing usable is selected.
    Rejected(Notice),
}

/// The sorted list of sites last confirmed by the server.
#[derive(Debug, Default)]
pub struct ListView {
    sites: Vec<String>,
    selected: usize,
    loaded: bool,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    /// Whether a list has been received at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_site(&self) -> Option<&str> {
        self.sites.get(self.selected).map(String::as_str)
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.sites.len() {
            self.selected += 1;
        }
    }

    pub fn move_first(&mut self) {
        self.selected = 0;
    }

    pub fn move_last(&mut self) {
        self.selected = self.sites.len().saturating_sub(1);
    }

    /// Select `site` if it is listed. Returns whether it was found.
    pub fn select_site(&mut self, site: &str) -> bool {
        match self.sites.iter().position(|s| s == site) {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Apply the result of a list fetch.
    ///
    /// A successful fetch replaces the whole list; the selection follows the
    /// previously selected site when it is still present. A failure leaves the
    /// displayed list untouched and is returned as a notice.
    pub fn apply(&mut self, result: Result<Vec<String>>) -> Option<Notice> {
        match result {
            Ok(sites) => {
                let previous = self.selected_site().map(str::to_string);
                self.sites = sites;
                self.loaded = true;

                let kept = previous.is_some_and(|site| self.select_site(&site));
                if !kept {
                    self.selected = self.selected.min(self.sites.len().saturating_sub(1));
                }
                tracing::debug!("Loaded {} sites", self.sites.len());
                None
            }
            Err(e) => {
                tracing::warn!("Failed to fetch passwords: {}", e);
                Some(Notice::failure("Failed to fetch passwords", &e))
            }
        }
    }

    /// Activate the selected row.
    pub fn activate(&self) -> Activation {
        match self.selected_site() {
            Some(site) if !site.is_empty() => Activation::Open(site.to_string()),
            _ => Activation::Rejected(Notice::warning("Error", "No site selected.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;

    fn sites(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn successful_fetch_replaces_list() {
        let mut list = ListView::new();
        assert!(list.apply(Ok(sites(&["a.com", "b.com"]))).is_none());
        assert!(list.apply(Ok(sites(&["c.com"]))).is_none());
        assert_eq!(list.sites(), ["c.com"]);
        assert!(list.is_loaded());
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut list = ListView::new();
        list.apply(Ok(sites(&["a.com", "b.com"])));
        list.move_down();

        let notice = list
            .apply(Err(ClientError::Server {
                status: 404,
                body: String::new(),
            }))
            .expect("notice");
        assert_eq!(notice.title, "Server Error");
        assert_eq!(list.sites(), ["a.com", "b.com"]);
        assert_eq!(list.selected_site(), Some("b.com"));
    }

    #[test]
    fn selection_follows_site_across_refresh() {
        let mut list = ListView::new();
        list.apply(Ok(sites(&["b.com", "c.com"])));
        list.move_down();
        list.apply(Ok(sites(&["a.com", "b.com", "c.com"])));
        assert_eq!(list.selected_site(), Some("c.com"));
    }

    #[test]
    fn selection_is_clamped_when_site_disappears() {
        let mut list = ListView::new();
        list.apply(Ok(sites(&["a.com", "b.com", "c.com"])));
        list.move_last();
        list.apply(Ok(sites(&["a.com"])));
        assert_eq!(list.selected_site(), Some("a.com"));
    }

    #[test]
    fn activating_empty_list_is_rejected() {
        let list = ListView::new();
        match list.activate() {
            Activation::Rejected(notice) => assert_eq!(notice.message, "No site selected."),
            other => panic!("unexpected activation: {other:?}"),
        }
    }

    #[test]
    fn activating_selected_site_opens_it() {
        let mut list = ListView::new();
        list.apply(Ok(sites(&["a.com", "b.com"])));
        list.move_down();
        assert_eq!(list.activate(), Activation::Open("b.com".into()));
    }

    #[test]
    fn movement_stays_in_bounds() {
        let mut list = ListView::new();
        list.apply(Ok(sites(&["a.com", "b.com"])));
        list.move_up();
        assert_eq!(list.selected_index(), 0);
        list.move_down();
        list.move_down();
        assert_eq!(list.selected_index(), 1);
    }
}
