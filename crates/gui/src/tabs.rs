use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};

pub type TabId = u64;

pub const DEFAULT_TAB_TITLE: &str = "New Tab";
pub const BLANK_URL: &str = "about:blank";

/// Browser tab information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub active: bool,
    pub is_loading: bool,
}

impl Tab {
    pub fn new(id: TabId, url: String) -> Self {
        Self {
            id,
            title: DEFAULT_TAB_TITLE.to_string(),
            url,
            active: false,
            is_loading: false,
        }
    }
}

/// Result of a close request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The tab was the only one left and stays open.
    LastTab,
    /// An inactive tab was removed.
    Closed,
    /// The active tab was removed and this tab took over.
    Promoted(Tab),
}

/// Ordered tab strip. Holds exactly one active tab whenever it is non-empty.
#[derive(Debug, Clone, Default)]
pub struct TabStrip {
    tabs: IndexMap<TabId, Tab>,
    active: Option<TabId>,
    next_id: TabId,
}

impl TabStrip {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip bootstrapped with a single active tab.
    pub fn with_initial(url: impl Into<String>) -> Self {
        let mut strip = Self::new();
        strip.create_tab(url.into());
        strip
    }

    /// Create a new tab. The new tab becomes the active one.
    pub fn create_tab(&mut self, url: String) -> TabId {
        self.next_id += 1;
        let tab_id = self.next_id;
        self.tabs.insert(tab_id, Tab::new(tab_id, url));
        self.set_active(tab_id);
        tab_id
    }

    pub fn close_tab(&mut self, tab_id: TabId) -> Result<CloseOutcome> {
        if !self.tabs.contains_key(&tab_id) {
            return Err(ShellError::TabNotFound(tab_id));
        }
        if self.tabs.len() == 1 {
            return Ok(CloseOutcome::LastTab);
        }

        self.tabs.shift_remove(&tab_id);
        if self.active != Some(tab_id) {
            return Ok(CloseOutcome::Closed);
        }

        // The strip had at least two tabs, so a first one remains.
        let promoted = match self.tabs.keys().next().copied() {
            Some(id) => id,
            None => return Ok(CloseOutcome::Closed),
        };
        self.set_active(promoted);
        Ok(CloseOutcome::Promoted(self.tabs[&promoted].clone()))
    }

    /// Switch to a tab
    pub fn activate(&mut self, tab_id: TabId) -> Result<&Tab> {
        if !self.tabs.contains_key(&tab_id) {
            return Err(ShellError::TabNotFound(tab_id));
        }
        self.set_active(tab_id);
        Ok(&self.tabs[&tab_id])
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn get(&self, tab_id: TabId) -> Option<&Tab> {
        self.tabs.get(&tab_id)
    }

    pub fn active(&self) -> Option<&Tab> {
        self.active.and_then(|id| self.tabs.get(&id))
    }

    /// Mutable access to the active tab, which all host events target.
    pub fn active_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active?;
        self.tabs.get_mut(&id)
    }

    /// Only the active tab can show the content view's loading state.
    fn set_active(&mut self, tab_id: TabId) {
        for tab in self.tabs.values_mut() {
            tab.active = tab.id == tab_id;
            if !tab.active {
                tab.is_loading = false;
            }
        }
        self.active = Some(tab_id);
    }
}

/// Navigation helper functions
pub mod navigation {
    /// Resolve URL-bar input into an address.
    ///
    /// Empty input resolves to nothing. Input starting with `http` is used
    /// as-is; otherwise input containing a `.` is treated as a host and gets
    /// `https://`, and anything else becomes a search query.
    pub fn resolve_input(input: &str, search_endpoint: &str) -> Option<String> {
        let url = input.trim();
        if url.is_empty() {
            return None;
        }
        if url.starts_with("http") {
            return Some(url.to_string());
        }
        if url.contains('.') {
            Some(format!("https://{url}"))
        } else {
            Some(search_query_to_url(url, search_endpoint))
        }
    }

    /// Characters `encodeURIComponent` leaves alone but `urlencoding` escapes.
    const UNRESERVED_MARKS: [(&str, &str); 5] = [
        ("%21", "!"),
        ("%27", "'"),
        ("%28", "("),
        ("%29", ")"),
        ("%2A", "*"),
    ];

    /// Convert search query to URL
    pub fn search_query_to_url(query: &str, search_endpoint: &str) -> String {
        let encoded = UNRESERVED_MARKS
            .iter()
            .fold(urlencoding::encode(query).into_owned(), |acc, (escaped, mark)| {
                acc.replace(escaped, mark)
            });
        format!("{search_endpoint}{encoded}")
    }
}

#[cfg(test)]
mod tests {
    use super::navigation::*;
    use super::*;

    const SEARCH: &str = "https://google.com/search?q=";

    fn assert_single_active(strip: &TabStrip) {
        let active = strip.tabs().iter().filter(|t| t.active).count();
        assert_eq!(active, 1, "exactly one active tab expected");
        assert_eq!(strip.active().map(|t| t.active), Some(true));
    }

    #[test]
    fn test_new_tab_becomes_active() {
        let mut strip = TabStrip::with_initial("https://google.com");
        let first = strip.active().unwrap().id;
        let second = strip.create_tab(BLANK_URL.to_string());

        assert_ne!(first, second);
        assert_eq!(strip.active().unwrap().id, second);
        assert_eq!(strip.active().unwrap().title, "New Tab");
        assert_single_active(&strip);
    }

    #[test]
    fn test_closing_last_tab_is_rejected() {
        let mut strip = TabStrip::with_initial("https://google.com");
        let id = strip.active().unwrap().id;
        assert_eq!(strip.close_tab(id).unwrap(), CloseOutcome::LastTab);
        assert_eq!(strip.len(), 1);
        assert_single_active(&strip);
    }

    #[test]
    fn test_closing_active_tab_promotes_first() {
        let mut strip = TabStrip::with_initial("https://a.example");
        let first = strip.active().unwrap().id;
        strip.create_tab("https://b.example".into());
        let third = strip.create_tab("https://c.example".into());

        match strip.close_tab(third).unwrap() {
            CloseOutcome::Promoted(tab) => {
                assert_eq!(tab.id, first);
                assert_eq!(tab.url, "https://a.example");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_single_active(&strip);
    }

    #[test]
    fn test_closing_inactive_tab_keeps_active() {
        let mut strip = TabStrip::with_initial("https://a.example");
        let first = strip.active().unwrap().id;
        let second = strip.create_tab("https://b.example".into());

        assert_eq!(strip.close_tab(first).unwrap(), CloseOutcome::Closed);
        assert_eq!(strip.active().unwrap().id, second);
        assert!(matches!(strip.close_tab(first), Err(ShellError::TabNotFound(_))));
    }

    #[test]
    fn test_single_active_over_mixed_sequences() {
        let mut strip = TabStrip::with_initial("https://start.example");
        for round in 0..40u64 {
            match round % 5 {
                0 | 3 => {
                    strip.create_tab(format!("https://{round}.example"));
                }
                1 => {
                    let id = strip.active().unwrap().id;
                    strip.close_tab(id).unwrap();
                }
                2 => {
                    let id = strip.tabs()[0].id;
                    strip.close_tab(id).unwrap();
                }
                _ => {
                    let id = strip.tabs().last().unwrap().id;
                    strip.activate(id).unwrap();
                }
            }
            assert!(strip.len() >= 1);
            assert_single_active(&strip);
        }
    }

    #[test]
    fn test_url_bar_resolution() {
        assert_eq!(
            resolve_input("example", SEARCH).as_deref(),
            Some("https://google.com/search?q=example")
        );
        assert_eq!(
            resolve_input("example.com", SEARCH).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(resolve_input("http://x", SEARCH).as_deref(), Some("http://x"));
        assert_eq!(resolve_input("   ", SEARCH), None);
        assert_eq!(
            resolve_input("  weather today ", SEARCH).as_deref(),
            Some("https://google.com/search?q=weather%20today")
        );
    }

    #[test]
    fn test_search_query_keeps_unreserved_marks() {
        assert_eq!(
            search_query_to_url("what's up!", SEARCH),
            "https://google.com/search?q=what's%20up!"
        );
        assert_eq!(
            search_query_to_url("(a*b) & c", SEARCH),
            "https://google.com/search?q=(a*b)%20%26%20c"
        );
    }

    #[test]
    fn test_switching_tabs_clears_loading_on_inactive() {
        let mut strip = TabStrip::with_initial("https://a.example");
        let first = strip.active().unwrap().id;
        strip.active_mut().unwrap().is_loading = true;

        strip.create_tab(BLANK_URL.to_string());
        assert!(!strip.get(first).unwrap().is_loading);
        assert!(strip.tabs().iter().all(|t| !t.is_loading));
    }
}
