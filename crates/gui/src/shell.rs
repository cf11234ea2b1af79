use tracing::debug;

use crate::error::Result;
use crate::events::{HostCommand, HostEvent};
use crate::layout::{LayoutRect, LayoutSync};
use crate::tabs::{navigation, CloseOutcome, Tab, TabId, TabStrip, BLANK_URL, DEFAULT_TAB_TITLE};

/// User interactions with the browser chrome.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    NewTab,
    CloseTab(TabId),
    ActivateTab(TabId),
    SubmitUrl(String),
    Back,
    Forward,
    Reload,
    ContainerResized(LayoutRect),
}

impl UiAction {
    /// Whether the action can change the tab list.
    pub fn touches_tabs(&self) -> bool {
        matches!(
            self,
            UiAction::NewTab
                | UiAction::CloseTab(_)
                | UiAction::ActivateTab(_)
                | UiAction::SubmitUrl(_)
        )
    }
}

/// UI-surface state: tab strip, URL bar, loading indicator and the content
/// container observer. Turns user actions into host commands and folds host
/// events back into the tab strip.
#[derive(Debug, Clone)]
pub struct BrowserShell {
    tabs: TabStrip,
    url_input: String,
    loading: bool,
    layout: LayoutSync,
    search_endpoint: String,
}

impl BrowserShell {
    pub fn new(home_url: &str, search_endpoint: impl Into<String>) -> Self {
        Self {
            tabs: TabStrip::with_initial(home_url),
            url_input: home_url.to_string(),
            loading: false,
            layout: LayoutSync::new(),
            search_endpoint: search_endpoint.into(),
        }
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs.tabs()
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.active()
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_search_endpoint(&mut self, endpoint: impl Into<String>) {
        self.search_endpoint = endpoint.into();
    }

    /// Handle one user action, returning the host command it produces.
    pub fn dispatch(&mut self, action: UiAction) -> Result<Option<HostCommand>> {
        debug!(?action, "ui action");
        let command = match action {
            UiAction::NewTab => {
                self.tabs.create_tab(BLANK_URL.to_string());
                self.url_input.clear();
                None
            }
            UiAction::CloseTab(tab_id) => match self.tabs.close_tab(tab_id)? {
                CloseOutcome::Promoted(tab) => {
                    self.url_input = tab.url.clone();
                    Some(HostCommand::Navigate(tab.url))
                }
                CloseOutcome::LastTab | CloseOutcome::Closed => None,
            },
            UiAction::ActivateTab(tab_id) => {
                let url = self.tabs.activate(tab_id)?.url.clone();
                self.url_input = url.clone();
                Some(HostCommand::Navigate(url))
            }
            UiAction::SubmitUrl(input) => {
                let resolved = navigation::resolve_input(&input, &self.search_endpoint);
                self.url_input = input;
                resolved.map(|url| {
                    if let Some(tab) = self.tabs.active_mut() {
                        tab.url = url.clone();
                    }
                    HostCommand::Navigate(url)
                })
            }
            UiAction::Back => Some(HostCommand::GoBack),
            UiAction::Forward => Some(HostCommand::GoForward),
            UiAction::Reload => Some(HostCommand::Reload),
            UiAction::ContainerResized(rect) => self.layout.observe(rect),
        };
        // A single content view backs every tab, so its loading state follows
        // whichever tab is active.
        if let Some(tab) = self.tabs.active_mut() {
            tab.is_loading = self.loading;
        }
        Ok(command)
    }

    /// Fold a relayed host event into the active tab and the URL bar.
    pub fn apply_host_event(&mut self, event: &HostEvent) {
        match event {
            HostEvent::Loading(loading) => {
                self.loading = *loading;
                if let Some(tab) = self.tabs.active_mut() {
                    tab.is_loading = *loading;
                }
            }
            HostEvent::UrlChanged(url) => {
                self.url_input = url.clone();
                if let Some(tab) = self.tabs.active_mut() {
                    tab.url = url.clone();
                }
            }
            HostEvent::TitleChanged(title) => {
                if let Some(tab) = self.tabs.active_mut() {
                    tab.title = if title.is_empty() {
                        DEFAULT_TAB_TITLE.to_string()
                    } else {
                        title.clone()
                    };
                }
            }
        }
    }
}
