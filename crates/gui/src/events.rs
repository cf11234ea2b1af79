//! Typed messages crossing the host/UI boundary.
//!
//! `HostCommand` flows UI → host, `SurfaceEvent` is what the native content
//! view reports, `HostEvent` is what the host relays to the UI, and `UiEvent`
//! is everything pushed to the UI webview, keyed by channel name.

use agent_session::{AgentMessage, SessionStatus};
use serde::Serialize;

use crate::layout::LayoutRect;
use crate::tabs::Tab;

/// One-way, unacknowledged commands for the host controller.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Navigate(String),
    GoBack,
    GoForward,
    Reload,
    UpdateLayout(LayoutRect),
}

/// Raw lifecycle callbacks from the content surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    StartedLoading,
    StoppedLoading,
    Navigated(String),
    /// Fragment or history-API navigation within the same document.
    NavigatedInPage(String),
    TitleUpdated(String),
}

/// Events relayed from the host to the UI surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostEvent {
    Loading(bool),
    UrlChanged(String),
    TitleChanged(String),
}

impl HostEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            HostEvent::Loading(_) => "browser-loading",
            HostEvent::UrlChanged(_) => "browser-url-changed",
            HostEvent::TitleChanged(_) => "browser-title-changed",
        }
    }
}

/// Everything pushed to the UI webview. Serialises to the bare payload; the
/// channel name travels separately.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UiEvent {
    Host(HostEvent),
    TabsChanged(Vec<Tab>),
    AgentMessage(AgentMessage),
    AgentStatus(SessionStatus),
}

impl UiEvent {
    pub fn channel(&self) -> &'static str {
        match self {
            UiEvent::Host(event) => event.channel(),
            UiEvent::TabsChanged(_) => "tabs-changed",
            UiEvent::AgentMessage(_) => "agent-message",
            UiEvent::AgentStatus(_) => "agent-status",
        }
    }
}

/// Push channel to the UI surface.
pub trait UiSink: Send + Sync {
    fn emit(&self, event: UiEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn host_events_serialise_to_bare_payloads() {
        let loading = UiEvent::Host(HostEvent::Loading(true));
        assert_eq!(loading.channel(), "browser-loading");
        assert_eq!(serde_json::to_value(&loading).unwrap(), json!(true));

        let title = UiEvent::Host(HostEvent::TitleChanged("Docs".into()));
        assert_eq!(title.channel(), "browser-title-changed");
        assert_eq!(serde_json::to_value(&title).unwrap(), json!("Docs"));
    }

    #[test]
    fn tab_list_payload_is_camel_case() {
        let event = UiEvent::TabsChanged(vec![Tab::new(1, "about:blank".into())]);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(event.channel(), "tabs-changed");
        assert_eq!(value[0]["isLoading"], json!(false));
        assert_eq!(value[0]["title"], json!("New Tab"));
    }
}
