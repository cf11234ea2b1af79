use agent_session::{AgentMessage, SessionStatus};
use serde::Deserialize;
use tauri::State;

use crate::events::HostCommand;
use crate::layout::LayoutRect;
use crate::settings::ShellSettings;
use crate::shell::UiAction;
use crate::surface::ContentView;
use crate::tabs::{Tab, TabId};
use crate::AppState;

pub type DesktopState = AppState<ContentView>;

#[derive(Debug, Deserialize)]
pub struct ContentBounds {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl From<ContentBounds> for LayoutRect {
    fn from(bounds: ContentBounds) -> Self {
        LayoutRect::new(bounds.x, bounds.y, bounds.width, bounds.height)
    }
}

fn ui_action(state: &DesktopState, action: UiAction) -> Result<(), String> {
    state.context().ui_action(action).map_err(|e| e.to_string())
}

// Host command channel

#[tauri::command]
pub fn navigate(url: String, state: State<'_, DesktopState>) {
    state.context().host_command(HostCommand::Navigate(url));
}

#[tauri::command]
pub fn go_back(state: State<'_, DesktopState>) {
    state.context().host_command(HostCommand::GoBack);
}

#[tauri::command]
pub fn go_forward(state: State<'_, DesktopState>) {
    state.context().host_command(HostCommand::GoForward);
}

#[tauri::command]
pub fn reload(state: State<'_, DesktopState>) {
    state.context().host_command(HostCommand::Reload);
}

#[tauri::command]
pub fn update_layout(bounds: ContentBounds, state: State<'_, DesktopState>) {
    state
        .context()
        .host_command(HostCommand::UpdateLayout(bounds.into()));
}

// Tab and URL-bar management

/// Resize-observer callback for the content container.
#[tauri::command]
pub fn container_resized(
    bounds: ContentBounds,
    state: State<'_, DesktopState>,
) -> Result<(), String> {
    ui_action(&state, UiAction::ContainerResized(bounds.into()))
}

#[tauri::command]
pub fn submit_url(input: String, state: State<'_, DesktopState>) -> Result<(), String> {
    ui_action(&state, UiAction::SubmitUrl(input))
}

#[tauri::command]
pub fn new_tab(state: State<'_, DesktopState>) -> Result<(), String> {
    ui_action(&state, UiAction::NewTab)
}

#[tauri::command]
pub fn close_tab(tab_id: TabId, state: State<'_, DesktopState>) -> Result<(), String> {
    ui_action(&state, UiAction::CloseTab(tab_id))
}

#[tauri::command]
pub fn activate_tab(tab_id: TabId, state: State<'_, DesktopState>) -> Result<(), String> {
    ui_action(&state, UiAction::ActivateTab(tab_id))
}

#[tauri::command]
pub fn get_tabs(state: State<'_, DesktopState>) -> Vec<Tab> {
    state.context().shell().tabs()
}

// Agent sidebar

#[tauri::command]
pub fn agent_submit(text: String, state: State<'_, DesktopState>) {
    state.agent.submit(text);
}

#[tauri::command]
pub fn agent_stop(state: State<'_, DesktopState>) {
    state.agent.stop();
}

#[tauri::command]
pub fn agent_log(state: State<'_, DesktopState>) -> Vec<AgentMessage> {
    state.agent.messages()
}

#[tauri::command]
pub fn agent_status(state: State<'_, DesktopState>) -> SessionStatus {
    state.agent.status()
}

// Settings management

#[tauri::command]
pub fn get_settings(state: State<'_, DesktopState>) -> ShellSettings {
    state.settings()
}

#[tauri::command]
pub fn update_settings(
    settings: ShellSettings,
    state: State<'_, DesktopState>,
) -> Result<(), String> {
    settings.save().map_err(|e| e.to_string())?;
    state.apply_settings(settings);
    Ok(())
}
